//! Per-user session state and the registry mapping bearer tokens to sessions.

use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::account::{Account, Role},
};

/// Session context handed explicitly to the dashboard controller.
///
/// Only two states exist: nobody is logged in, or an account is logged in
/// with the role resolved at login time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Account),
}

impl Session {
    /// `Anonymous -> Authenticated` after a successful login. Re-authenticating
    /// replaces the previous identity.
    pub fn authenticate(&mut self, account: Account) {
        *self = Session::Authenticated(account);
    }

    /// `Authenticated -> Anonymous`. Clears the session unconditionally.
    pub fn logout(&mut self) {
        *self = Session::Anonymous;
    }

    /// Logged-in account, if any.
    pub fn account(&self) -> Option<&Account> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(account) => Some(account),
        }
    }

    /// Role of the logged-in account, if any.
    pub fn role(&self) -> Option<Role> {
        self.account().map(|account| account.role)
    }

    /// Gate for operations reachable by any logged-in account.
    pub fn require_account(&self) -> Result<&Account, ServiceError> {
        self.account()
            .ok_or_else(|| ServiceError::Unauthorized("login required".into()))
    }

    /// Gate for match-mutating operations.
    pub fn require_admin(&self) -> Result<&Account, ServiceError> {
        let account = self.require_account()?;
        if account.role.is_admin() {
            Ok(account)
        } else {
            Err(ServiceError::Forbidden(format!(
                "role `{}` cannot manage matches",
                account.role.as_str()
            )))
        }
    }
}

/// Handle returned to the client after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    pub token: Uuid,
    pub issued_at: OffsetDateTime,
}

/// In-memory table of live sessions keyed by their bearer token.
///
/// Sessions do not survive a restart.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    entries: DashMap<Uuid, Account>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated account and hand back its ticket.
    pub fn open(&self, account: Account) -> SessionTicket {
        let ticket = SessionTicket {
            token: Uuid::new_v4(),
            issued_at: OffsetDateTime::now_utc(),
        };
        self.entries.insert(ticket.token, account);
        ticket
    }

    /// Resolve a token into a session. Unknown or missing tokens are anonymous.
    pub fn resolve(&self, token: Option<Uuid>) -> Session {
        token
            .and_then(|token| self.entries.get(&token).map(|account| account.clone()))
            .map(Session::Authenticated)
            .unwrap_or_default()
    }

    /// Drop the session behind `token`. Returns whether one existed.
    pub fn close(&self, token: Uuid) -> bool {
        self.entries.remove(&token).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
