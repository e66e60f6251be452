use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access level granted to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May create and delete matches.
    Admin,
    /// Read-only access to the match list.
    #[default]
    Viewer,
}

impl Role {
    /// Stored representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }

    /// Capitalised label used in dashboard headings.
    pub fn title(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Viewer => "Viewer",
        }
    }

    /// Whether match-mutating operations are reachable with this role.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Interpret a stored role value. Anything other than `admin` is a viewer.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("admin") => Role::Admin,
            _ => Role::Viewer,
        }
    }
}

/// Authenticated identity together with its resolved role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Opaque unique identifier (the e-mail address used at signup).
    pub identifier: String,
    /// Role looked up after authentication.
    pub role: Role,
}

impl Account {
    /// Build an account from its identifier and role.
    pub fn new(identifier: impl Into<String>, role: Role) -> Self {
        Self {
            identifier: identifier.into(),
            role,
        }
    }
}
