pub mod account;
pub mod matches;
pub mod session;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    auth::AuthProvider,
    config::AppConfig,
    dao::record_store::RecordStore,
    error::ServiceError,
    services::{identity_service::IdentityStore, match_registry::MatchRegistry},
};

pub use self::session::{Session, SessionRegistry, SessionTicket};

pub type SharedState = Arc<AppState>;

/// Central application state holding the collaborators and live sessions.
pub struct AppState {
    config: AppConfig,
    record_store: RwLock<Option<Arc<dyn RecordStore>>>,
    auth: Arc<dyn AuthProvider>,
    sessions: SessionRegistry,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a record store is installed.
    pub fn new(config: AppConfig, auth: Arc<dyn AuthProvider>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            record_store: RwLock::new(None),
            auth,
            sessions: SessionRegistry::new(),
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current record store, if one is installed.
    pub async fn record_store(&self) -> Option<Arc<dyn RecordStore>> {
        let guard = self.record_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current record store, failing fast in degraded mode.
    pub async fn require_record_store(&self) -> Result<Arc<dyn RecordStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.record_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new record store implementation and leave degraded mode.
    pub async fn set_record_store(&self, store: Arc<dyn RecordStore>) {
        {
            let mut guard = self.record_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current record store and enter degraded mode.
    pub async fn clear_record_store(&self) {
        {
            let mut guard = self.record_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Authentication collaborator.
    pub fn auth(&self) -> Arc<dyn AuthProvider> {
        self.auth.clone()
    }

    /// Live sessions keyed by bearer token.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Identity & role store bound to the current record store.
    pub async fn identity(&self) -> Result<IdentityStore, ServiceError> {
        let store = self.require_record_store().await?;
        Ok(IdentityStore::new(self.auth(), store))
    }

    /// Match registry bound to the current record store.
    pub async fn registry(&self) -> Result<MatchRegistry, ServiceError> {
        let store = self.require_record_store().await?;
        Ok(MatchRegistry::new(store, self.config.token_policy))
    }
}
