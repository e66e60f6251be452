use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{record_store::RecordStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the record store, then keep polling its health. The shared state
/// stays in degraded mode whenever the backend cannot be reached.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RecordStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                let backend = store.backend_name();
                state.set_record_store(store.clone()).await;
                info!(backend, "storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                watch_health(&state, store.as_ref()).await;

                state.clear_record_store().await;
                warn!(backend, "dropping storage connection; reconnecting from scratch");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll until the store fails and cannot be brought back.
async fn watch_health(state: &SharedState, store: &dyn RecordStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                if !reconnect(state, store).await {
                    warn!("exhausted storage reconnect attempts; staying in degraded mode");
                    return;
                }
                state.update_degraded(false);
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect(state: &SharedState, store: &dyn RecordStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use tokio::time::timeout;

    use super::*;
    use crate::{
        auth::memory::MemoryAuthProvider, config::AppConfig,
        dao::record_store::memory::MemoryRecordStore, state::AppState,
    };

    #[tokio::test]
    async fn successful_connect_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryAuthProvider::new()));
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded());

        let store = MemoryRecordStore::new();
        let supervisor = tokio::spawn(run(state.clone(), move || {
            let store: Arc<dyn RecordStore> = Arc::new(store.clone());
            async move { Ok::<_, StorageError>(store) }
        }));

        timeout(Duration::from_secs(2), watcher.changed())
            .await
            .expect("degraded flag never changed")
            .unwrap();
        assert!(!state.is_degraded());
        assert_eq!(
            state.record_store().await.map(|store| store.backend_name()),
            Some("memory")
        );

        supervisor.abort();
    }
}
