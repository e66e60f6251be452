use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_record_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(backend = store.backend_name(), error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    HealthResponse::from_degraded(state.is_degraded())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        auth::memory::MemoryAuthProvider, config::AppConfig,
        dao::record_store::memory::MemoryRecordStore, dto::health::HealthStatus, state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryAuthProvider::new()));
        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);

        state
            .set_record_store(Arc::new(MemoryRecordStore::new()))
            .await;
        assert_eq!(health_status(&state).await.status, HealthStatus::Ok);

        state.clear_record_store().await;
        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);
    }
}
