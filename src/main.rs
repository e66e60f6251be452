//! Match tracker binary entrypoint wiring the REST API, the auth provider and
//! the configured record store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_tracker_back::{
    auth::{AuthProvider, memory::MemoryAuthProvider},
    config::{AppConfig, BackendKind},
    dao::{
        record_store::{RecordStore, memory::MemoryRecordStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::load();
    let auth = build_auth_provider(config.backend)?;
    let provider = auth.provider_name();

    let app_state = AppState::new(config, auth);
    let config = app_state.config();
    info!(
        backend = ?config.backend,
        token_policy = ?config.token_policy,
        provider,
        "application state ready"
    );
    spawn_storage_supervisor(app_state.clone(), config.backend)?;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Hosted backends authenticate through Firebase; the memory backend keeps
/// credentials in process.
fn build_auth_provider(backend: BackendKind) -> anyhow::Result<Arc<dyn AuthProvider>> {
    match backend {
        BackendKind::Memory => Ok(Arc::new(MemoryAuthProvider::new())),
        BackendKind::Realtime | BackendKind::Document => firebase_auth_provider(),
    }
}

#[cfg(feature = "firebase")]
fn firebase_auth_provider() -> anyhow::Result<Arc<dyn AuthProvider>> {
    use match_tracker_back::auth::firebase::{FirebaseAuthConfig, FirebaseAuthProvider};

    let config = FirebaseAuthConfig::from_env()
        .context("missing FIREBASE_API_KEY; set it in the environment or in the .env file")?;
    let provider = FirebaseAuthProvider::new(config).context("building Firebase auth client")?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "firebase"))]
fn firebase_auth_provider() -> anyhow::Result<Arc<dyn AuthProvider>> {
    anyhow::bail!("hosted backends need the `firebase` feature for authentication")
}

/// Start the background task owning the record store connection.
fn spawn_storage_supervisor(state: SharedState, backend: BackendKind) -> anyhow::Result<()> {
    match backend {
        BackendKind::Memory => {
            let store = MemoryRecordStore::new();
            tokio::spawn(storage_supervisor::run(state, move || {
                let store: Arc<dyn RecordStore> = Arc::new(store.clone());
                async move { Ok::<_, StorageError>(store) }
            }));
        }
        #[cfg(feature = "firebase")]
        BackendKind::Realtime => {
            use match_tracker_back::dao::record_store::realtime::{
                RealtimeConfig, RealtimeRecordStore,
            };

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = RealtimeConfig::from_env()?;
                let store: Arc<dyn RecordStore> =
                    Arc::new(RealtimeRecordStore::connect(config).await?);
                Ok::<_, StorageError>(store)
            }));
        }
        #[cfg(feature = "mongo-store")]
        BackendKind::Document => {
            use match_tracker_back::dao::record_store::mongodb::{MongoConfig, MongoRecordStore};

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store: Arc<dyn RecordStore> =
                    Arc::new(MongoRecordStore::connect(config).await?);
                Ok::<_, StorageError>(store)
            }));
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("backend {other:?} is not compiled into this build"),
    }
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
