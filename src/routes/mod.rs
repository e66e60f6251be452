use axum::{Router, extract::FromRequest};

use crate::{error::AppError, state::SharedState};

pub mod auth;
pub mod docs;
pub mod health;
pub mod matches;

/// JSON body extractor answering malformed payloads with a JSON `400`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(auth::router())
        .merge(matches::router(state.clone()))
        .merge(docs::router())
        .with_state(state)
}
