use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, tts};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tts", post(tts::tts_handler))
        .route("/health", get(api::engine_health))
        .route("/speakers", get(api::list_speakers))
        .route("/test", get(api::self_test))
        .layer(TraceLayer::new_for_http())
}
