use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};
use tracing::info;

use crate::core::request::SynthesisRequest;
use crate::handlers::tts::run_synthesis;
use crate::state::AppState;

/// Phrase synthesized by the self-test endpoint
pub const SELF_TEST_PHRASE: &str = "Hello world test";

/// Health check handler
/// Returns a simple JSON response indicating the server is running
pub async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "OK"
    })))
}

/// Engine health
///
/// Reports `degraded` when the engine failed to load; synthesis requests then
/// answer with silence.
pub async fn engine_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let info = state.pipeline.model_info();
    Json(json!({
        "status": if info.loaded { "healthy" } else { "degraded" },
        "engine": info.engine,
        "model_loaded": info.loaded,
        "sample_rate": info.sample_rate,
        "strategies": state.pipeline.strategy_names(),
        "generations": state.pipeline.generation_count(),
    }))
}

/// Speaker options of the loaded voice
pub async fn list_speakers(State(state): State<Arc<AppState>>) -> Json<Value> {
    let info = state.pipeline.model_info();
    let resolver = state.pipeline.resolver();
    let bounds = resolver.id_bounds();
    Json(json!({
        "engine": info.engine,
        "speaker_count": info.speaker_count,
        "speaker_selection": info.supports_speaker_selection(),
        "voice_cloning": info.supports_cloning,
        "id_min": bounds.min,
        "id_max": bounds.max,
        "default_reference": resolver.default_reference().display().to_string(),
        "default_reference_available": resolver.has_default_reference(),
    }))
}

/// Synthesize a fixed phrase and report what the pipeline produced
pub async fn self_test(State(state): State<Arc<AppState>>) -> Json<Value> {
    let outcome = run_synthesis(&state, SynthesisRequest::new(SELF_TEST_PHRASE)).await;
    info!(
        "Self-test produced {} bytes from {}",
        outcome.audio.byte_len(),
        outcome.source.as_str()
    );

    let attempts: Vec<Value> = outcome
        .attempts
        .iter()
        .map(|attempt| {
            json!({
                "strategy": attempt.strategy,
                "status": format!("{:?}", attempt.status),
            })
        })
        .collect();

    Json(json!({
        "status": if outcome.is_silence() { "degraded" } else { "success" },
        "source": outcome.source.as_str(),
        "audio_bytes": outcome.audio.byte_len(),
        "duration_seconds": outcome.audio.duration_seconds(),
        "sample_rate": outcome.audio.sample_rate(),
        "degraded_reason": outcome.degraded.map(|kind| kind.as_str()),
        "attempts": attempts,
    }))
}
