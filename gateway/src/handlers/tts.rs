use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::core::pipeline::SynthesisOutcome;
use crate::core::request::SynthesisRequest;
use crate::core::strategy::ErrorKind;
use crate::state::AppState;

/// Handler for the /tts endpoint
///
/// Always answers 200 with a WAV body. Malformed bodies are treated as an
/// empty request and get silence.
pub async fn tts_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<SynthesisRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed TTS request body: {}", e);
            SynthesisRequest::default()
        }
    };

    info!(
        "TTS request received - text length: {}, speaker: {:?}, speaker_id: {:?}",
        request.text.len(),
        request.speaker_ref,
        request.speaker_id
    );

    let outcome = run_synthesis(&state, request).await;
    wav_response(&outcome)
}

/// Run the blocking pipeline off the async runtime, bounded by the request timeout
pub async fn run_synthesis(state: &AppState, request: SynthesisRequest) -> SynthesisOutcome {
    let pipeline = state.pipeline.clone();
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);
    let task = tokio::task::spawn_blocking(move || pipeline.synthesize(&request));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            error!("Synthesis task failed: {}", e);
            state.pipeline.silence(ErrorKind::StrategyFault)
        }
        Err(_) => {
            error!(
                "Synthesis exceeded {}s, returning silence",
                state.config.request_timeout_seconds
            );
            state.pipeline.silence(ErrorKind::StrategyFault)
        }
    }
}

fn wav_response(outcome: &SynthesisOutcome) -> Response {
    let wav = outcome.to_wav_bytes();
    info!(
        "TTS response - {} bytes, sample_rate: {}, source: {}",
        wav.len(),
        outcome.audio.sample_rate(),
        outcome.source.as_str()
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (header::CONTENT_LENGTH, wav.len().to_string()),
            (
                HeaderName::from_static("x-sample-rate"),
                outcome.audio.sample_rate().to_string(),
            ),
            (
                HeaderName::from_static("x-synthesis-source"),
                outcome.source.as_str().to_string(),
            ),
        ],
        wav,
    )
        .into_response()
}
