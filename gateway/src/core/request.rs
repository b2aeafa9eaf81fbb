use serde::{Deserialize, Serialize};

/// Rate scale range accepted from requests
pub const RATE_SCALE_MIN: f32 = 0.1;
pub const RATE_SCALE_MAX: f32 = 3.0;

/// A request for synthesized speech
///
/// Accepts both the cloning-server dialect (`speaker_wav`) and the
/// multi-speaker dialect (`speaker`, `length_scale`). Clients of the latter
/// send both speaker keys, so they are read separately and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RequestBody")]
pub struct SynthesisRequest {
    pub text: String,
    pub language: Option<String>,
    /// Reference audio path or numeric speaker ID
    pub speaker_ref: Option<String>,
    pub speaker_id: Option<i64>,
    pub rate_scale: Option<f32>,
}

/// Wire shape of a request, one field per accepted key
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RequestBody {
    #[serde(alias = "raw_text")]
    text: String,
    #[serde(alias = "language_tag")]
    language: Option<String>,
    speaker_ref: Option<String>,
    speaker_wav: Option<String>,
    speaker: Option<String>,
    speaker_id: Option<i64>,
    #[serde(alias = "length_scale")]
    rate_scale: Option<f32>,
}

impl From<RequestBody> for SynthesisRequest {
    fn from(body: RequestBody) -> Self {
        let speaker_ref = [body.speaker_ref, body.speaker_wav, body.speaker]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty());
        Self {
            text: body.text,
            language: body.language,
            speaker_ref,
            speaker_id: body.speaker_id,
            rate_scale: body.rate_scale,
        }
    }
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Rate scale clamped into the supported range, 1.0 when absent or invalid
    pub fn effective_rate_scale(&self) -> f32 {
        match self.rate_scale {
            Some(rate) if rate.is_finite() => rate.clamp(RATE_SCALE_MIN, RATE_SCALE_MAX),
            _ => 1.0,
        }
    }
}
