use crate::core::engine::{EngineKind, get_supported_engines};
use crate::core::strategy::{StrategySettings, create_strategies};
use crate::core::text::is_supported_language;

/// Longest silence the degrade path may return
const MAX_SILENCE_SECONDS: f64 = 10.0;

const MAX_SAMPLE_RATE: u32 = 192_000;

/// Validate the configured engine name
pub fn validate_engine(engine: &str) -> Result<(), Box<dyn std::error::Error>> {
    if EngineKind::parse(engine).is_none() {
        return Err(format!(
            "TTS_ENGINE '{engine}' is not supported. Supported engines: {}",
            get_supported_engines().join(", ")
        )
        .into());
    }
    Ok(())
}

/// Validate that the speaker ID range is not inverted
pub fn validate_speaker_ids(min: u32, max: u32) -> Result<(), Box<dyn std::error::Error>> {
    if min > max {
        return Err(format!("SPEAKER_ID_MIN ({min}) must not exceed SPEAKER_ID_MAX ({max})").into());
    }
    Ok(())
}

/// Validate text bounds
///
/// Requires `1 <= min_chars <= strict_max_chars <= extended_max_chars`.
pub fn validate_text_bounds(
    min_chars: usize,
    strict_max_chars: usize,
    extended_max_chars: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if min_chars == 0 {
        return Err("text min_chars must be at least 1".into());
    }
    if strict_max_chars < min_chars {
        return Err(format!(
            "text strict_max_chars ({strict_max_chars}) must be at least min_chars ({min_chars})"
        )
        .into());
    }
    if extended_max_chars < strict_max_chars {
        return Err(format!(
            "text strict_max_chars ({strict_max_chars}) must not exceed extended_max_chars ({extended_max_chars})"
        )
        .into());
    }
    Ok(())
}

/// Validate that every configured strategy name is known
pub fn validate_strategies(strategies: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    create_strategies(strategies, &StrategySettings::default())
        .map(|_| ())
        .map_err(|e| e.to_string().into())
}

pub fn validate_silence_duration(seconds: f64) -> Result<(), Box<dyn std::error::Error>> {
    if !seconds.is_finite() || seconds <= 0.0 || seconds > MAX_SILENCE_SECONDS {
        return Err(format!(
            "SILENCE_DURATION_SECONDS must be within (0, {MAX_SILENCE_SECONDS}], got {seconds}"
        )
        .into());
    }
    Ok(())
}

pub fn validate_request_timeout(seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    if seconds == 0 {
        return Err("REQUEST_TIMEOUT_SECONDS must be greater than 0".into());
    }
    Ok(())
}

/// Validate an engine sample-rate override, if set
pub fn validate_sample_rate(rate: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    match rate {
        Some(rate) if rate == 0 || rate > MAX_SAMPLE_RATE => Err(format!(
            "TTS_SAMPLE_RATE must be within 1..={MAX_SAMPLE_RATE} Hz, got {rate}"
        )
        .into()),
        _ => Ok(()),
    }
}

pub fn validate_language(language: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !is_supported_language(language) {
        return Err(format!("DEFAULT_LANGUAGE '{language}' is not supported").into());
    }
    Ok(())
}
