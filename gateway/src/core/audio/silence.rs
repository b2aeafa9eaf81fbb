//! Silence generation, the terminal fallback of the pipeline

use super::pcm::PcmAudio;

/// Produce `round(duration_seconds * sample_rate)` zero samples
///
/// Negative or non-finite durations produce empty audio.
pub fn generate_silence(duration_seconds: f64, sample_rate: u32) -> PcmAudio {
    let frames = if duration_seconds.is_finite() && duration_seconds > 0.0 {
        (duration_seconds * f64::from(sample_rate)).round() as usize
    } else {
        0
    };
    PcmAudio::from_samples(&vec![0i16; frames], sample_rate)
}

/// Silence that always holds at least one sample
///
/// Used when degrading a request so the container is never header-only.
pub fn generate_fallback_silence(duration_seconds: f64, sample_rate: u32) -> PcmAudio {
    let audio = generate_silence(duration_seconds, sample_rate);
    if audio.is_empty() {
        PcmAudio::from_samples(&[0], sample_rate)
    } else {
        audio
    }
}
