//! Fallback pipeline
//!
//! Drives one request through the ordered strategy chain:
//!
//! ```text
//! Pending -> Trying(0) -> Trying(1) -> ... -> Succeeded(audio)
//!                                      \-> Exhausted -> silence
//! ```
//!
//! Every request ends with valid audio. Faults raised by strategies, panics
//! included, are recorded as failed attempts and never reach the caller.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info, warn};

use super::audio::{PcmAudio, WAV_HEADER_LEN, encode, generate_fallback_silence};
use super::engine::{ModelInfo, SpeechModel};
use super::request::SynthesisRequest;
use super::speaker::{ResolvedSpeaker, SpeakerResolver};
use super::strategy::{AttemptResult, ErrorKind, StrategyInput, SynthesisStrategy, TextClass};
use super::text::{
    DEFAULT_LANGUAGE, Rejection, SanitizedText, TextBounds, normalize_language, sanitize,
};

/// Peak amplitude below which output is reported as suspiciously quiet
pub const QUIET_PEAK_THRESHOLD: f32 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub strict_bounds: TextBounds,
    pub extended_bounds: TextBounds,
    /// Length of the silence returned when nothing else worked
    pub silence_duration_seconds: f64,
    /// Release transient model memory every N requests, 0 disables
    pub memory_release_interval: u64,
    pub default_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strict_bounds: TextBounds::STRICT,
            extended_bounds: TextBounds::EXTENDED,
            silence_duration_seconds: 0.1,
            memory_release_interval: 5,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn bounds_for(&self, class: TextClass) -> TextBounds {
        match class {
            TextClass::Strict => self.strict_bounds,
            TextClass::Extended => self.extended_bounds,
        }
    }
}

/// Progress of one request through the chain
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Pending,
    Trying(usize),
    Succeeded(PcmAudio),
    Exhausted,
}

/// Where the returned audio came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    Strategy(&'static str),
    Silence,
}

impl AudioSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioSource::Strategy(name) => name,
            AudioSource::Silence => "silence",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    Succeeded { byte_len: usize },
    Skipped(String),
    Failed(ErrorKind, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub strategy: &'static str,
    pub status: AttemptStatus,
}

/// Final result of a request, always carrying playable audio
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub audio: PcmAudio,
    pub source: AudioSource,
    pub attempts: Vec<AttemptRecord>,
    /// Why silence was returned, if it was
    pub degraded: Option<ErrorKind>,
}

impl SynthesisOutcome {
    pub fn is_silence(&self) -> bool {
        self.source == AudioSource::Silence
    }

    pub fn to_wav_bytes(&self) -> Vec<u8> {
        self.audio.to_wav_bytes()
    }
}

pub struct FallbackPipeline {
    model: Arc<dyn SpeechModel>,
    strategies: Vec<Box<dyn SynthesisStrategy>>,
    resolver: SpeakerResolver,
    config: PipelineConfig,
    generation_count: AtomicU64,
}

impl FallbackPipeline {
    pub fn new(
        model: Arc<dyn SpeechModel>,
        strategies: Vec<Box<dyn SynthesisStrategy>>,
        resolver: SpeakerResolver,
        config: PipelineConfig,
    ) -> Self {
        Self {
            model,
            strategies,
            resolver,
            config,
            generation_count: AtomicU64::new(0),
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        self.model.info()
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn resolver(&self) -> &SpeakerResolver {
        &self.resolver
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Requests that reached the strategy chain so far
    pub fn generation_count(&self) -> u64 {
        self.generation_count.load(Ordering::Relaxed)
    }

    /// Widest text window any configured strategy accepts
    fn admission_bounds(&self) -> TextBounds {
        self.strategies
            .iter()
            .map(|s| self.config.bounds_for(s.text_class()))
            .reduce(|a, b| a.union(&b))
            .unwrap_or(self.config.extended_bounds)
    }

    /// Synthesize a request, falling back through every strategy and finally to silence
    pub fn synthesize(&self, request: &SynthesisRequest) -> SynthesisOutcome {
        let info = self.model.info();

        let admission = self.admission_bounds();
        let admitted = match sanitize(&request.text, admission) {
            Ok(text) => text,
            Err(rejection) => {
                warn!("Text rejected by sanitizer: {}", rejection);
                return self.degrade(&info, ErrorKind::SanitizationRejected, Vec::new());
            }
        };

        let speaker = self
            .resolver
            .resolve(request.speaker_ref.as_deref(), request.speaker_id);
        if !speaker.is_resolved() {
            debug!("No speaker resolved, engines will use their default voice");
        }
        let language = normalize_language(request.language.as_deref(), &self.config.default_language);
        let rate_scale = request.effective_rate_scale();

        self.housekeeping();

        info!(
            "Synthesizing {} chars with speaker {} language {} rate {:.2}",
            admitted.char_len(),
            speaker,
            language,
            rate_scale
        );

        let mut texts: HashMap<TextBounds, Result<SanitizedText, Rejection>> = HashMap::new();
        texts.insert(admission, Ok(admitted));

        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut state = PipelineState::Pending;

        loop {
            state = match state {
                PipelineState::Pending => self.advance(None),
                PipelineState::Trying(index) => {
                    let Some(strategy) = self.strategies.get(index) else {
                        break;
                    };
                    let bounds = self.config.bounds_for(strategy.text_class());
                    let text = &*texts
                        .entry(bounds)
                        .or_insert_with(|| sanitize(&request.text, bounds));

                    let result = match text {
                        Ok(text) => {
                            let input = StrategyInput {
                                text,
                                speaker: &speaker,
                                rate_scale,
                                language: &language,
                            };
                            self.attempt(strategy.as_ref(), &info, &input)
                        }
                        Err(rejection) => AttemptResult::Skipped(format!(
                            "{}: {}",
                            ErrorKind::SanitizationRejected,
                            rejection
                        )),
                    };

                    match result {
                        AttemptResult::Success(audio) => {
                            attempts.push(AttemptRecord {
                                strategy: strategy.name(),
                                status: AttemptStatus::Succeeded {
                                    byte_len: audio.byte_len(),
                                },
                            });
                            info!(
                                "Strategy {} produced {} bytes ({:.2}s)",
                                strategy.name(),
                                audio.byte_len(),
                                audio.duration_seconds()
                            );
                            PipelineState::Succeeded(audio)
                        }
                        AttemptResult::Skipped(reason) => {
                            debug!("Strategy {} skipped: {}", strategy.name(), reason);
                            attempts.push(AttemptRecord {
                                strategy: strategy.name(),
                                status: AttemptStatus::Skipped(reason),
                            });
                            self.advance(Some(index))
                        }
                        AttemptResult::Failed(kind, detail) => {
                            warn!("Strategy {} failed ({}): {}", strategy.name(), kind, detail);
                            attempts.push(AttemptRecord {
                                strategy: strategy.name(),
                                status: AttemptStatus::Failed(kind, detail),
                            });
                            self.advance(Some(index))
                        }
                    }
                }
                PipelineState::Succeeded(audio) => {
                    let source = attempts
                        .last()
                        .map(|a| AudioSource::Strategy(a.strategy))
                        .unwrap_or(AudioSource::Silence);
                    return SynthesisOutcome {
                        audio,
                        source,
                        attempts,
                        degraded: None,
                    };
                }
                PipelineState::Exhausted => break,
            };
        }

        error!(
            "All {} strategies failed, returning silence",
            self.strategies.len()
        );
        self.degrade(&info, ErrorKind::AllStrategiesExhausted, attempts)
    }

    fn advance(&self, current: Option<usize>) -> PipelineState {
        let next = current.map_or(0, |i| i + 1);
        if next < self.strategies.len() {
            PipelineState::Trying(next)
        } else {
            PipelineState::Exhausted
        }
    }

    /// Run one strategy and classify the result
    pub fn attempt(
        &self,
        strategy: &dyn SynthesisStrategy,
        info: &ModelInfo,
        input: &StrategyInput<'_>,
    ) -> AttemptResult {
        if let Some(reason) = strategy.unmet_precondition(info, input.speaker) {
            return AttemptResult::Skipped(reason);
        }

        let ignored = strategy
            .capabilities()
            .ignored_controls(input.speaker, input.rate_scale);
        if !ignored.is_empty() {
            debug!("Strategy {} ignores requested {}", strategy.name(), ignored.join(", "));
        }

        let model = self.model.as_ref();
        let raw = match panic::catch_unwind(AssertUnwindSafe(|| strategy.synthesize(model, input))) {
            Ok(Ok(raw)) => raw,
            Ok(Err(fault)) => return AttemptResult::Failed(ErrorKind::StrategyFault, fault.to_string()),
            Err(payload) => {
                return AttemptResult::Failed(
                    ErrorKind::StrategyFault,
                    format!("panicked: {}", panic_message(payload.as_ref())),
                );
            }
        };

        let kind = raw.kind();
        let audio = encode(raw, info.sample_rate);
        if audio.byte_len() <= WAV_HEADER_LEN {
            return AttemptResult::Failed(
                ErrorKind::EncodingEmpty,
                format!("{kind} output encoded to {} bytes", audio.byte_len()),
            );
        }

        let peak = audio.peak_amplitude();
        if peak < QUIET_PEAK_THRESHOLD {
            warn!(
                "Strategy {} produced very quiet audio (peak {:.5})",
                strategy.name(),
                peak
            );
        }

        AttemptResult::Success(audio)
    }

    /// Silence outcome for failures outside the strategy chain
    pub fn silence(&self, reason: ErrorKind) -> SynthesisOutcome {
        self.degrade(&self.model.info(), reason, Vec::new())
    }

    fn housekeeping(&self) {
        let count = self.generation_count.fetch_add(1, Ordering::Relaxed) + 1;
        let interval = self.config.memory_release_interval;
        if interval > 0 && count % interval == 0 {
            debug!("Releasing transient model memory after {} generations", count);
            self.model.release_transient_memory();
        }
    }

    fn degrade(&self, info: &ModelInfo, reason: ErrorKind, attempts: Vec<AttemptRecord>) -> SynthesisOutcome {
        let audio = generate_fallback_silence(self.config.silence_duration_seconds, info.sample_rate);
        info!(
            "Returning {:.2}s of silence ({})",
            audio.duration_seconds(),
            reason
        );
        SynthesisOutcome {
            audio,
            source: AudioSource::Silence,
            attempts,
            degraded: Some(reason),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for FallbackPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackPipeline")
            .field("engine", &self.model.info().engine)
            .field("strategies", &self.strategy_names())
            .field("config", &self.config)
            .finish()
    }
}
