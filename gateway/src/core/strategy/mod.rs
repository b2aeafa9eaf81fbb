//! Synthesis strategies
//!
//! A strategy is one way of getting audio out of the speech model. Strategies
//! differ in which voice controls they honor and in how the model returns its
//! output. The pipeline tries them in a fixed priority order.

mod cloned;
mod direct;
mod file_render;
mod plain;

use std::path::PathBuf;

use thiserror::Error;

pub use cloned::ClonedVoiceStrategy;
pub use direct::DirectSamplesStrategy;
pub use file_render::FileRenderStrategy;
pub use plain::PlainTextStrategy;

use crate::core::audio::{PcmAudio, RawAudio};
use crate::core::engine::{ModelInfo, ModelResult, SpeechModel};
use crate::core::speaker::ResolvedSpeaker;
use crate::core::text::SanitizedText;

/// Classification of everything that can go wrong on the way to audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SanitizationRejected,
    SpeakerUnresolved,
    StrategyFault,
    EncodingEmpty,
    AllStrategiesExhausted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SanitizationRejected => "sanitization_rejected",
            ErrorKind::SpeakerUnresolved => "speaker_unresolved",
            ErrorKind::StrategyFault => "strategy_fault",
            ErrorKind::EncodingEmpty => "encoding_empty",
            ErrorKind::AllStrategiesExhausted => "all_strategies_exhausted",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single strategy attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptResult {
    Success(PcmAudio),
    /// Preconditions not met, the strategy was never invoked
    Skipped(String),
    Failed(ErrorKind, String),
}

impl AttemptResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptResult::Success(_))
    }
}

/// Text-length window a strategy accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextClass {
    /// High-fidelity strategies, short texts only
    Strict,
    /// Lower-fidelity strategies, long texts allowed
    Extended,
}

/// Voice features a strategy honors or needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub speaker_selection: bool,
    pub rate_control: bool,
    /// Needs a reference recording and a model able to clone from it
    pub requires_speaker_reference: bool,
}

impl Capabilities {
    /// Request controls this strategy will not honor
    pub fn ignored_controls(&self, speaker: &ResolvedSpeaker, rate_scale: f32) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if speaker.id().is_some() && !self.speaker_selection {
            ignored.push("speaker_id");
        }
        if (rate_scale - 1.0).abs() > f32::EPSILON && !self.rate_control {
            ignored.push("rate_scale");
        }
        ignored
    }
}

/// Everything a strategy receives for one attempt
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub text: &'a SanitizedText,
    pub speaker: &'a ResolvedSpeaker,
    pub rate_scale: f32,
    pub language: &'a str,
}

pub trait SynthesisStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn text_class(&self) -> TextClass {
        TextClass::Extended
    }

    /// Reason this strategy cannot run for the request, if any
    fn unmet_precondition(&self, model: &ModelInfo, speaker: &ResolvedSpeaker) -> Option<String> {
        if self.capabilities().requires_speaker_reference {
            if !model.supports_cloning {
                return Some(format!(
                    "capability_missing: {} engine cannot clone voices",
                    model.engine
                ));
            }
            if speaker.reference().is_none() {
                return Some(format!(
                    "{}: no speaker reference available",
                    ErrorKind::SpeakerUnresolved
                ));
            }
        }
        None
    }

    /// Produce raw audio from the model
    fn synthesize(&self, model: &dyn SpeechModel, input: &StrategyInput<'_>) -> ModelResult<RawAudio>;
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Unsupported strategy: {0}. Supported strategies: cloned_voice, direct_samples, file_render, plain_text")]
    Unsupported(String),
    #[error("No synthesis strategies configured")]
    Empty,
}

/// Settings shared by strategies that need them
#[derive(Debug, Clone)]
pub struct StrategySettings {
    pub scratch_dir: PathBuf,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// Default priority order, highest fidelity first
pub const DEFAULT_STRATEGY_ORDER: &[&str] = &[
    ClonedVoiceStrategy::NAME,
    DirectSamplesStrategy::NAME,
    FileRenderStrategy::NAME,
    PlainTextStrategy::NAME,
];

/// Factory function to create a strategy by name
pub fn create_strategy(
    name: &str,
    settings: &StrategySettings,
) -> Result<Box<dyn SynthesisStrategy>, StrategyError> {
    match name.trim().to_lowercase().replace('-', "_").as_str() {
        "cloned_voice" | "clone" | "xtts" => Ok(Box::new(ClonedVoiceStrategy)),
        "direct_samples" | "direct" => Ok(Box::new(DirectSamplesStrategy)),
        "file_render" | "file" => Ok(Box::new(FileRenderStrategy::new(
            settings.scratch_dir.clone(),
        ))),
        "plain_text" | "plain" => Ok(Box::new(PlainTextStrategy)),
        _ => Err(StrategyError::Unsupported(name.to_string())),
    }
}

/// Build an ordered strategy chain from names
pub fn create_strategies<S: AsRef<str>>(
    names: &[S],
    settings: &StrategySettings,
) -> Result<Vec<Box<dyn SynthesisStrategy>>, StrategyError> {
    if names.is_empty() {
        return Err(StrategyError::Empty);
    }
    names
        .iter()
        .map(|name| create_strategy(name.as_ref(), settings))
        .collect()
}

pub fn default_strategies(settings: &StrategySettings) -> Vec<Box<dyn SynthesisStrategy>> {
    vec![
        Box::new(ClonedVoiceStrategy),
        Box::new(DirectSamplesStrategy),
        Box::new(FileRenderStrategy::new(settings.scratch_dir.clone())),
        Box::new(PlainTextStrategy),
    ]
}

pub fn get_supported_strategies() -> Vec<&'static str> {
    DEFAULT_STRATEGY_ORDER.to_vec()
}
