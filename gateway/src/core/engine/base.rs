use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::audio::RawAudio;

/// Faults raised by speech engines
#[derive(Debug, Error)]
pub enum ModelFault {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid engine configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Operation not supported: {0}")]
    Unsupported(String),
    /// The engine refused this particular input; a simpler text may succeed
    #[error("Engine rejected input: {0}")]
    InputRejected(String),
    #[error("Engine execution failed: {0}")]
    ExecutionFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelFault {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ModelFault::InputRejected(_))
    }
}

pub type ModelResult<T> = Result<T, ModelFault>;

/// Per-invocation voice controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceControls {
    pub speaker_id: Option<u32>,
    /// Phoneme duration multiplier, >1.0 is slower
    pub length_scale: f32,
}

impl Default for VoiceControls {
    fn default() -> Self {
        Self {
            speaker_id: None,
            length_scale: 1.0,
        }
    }
}

/// Static description of a loaded model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub engine: String,
    pub sample_rate: u32,
    pub speaker_count: u32,
    pub supports_cloning: bool,
    pub loaded: bool,
}

impl ModelInfo {
    pub fn supports_speaker_selection(&self) -> bool {
        self.speaker_count > 1
    }
}

/// Engine configuration shared by all backends
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Engine executable, looked up on PATH when unset
    pub binary: Option<PathBuf>,
    /// Voice model file (Piper `.onnx`)
    pub model_path: Option<PathBuf>,
    /// Model identifier (Coqui model name)
    pub model_name: Option<String>,
    /// Voice name (eSpeak voice code)
    pub voice: Option<String>,
    /// Overrides the engine's native output rate
    pub sample_rate: Option<u32>,
    /// Directory for transient render files
    pub scratch_dir: PathBuf,
}

/// The inference capability every synthesis strategy draws on
///
/// Calls block until the engine returns. Implementations must be safe to share
/// across request threads.
pub trait SpeechModel: Send + Sync {
    fn info(&self) -> ModelInfo;

    /// Render samples honoring speaker and rate controls
    fn render_samples(&self, text: &str, controls: &VoiceControls) -> ModelResult<RawAudio>;

    /// Render into a WAV file at `path`
    fn render_to_file(&self, text: &str, controls: &VoiceControls, path: &Path)
    -> ModelResult<()>;

    /// Render with engine defaults only
    fn render_plain(&self, text: &str) -> ModelResult<RawAudio>;

    /// Clone the voice in `reference` speaking `language`
    fn render_cloned(&self, _text: &str, _reference: &Path, _language: &str) -> ModelResult<RawAudio> {
        Err(ModelFault::Unsupported("voice cloning".to_string()))
    }

    /// Hint that transient inference memory can be released
    fn release_transient_memory(&self) {}
}

/// Stand-in for an engine that failed to load
///
/// Every render call fails, so requests degrade to silence while the server
/// keeps answering.
#[derive(Debug, Clone)]
pub struct UnavailableModel {
    engine: String,
    reason: String,
    sample_rate: u32,
}

impl UnavailableModel {
    pub fn new(engine: impl Into<String>, reason: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            engine: engine.into(),
            reason: reason.into(),
            sample_rate,
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn fault(&self) -> ModelFault {
        ModelFault::Unavailable(self.reason.clone())
    }
}

impl SpeechModel for UnavailableModel {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            engine: self.engine.clone(),
            sample_rate: self.sample_rate,
            speaker_count: 0,
            supports_cloning: false,
            loaded: false,
        }
    }

    fn render_samples(&self, _text: &str, _controls: &VoiceControls) -> ModelResult<RawAudio> {
        Err(self.fault())
    }

    fn render_to_file(&self, _text: &str, _controls: &VoiceControls, _path: &Path) -> ModelResult<()> {
        Err(self.fault())
    }

    fn render_plain(&self, _text: &str) -> ModelResult<RawAudio> {
        Err(self.fault())
    }

    fn render_cloned(&self, _text: &str, _reference: &Path, _language: &str) -> ModelResult<RawAudio> {
        Err(self.fault())
    }
}
