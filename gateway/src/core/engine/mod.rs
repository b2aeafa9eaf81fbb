mod base;
pub mod coqui;
pub mod espeak;
pub mod piper;
pub mod process;

use std::sync::Arc;

use tracing::error;

pub use base::{
    EngineConfig, ModelFault, ModelInfo, ModelResult, SpeechModel, UnavailableModel,
    VoiceControls,
};
pub use coqui::{COQUI_DEFAULT_MODEL, COQUI_SAMPLE_RATE, CoquiCli};
pub use espeak::{ESPEAK_SAMPLE_RATE, EspeakCli};
pub use piper::{PIPER_DEFAULT_SAMPLE_RATE, PiperCli};

/// Speech engines the gateway can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Piper,
    Espeak,
    Coqui,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Piper => "piper",
            EngineKind::Espeak => "espeak",
            EngineKind::Coqui => "coqui",
        }
    }

    /// Parse an engine name, accepting common aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "piper" => Some(EngineKind::Piper),
            "espeak" | "espeak-ng" | "espeak_ng" => Some(EngineKind::Espeak),
            "coqui" | "xtts" | "coqui-tts" => Some(EngineKind::Coqui),
            _ => None,
        }
    }

    /// Native output rate of the engine
    pub fn default_sample_rate(&self) -> u32 {
        match self {
            EngineKind::Piper => PIPER_DEFAULT_SAMPLE_RATE,
            EngineKind::Espeak => ESPEAK_SAMPLE_RATE,
            EngineKind::Coqui => COQUI_SAMPLE_RATE,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factory function to create a speech model by engine name
///
/// # Arguments
/// * `engine` - Engine name (piper, espeak, coqui and their aliases)
/// * `config` - Engine configuration
///
/// # Returns
/// * `ModelResult<Arc<dyn SpeechModel>>` - The loaded model or the reason it could not load
pub fn create_speech_model(engine: &str, config: &EngineConfig) -> ModelResult<Arc<dyn SpeechModel>> {
    match EngineKind::parse(engine) {
        Some(EngineKind::Piper) => Ok(Arc::new(PiperCli::new(config)?)),
        Some(EngineKind::Espeak) => Ok(Arc::new(EspeakCli::new(config)?)),
        Some(EngineKind::Coqui) => Ok(Arc::new(CoquiCli::new(config)?)),
        None => Err(ModelFault::InvalidConfiguration(format!(
            "Unsupported engine: {engine}. Supported engines: {}",
            get_supported_engines().join(", ")
        ))),
    }
}

/// Load a speech model, substituting an [`UnavailableModel`] on failure
///
/// The server keeps running without an engine; every request then degrades to
/// silence and `/health` reports the model as not loaded.
pub fn load_speech_model(engine: &str, config: &EngineConfig) -> Arc<dyn SpeechModel> {
    match create_speech_model(engine, config) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to load {} engine: {}", engine, e);
            let sample_rate = config.sample_rate.unwrap_or_else(|| {
                EngineKind::parse(engine)
                    .map(|kind| kind.default_sample_rate())
                    .unwrap_or(PIPER_DEFAULT_SAMPLE_RATE)
            });
            Arc::new(UnavailableModel::new(engine, e.to_string(), sample_rate))
        }
    }
}

pub fn get_supported_engines() -> Vec<&'static str> {
    vec![
        EngineKind::Piper.as_str(),
        EngineKind::Espeak.as_str(),
        EngineKind::Coqui.as_str(),
    ]
}
