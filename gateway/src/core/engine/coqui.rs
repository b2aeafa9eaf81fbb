//! Coqui TTS multilingual voice cloning, driven through the `tts` executable

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use super::base::{EngineConfig, ModelFault, ModelInfo, ModelResult, SpeechModel, VoiceControls};
use super::process::{ScratchFile, resolve_binary, run_engine};
use crate::core::audio::RawAudio;

pub const COQUI_SAMPLE_RATE: u32 = 24000;
pub const COQUI_DEFAULT_MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

#[derive(Debug, Clone)]
pub struct CoquiCli {
    binary: PathBuf,
    model_name: String,
    sample_rate: u32,
    scratch_dir: PathBuf,
}

impl CoquiCli {
    pub fn new(config: &EngineConfig) -> ModelResult<Self> {
        let binary = resolve_binary(config.binary.as_deref(), &["tts"])?;
        let model_name = config
            .model_name
            .clone()
            .unwrap_or_else(|| COQUI_DEFAULT_MODEL.to_string());
        info!("Using Coqui model {} via {}", model_name, binary.display());

        Ok(Self {
            binary,
            model_name,
            sample_rate: config.sample_rate.unwrap_or(COQUI_SAMPLE_RATE),
            scratch_dir: config.scratch_dir.clone(),
        })
    }

    fn unsupported(what: &str) -> ModelFault {
        ModelFault::Unsupported(format!("{what} requires a speaker reference on this engine"))
    }
}

impl SpeechModel for CoquiCli {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            engine: "coqui".to_string(),
            sample_rate: self.sample_rate,
            speaker_count: 1,
            supports_cloning: true,
            loaded: true,
        }
    }

    fn render_samples(&self, _text: &str, _controls: &VoiceControls) -> ModelResult<RawAudio> {
        Err(Self::unsupported("sample rendering"))
    }

    fn render_to_file(&self, _text: &str, _controls: &VoiceControls, _path: &Path) -> ModelResult<()> {
        Err(Self::unsupported("file rendering"))
    }

    fn render_plain(&self, _text: &str) -> ModelResult<RawAudio> {
        Err(Self::unsupported("plain rendering"))
    }

    fn render_cloned(&self, text: &str, reference: &Path, language: &str) -> ModelResult<RawAudio> {
        let scratch = ScratchFile::new(&self.scratch_dir, "coqui");
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--model_name")
            .arg(&self.model_name)
            .arg("--text")
            .arg(text)
            .arg("--speaker_wav")
            .arg(reference)
            .arg("--language_idx")
            .arg(language)
            .arg("--out_path")
            .arg(scratch.path());
        run_engine("coqui", &mut cmd, None)?;
        Ok(RawAudio::Encoded(scratch.read()?))
    }
}
