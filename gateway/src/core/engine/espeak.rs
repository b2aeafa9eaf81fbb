//! eSpeak NG formant synthesizer, driven through `espeak-ng`

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use super::base::{EngineConfig, ModelInfo, ModelResult, SpeechModel, VoiceControls};
use super::process::{resolve_binary, run_engine};
use crate::core::audio::RawAudio;

pub const ESPEAK_SAMPLE_RATE: u32 = 22050;
const DEFAULT_WORDS_PER_MINUTE: f32 = 175.0;

/// Words per minute for a length scale, within what eSpeak accepts
pub fn words_per_minute(length_scale: f32) -> u32 {
    let scale = if length_scale.is_finite() && length_scale > 0.0 {
        length_scale
    } else {
        1.0
    };
    (DEFAULT_WORDS_PER_MINUTE / scale).round().clamp(80.0, 450.0) as u32
}

#[derive(Debug, Clone)]
pub struct EspeakCli {
    binary: PathBuf,
    voice: Option<String>,
}

impl EspeakCli {
    pub fn new(config: &EngineConfig) -> ModelResult<Self> {
        let binary = resolve_binary(config.binary.as_deref(), &["espeak-ng", "espeak"])?;
        info!("Using eSpeak binary {}", binary.display());
        Ok(Self {
            binary,
            voice: config.voice.clone(),
        })
    }

    fn command(&self, controls: Option<&VoiceControls>) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(voice) = &self.voice {
            cmd.arg("-v").arg(voice);
        }
        if let Some(controls) = controls {
            cmd.arg("-s")
                .arg(words_per_minute(controls.length_scale).to_string());
        }
        cmd.arg("--stdin");
        cmd
    }
}

impl SpeechModel for EspeakCli {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            engine: "espeak".to_string(),
            sample_rate: ESPEAK_SAMPLE_RATE,
            speaker_count: 1,
            supports_cloning: false,
            loaded: true,
        }
    }

    fn render_samples(&self, text: &str, controls: &VoiceControls) -> ModelResult<RawAudio> {
        let mut cmd = self.command(Some(controls));
        cmd.arg("--stdout");
        let wav = run_engine("espeak", &mut cmd, Some(text))?;
        Ok(RawAudio::Encoded(wav))
    }

    fn render_to_file(&self, text: &str, controls: &VoiceControls, path: &Path) -> ModelResult<()> {
        let mut cmd = self.command(Some(controls));
        cmd.arg("-w").arg(path);
        run_engine("espeak", &mut cmd, Some(text))?;
        Ok(())
    }

    fn render_plain(&self, text: &str) -> ModelResult<RawAudio> {
        let mut cmd = self.command(None);
        cmd.arg("--stdout");
        let wav = run_engine("espeak", &mut cmd, Some(text))?;
        Ok(RawAudio::Encoded(wav))
    }
}
