//! Piper neural TTS, driven through the `piper` executable
//!
//! Piper voices ship as an `.onnx` model plus a `<model>.onnx.json` sidecar
//! describing the output sample rate and speaker count.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{info, warn};

use super::base::{EngineConfig, ModelFault, ModelInfo, ModelResult, SpeechModel, VoiceControls};
use super::process::{resolve_binary, run_engine};
use crate::core::audio::RawAudio;

pub const PIPER_DEFAULT_SAMPLE_RATE: u32 = 22050;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VoiceSidecar {
    audio: SidecarAudio,
    num_speakers: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SidecarAudio {
    sample_rate: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PiperCli {
    binary: PathBuf,
    model: PathBuf,
    sample_rate: u32,
    speaker_count: u32,
}

impl PiperCli {
    pub fn new(config: &EngineConfig) -> ModelResult<Self> {
        let binary = resolve_binary(config.binary.as_deref(), &["piper"])?;

        let model = config.model_path.clone().ok_or_else(|| {
            ModelFault::InvalidConfiguration("piper requires a voice model path".to_string())
        })?;
        if !model.is_file() {
            return Err(ModelFault::Unavailable(format!(
                "piper voice model not found: {}",
                model.display()
            )));
        }

        let sidecar = read_sidecar(&model);
        let sample_rate = config
            .sample_rate
            .or(sidecar.audio.sample_rate)
            .unwrap_or(PIPER_DEFAULT_SAMPLE_RATE);
        let speaker_count = sidecar.num_speakers.unwrap_or(1).max(1);

        info!(
            "Loaded piper voice {} ({} Hz, {} speaker(s))",
            model.display(),
            sample_rate,
            speaker_count
        );

        Ok(Self {
            binary,
            model,
            sample_rate,
            speaker_count,
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--model").arg(&self.model);
        cmd
    }

    fn apply_controls(&self, cmd: &mut Command, controls: &VoiceControls) {
        if let Some(id) = controls.speaker_id
            && self.speaker_count > 1
        {
            cmd.arg("--speaker").arg(id.min(self.speaker_count - 1).to_string());
        }
        cmd.arg("--length_scale")
            .arg(format!("{:.2}", controls.length_scale));
    }

    fn render_raw(&self, mut cmd: Command, text: &str) -> ModelResult<RawAudio> {
        cmd.arg("--output_raw");
        let stdout = run_engine("piper", &mut cmd, Some(text))?;
        Ok(RawAudio::I16(le_bytes_to_i16(&stdout)))
    }
}

impl SpeechModel for PiperCli {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            engine: "piper".to_string(),
            sample_rate: self.sample_rate,
            speaker_count: self.speaker_count,
            supports_cloning: false,
            loaded: true,
        }
    }

    fn render_samples(&self, text: &str, controls: &VoiceControls) -> ModelResult<RawAudio> {
        let mut cmd = self.command();
        self.apply_controls(&mut cmd, controls);
        self.render_raw(cmd, text)
    }

    fn render_to_file(&self, text: &str, controls: &VoiceControls, path: &Path) -> ModelResult<()> {
        let mut cmd = self.command();
        self.apply_controls(&mut cmd, controls);
        cmd.arg("--output_file").arg(path);
        run_engine("piper", &mut cmd, Some(text))?;
        Ok(())
    }

    fn render_plain(&self, text: &str) -> ModelResult<RawAudio> {
        self.render_raw(self.command(), text)
    }
}

fn sidecar_path(model: &Path) -> PathBuf {
    let mut path = OsString::from(model.as_os_str());
    path.push(".json");
    PathBuf::from(path)
}

fn read_sidecar(model: &Path) -> VoiceSidecar {
    let path = sidecar_path(model);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return VoiceSidecar::default();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Ignoring unreadable voice config {}: {}", path.display(), e);
        VoiceSidecar::default()
    })
}

fn le_bytes_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path_appends_json() {
        assert_eq!(
            sidecar_path(Path::new("/voices/en_US-libritts-high.onnx")),
            PathBuf::from("/voices/en_US-libritts-high.onnx.json")
        );
    }

    #[test]
    fn test_sidecar_parsed() {
        let dir = TempDir::new().unwrap();
        let model = dir.path().join("voice.onnx");
        std::fs::write(&model, b"onnx").unwrap();
        std::fs::write(
            sidecar_path(&model),
            r#"{"audio": {"sample_rate": 16000, "quality": "medium"}, "num_speakers": 904}"#,
        )
        .unwrap();

        let sidecar = read_sidecar(&model);
        assert_eq!(sidecar.audio.sample_rate, Some(16000));
        assert_eq!(sidecar.num_speakers, Some(904));
    }

    #[test]
    fn test_missing_or_broken_sidecar_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let model = dir.path().join("voice.onnx");
        assert!(read_sidecar(&model).audio.sample_rate.is_none());

        std::fs::write(sidecar_path(&model), "not json").unwrap();
        assert!(read_sidecar(&model).num_speakers.is_none());
    }

    #[test]
    fn test_missing_model_path_is_configuration_error() {
        let config = EngineConfig {
            binary: Some(PathBuf::from("/bin/sh")),
            ..Default::default()
        };
        assert!(matches!(
            PiperCli::new(&config),
            Err(ModelFault::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_le_bytes_conversion_drops_odd_byte() {
        assert_eq!(le_bytes_to_i16(&[0x01, 0x00, 0xff, 0xff, 0x07]), vec![1, -1]);
    }
}
