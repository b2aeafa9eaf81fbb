use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8011
///
/// engine:
///   kind: "piper"
///   binary: "/usr/local/bin/piper"
///   model_path: "/voices/en_US-libritts_r-medium.onnx"
///   scratch_dir: "/tmp/voicefall"
///
/// speakers:
///   base_dir: "/srv/voicefall"
///   default_reference: "speaker.wav"
///   id_min: 0
///   id_max: 903
///
/// text:
///   min_chars: 5
///   strict_max_chars: 200
///   extended_max_chars: 2000
///
/// synthesis:
///   strategies: ["cloned_voice", "direct_samples", "file_render", "plain_text"]
///   silence_duration_seconds: 0.1
///   memory_release_interval: 5
///   request_timeout_seconds: 60
///   default_language: "en"
///
/// security:
///   cors_allowed_origins: "*"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub engine: Option<EngineYaml>,
    pub speakers: Option<SpeakersYaml>,
    pub text: Option<TextYaml>,
    pub synthesis: Option<SynthesisYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Speech engine configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EngineYaml {
    pub kind: Option<String>,
    pub binary: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub model_name: Option<String>,
    pub voice: Option<String>,
    pub sample_rate: Option<u32>,
    pub scratch_dir: Option<PathBuf>,
}

/// Speaker resolution configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SpeakersYaml {
    pub base_dir: Option<PathBuf>,
    pub default_reference: Option<PathBuf>,
    pub id_min: Option<u32>,
    pub id_max: Option<u32>,
}

/// Text bounds configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TextYaml {
    pub min_chars: Option<usize>,
    pub strict_max_chars: Option<usize>,
    pub extended_max_chars: Option<usize>,
}

/// Pipeline behaviour from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SynthesisYaml {
    pub strategies: Option<Vec<String>>,
    pub silence_duration_seconds: Option<f64>,
    pub memory_release_interval: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
    pub default_language: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080

engine:
  kind: "coqui"
  binary: "/opt/coqui/bin/tts"
  model_name: "tts_models/multilingual/multi-dataset/xtts_v2"
  sample_rate: 24000
  scratch_dir: "/tmp/scratch"

speakers:
  base_dir: "/srv/voices"
  default_reference: "narrator.wav"
  id_min: 0
  id_max: 299

text:
  min_chars: 4
  strict_max_chars: 150
  extended_max_chars: 1500

synthesis:
  strategies: ["cloned_voice", "plain_text"]
  silence_duration_seconds: 0.25
  memory_release_interval: 10
  request_timeout_seconds: 30
  default_language: "de"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host, Some("127.0.0.1".to_string()));
        assert_eq!(server.port, Some(8080));

        let engine = config.engine.as_ref().unwrap();
        assert_eq!(engine.kind, Some("coqui".to_string()));
        assert_eq!(engine.binary, Some(PathBuf::from("/opt/coqui/bin/tts")));
        assert_eq!(engine.sample_rate, Some(24000));

        let speakers = config.speakers.as_ref().unwrap();
        assert_eq!(speakers.default_reference, Some(PathBuf::from("narrator.wav")));
        assert_eq!(speakers.id_max, Some(299));

        let text = config.text.as_ref().unwrap();
        assert_eq!(text.strict_max_chars, Some(150));

        let synthesis = config.synthesis.as_ref().unwrap();
        assert_eq!(
            synthesis.strategies,
            Some(vec!["cloned_voice".to_string(), "plain_text".to_string()])
        );
        assert_eq!(synthesis.silence_duration_seconds, Some(0.25));
        assert_eq!(synthesis.default_language, Some("de".to_string()));
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
engine:
  kind: "espeak"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.server.is_none());
        assert_eq!(
            config.engine.as_ref().unwrap().kind,
            Some("espeak".to_string())
        );
        assert!(config.engine.as_ref().unwrap().model_path.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.synthesis.is_none());
    }

    #[test]
    fn test_yaml_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "server:\n  port: 9000\n").unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();
        assert_eq!(config.server.unwrap().port, Some(9000));
    }

    #[test]
    fn test_yaml_from_missing_file() {
        let result = YamlConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_yaml_invalid_types() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "server:\n  port: \"not a number\"\n").unwrap();

        let err = YamlConfig::from_file(&config_path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse YAML config"));
    }
}
