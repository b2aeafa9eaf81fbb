use std::env;
use std::path::PathBuf;

use super::utils::{parse_env_number, parse_list};
use super::yaml::YamlConfig;
use super::{
    DEFAULT_ENGINE, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECONDS,
    DEFAULT_SPEAKER_REFERENCE, ServerConfig,
};
use crate::core::speaker::SpeakerIdBounds;
use crate::core::strategy::DEFAULT_STRATEGY_ORDER;
use crate::core::text::{DEFAULT_LANGUAGE, TextBounds};

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// # Arguments
/// * `yaml_config` - Optional YAML configuration to use as overrides
///
/// # Returns
/// * `Result<ServerConfig, Box<dyn std::error::Error>>` - The merged configuration or an error
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();

    // Helper macro to get value with priority: YAML > ENV > Default
    macro_rules! get_value {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            $yaml_value
                .or_else(|| env::var($env_var).ok())
                .unwrap_or_else(|| $default.to_string())
        };
    }

    // Helper macro for optional values: YAML > ENV
    macro_rules! get_optional {
        ($env_var:expr, $yaml_value:expr) => {
            $yaml_value.or_else(|| env::var($env_var).ok())
        };
    }

    // Helper macro for numeric values: YAML > ENV (parsed) > Default
    macro_rules! get_number {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            match $yaml_value {
                Some(value) => value,
                None => match env::var($env_var) {
                    Ok(raw) => parse_env_number($env_var, &raw)?,
                    Err(_) => $default,
                },
            }
        };
    }

    // Server configuration
    let server = yaml.server.as_ref();
    let host = get_value!("HOST", server.and_then(|s| s.host.clone()), DEFAULT_HOST);
    let port: u16 = get_number!("PORT", server.and_then(|s| s.port), DEFAULT_PORT);

    // Engine configuration
    let engine_yaml = yaml.engine.as_ref();
    let engine = get_value!(
        "TTS_ENGINE",
        engine_yaml.and_then(|e| e.kind.clone()),
        DEFAULT_ENGINE
    );
    let engine_binary = engine_yaml
        .and_then(|e| e.binary.clone())
        .or_else(|| env::var("TTS_ENGINE_BIN").ok().map(PathBuf::from));
    let engine_model_path = engine_yaml
        .and_then(|e| e.model_path.clone())
        .or_else(|| env::var("TTS_MODEL_PATH").ok().map(PathBuf::from));
    let engine_model_name = get_optional!(
        "TTS_MODEL_NAME",
        engine_yaml.and_then(|e| e.model_name.clone())
    );
    let engine_voice = get_optional!("TTS_VOICE", engine_yaml.and_then(|e| e.voice.clone()));
    let engine_sample_rate: Option<u32> = match engine_yaml.and_then(|e| e.sample_rate) {
        Some(rate) => Some(rate),
        None => match env::var("TTS_SAMPLE_RATE") {
            Ok(raw) => Some(parse_env_number("TTS_SAMPLE_RATE", &raw)?),
            Err(_) => None,
        },
    };
    let scratch_dir = engine_yaml
        .and_then(|e| e.scratch_dir.clone())
        .or_else(|| env::var("TTS_SCRATCH_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(env::temp_dir);

    // Speaker configuration
    let speakers = yaml.speakers.as_ref();
    let speaker_base_dir = speakers
        .and_then(|s| s.base_dir.clone())
        .or_else(|| env::var("SPEAKER_BASE_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let default_speaker_reference = speakers
        .and_then(|s| s.default_reference.clone())
        .or_else(|| env::var("DEFAULT_SPEAKER_REFERENCE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SPEAKER_REFERENCE));
    let default_ids = SpeakerIdBounds::default();
    let speaker_id_min: u32 = get_number!(
        "SPEAKER_ID_MIN",
        speakers.and_then(|s| s.id_min),
        default_ids.min
    );
    let speaker_id_max: u32 = get_number!(
        "SPEAKER_ID_MAX",
        speakers.and_then(|s| s.id_max),
        default_ids.max
    );

    // Text bounds
    let text = yaml.text.as_ref();
    let text_min_chars: usize = get_number!(
        "TEXT_MIN_CHARS",
        text.and_then(|t| t.min_chars),
        TextBounds::STRICT.min_chars
    );
    let text_strict_max_chars: usize = get_number!(
        "TEXT_STRICT_MAX_CHARS",
        text.and_then(|t| t.strict_max_chars),
        TextBounds::STRICT.max_chars
    );
    let text_extended_max_chars: usize = get_number!(
        "TEXT_EXTENDED_MAX_CHARS",
        text.and_then(|t| t.extended_max_chars),
        TextBounds::EXTENDED.max_chars
    );

    // Synthesis configuration
    let synthesis = yaml.synthesis.as_ref();
    let strategies = synthesis
        .and_then(|s| s.strategies.clone())
        .or_else(|| env::var("TTS_STRATEGIES").ok().map(|v| parse_list(&v)))
        .unwrap_or_else(|| DEFAULT_STRATEGY_ORDER.iter().map(|s| s.to_string()).collect());
    let silence_duration_seconds: f64 = get_number!(
        "SILENCE_DURATION_SECONDS",
        synthesis.and_then(|s| s.silence_duration_seconds),
        0.1
    );
    let memory_release_interval: u64 = get_number!(
        "MEMORY_RELEASE_INTERVAL",
        synthesis.and_then(|s| s.memory_release_interval),
        5
    );
    let request_timeout_seconds: u64 = get_number!(
        "REQUEST_TIMEOUT_SECONDS",
        synthesis.and_then(|s| s.request_timeout_seconds),
        DEFAULT_REQUEST_TIMEOUT_SECONDS
    );
    let default_language = get_value!(
        "DEFAULT_LANGUAGE",
        synthesis.and_then(|s| s.default_language.clone()),
        DEFAULT_LANGUAGE
    )
    .trim()
    .to_lowercase();

    // Security configuration
    let cors_allowed_origins = get_optional!(
        "CORS_ALLOWED_ORIGINS",
        yaml.security
            .as_ref()
            .and_then(|s| s.cors_allowed_origins.clone())
    );

    Ok(ServerConfig {
        host,
        port,
        engine,
        engine_binary,
        engine_model_path,
        engine_model_name,
        engine_voice,
        engine_sample_rate,
        scratch_dir,
        speaker_base_dir,
        default_speaker_reference,
        speaker_id_min,
        speaker_id_max,
        text_min_chars,
        text_strict_max_chars,
        text_extended_max_chars,
        strategies,
        silence_duration_seconds,
        memory_release_interval,
        request_timeout_seconds,
        default_language,
        cors_allowed_origins,
    })
}
