//! Configuration module for the Voicefall gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use voicefall_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod merge;
mod utils;
mod validation;
mod yaml;

use crate::core::engine::EngineConfig;
use crate::core::pipeline::PipelineConfig;
use crate::core::speaker::{SpeakerIdBounds, SpeakerResolver};
use crate::core::strategy::{DEFAULT_STRATEGY_ORDER, StrategySettings};
use crate::core::text::{DEFAULT_LANGUAGE, TextBounds};

pub use utils::{parse_env_number, parse_list};
pub use yaml::YamlConfig;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8011;
pub const DEFAULT_ENGINE: &str = "piper";
pub const DEFAULT_SPEAKER_REFERENCE: &str = "speaker.wav";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 120;

/// Server configuration
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port)
/// - Speech engine selection and its files
/// - Speaker resolution (reference directory, default reference, ID bounds)
/// - Text bounds per strategy class
/// - Pipeline behaviour (strategy order, silence, housekeeping, timeout)
/// - Security settings (CORS)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Engine settings
    pub engine: String,
    pub engine_binary: Option<PathBuf>,
    pub engine_model_path: Option<PathBuf>,
    pub engine_model_name: Option<String>,
    pub engine_voice: Option<String>,
    pub engine_sample_rate: Option<u32>,
    /// Directory for transient render files
    pub scratch_dir: PathBuf,

    // Speaker settings
    pub speaker_base_dir: PathBuf,
    /// Relative paths are resolved against `speaker_base_dir`
    pub default_speaker_reference: PathBuf,
    pub speaker_id_min: u32,
    pub speaker_id_max: u32,

    // Text bounds
    pub text_min_chars: usize,
    pub text_strict_max_chars: usize,
    pub text_extended_max_chars: usize,

    // Synthesis settings
    pub strategies: Vec<String>,
    pub silence_duration_seconds: f64,
    pub memory_release_interval: u64,
    pub request_timeout_seconds: u64,
    pub default_language: String,

    // Security settings
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            engine: DEFAULT_ENGINE.to_string(),
            engine_binary: None,
            engine_model_path: None,
            engine_model_name: None,
            engine_voice: None,
            engine_sample_rate: None,
            scratch_dir: std::env::temp_dir(),
            speaker_base_dir: PathBuf::from("."),
            default_speaker_reference: PathBuf::from(DEFAULT_SPEAKER_REFERENCE),
            speaker_id_min: SpeakerIdBounds::default().min,
            speaker_id_max: SpeakerIdBounds::default().max,
            text_min_chars: TextBounds::STRICT.min_chars,
            text_strict_max_chars: TextBounds::STRICT.max_chars,
            text_extended_max_chars: TextBounds::EXTENDED.max_chars,
            strategies: DEFAULT_STRATEGY_ORDER.iter().map(|s| s.to_string()).collect(),
            silence_duration_seconds: 0.1,
            memory_release_interval: 5,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            default_language: DEFAULT_LANGUAGE.to_string(),
            cors_allowed_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Note: .env file is loaded in main.rs at application startup
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, with environment variables as the base
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // The configuration priority is: YAML > Environment Variables (.env + actual ENV) > Defaults
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_engine(&self.engine)?;
        validation::validate_speaker_ids(self.speaker_id_min, self.speaker_id_max)?;
        validation::validate_text_bounds(
            self.text_min_chars,
            self.text_strict_max_chars,
            self.text_extended_max_chars,
        )?;
        validation::validate_strategies(&self.strategies)?;
        validation::validate_silence_duration(self.silence_duration_seconds)?;
        validation::validate_request_timeout(self.request_timeout_seconds)?;
        validation::validate_sample_rate(self.engine_sample_rate)?;
        validation::validate_language(&self.default_language)?;
        Ok(())
    }

    /// Get the server address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            binary: self.engine_binary.clone(),
            model_path: self.engine_model_path.clone(),
            model_name: self.engine_model_name.clone(),
            voice: self.engine_voice.clone(),
            sample_rate: self.engine_sample_rate,
            scratch_dir: self.scratch_dir.clone(),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            strict_bounds: TextBounds::new(self.text_min_chars, self.text_strict_max_chars),
            extended_bounds: TextBounds::new(self.text_min_chars, self.text_extended_max_chars),
            silence_duration_seconds: self.silence_duration_seconds,
            memory_release_interval: self.memory_release_interval,
            default_language: self.default_language.clone(),
        }
    }

    pub fn speaker_resolver(&self) -> SpeakerResolver {
        SpeakerResolver::new(
            self.speaker_base_dir.clone(),
            self.default_speaker_reference.clone(),
            SpeakerIdBounds::new(self.speaker_id_min, self.speaker_id_max),
        )
    }

    pub fn strategy_settings(&self) -> StrategySettings {
        StrategySettings {
            scratch_dir: self.scratch_dir.clone(),
        }
    }
}
