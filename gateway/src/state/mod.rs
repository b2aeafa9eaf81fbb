use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::engine::load_speech_model;
use crate::core::pipeline::FallbackPipeline;
use crate::core::strategy::{create_strategies, default_strategies};

/// Application state that can be shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    /// The process-wide synthesis pipeline
    pub pipeline: Arc<FallbackPipeline>,
}

impl AppState {
    /// Build the state, loading the configured engine
    ///
    /// An engine that fails to load does not stop the server; requests degrade
    /// to silence instead.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let model = load_speech_model(&config.engine, &config.engine_config());

        let settings = config.strategy_settings();
        let strategies = create_strategies(&config.strategies, &settings).unwrap_or_else(|e| {
            warn!("Invalid strategy list ({}), using the default order", e);
            default_strategies(&settings)
        });

        let pipeline = FallbackPipeline::new(
            model,
            strategies,
            config.speaker_resolver(),
            config.pipeline_config(),
        );
        info!("Synthesis pipeline ready: {:?}", pipeline);

        Self::with_pipeline(config, Arc::new(pipeline))
    }

    /// Build the state around an existing pipeline
    pub fn with_pipeline(config: ServerConfig, pipeline: Arc<FallbackPipeline>) -> Arc<Self> {
        Arc::new(Self { config, pipeline })
    }
}
