pub mod audio;
pub mod engine;
pub mod pipeline;
pub mod request;
pub mod speaker;
pub mod strategy;
pub mod text;

// Re-export commonly used types for convenience
pub use audio::{PcmAudio, RawAudio, WAV_HEADER_LEN, encode, generate_silence};
pub use engine::{
    EngineConfig, EngineKind, ModelFault, ModelInfo, ModelResult, SpeechModel, VoiceControls,
    create_speech_model, get_supported_engines, load_speech_model,
};
pub use pipeline::{
    AttemptRecord, AttemptStatus, AudioSource, FallbackPipeline, PipelineConfig, PipelineState,
    SynthesisOutcome,
};
pub use request::SynthesisRequest;
pub use speaker::{ResolvedSpeaker, SpeakerIdBounds, SpeakerResolver, resolve_speaker};
pub use strategy::{
    AttemptResult, Capabilities, ErrorKind, StrategyInput, StrategySettings, SynthesisStrategy,
    TextClass, create_strategies, create_strategy,
};
pub use text::{Rejection, SanitizedText, TextBounds, sanitize};
