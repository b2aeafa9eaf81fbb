use super::{Capabilities, StrategyInput, SynthesisStrategy};
use crate::core::audio::RawAudio;
use crate::core::engine::{ModelResult, SpeechModel};

/// Last resort: plain text with engine defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextStrategy;

impl PlainTextStrategy {
    pub const NAME: &'static str = "plain_text";
}

impl SynthesisStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn synthesize(&self, model: &dyn SpeechModel, input: &StrategyInput<'_>) -> ModelResult<RawAudio> {
        model.render_plain(input.text.as_str())
    }
}
