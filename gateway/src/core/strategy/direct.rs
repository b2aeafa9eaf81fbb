use super::{Capabilities, StrategyInput, SynthesisStrategy};
use crate::core::audio::RawAudio;
use crate::core::engine::{ModelResult, SpeechModel, VoiceControls};

/// Renders samples directly, honoring speaker ID and rate
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSamplesStrategy;

impl DirectSamplesStrategy {
    pub const NAME: &'static str = "direct_samples";
}

impl SynthesisStrategy for DirectSamplesStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            speaker_selection: true,
            rate_control: true,
            requires_speaker_reference: false,
        }
    }

    fn synthesize(&self, model: &dyn SpeechModel, input: &StrategyInput<'_>) -> ModelResult<RawAudio> {
        let controls = VoiceControls {
            speaker_id: input.speaker.id(),
            length_scale: input.rate_scale,
        };
        model.render_samples(input.text.as_str(), &controls)
    }
}
