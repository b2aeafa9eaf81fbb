use tracing::warn;

use super::{Capabilities, StrategyInput, SynthesisStrategy, TextClass};
use crate::core::audio::RawAudio;
use crate::core::engine::{ModelFault, ModelResult, SpeechModel};
use crate::core::text::simplify;

/// Clones the voice of a reference recording
///
/// Highest fidelity, so it only accepts short texts. When the engine rejects
/// the input it is retried once with a simplified form of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClonedVoiceStrategy;

impl ClonedVoiceStrategy {
    pub const NAME: &'static str = "cloned_voice";
}

impl SynthesisStrategy for ClonedVoiceStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            speaker_selection: false,
            rate_control: false,
            requires_speaker_reference: true,
        }
    }

    fn text_class(&self) -> TextClass {
        TextClass::Strict
    }

    fn synthesize(&self, model: &dyn SpeechModel, input: &StrategyInput<'_>) -> ModelResult<RawAudio> {
        let reference = input.speaker.reference().ok_or_else(|| {
            ModelFault::Unsupported("voice cloning without a speaker reference".to_string())
        })?;
        let text = input.text.as_str();

        match model.render_cloned(text, reference, input.language) {
            Err(fault) if fault.is_recoverable() => {
                let Some(simplified) = simplify(text).filter(|s| s != text) else {
                    return Err(fault);
                };
                warn!("Cloning rejected input ({}), retrying with simplified text", fault);
                model.render_cloned(&simplified, reference, input.language)
            }
            result => result,
        }
    }
}
