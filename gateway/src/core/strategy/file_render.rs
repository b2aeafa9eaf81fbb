use std::path::PathBuf;

use super::{Capabilities, StrategyInput, SynthesisStrategy};
use crate::core::audio::RawAudio;
use crate::core::engine::process::ScratchFile;
use crate::core::engine::{ModelResult, SpeechModel, VoiceControls};

/// Renders into a scratch WAV file and reads it back
///
/// The scratch file is removed whether or not rendering succeeds.
#[derive(Debug, Clone)]
pub struct FileRenderStrategy {
    scratch_dir: PathBuf,
}

impl FileRenderStrategy {
    pub const NAME: &'static str = "file_render";

    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }
}

impl SynthesisStrategy for FileRenderStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            speaker_selection: false,
            rate_control: true,
            requires_speaker_reference: false,
        }
    }

    fn synthesize(&self, model: &dyn SpeechModel, input: &StrategyInput<'_>) -> ModelResult<RawAudio> {
        let scratch = ScratchFile::new(&self.scratch_dir, "render");
        let controls = VoiceControls {
            speaker_id: None,
            length_scale: input.rate_scale,
        };
        model.render_to_file(input.text.as_str(), &controls, scratch.path())?;
        Ok(RawAudio::Encoded(scratch.read()?))
    }
}
