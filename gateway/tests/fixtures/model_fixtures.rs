//! Mock speech model and strategies
//!
//! `MockModel` answers each render path with a configurable behavior and
//! counts every invocation, so tests can assert which paths the pipeline
//! actually reached.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use voicefall_gateway::core::strategy::{Capabilities, StrategyInput, SynthesisStrategy};
use voicefall_gateway::{ModelFault, ModelInfo, ModelResult, RawAudio, SpeechModel, VoiceControls};

use super::audio_fixtures::{SAMPLE_RATE, create_wav_file, to_i16};

/// How one render path responds
#[derive(Debug, Clone)]
pub enum Behavior {
    Samples(Vec<f32>),
    /// Bytes as an engine wrote them, e.g. a streamed WAV
    Blob(Vec<u8>),
    Empty,
    Fail,
    RejectInput,
    Panic,
}

impl Behavior {
    fn run(&self, path: &str) -> ModelResult<RawAudio> {
        match self {
            Behavior::Samples(samples) => Ok(RawAudio::F32(samples.clone())),
            Behavior::Blob(bytes) => Ok(RawAudio::Encoded(bytes.clone())),
            Behavior::Empty => Ok(RawAudio::F32(Vec::new())),
            Behavior::Fail => Err(ModelFault::ExecutionFailed(format!("{path} failed"))),
            Behavior::RejectInput => Err(ModelFault::InputRejected(format!("{path} rejected input"))),
            Behavior::Panic => panic!("{path} exploded"),
        }
    }
}

/// Which render path a call went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    Cloned,
    Samples,
    File,
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub path: RenderPath,
    pub text: String,
    pub speaker_id: Option<u32>,
    pub length_scale: Option<f32>,
    pub language: Option<String>,
}

pub struct MockModel {
    pub info: ModelInfo,
    pub cloned: Behavior,
    pub samples: Behavior,
    pub file: Behavior,
    pub plain: Behavior,
    /// Behavior of the cloning path after the first call
    pub cloned_retry: Option<Behavior>,
    calls: Mutex<Vec<RenderCall>>,
    releases: AtomicUsize,
}

impl MockModel {
    /// Model where every path succeeds with a short tone
    pub fn healthy() -> Self {
        let tone = super::audio_fixtures::generate_a440_tone(super::audio_fixtures::MS_100);
        Self {
            info: ModelInfo {
                engine: "mock".to_string(),
                sample_rate: SAMPLE_RATE,
                speaker_count: 4,
                supports_cloning: true,
                loaded: true,
            },
            cloned: Behavior::Samples(tone.clone()),
            samples: Behavior::Samples(tone.clone()),
            file: Behavior::Samples(tone.clone()),
            plain: Behavior::Samples(tone),
            cloned_retry: None,
            calls: Mutex::new(Vec::new()),
            releases: AtomicUsize::new(0),
        }
    }

    /// Model where every path fails
    pub fn broken() -> Self {
        Self {
            cloned: Behavior::Fail,
            samples: Behavior::Fail,
            file: Behavior::Fail,
            plain: Behavior::Fail,
            ..Self::healthy()
        }
    }

    pub fn without_cloning(mut self) -> Self {
        self.info.supports_cloning = false;
        self
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self, path: RenderPath) -> usize {
        self.calls().iter().filter(|c| c.path == path).count()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    fn record(&self, call: RenderCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn record_path(&self, path: RenderPath, text: &str, controls: Option<&VoiceControls>) {
        self.record(RenderCall {
            path,
            text: text.to_string(),
            speaker_id: controls.and_then(|c| c.speaker_id),
            length_scale: controls.map(|c| c.length_scale),
            language: None,
        });
    }
}

impl SpeechModel for MockModel {
    fn info(&self) -> ModelInfo {
        self.info.clone()
    }

    fn render_samples(&self, text: &str, controls: &VoiceControls) -> ModelResult<RawAudio> {
        self.record_path(RenderPath::Samples, text, Some(controls));
        self.samples.run("samples")
    }

    fn render_to_file(&self, text: &str, controls: &VoiceControls, path: &Path) -> ModelResult<()> {
        self.record_path(RenderPath::File, text, Some(controls));
        let bytes = match self.file.run("file")? {
            RawAudio::Encoded(bytes) => bytes,
            RawAudio::F32(samples) => create_wav_file(&to_i16(&samples), self.info.sample_rate, 1),
            other => panic!("file path cannot write {}", other.kind()),
        };
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn render_plain(&self, text: &str) -> ModelResult<RawAudio> {
        self.record_path(RenderPath::Plain, text, None);
        self.plain.run("plain")
    }

    fn render_cloned(&self, text: &str, _reference: &Path, language: &str) -> ModelResult<RawAudio> {
        let previous = self.call_count(RenderPath::Cloned);
        self.record(RenderCall {
            path: RenderPath::Cloned,
            text: text.to_string(),
            speaker_id: None,
            length_scale: None,
            language: Some(language.to_string()),
        });
        let behavior = match (&self.cloned_retry, previous) {
            (Some(retry), n) if n > 0 => retry,
            _ => &self.cloned,
        };
        behavior.run("cloned")
    }

    fn release_transient_memory(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Strategy that counts invocations and returns fixed output
///
/// The counter is shared so it stays readable after the strategy is boxed
/// into a pipeline.
pub struct CountingStrategy {
    pub name: &'static str,
    pub output: Behavior,
    pub capabilities: Capabilities,
    invocations: Arc<AtomicUsize>,
}

impl CountingStrategy {
    pub fn new(name: &'static str, output: Behavior) -> Self {
        Self {
            name,
            output,
            capabilities: Capabilities::default(),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn requiring_reference(mut self) -> Self {
        self.capabilities.requires_speaker_reference = true;
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.invocations)
    }
}

impl SynthesisStrategy for CountingStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn synthesize(&self, _model: &dyn SpeechModel, _input: &StrategyInput<'_>) -> ModelResult<RawAudio> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.output.run(self.name)
    }
}
