//! Audio Test Fixtures
//!
//! Programmatically generated audio so tests have no external file
//! dependencies. Float samples feed mock models, WAV helpers build the blobs
//! file-based engines hand back.

use std::f32::consts::PI;
use std::io::Cursor;
use std::path::Path;

/// Sample rate used by the mock model
pub const SAMPLE_RATE: u32 = 16000;

/// Duration constants (in samples at 16kHz)
pub const MS_100: usize = 1600;
pub const MS_500: usize = 8000;

/// Generate a sine wave tone as float samples in -1.0..=1.0
pub fn generate_sine_wave(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
    let angular_freq = 2.0 * PI * frequency / SAMPLE_RATE as f32;
    (0..duration_samples)
        .map(|i| (angular_freq * i as f32).sin() * amplitude)
        .collect()
}

/// Generate an A4 (440Hz) tone
pub fn generate_a440_tone(duration_samples: usize) -> Vec<f32> {
    generate_sine_wave(duration_samples, 440.0, 0.5)
}

/// Convert float samples to i16 the way the encoder does
pub fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0).round() as i16)
        .collect()
}

/// Encode i16 samples as an in-memory WAV file
pub fn create_wav_file(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for &sample in samples {
            writer.write_sample(sample).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Mono 16-bit WAV as an engine streaming to stdout writes it
///
/// The RIFF and data sizes are placeholders because the writer cannot seek
/// back to patch them.
pub fn create_streamed_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(44 + samples.len() * 2);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&0x7ffff024u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&0x7ffff000u32.to_le_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Write i16 samples to a mono WAV file on disk
pub fn write_wav_file(path: &Path, samples: &[i16], sample_rate: u32) {
    std::fs::write(path, create_wav_file(samples, sample_rate, 1)).expect("write wav file");
}

/// Parsed view of a WAV byte stream
#[derive(Debug)]
pub struct ParsedWav {
    pub spec: hound::WavSpec,
    pub samples: Vec<i16>,
}

/// Parse WAV bytes with hound, panicking on malformed input
pub fn parse_wav(bytes: &[u8]) -> ParsedWav {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).expect("valid wav");
    let spec = reader.spec();
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("valid samples");
    ParsedWav { spec, samples }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_wave_generation() {
        let tone = generate_a440_tone(MS_100);
        assert_eq!(tone.len(), MS_100);
        assert!(tone.iter().all(|s| s.abs() <= 0.5 + f32::EPSILON));
        assert!(tone.iter().any(|s| s.abs() > 0.4));
    }

    #[test]
    fn test_wav_file_round_trip() {
        let wav = create_wav_file(&[1, -2, 3], 8000, 1);
        let parsed = parse_wav(&wav);
        assert_eq!(parsed.spec.sample_rate, 8000);
        assert_eq!(parsed.samples, vec![1, -2, 3]);
    }
}
