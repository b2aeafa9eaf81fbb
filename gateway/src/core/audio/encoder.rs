//! Normalization of engine output into canonical PCM

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use tracing::debug;

use super::pcm::PcmAudio;

/// Audio exactly as an engine produced it
#[derive(Debug, Clone, PartialEq)]
pub enum RawAudio {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I16(Vec<i16>),
    /// Opaque bytes, either a WAV file or raw 16-bit little-endian PCM
    Encoded(Vec<u8>),
}

impl RawAudio {
    pub fn is_empty(&self) -> bool {
        match self {
            RawAudio::F32(s) => s.is_empty(),
            RawAudio::F64(s) => s.is_empty(),
            RawAudio::I16(s) => s.is_empty(),
            RawAudio::Encoded(b) => b.is_empty(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RawAudio::F32(_) => "f32",
            RawAudio::F64(_) => "f64",
            RawAudio::I16(_) => "i16",
            RawAudio::Encoded(_) => "encoded",
        }
    }
}

/// Convert a float sample to 16-bit PCM
///
/// Clamps to [-1.0, 1.0], scales by 32767 and rounds to nearest.
#[inline]
pub fn float_to_i16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * f64::from(i16::MAX)).round() as i16
}

/// Encode raw engine output as PCM at `sample_rate`
///
/// Never fails. Empty input produces an empty payload, which downstream
/// validation rejects. A byte blob holding a WAV file is unwrapped and keeps
/// its own sample rate, including streamed files whose chunk sizes are
/// placeholders; any other blob is taken as 16-bit PCM.
pub fn encode(raw: RawAudio, sample_rate: u32) -> PcmAudio {
    match raw {
        RawAudio::F32(samples) => {
            let pcm: Vec<i16> = samples.iter().map(|&s| float_to_i16(f64::from(s))).collect();
            PcmAudio::from_samples(&pcm, sample_rate)
        }
        RawAudio::F64(samples) => {
            let pcm: Vec<i16> = samples.iter().map(|&s| float_to_i16(s)).collect();
            PcmAudio::from_samples(&pcm, sample_rate)
        }
        RawAudio::I16(samples) => PcmAudio::from_samples(&samples, sample_rate),
        RawAudio::Encoded(bytes) => {
            if !is_wav(&bytes) {
                return PcmAudio::from_bytes(bytes, sample_rate);
            }
            match decode_wav(&bytes) {
                Ok(audio) => audio,
                Err(e) => {
                    debug!("WAV blob rejected by reader ({}), scanning chunks", e);
                    scan_wav_chunks(&bytes, sample_rate)
                }
            }
        }
    }
}

fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Unwrap a WAV file into mono 16-bit PCM, averaging channels
fn decode_wav(bytes: &[u8]) -> Result<PcmAudio, hound::Error> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Int, 16) => {
            let samples = reader
                .into_samples::<i16>()
                .collect::<Result<Vec<_>, _>>()?;
            if channels == 1 {
                return Ok(PcmAudio::from_samples(&samples, spec.sample_rate));
            }
            samples
                .into_iter()
                .map(|s| f64::from(s) / f64::from(i16::MAX))
                .collect()
        }
        (SampleFormat::Int, bits) => {
            let scale = f64::from((1u32 << (bits - 1)) - 1);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(PcmAudio::from_samples(&downmix(&interleaved, channels), spec.sample_rate))
}

fn downmix(interleaved: &[f64], channels: usize) -> Vec<i16> {
    interleaved
        .chunks(channels)
        .map(|frame| float_to_i16(frame.iter().sum::<f64>() / frame.len() as f64))
        .collect()
}

const WAVE_FORMAT_IEEE_FLOAT: u16 = 3;

#[derive(Debug, Clone, Copy)]
struct FmtChunk {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let b = bytes.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn parse_fmt(body: &[u8]) -> Option<FmtChunk> {
    Some(FmtChunk {
        format_tag: read_u16(body, 0)?,
        channels: read_u16(body, 2)?,
        sample_rate: read_u32(body, 4)?,
        bits_per_sample: read_u16(body, 14)?,
    })
}

/// Recover samples from a WAV blob the reader refused
///
/// Engines that stream WAV to a pipe write placeholder RIFF and data sizes
/// (e.g. `0x7ffff000`). Chunk sizes are clamped to the bytes actually
/// present and the data chunk runs to the end of the blob. Header bytes
/// never reach the payload: without a data chunk the result is empty.
fn scan_wav_chunks(bytes: &[u8], sample_rate: u32) -> PcmAudio {
    let mut fmt = None;
    let mut data: &[u8] = &[];
    let mut offset = 12usize;

    while let (Some(id), Some(size)) = (
        bytes.get(offset..offset.saturating_add(4)),
        read_u32(bytes, offset.saturating_add(4)),
    ) {
        let size = size as usize;
        let body_start = offset + 8;
        let body_end = body_start.saturating_add(size).min(bytes.len());
        let body = &bytes[body_start..body_end];
        match id {
            b"fmt " => fmt = parse_fmt(body),
            b"data" => {
                data = body;
                break;
            }
            _ => {}
        }
        // chunks are word aligned
        offset = body_start.saturating_add(size).saturating_add(size & 1);
    }

    let fmt = fmt.unwrap_or(FmtChunk {
        format_tag: 1,
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
    });
    let rate = if fmt.sample_rate == 0 { sample_rate } else { fmt.sample_rate };
    let channels = usize::from(fmt.channels.max(1));

    let interleaved: Vec<f64> = match (fmt.format_tag, fmt.bits_per_sample) {
        (WAVE_FORMAT_IEEE_FLOAT, 32) => data
            .chunks_exact(4)
            .map(|b| f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])))
            .collect(),
        _ if channels == 1 => return PcmAudio::from_bytes(data.to_vec(), rate),
        _ => data
            .chunks_exact(2)
            .map(|b| f64::from(i16::from_le_bytes([b[0], b[1]])) / f64::from(i16::MAX))
            .collect(),
    };

    PcmAudio::from_samples(&downmix(&interleaved, channels), rate)
}
