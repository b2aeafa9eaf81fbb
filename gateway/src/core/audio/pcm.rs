//! Canonical PCM container

/// Size of the canonical RIFF/WAVE header for 16-bit PCM
pub const WAV_HEADER_LEN: usize = 44;

const PCM_FORMAT_TAG: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

/// Mono, 16-bit little-endian PCM audio
///
/// This is the only audio representation that leaves the pipeline. It always
/// serializes to a canonical 44-byte-header WAV file via [`PcmAudio::to_wav_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    sample_rate: u32,
    data: Vec<u8>,
}

impl PcmAudio {
    /// Wrap little-endian 16-bit sample bytes
    ///
    /// A trailing odd byte cannot form a sample and is dropped.
    pub fn from_bytes(mut data: Vec<u8>, sample_rate: u32) -> Self {
        if data.len() % 2 != 0 {
            data.pop();
        }
        Self { sample_rate, data }
    }

    pub fn from_samples(samples: &[i16], sample_rate: u32) -> Self {
        let mut data = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            data.extend_from_slice(&sample.to_le_bytes());
        }
        Self { sample_rate, data }
    }

    pub fn format_tag(&self) -> u16 {
        PCM_FORMAT_TAG
    }

    pub fn channels(&self) -> u16 {
        CHANNELS
    }

    pub fn bits_per_sample(&self) -> u16 {
        BITS_PER_SAMPLE
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> usize {
        self.data.len() / 2
    }

    /// Raw sample payload, little-endian
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length of the serialized WAV file in bytes
    pub fn byte_len(&self) -> usize {
        WAV_HEADER_LEN + self.data.len()
    }

    /// Playback duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Peak absolute amplitude normalized to 0.0..=1.0
    pub fn peak_amplitude(&self) -> f32 {
        self.samples()
            .map(|s| (f32::from(s) / f32::from(i16::MAX)).abs())
            .fold(0.0, f32::max)
    }

    /// Serialize as a RIFF/WAVE file
    pub fn to_wav_bytes(&self) -> Vec<u8> {
        let data_size = self.data.len() as u32;
        let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
        let byte_rate = self.sample_rate * u32::from(block_align);

        let mut wav = Vec::with_capacity(self.byte_len());
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_size).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
        wav.extend_from_slice(&CHANNELS.to_le_bytes());
        wav.extend_from_slice(&self.sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_size.to_le_bytes());
        wav.extend_from_slice(&self.data);
        wav
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_empty_audio_is_header_only() {
        let audio = PcmAudio::from_samples(&[], 22050);
        assert!(audio.is_empty());
        assert_eq!(audio.byte_len(), WAV_HEADER_LEN);
        assert_eq!(audio.to_wav_bytes().len(), WAV_HEADER_LEN);
    }

    #[test]
    fn test_wav_bytes_parse_with_hound() {
        let audio = PcmAudio::from_samples(&[0, 1000, -1000, i16::MAX], 24000);
        let bytes = audio.to_wav_bytes();
        assert_eq!(bytes.len(), audio.byte_len());

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 1000, -1000, i16::MAX]);
    }

    #[test]
    fn test_odd_byte_dropped() {
        let audio = PcmAudio::from_bytes(vec![1, 0, 2], 16000);
        assert_eq!(audio.frame_count(), 1);
        assert_eq!(audio.payload(), &[1, 0]);
    }

    #[test]
    fn test_peak_amplitude() {
        let audio = PcmAudio::from_samples(&[0, -16384, 8192], 16000);
        let peak = audio.peak_amplitude();
        assert!((peak - 0.5).abs() < 0.001);
        assert_eq!(PcmAudio::from_samples(&[], 16000).peak_amplitude(), 0.0);
    }

    #[test]
    fn test_duration() {
        let audio = PcmAudio::from_samples(&vec![0; 22050], 22050);
        assert!((audio.duration_seconds() - 1.0).abs() < f64::EPSILON);
    }
}
