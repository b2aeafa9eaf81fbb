pub mod encoder;
pub mod pcm;
pub mod silence;

pub use encoder::{RawAudio, encode, float_to_i16};
pub use pcm::{PcmAudio, WAV_HEADER_LEN};
pub use silence::{generate_fallback_silence, generate_silence};
