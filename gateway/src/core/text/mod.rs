pub mod language;
pub mod sanitizer;

pub use language::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES, is_supported_language, normalize_language};
pub use sanitizer::{Rejection, SanitizedText, TextBounds, sanitize, simplify};
