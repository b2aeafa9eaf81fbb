//! Language tags accepted by multilingual cloning models

use tracing::warn;

/// Languages the multilingual cloning engine can speak
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "zh-cn", "ja", "hu",
    "ko", "hi",
];

/// Language used when a request carries none or an unsupported one
pub const DEFAULT_LANGUAGE: &str = "en";

pub fn is_supported_language(tag: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&tag)
}

/// Normalize a requested language tag
///
/// Tags are trimmed and lower-cased. Unknown tags fall back to `fallback`
/// (itself falling back to [`DEFAULT_LANGUAGE`] when unsupported).
pub fn normalize_language(requested: Option<&str>, fallback: &str) -> String {
    let fallback = if is_supported_language(fallback) {
        fallback
    } else {
        DEFAULT_LANGUAGE
    };

    let Some(tag) = requested.map(|t| t.trim().to_lowercase()) else {
        return fallback.to_string();
    };

    if tag.is_empty() {
        return fallback.to_string();
    }

    if is_supported_language(&tag) {
        tag
    } else {
        warn!("Language '{}' not supported, using '{}'", tag, fallback);
        fallback.to_string()
    }
}
