//! Text sanitization ahead of synthesis
//!
//! Untrusted request text is reduced to a conservative character set before any
//! engine sees it. Acoustic models are prone to indexing faults on unusual glyphs,
//! stray punctuation runs and single-word prompts, so the sanitizer rejects
//! anything it cannot turn into a short, well-formed sentence.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static PUNCT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,!?]{2,}").expect("static regex"));
static SPACED_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[.,!?]\s+").expect("static regex"));
static SIMPLIFY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s.]").expect("static regex"));

/// Punctuation kept verbatim in addition to letters, digits and whitespace
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', '!', '?', '-', '\'', '"'];
/// Characters stripped from both ends of the cleaned text
const EDGE_TRIM: &[char] = &[' ', '.', ',', '!', '?', ';', ':', '-'];
/// Characters stripped from the end of every token
const TOKEN_TRAILING_TRIM: &[char] = &['.', ',', '!', '?'];
const TERMINATORS: &[char] = &['.', '!', '?'];
const MIN_TOKENS: usize = 2;
const MIN_SIMPLIFIED_CHARS: usize = 3;

/// Inclusive character-length window a sanitized text must fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextBounds {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl TextBounds {
    /// Window used by high-fidelity strategies
    pub const STRICT: TextBounds = TextBounds {
        min_chars: 5,
        max_chars: 200,
    };

    /// Window used by lower-fidelity strategies
    pub const EXTENDED: TextBounds = TextBounds {
        min_chars: 5,
        max_chars: 2000,
    };

    pub fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min_chars && len <= self.max_chars
    }

    /// Smallest window containing both `self` and `other`
    pub fn union(&self, other: &TextBounds) -> TextBounds {
        TextBounds {
            min_chars: self.min_chars.min(other.min_chars),
            max_chars: self.max_chars.max(other.max_chars),
        }
    }
}

impl Default for TextBounds {
    fn default() -> Self {
        Self::EXTENDED
    }
}

/// Why a text was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("text is empty")]
    Empty,
    #[error("text has {0} usable word(s), at least 2 are required")]
    TooFewWords(usize),
    #[error("text length {length} is outside {min}..={max}")]
    Length { length: usize, min: usize, max: usize },
}

/// Text that passed sanitization
///
/// Only [`sanitize`] constructs this type, so holding one guarantees the length
/// and token invariants of the bounds it was checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedText {
    text: String,
    bounds: TextBounds,
}

impl SanitizedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Bounds this text was validated against
    pub fn bounds(&self) -> TextBounds {
        self.bounds
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for SanitizedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for SanitizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Sanitize untrusted text for synthesis
///
/// Steps, in order:
/// 1. trim, reject when empty
/// 2. map typographic quotes, dashes and ellipses to ASCII
/// 3. keep letters, digits, whitespace and `. , ! ? - ' "`, blank out the rest
/// 4. collapse whitespace and punctuation runs, normalize spaced punctuation
/// 5. trim whitespace and `. , ! ? ; : -` from both ends
/// 6. keep tokens carrying an alphanumeric character, minus trailing `. , ! ?`
/// 7. join and check the character length against `bounds`
/// 8. terminate with `.` unless already terminated
///
/// Applying it to its own output yields the same text.
pub fn sanitize(raw: &str, bounds: TextBounds) -> Result<SanitizedText, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Empty);
    }

    let normalized = normalize_punctuation(trimmed);

    let filtered: String = normalized
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();

    let collapsed = WHITESPACE_RE.replace_all(&filtered, " ");
    let collapsed = PUNCT_RUN_RE.replace_all(&collapsed, ".");
    let collapsed = SPACED_PUNCT_RE.replace_all(&collapsed, ". ");

    let edged = collapsed.trim_matches(EDGE_TRIM);

    let tokens: Vec<&str> = edged
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .map(|token| token.trim_end_matches(TOKEN_TRAILING_TRIM))
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.len() < MIN_TOKENS {
        return Err(Rejection::TooFewWords(tokens.len()));
    }

    let mut text = tokens.join(" ");
    let length = text.chars().count();
    if !bounds.contains(length) {
        return Err(Rejection::Length {
            length,
            min: bounds.min_chars,
            max: bounds.max_chars,
        });
    }

    if !text.ends_with(TERMINATORS) {
        text.push('.');
    }

    Ok(SanitizedText { text, bounds })
}

/// Reduce an already sanitized text to letters, digits, spaces and periods
///
/// Used for a single recovery attempt after an engine refused its input.
/// Returns `None` when too little text survives.
pub fn simplify(text: &str) -> Option<String> {
    let stripped = SIMPLIFY_RE.replace_all(text, "");
    let simplified = WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned();
    (simplified.chars().count() >= MIN_SIMPLIFIED_CHARS).then_some(simplified)
}

fn normalize_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' => out.push('"'),
            '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            _ => out.push(c),
        }
    }
    out
}
