//! Speaker resolution
//!
//! Requests may name a speaker by numeric ID, by a reference-audio path, or
//! not at all. Resolution never fails: every request ends up with exactly one
//! [`ResolvedSpeaker`], possibly [`ResolvedSpeaker::Unresolved`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Inclusive range of valid speaker IDs for the loaded voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeakerIdBounds {
    pub min: u32,
    pub max: u32,
}

impl SpeakerIdBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Clamp any integer into the bounds
    pub fn clamp(&self, id: i64) -> u32 {
        let clamped = id.clamp(i64::from(self.min), i64::from(self.max));
        // Within u32 range after clamping
        clamped as u32
    }
}

impl Default for SpeakerIdBounds {
    fn default() -> Self {
        Self { min: 0, max: 903 }
    }
}

/// The speaker a request will be synthesized with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSpeaker {
    /// Existing reference-audio file for voice cloning
    Reference(PathBuf),
    /// Speaker index of a multi-speaker voice
    Id(u32),
    /// No speaker information, engines use their default voice
    Unresolved,
}

impl ResolvedSpeaker {
    pub fn reference(&self) -> Option<&Path> {
        match self {
            ResolvedSpeaker::Reference(path) => Some(path),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<u32> {
        match self {
            ResolvedSpeaker::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, ResolvedSpeaker::Unresolved)
    }
}

impl std::fmt::Display for ResolvedSpeaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedSpeaker::Reference(path) => write!(f, "reference:{}", path.display()),
            ResolvedSpeaker::Id(id) => write!(f, "id:{id}"),
            ResolvedSpeaker::Unresolved => f.write_str("none"),
        }
    }
}

/// Resolve a speaker from request fields
///
/// Priority:
/// 1. explicit numeric ID, clamped into `id_bounds`
/// 2. string reference: an integer is treated like (1), anything else is a
///    path (relative paths are joined to `base_dir`) accepted only if it exists
/// 3. `default_ref` when it exists
/// 4. [`ResolvedSpeaker::Unresolved`]
pub fn resolve_speaker(
    requested_ref: Option<&str>,
    requested_id: Option<i64>,
    default_ref: &Path,
    id_bounds: SpeakerIdBounds,
    base_dir: &Path,
) -> ResolvedSpeaker {
    if let Some(id) = requested_id {
        return ResolvedSpeaker::Id(id_bounds.clamp(id));
    }

    if let Some(reference) = requested_ref.map(str::trim).filter(|r| !r.is_empty()) {
        if let Ok(id) = reference.parse::<i64>() {
            return ResolvedSpeaker::Id(id_bounds.clamp(id));
        }

        let path = Path::new(reference);
        let candidate = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        };

        if candidate.is_file() {
            debug!("Using speaker reference {}", candidate.display());
            return ResolvedSpeaker::Reference(candidate);
        }
        warn!(
            "Speaker reference {} not found, falling back",
            candidate.display()
        );
    }

    if default_ref.is_file() {
        return ResolvedSpeaker::Reference(default_ref.to_path_buf());
    }

    ResolvedSpeaker::Unresolved
}

/// Per-process resolver carrying the configured defaults
#[derive(Debug, Clone)]
pub struct SpeakerResolver {
    base_dir: PathBuf,
    default_reference: PathBuf,
    id_bounds: SpeakerIdBounds,
}

impl SpeakerResolver {
    pub fn new(base_dir: PathBuf, default_reference: PathBuf, id_bounds: SpeakerIdBounds) -> Self {
        // A relative default lives next to the other references
        let default_reference = if default_reference.is_absolute() {
            default_reference
        } else {
            base_dir.join(default_reference)
        };
        Self {
            base_dir,
            default_reference,
            id_bounds,
        }
    }

    pub fn resolve(&self, requested_ref: Option<&str>, requested_id: Option<i64>) -> ResolvedSpeaker {
        resolve_speaker(
            requested_ref,
            requested_id,
            &self.default_reference,
            self.id_bounds,
            &self.base_dir,
        )
    }

    pub fn id_bounds(&self) -> SpeakerIdBounds {
        self.id_bounds
    }

    pub fn default_reference(&self) -> &Path {
        &self.default_reference
    }

    pub fn has_default_reference(&self) -> bool {
        self.default_reference.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BOUNDS: SpeakerIdBounds = SpeakerIdBounds { min: 0, max: 903 };

    fn missing_default(dir: &TempDir) -> PathBuf {
        dir.path().join("speaker.wav")
    }

    #[test]
    fn test_explicit_id_clamped_high() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_speaker(None, Some(5000), &missing_default(&dir), BOUNDS, dir.path());
        assert_eq!(resolved, ResolvedSpeaker::Id(903));
    }

    #[test]
    fn test_explicit_id_clamped_low() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_speaker(None, Some(-5), &missing_default(&dir), BOUNDS, dir.path());
        assert_eq!(resolved, ResolvedSpeaker::Id(0));
    }

    #[test]
    fn test_explicit_id_wins_over_reference() {
        let dir = TempDir::new().unwrap();
        let voice = dir.path().join("voice.wav");
        fs::write(&voice, b"RIFF").unwrap();
        let resolved = resolve_speaker(
            Some("voice.wav"),
            Some(12),
            &missing_default(&dir),
            BOUNDS,
            dir.path(),
        );
        assert_eq!(resolved, ResolvedSpeaker::Id(12));
    }

    #[test]
    fn test_numeric_reference_parsed_as_id() {
        let dir = TempDir::new().unwrap();
        let resolved =
            resolve_speaker(Some(" 1200 "), None, &missing_default(&dir), BOUNDS, dir.path());
        assert_eq!(resolved, ResolvedSpeaker::Id(903));
    }

    #[test]
    fn test_relative_reference_resolved_against_base_dir() {
        let dir = TempDir::new().unwrap();
        let voice = dir.path().join("alice.wav");
        fs::write(&voice, b"RIFF").unwrap();
        let resolved =
            resolve_speaker(Some("alice.wav"), None, &missing_default(&dir), BOUNDS, dir.path());
        assert_eq!(resolved, ResolvedSpeaker::Reference(voice));
    }

    #[test]
    fn test_absolute_reference_used_as_is() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let voice = other.path().join("bob.wav");
        fs::write(&voice, b"RIFF").unwrap();
        let resolved = resolve_speaker(
            voice.to_str(),
            None,
            &missing_default(&dir),
            BOUNDS,
            dir.path(),
        );
        assert_eq!(resolved, ResolvedSpeaker::Reference(voice));
    }

    #[test]
    fn test_missing_reference_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("speaker.wav");
        fs::write(&default, b"RIFF").unwrap();
        let resolved = resolve_speaker(Some("ghost.wav"), None, &default, BOUNDS, dir.path());
        assert_eq!(resolved, ResolvedSpeaker::Reference(default));
    }

    #[test]
    fn test_nothing_available_is_unresolved() {
        let dir = TempDir::new().unwrap();
        let resolved =
            resolve_speaker(Some("ghost.wav"), None, &missing_default(&dir), BOUNDS, dir.path());
        assert_eq!(resolved, ResolvedSpeaker::Unresolved);
        assert!(!resolved.is_resolved());
    }

    #[test]
    fn test_resolver_joins_relative_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("speaker.wav"), b"RIFF").unwrap();
        let resolver = SpeakerResolver::new(
            dir.path().to_path_buf(),
            PathBuf::from("speaker.wav"),
            SpeakerIdBounds::default(),
        );
        assert!(resolver.has_default_reference());
        assert_eq!(
            resolver.resolve(None, None),
            ResolvedSpeaker::Reference(dir.path().join("speaker.wav"))
        );
    }

    #[test]
    fn test_bounds_new_orders_range() {
        let bounds = SpeakerIdBounds::new(10, 2);
        assert_eq!(bounds, SpeakerIdBounds { min: 2, max: 10 });
        assert_eq!(bounds.clamp(i64::MIN), 2);
        assert_eq!(bounds.clamp(i64::MAX), 10);
    }
}
