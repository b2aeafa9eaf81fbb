//! Helpers for engines driven through a command-line executable

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::base::{ModelFault, ModelResult};

/// Stderr fragments that mark an input-specific failure rather than a broken engine
const INPUT_FAULT_MARKERS: &[&str] = &["index", "assert", "cuda"];

/// Locate an executable, either as an explicit path or on `PATH`
pub fn find_binary(bin: &str) -> Option<PathBuf> {
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(bin);
        return path.is_file().then_some(path);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|candidate| candidate.is_file())
}

/// Resolve a configured binary, falling back to well-known names on `PATH`
pub fn resolve_binary(configured: Option<&Path>, defaults: &[&str]) -> ModelResult<PathBuf> {
    if let Some(path) = configured {
        if let Some(found) = path.to_str().and_then(find_binary) {
            return Ok(found);
        }
        return Err(ModelFault::Unavailable(format!(
            "engine binary not found: {}",
            path.display()
        )));
    }

    defaults
        .iter()
        .find_map(|name| find_binary(name))
        .ok_or_else(|| {
            ModelFault::Unavailable(format!("none of {} found on PATH", defaults.join(", ")))
        })
}

/// Run an engine command and return its stdout
///
/// `stdin_text` is written to the child's standard input when given.
pub fn run_engine(engine: &str, cmd: &mut Command, stdin_text: Option<&str>) -> ModelResult<Vec<u8>> {
    cmd.stdin(if stdin_text.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    debug!(command = ?cmd, "Running {}", engine);
    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => ModelFault::Unavailable(format!("{engine} executable not found")),
        _ => ModelFault::Io(e),
    })?;

    if let Some(text) = stdin_text
        && let Some(mut stdin) = child.stdin.take()
    {
        stdin.write_all(text.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(classify_failure(engine, &stderr));
    }

    Ok(output.stdout)
}

/// Map a failed run onto a fault variant
pub fn classify_failure(engine: &str, stderr: &str) -> ModelFault {
    let detail = stderr.trim();
    let lowered = detail.to_lowercase();
    if INPUT_FAULT_MARKERS.iter().any(|m| lowered.contains(m)) {
        ModelFault::InputRejected(format!("{engine}: {detail}"))
    } else {
        ModelFault::ExecutionFailed(format!("{engine} failed: {detail}"))
    }
}

/// Transient render file removed on drop
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Reserve a uniquely named WAV path inside `dir`
    pub fn new(dir: &Path, prefix: &str) -> Self {
        let path = dir.join(format!("{prefix}_{}.wav", uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the rendered file back
    pub fn read(&self) -> ModelResult<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ModelFault::ExecutionFailed("engine did not produce an output file".to_string())
            }
            _ => ModelFault::Io(e),
        })
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            warn!("Failed to remove scratch file {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_input_faults() {
        let fault = classify_failure("coqui", "IndexError: index out of range in self");
        assert!(matches!(fault, ModelFault::InputRejected(_)));

        let fault = classify_failure("coqui", "AssertionError");
        assert!(matches!(fault, ModelFault::InputRejected(_)));

        let fault = classify_failure("piper", "Unable to load model");
        assert!(matches!(fault, ModelFault::ExecutionFailed(_)));
    }

    #[test]
    fn test_scratch_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = {
            let scratch = ScratchFile::new(dir.path(), "render");
            std::fs::write(scratch.path(), b"data").unwrap();
            assert_eq!(scratch.read().unwrap(), b"data");
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_names_are_unique() {
        let dir = TempDir::new().unwrap();
        let a = ScratchFile::new(dir.path(), "render");
        let b = ScratchFile::new(dir.path(), "render");
        assert_ne!(a.path(), b.path());
        assert!(a.path().extension().is_some_and(|e| e == "wav"));
    }

    #[test]
    fn test_missing_scratch_output_is_execution_failure() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchFile::new(dir.path(), "render");
        assert!(matches!(scratch.read(), Err(ModelFault::ExecutionFailed(_))));
    }

    #[test]
    fn test_resolve_binary_reports_missing() {
        let result = resolve_binary(Some(Path::new("/nonexistent/dir/piper")), &["piper"]);
        assert!(matches!(result, Err(ModelFault::Unavailable(_))));
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let mut cmd = Command::new("voicefall-definitely-not-installed");
        let result = run_engine("ghost", &mut cmd, Some("hello there."));
        assert!(matches!(result, Err(ModelFault::Unavailable(_))));
    }
}
