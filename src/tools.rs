//! Executable discovery helpers.
//!
//! Discovery is a convenience only: the probe layer passes whatever
//! executable the caller configured straight to the OS and reports a missing
//! one as a spawn error.

use std::path::{Path, PathBuf};

/// Locate `ffprobe` on `PATH`.
pub fn find_ffprobe() -> Option<PathBuf> {
    which::which(crate::probe::DEFAULT_EXECUTABLE).ok()
}

/// Run `<path> -version` and return the first line of stdout.
///
/// Best-effort: any failure (spawn, non-zero exit, empty output) yields
/// `None`.
pub async fn detect_version(path: &Path) -> Option<String> {
    let output = tokio::process::Command::new(path)
        .arg("-version")
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_does_not_panic_without_ffprobe() {
        // ffprobe may or may not be installed in CI; the call itself must
        // not panic.
        let _ = find_ffprobe();
    }

    #[tokio::test]
    async fn version_of_nonexistent_tool_is_none() {
        let version = detect_version(Path::new("/nonexistent/ffprobe-xyz")).await;
        assert!(version.is_none());
    }
}
