//! Locating the FFmpeg executable.

use std::path::PathBuf;
use tracing::{debug, warn};

/// Candidate file names for an FFmpeg binary in the working directory.
const LOCAL_NAMES: &[&str] = &["ffmpeg", "ffmpeg.exe"];

/// Find an FFmpeg executable.
///
/// Search order: `PATH`, the current working directory, then the binary
/// managed by ffmpeg-sidecar.
pub fn locate_encoder() -> Option<PathBuf> {
    if let Ok(path) = which::which("ffmpeg") {
        debug!("Found ffmpeg on PATH: {}", path.display());
        return Some(path);
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = LOCAL_NAMES
            .iter()
            .map(|name| cwd.join(name))
            .find(|path| path.is_file())
        {
            debug!("Found ffmpeg in working directory: {}", path.display());
            return Some(path);
        }
    }

    if ffmpeg_sidecar::command::ffmpeg_is_installed() {
        let path = ffmpeg_sidecar::paths::ffmpeg_path();
        debug!("Using sidecar ffmpeg: {}", path.display());
        return Some(path);
    }

    warn!("No ffmpeg executable found");
    None
}

/// Find an ffprobe executable, falling back to the sidecar location.
pub fn locate_probe() -> PathBuf {
    which::which("ffprobe").unwrap_or_else(|_| ffmpeg_sidecar::ffprobe::ffprobe_path())
}
