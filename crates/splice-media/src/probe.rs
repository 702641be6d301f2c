//! Media file probing to get metadata without full decode.

use serde::{Deserialize, Serialize};
use splice_core::{Result, SpliceError};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::locate::locate_probe;

/// Information about a media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// File path
    pub path: PathBuf,
    /// Container duration in milliseconds
    pub duration_ms: i64,
    /// Primary video stream width
    pub width: u32,
    /// Primary video stream height
    pub height: u32,
    /// Whether any audio stream is present
    pub has_audio: bool,
}

// ffprobe `-of json` output, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl MediaProbe {
    /// Probe a media file with ffprobe.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SpliceError::NotFound(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let output = Command::new(locate_probe())
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration:stream=codec_type,width,height",
                "-of",
                "json",
            ])
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(SpliceError::Media(format!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let probe = Self::from_json(path, &output.stdout)?;
        debug!(
            "Probed {}: {}ms, {}x{}",
            path.display(),
            probe.duration_ms,
            probe.width,
            probe.height
        );
        Ok(probe)
    }

    /// Parse ffprobe JSON output for `path`.
    pub fn from_json(path: &Path, data: &[u8]) -> Result<Self> {
        let parsed: ProbeOutput = serde_json::from_slice(data)
            .map_err(|e| SpliceError::Media(format!("Invalid ffprobe output: {e}")))?;

        let seconds: f64 = parsed
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.trim().parse().ok())
            .ok_or_else(|| {
                SpliceError::Media(format!("No duration reported for {}", path.display()))
            })?;
        if !seconds.is_finite() || seconds < 0.0 || seconds * 1000.0 >= i64::MAX as f64 {
            return Err(SpliceError::Media(format!(
                "Unusable duration {seconds} for {}",
                path.display()
            )));
        }

        let video = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                SpliceError::Media(format!("No video stream in {}", path.display()))
            })?;

        let has_audio = parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        Ok(Self {
            path: path.to_path_buf(),
            duration_ms: (seconds * 1000.0).round() as i64,
            width: video.width.unwrap_or(0),
            height: video.height.unwrap_or(0),
            has_audio,
        })
    }
}
