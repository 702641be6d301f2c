//! Source clips placed on the global timeline.

use serde::{Deserialize, Serialize};
use splice_core::TimeSpan;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A probed source file laid out on the global timeline.
///
/// Global positions are assigned by [`Timeline::add_clip`](crate::Timeline::add_clip)
/// and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceClip {
    id: Uuid,
    path: PathBuf,
    duration_ms: i64,
    width: u32,
    height: u32,
    has_audio: bool,
    global_start_ms: i64,
    global_end_ms: i64,
}

impl SourceClip {
    pub(crate) fn new(
        path: PathBuf,
        duration_ms: i64,
        width: u32,
        height: u32,
        has_audio: bool,
        span: TimeSpan,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            duration_ms,
            width,
            height,
            has_audio,
            global_start_ms: span.start_ms,
            global_end_ms: span.end_ms,
        }
    }

    /// Unique clip ID.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Path to the media file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Probed duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// Probed frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Probed frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the file carries an audio stream.
    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    /// Position of the first frame on the global timeline.
    pub fn global_start_ms(&self) -> i64 {
        self.global_start_ms
    }

    /// Global position just past the last frame.
    pub fn global_end_ms(&self) -> i64 {
        self.global_end_ms
    }

    /// The clip's span on the global timeline.
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.global_start_ms, self.global_end_ms)
    }

    /// Convert a global position to this clip's local time.
    pub fn to_local(&self, global_ms: i64) -> i64 {
        global_ms - self.global_start_ms
    }
}
