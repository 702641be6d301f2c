//! The clip registry: an ordered, gapless sequence of source clips.

use serde::{Deserialize, Serialize};
use splice_core::{Result, SpliceError, TimeSpan};
use std::path::PathBuf;
use tracing::debug;

use crate::clip::SourceClip;

/// Source clips concatenated end-to-end into one global timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    clips: Vec<SourceClip>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clip with an audio stream to the end of the timeline.
    ///
    /// The new clip starts where the previous last clip ends (or at 0).
    pub fn add_clip(
        &mut self,
        path: impl Into<PathBuf>,
        duration_ms: i64,
        width: u32,
        height: u32,
    ) -> Result<&SourceClip> {
        self.add_probed_clip(path, duration_ms, width, height, true)
    }

    /// Append a clip, recording whether it carries audio.
    pub fn add_probed_clip(
        &mut self,
        path: impl Into<PathBuf>,
        duration_ms: i64,
        width: u32,
        height: u32,
        has_audio: bool,
    ) -> Result<&SourceClip> {
        let path = path.into();
        if duration_ms <= 0 {
            return Err(SpliceError::InvalidParameter(format!(
                "clip {} has non-positive duration {duration_ms}ms",
                path.display()
            )));
        }

        let global_start = self.total_duration_ms();
        let global_end = global_start.checked_add(duration_ms).ok_or_else(|| {
            SpliceError::InvalidParameter(format!(
                "clip {} ({duration_ms}ms) overflows the timeline at {global_start}ms",
                path.display()
            ))
        })?;

        let span = TimeSpan::new(global_start, global_end);
        let clip = SourceClip::new(path, duration_ms, width, height, has_audio, span);
        debug!(
            "Appended clip {} at {}{}",
            clip.path().display(),
            span,
            if has_audio { "" } else { " (no audio)" }
        );
        self.clips.push(clip);
        Ok(&self.clips[self.clips.len() - 1])
    }

    /// Total duration in milliseconds (0 when empty).
    pub fn total_duration_ms(&self) -> i64 {
        self.clips.last().map_or(0, SourceClip::global_end_ms)
    }

    /// Find the clip containing `global_ms` and the local offset into it.
    ///
    /// Returns `None` past the end of the timeline (or before its start).
    pub fn locate(&self, global_ms: i64) -> Option<(&SourceClip, i64)> {
        self.to_local(global_ms)
            .map(|(index, local_ms)| (&self.clips[index], local_ms))
    }

    /// Like [`locate`](Self::locate), but returns the clip index.
    pub fn to_local(&self, global_ms: i64) -> Option<(usize, i64)> {
        if global_ms < 0 || global_ms >= self.total_duration_ms() {
            return None;
        }
        // Ends are strictly increasing, so the first clip ending after
        // `global_ms` is the one containing it.
        let index = self
            .clips
            .partition_point(|clip| clip.global_end_ms() <= global_ms);
        let clip = self.clips.get(index)?;
        clip.span()
            .contains(global_ms)
            .then(|| (index, clip.to_local(global_ms)))
    }

    /// Map a local offset in clip `index` back to global time.
    pub fn to_global(&self, index: usize, local_ms: i64) -> Option<i64> {
        let clip = self.clips.get(index)?;
        (0..clip.duration_ms())
            .contains(&local_ms)
            .then(|| clip.global_start_ms() + local_ms)
    }

    /// The clip following `clip`, if any.
    pub fn next_clip(&self, clip: &SourceClip) -> Option<&SourceClip> {
        let index = self.index_of(clip)?;
        self.clips.get(index + 1)
    }

    /// Position of `clip` in playlist order.
    pub fn index_of(&self, clip: &SourceClip) -> Option<usize> {
        self.clips.iter().position(|c| c.id() == clip.id())
    }

    /// Remove every clip.
    pub fn clear(&mut self) {
        self.clips.clear();
    }

    /// All clips in playlist order.
    pub fn clips(&self) -> &[SourceClip] {
        &self.clips
    }

    /// Get the clip at `index`.
    pub fn get(&self, index: usize) -> Option<&SourceClip> {
        self.clips.get(index)
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// True if no clips have been added.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
