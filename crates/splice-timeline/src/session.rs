//! Edit session: the timeline, its keep-set and the selection, edited together.

use serde::{Deserialize, Serialize};
use splice_core::Result;
use std::path::PathBuf;
use tracing::info;

use crate::clip::SourceClip;
use crate::segment::{PlaybackTarget, SegmentSet};
use crate::selection::Selection;
use crate::timeline::Timeline;

/// Single-writer editing state for one export.
///
/// Readers should clone what they need; any cut or append may reshape the
/// segment set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditSession {
    timeline: Timeline,
    segments: SegmentSet,
    selection: Selection,
}

impl EditSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clip with audio and keep its whole span.
    pub fn add_clip(
        &mut self,
        path: impl Into<PathBuf>,
        duration_ms: i64,
        width: u32,
        height: u32,
    ) -> Result<&SourceClip> {
        self.add_probed_clip(path, duration_ms, width, height, true)
    }

    /// Append a clip, recording whether it carries audio, and keep its whole span.
    pub fn add_probed_clip(
        &mut self,
        path: impl Into<PathBuf>,
        duration_ms: i64,
        width: u32,
        height: u32,
        has_audio: bool,
    ) -> Result<&SourceClip> {
        let span = self
            .timeline
            .add_probed_clip(path, duration_ms, width, height, has_audio)?
            .span();
        self.segments.insert(span);
        // `add_probed_clip` succeeded, so the registry is non-empty.
        Ok(&self.timeline.clips()[self.timeline.len() - 1])
    }

    /// Set the in marker.
    pub fn set_in(&mut self, position: i64) {
        let total = self.timeline.total_duration_ms();
        self.selection.set_in(position, total);
    }

    /// Set the out marker.
    pub fn set_out(&mut self, position: i64) {
        self.selection.set_out(position);
    }

    /// Select the whole timeline.
    pub fn reset_selection(&mut self) {
        self.selection = Selection::full(self.timeline.total_duration_ms());
    }

    /// Cut the current selection out of the keep-set.
    ///
    /// The selection is cleared afterwards even if nothing was removed.
    pub fn apply_cut(&mut self) -> bool {
        let Selection { in_ms, out_ms } = self.selection;
        let changed = self.segments.apply_cut(in_ms, out_ms);
        if changed {
            info!(
                "Cut [{in_ms}ms, {out_ms}ms): {} segments, {}ms kept",
                self.segments.len(),
                self.segments.kept_duration_ms()
            );
        }
        self.selection.clear();
        changed
    }

    /// Select `[start_ms, end_ms)` and cut it.
    pub fn cut(&mut self, start_ms: i64, end_ms: i64) -> bool {
        self.selection = Selection {
            in_ms: start_ms,
            out_ms: end_ms,
        };
        self.apply_cut()
    }

    /// Drop all clips, segments and markers.
    pub fn clear(&mut self) {
        self.timeline.clear();
        self.segments.clear();
        self.selection.clear();
    }

    /// Clip and local offset at a global position.
    pub fn locate(&self, global_ms: i64) -> Option<(&SourceClip, i64)> {
        self.timeline.locate(global_ms)
    }

    /// Where the player should continue from `position`.
    pub fn gap_jump(&self, position: i64) -> PlaybackTarget {
        self.segments.gap_jump(position)
    }

    /// Total kept time in milliseconds.
    pub fn kept_duration_ms(&self) -> i64 {
        self.segments.kept_duration_ms()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn segments(&self) -> &SegmentSet {
        &self.segments
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }
}
