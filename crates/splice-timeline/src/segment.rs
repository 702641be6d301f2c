//! Keep segments and the cut operation.
//!
//! The edit decision is stored as the set of regions to KEEP. Cutting a range
//! is plain interval subtraction over that set.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use splice_core::TimeSpan;

/// A half-open global-time region whose content survives into the export.
pub type Segment = TimeSpan;

/// Where the player should go for a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// The position is inside a kept segment; keep playing.
    Inside,
    /// The position is in a cut gap; seek to this segment start.
    JumpTo(i64),
    /// No kept content follows the position.
    EndOfContent,
}

/// Subtract `cut` from `segment`, yielding zero, one or two pieces.
fn subtract_one(segment: Segment, cut: TimeSpan) -> SmallVec<[Segment; 2]> {
    let (s, e) = (segment.start_ms, segment.end_ms);
    let (a, b) = (cut.start_ms, cut.end_ms);

    if a <= s && b >= e {
        // Cut covers the whole segment.
        smallvec![]
    } else if !segment.overlaps(cut) {
        smallvec![segment]
    } else if a <= s {
        // Prefix removed: s < b < e.
        smallvec![Segment::new(b, e)]
    } else if b >= e {
        // Suffix removed: s < a < e.
        smallvec![Segment::new(s, a)]
    } else {
        smallvec![Segment::new(s, a), Segment::new(b, e)]
    }
}

/// Sorted, pairwise non-overlapping keep segments.
///
/// Adjacent segments are not merged; a segment boundary at a clip boundary
/// stays visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSet {
    segments: Vec<Segment>,
}

impl SegmentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary spans. Empty spans are dropped and overlaps
    /// are resolved in favour of the earlier span in `spans`.
    pub fn from_spans(spans: impl IntoIterator<Item = TimeSpan>) -> Self {
        let mut set = Self::new();
        for span in spans {
            set.insert(span);
        }
        set
    }

    /// Add a span to the keep-set in sorted position.
    ///
    /// Only the parts of `span` not already kept are added, so the set never
    /// gains an overlap.
    pub fn insert(&mut self, span: TimeSpan) {
        if span.is_empty() {
            return;
        }
        let mut pieces: SmallVec<[Segment; 2]> = smallvec![span];
        for existing in &self.segments {
            pieces = pieces
                .into_iter()
                .flat_map(|piece| subtract_one(piece, *existing))
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.segments.extend(pieces);
        self.segments.sort_by_key(|s| s.start_ms);
    }

    /// Return a new set with `cut` removed.
    pub fn subtract(&self, cut: TimeSpan) -> SegmentSet {
        if cut.is_empty() {
            return self.clone();
        }
        let mut segments: Vec<Segment> = self
            .segments
            .iter()
            .flat_map(|segment| subtract_one(*segment, cut))
            .collect();
        segments.sort_by_key(|s| s.start_ms);
        SegmentSet { segments }
    }

    /// Remove `[sel_start, sel_end)` from the keep-set.
    ///
    /// A no-op when `sel_start >= sel_end`. Returns whether the set changed.
    pub fn apply_cut(&mut self, sel_start: i64, sel_end: i64) -> bool {
        let Some(cut) = TimeSpan::try_new(sel_start, sel_end) else {
            return false;
        };
        let next = self.subtract(cut);
        let changed = next != *self;
        *self = next;
        changed
    }

    /// Check whether `position` lies in a kept segment.
    pub fn contains(&self, position: i64) -> bool {
        self.segments.iter().any(|s| s.contains(position))
    }

    /// Decide where playback should continue from `position`.
    pub fn gap_jump(&self, position: i64) -> PlaybackTarget {
        if self.contains(position) {
            return PlaybackTarget::Inside;
        }
        self.segments
            .iter()
            .find(|s| s.start_ms > position)
            .map_or(PlaybackTarget::EndOfContent, |s| {
                PlaybackTarget::JumpTo(s.start_ms)
            })
    }

    /// Total kept time in milliseconds.
    pub fn kept_duration_ms(&self) -> i64 {
        self.segments.iter().map(|s| s.duration_ms()).sum()
    }

    /// Iterate segments in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Segments in ascending order.
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if nothing is kept.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drop every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

impl<'a> IntoIterator for &'a SegmentSet {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
