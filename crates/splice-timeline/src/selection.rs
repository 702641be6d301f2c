//! In/out selection markers.

use serde::{Deserialize, Serialize};
use splice_core::TimeSpan;

/// The editor's active in/out markers in global milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub in_ms: i64,
    pub out_ms: i64,
}

impl Selection {
    /// Selection covering `[0, total_ms)`.
    pub fn full(total_ms: i64) -> Self {
        Self {
            in_ms: 0,
            out_ms: total_ms,
        }
    }

    /// Move the in marker. An in marker past the out marker pushes the out
    /// marker to `total_ms`.
    pub fn set_in(&mut self, position: i64, total_ms: i64) {
        self.in_ms = position;
        if self.in_ms > self.out_ms {
            self.out_ms = total_ms;
        }
    }

    /// Move the out marker. An out marker before the in marker pulls the in
    /// marker back to 0.
    pub fn set_out(&mut self, position: i64) {
        self.out_ms = position;
        if self.out_ms < self.in_ms {
            self.in_ms = 0;
        }
    }

    /// Back to `(0, 0)`.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The selected range, if it has positive width.
    pub fn span(&self) -> Option<TimeSpan> {
        TimeSpan::try_new(self.in_ms, self.out_ms)
    }
}
