//! Time representation for the global timeline
//!
//! Timeline positions are integer milliseconds. Integer arithmetic keeps clip
//! boundaries exact, so `end(i) == start(i + 1)` holds without tolerance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convert milliseconds to seconds.
#[inline]
pub fn ms_to_seconds(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

/// Format milliseconds as `HH:MM:SS` (truncating sub-second precision).
pub fn format_clock(ms: i64) -> String {
    let ms = ms.max(0);
    let seconds = (ms / 1000) % 60;
    let minutes = (ms / 60_000) % 60;
    let hours = ms / 3_600_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// A half-open time span `[start_ms, end_ms)` in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Start time (inclusive)
    pub start_ms: i64,
    /// End time (exclusive)
    pub end_ms: i64,
}

impl TimeSpan {
    /// Create a span from start and end times.
    #[inline]
    pub const fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Create a span only if it has positive width.
    #[inline]
    pub fn try_new(start_ms: i64, end_ms: i64) -> Option<Self> {
        (start_ms < end_ms).then_some(Self { start_ms, end_ms })
    }

    /// Width of the span in milliseconds.
    #[inline]
    pub fn duration_ms(self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// True if the span has no positive width.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.start_ms >= self.end_ms
    }

    /// Check if a time is within this span.
    #[inline]
    pub fn contains(self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }

    /// Check if two spans overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    /// Compute the intersection of two spans, if non-empty.
    pub fn intersection(self, other: Self) -> Option<Self> {
        Self::try_new(
            self.start_ms.max(other.start_ms),
            self.end_ms.min(other.end_ms),
        )
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}ms, {}ms)", self.start_ms, self.end_ms)
    }
}

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// A rate with a zero term cannot drive an encoder.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Rendering accepted by ffmpeg's `-r` option.
    pub fn to_ffmpeg_arg(self) -> String {
        if self.denominator == 1 {
            self.numerator.to_string()
        } else {
            format!("{}/{}", self.numerator, self.denominator)
        }
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_59_94: Self = Self::new(60000, 1001);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}
