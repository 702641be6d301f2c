//! Splice Timeline - Edit decision model
//!
//! Implements the editing state for a cut-list export:
//! - A gapless clip registry mapping global time to clip-local time
//! - The keep-segment set and its cut (interval subtraction) operation
//! - In/out selection markers
//! - An edit session that keeps all three consistent

pub mod clip;
pub mod segment;
pub mod selection;
pub mod session;
pub mod timeline;

pub use clip::SourceClip;
pub use segment::{PlaybackTarget, Segment, SegmentSet};
pub use selection::Selection;
pub use session::EditSession;
pub use timeline::Timeline;
