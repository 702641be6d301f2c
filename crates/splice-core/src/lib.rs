//! Splice Core - Foundation types shared by the editor crates
//!
//! This crate provides:
//! - Millisecond time spans on the global timeline
//! - Frame rates for the export target
//! - The common error type

pub mod error;
pub mod time;

pub use error::{Result, SpliceError};
pub use time::{format_clock, ms_to_seconds, FrameRate, TimeSpan};
