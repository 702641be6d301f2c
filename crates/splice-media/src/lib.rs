//! Splice Media - FFmpeg integration for export
//!
//! This crate handles:
//! - Media file probing (duration and frame size)
//! - Locating the encoder binary
//! - Compiling an edit decision into an FFmpeg command
//! - Running that command with cancellation

pub mod codec;
pub mod error;
pub mod export;
pub mod locate;
pub mod probe;
pub mod runner;

pub use codec::{AudioCodec, CodecProfile, Container, EncoderPreference, VideoCodec};
pub use error::{ErrorKind, ExportError, ExportResult};
pub use export::{AudioSource, ExportCompiler, ExportPlan, ExportSettings, PlanInput, Stage, TrimUnit};
pub use locate::locate_encoder;
pub use probe::MediaProbe;
pub use runner::{ExportCancel, ExportHandle, ExportRunner};
