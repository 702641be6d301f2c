//! Container and codec selection.
//!
//! Every `(Container, EncoderPreference)` pair maps to exactly one
//! [`CodecProfile`]; the mapping is a single exhaustive `match`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{ExportError, ExportResult};

/// Headroom above the target bitrate allowed by `-maxrate`.
pub const MAXRATE_HEADROOM_MBPS: u32 = 5;

/// Quality floor for constrained-quality VP9.
pub const VP9_CRF: u32 = 30;

/// libvpx speed setting used with the realtime deadline.
pub const VP9_CPU_USED: u32 = 4;

// ── Containers ──────────────────────────────────────────────────

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    Mp4,
    Mkv,
    Webm,
}

impl Container {
    /// Every supported container.
    pub const ALL: [Container; 3] = [Container::Mp4, Container::Mkv, Container::Webm];

    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Webm => "webm",
        }
    }

    /// Parse an extension, with or without a leading dot, ignoring case.
    pub fn from_extension(ext: &str) -> ExportResult<Self> {
        let ext = ext.trim_start_matches('.');
        match ext.to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "mkv" => Ok(Self::Mkv),
            "webm" => Ok(Self::Webm),
            _ => Err(ExportError::UnsupportedContainer(ext.to_string())),
        }
    }

    /// Infer the container from an output path's extension.
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether to use a hardware encoder when the container offers one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncoderPreference {
    #[default]
    Software,
    Hardware,
}

impl EncoderPreference {
    pub const ALL: [EncoderPreference; 2] = [EncoderPreference::Software, EncoderPreference::Hardware];
}

// ── Codecs ──────────────────────────────────────────────────────

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodec {
    H264,
    H264Nvenc,
    HevcNvenc,
    Vp9,
}

impl VideoCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H264Nvenc => "h264_nvenc",
            Self::HevcNvenc => "hevc_nvenc",
            Self::Vp9 => "libvpx-vp9",
        }
    }

    /// True for GPU encoders.
    pub fn is_hardware(self) -> bool {
        matches!(self, Self::H264Nvenc | Self::HevcNvenc)
    }
}

/// Audio codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCodec {
    Aac,
    Opus,
}

impl AudioCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Opus => "libopus",
        }
    }
}

/// Encoder tuning beyond the shared bitrate controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tuning {
    /// Constrained quality: CRF floor with the fastest deadline.
    ConstrainedQuality {
        crf: u32,
        deadline: &'static str,
        cpu_used: u32,
    },
    /// Named speed preset, optionally pinning the pixel format.
    Preset {
        preset: &'static str,
        pixel_format: Option<&'static str>,
    },
}

/// Codec pairing and encoder flags for one container/preference choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodecProfile {
    pub video: VideoCodec,
    pub audio: AudioCodec,
    pub tuning: Tuning,
}

impl CodecProfile {
    /// Select the profile for a container and encoder preference.
    pub fn select(container: Container, preference: EncoderPreference) -> Self {
        use Container::*;
        use EncoderPreference::*;

        const VP9_CQ: CodecProfile = CodecProfile {
            video: VideoCodec::Vp9,
            audio: AudioCodec::Opus,
            tuning: Tuning::ConstrainedQuality {
                crf: VP9_CRF,
                deadline: "realtime",
                cpu_used: VP9_CPU_USED,
            },
        };

        match (container, preference) {
            // WebM has no accelerated path.
            (Mkv, Software) | (Webm, Software) | (Webm, Hardware) => VP9_CQ,
            (Mkv, Hardware) => CodecProfile {
                video: VideoCodec::HevcNvenc,
                audio: AudioCodec::Opus,
                tuning: Tuning::Preset {
                    preset: "medium",
                    pixel_format: None,
                },
            },
            (Mp4, Software) => CodecProfile {
                video: VideoCodec::H264,
                audio: AudioCodec::Aac,
                tuning: Tuning::Preset {
                    preset: "medium",
                    pixel_format: Some("yuv420p"),
                },
            },
            (Mp4, Hardware) => CodecProfile {
                video: VideoCodec::H264Nvenc,
                audio: AudioCodec::Aac,
                tuning: Tuning::Preset {
                    preset: "medium",
                    pixel_format: Some("yuv420p"),
                },
            },
        }
    }

    /// Build the FFmpeg codec arguments for a target bitrate in Mbps.
    pub fn ffmpeg_args(&self, bitrate_mbps: u32) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-c:v".into(),
            self.video.ffmpeg_encoder().into(),
            "-b:v".into(),
            format!("{bitrate_mbps}M"),
            "-maxrate".into(),
            format!("{}M", bitrate_mbps.saturating_add(MAXRATE_HEADROOM_MBPS)),
            "-bufsize".into(),
            format!("{}M", bitrate_mbps.saturating_mul(2)),
        ];

        match self.tuning {
            Tuning::ConstrainedQuality {
                crf,
                deadline,
                cpu_used,
            } => {
                args.extend_from_slice(&[
                    "-crf".into(),
                    crf.to_string(),
                    "-deadline".into(),
                    deadline.into(),
                    "-cpu-used".into(),
                    cpu_used.to_string(),
                ]);
            }
            Tuning::Preset {
                preset,
                pixel_format,
            } => {
                args.extend_from_slice(&["-preset".into(), preset.into()]);
                if let Some(pix_fmt) = pixel_format {
                    args.extend_from_slice(&["-pix_fmt".into(), pix_fmt.into()]);
                }
            }
        }

        args.extend_from_slice(&["-c:a".into(), self.audio.ffmpeg_encoder().into()]);
        args
    }
}
