//! Export compilation: turns kept segments into an FFmpeg filter graph.
//!
//! Every kept segment is intersected with every clip to produce trim units.
//! Each unit is trimmed, rebased to zero and letterboxed to the target size,
//! then all units are concatenated into one video (and, unless an external
//! track replaces it, one audio) stream.

use serde::{Deserialize, Serialize};
use splice_core::FrameRate;
use splice_timeline::{EditSession, SegmentSet, Timeline};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::codec::{CodecProfile, Container, EncoderPreference};
use crate::error::{ExportError, ExportResult};
use crate::locate::locate_encoder;

/// Lowest selectable bitrate in Mbps.
pub const MIN_BITRATE_MBPS: u32 = 5;
/// Highest selectable bitrate in Mbps.
pub const MAX_BITRATE_MBPS: u32 = 60;
/// Bitrate selection granularity in Mbps.
pub const BITRATE_STEP_MBPS: u32 = 5;

const VIDEO_OUT: &str = "vout";
const AUDIO_OUT: &str = "aout";

// Format of the silence generated for clips without an audio stream.
const SILENCE_LAYOUT: &str = "stereo";
const SILENCE_SAMPLE_RATE: u32 = 48_000;

// ── Settings ────────────────────────────────────────────────────

/// One export request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output file path.
    pub output_path: PathBuf,
    /// Output container.
    pub container: Container,
    /// Target video bitrate in Mbps.
    pub bitrate_mbps: u32,
    /// Output frame width.
    pub width: u32,
    /// Output frame height.
    pub height: u32,
    /// Output frame rate.
    pub frame_rate: FrameRate,
    /// Replaces all original audio when set.
    pub external_audio: Option<PathBuf>,
    /// Use a hardware encoder where the container offers one.
    pub encoder_preference: EncoderPreference,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.mp4"),
            container: Container::Mp4,
            bitrate_mbps: 25,
            width: 1920,
            height: 1080,
            frame_rate: FrameRate::FPS_30,
            external_audio: None,
            encoder_preference: EncoderPreference::Software,
        }
    }
}

impl ExportSettings {
    /// Settings for `output_path`, with the container taken from its extension.
    pub fn new(output_path: impl Into<PathBuf>) -> ExportResult<Self> {
        let output_path = output_path.into();
        let container = Container::from_path(&output_path)?;
        Ok(Self {
            output_path,
            container,
            ..Self::default()
        })
    }

    pub fn with_bitrate(mut self, bitrate_mbps: u32) -> Self {
        self.bitrate_mbps = bitrate_mbps;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_external_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.external_audio = Some(path.into());
        self
    }

    pub fn with_encoder_preference(mut self, preference: EncoderPreference) -> Self {
        self.encoder_preference = preference;
        self
    }

    /// Clamp a bitrate into the selectable range and snap it to the step.
    pub fn snap_bitrate(mbps: u32) -> u32 {
        let clamped = mbps.clamp(MIN_BITRATE_MBPS, MAX_BITRATE_MBPS);
        (clamped + BITRATE_STEP_MBPS / 2) / BITRATE_STEP_MBPS * BITRATE_STEP_MBPS
    }

    /// Reject settings that cannot produce a working command.
    pub fn validate(&self) -> ExportResult<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(ExportError::InvalidSettings("output path is empty".into()));
        }
        if !(MIN_BITRATE_MBPS..=MAX_BITRATE_MBPS).contains(&self.bitrate_mbps) {
            return Err(ExportError::InvalidSettings(format!(
                "bitrate {}M is outside {MIN_BITRATE_MBPS}M..={MAX_BITRATE_MBPS}M",
                self.bitrate_mbps
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::InvalidSettings(format!(
                "resolution {}x{} has a zero dimension",
                self.width, self.height
            )));
        }
        // 4:2:0 chroma subsampling needs even frame dimensions.
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ExportError::InvalidSettings(format!(
                "resolution {}x{} must have even dimensions",
                self.width, self.height
            )));
        }
        if !self.frame_rate.is_valid() {
            return Err(ExportError::InvalidSettings(format!(
                "frame rate {}/{} is invalid",
                self.frame_rate.numerator, self.frame_rate.denominator
            )));
        }
        Ok(())
    }
}

// ── Plan ────────────────────────────────────────────────────────

/// One kept segment's overlap with one clip, in that clip's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimUnit {
    pub clip_index: usize,
    pub local_start_ms: i64,
    pub local_end_ms: i64,
}

impl TrimUnit {
    pub fn start_seconds(&self) -> f64 {
        splice_core::ms_to_seconds(self.local_start_ms)
    }

    pub fn end_seconds(&self) -> f64 {
        splice_core::ms_to_seconds(self.local_end_ms)
    }

    pub fn duration_ms(&self) -> i64 {
        self.local_end_ms - self.local_start_ms
    }
}

/// Why an input is on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputRole {
    Clip(usize),
    ExternalAudio,
}

/// A `-i` input, in command-line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanInput {
    pub path: PathBuf,
    pub role: InputRole,
}

/// Where the final audio stream comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AudioSource {
    /// Concatenated per-unit audio trims.
    Concat { pad: String },
    /// An external file's audio, cut to the video length.
    External { input: usize, path: PathBuf },
}

impl AudioSource {
    /// The `-map` argument selecting this source.
    pub fn map_arg(&self) -> String {
        match self {
            Self::Concat { pad } => format!("[{pad}]"),
            Self::External { input, .. } => format!("{input}:a"),
        }
    }
}

/// One processing step of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Cut `[start_ms, end_ms)` from an input's video and rebase timestamps.
    TrimVideo {
        input: usize,
        start_ms: i64,
        end_ms: i64,
        output: String,
    },
    /// Fit a pad into `width`x`height`, letterboxing as needed.
    Scale {
        input: String,
        width: u32,
        height: u32,
        output: String,
    },
    /// Cut `[start_ms, end_ms)` from an input's audio and rebase timestamps.
    TrimAudio {
        input: usize,
        start_ms: i64,
        end_ms: i64,
        output: String,
    },
    /// Generate `duration_ms` of silence for a unit whose clip has no audio.
    SilentAudio { duration_ms: i64, output: String },
    ConcatVideo { inputs: Vec<String>, output: String },
    ConcatAudio { inputs: Vec<String>, output: String },
    /// Select the final streams for the output file.
    MapOutput { video: String, audio: AudioSource },
}

impl Stage {
    /// Filter-graph chain for this stage; `None` for stages outside the graph.
    pub fn filter(&self) -> Option<String> {
        match self {
            Self::TrimVideo {
                input,
                start_ms,
                end_ms,
                output,
            } => Some(format!(
                "[{input}:v]trim=start={}:end={},setpts=PTS-STARTPTS[{output}]",
                seconds_arg(*start_ms),
                seconds_arg(*end_ms)
            )),
            Self::Scale {
                input,
                width,
                height,
                output,
            } => Some(format!(
                "[{input}]scale={width}:{height}:force_original_aspect_ratio=decrease,\
                 pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1[{output}]"
            )),
            Self::TrimAudio {
                input,
                start_ms,
                end_ms,
                output,
            } => Some(format!(
                "[{input}:a]atrim=start={}:end={},asetpts=PTS-STARTPTS[{output}]",
                seconds_arg(*start_ms),
                seconds_arg(*end_ms)
            )),
            Self::SilentAudio {
                duration_ms,
                output,
            } => Some(format!(
                "anullsrc=channel_layout={SILENCE_LAYOUT}:sample_rate={SILENCE_SAMPLE_RATE},\
                 atrim=duration={}[{output}]",
                seconds_arg(*duration_ms)
            )),
            Self::ConcatVideo { inputs, output } => Some(format!(
                "{}concat=n={}:v=1:a=0[{output}]",
                pads(inputs),
                inputs.len()
            )),
            Self::ConcatAudio { inputs, output } => Some(format!(
                "{}concat=n={}:v=0:a=1[{output}]",
                pads(inputs),
                inputs.len()
            )),
            Self::MapOutput { .. } => None,
        }
    }
}

/// Render milliseconds as exact decimal seconds (`12.345`).
fn seconds_arg(ms: i64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

fn pads(labels: &[String]) -> String {
    labels.iter().map(|l| format!("[{l}]")).collect()
}

/// A fully resolved export: inputs, filter stages and encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPlan {
    /// Encoder executable.
    pub program: PathBuf,
    pub inputs: Vec<PlanInput>,
    pub trims: Vec<TrimUnit>,
    pub stages: Vec<Stage>,
    pub codec: CodecProfile,
    pub bitrate_mbps: u32,
    pub frame_rate: FrameRate,
    pub output_path: PathBuf,
}

impl ExportPlan {
    /// The `-filter_complex` expression.
    pub fn filter_graph(&self) -> String {
        self.stages
            .iter()
            .filter_map(Stage::filter)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// The final audio source.
    pub fn audio_source(&self) -> Option<&AudioSource> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::MapOutput { audio, .. } => Some(audio),
            _ => None,
        })
    }

    /// The final video pad label.
    pub fn video_output(&self) -> Option<&str> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::MapOutput { video, .. } => Some(video.as_str()),
            _ => None,
        })
    }

    pub fn uses_external_audio(&self) -> bool {
        matches!(self.audio_source(), Some(AudioSource::External { .. }))
    }

    pub fn video_trim_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| matches!(s, Stage::TrimVideo { .. }))
            .count()
    }

    pub fn audio_trim_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| matches!(s, Stage::TrimAudio { .. }))
            .count()
    }

    pub fn silent_audio_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| matches!(s, Stage::SilentAudio { .. }))
            .count()
    }

    /// Length of the exported video in milliseconds.
    pub fn output_duration_ms(&self) -> i64 {
        self.trims.iter().map(TrimUnit::duration_ms).sum()
    }

    /// FFmpeg arguments (without the program name).
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into()];

        for input in &self.inputs {
            args.extend_from_slice(&["-i".into(), input.path.to_string_lossy().into_owned()]);
        }

        args.extend_from_slice(&["-filter_complex".into(), self.filter_graph()]);

        if let Some(video) = self.video_output() {
            args.extend_from_slice(&["-map".into(), format!("[{video}]")]);
        }
        if let Some(audio) = self.audio_source() {
            args.extend_from_slice(&["-map".into(), audio.map_arg()]);
        }
        if self.uses_external_audio() {
            // Cut the external track to the video length.
            args.push("-shortest".into());
        }

        args.extend(self.codec.ffmpeg_args(self.bitrate_mbps));
        args.extend_from_slice(&["-r".into(), self.frame_rate.to_ffmpeg_arg()]);
        args.push(self.output_path.to_string_lossy().into_owned());

        args
    }

    /// Program followed by its arguments.
    pub fn command(&self) -> Vec<String> {
        let mut command = vec![self.program.to_string_lossy().into_owned()];
        command.extend(self.to_args());
        command
    }

    /// Pretty JSON dump of the plan.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ── Compiler ────────────────────────────────────────────────────

/// Intersect every kept segment with every clip, in timeline order.
///
/// Segments form the outer loop so that a segment spanning several clips
/// yields its units in playback order.
pub fn trim_units(timeline: &Timeline, segments: &SegmentSet) -> Vec<TrimUnit> {
    let mut units = Vec::new();
    for segment in segments {
        for (clip_index, clip) in timeline.clips().iter().enumerate() {
            if let Some(overlap) = segment.intersection(clip.span()) {
                units.push(TrimUnit {
                    clip_index,
                    local_start_ms: clip.to_local(overlap.start_ms),
                    local_end_ms: clip.to_local(overlap.end_ms),
                });
            }
        }
    }
    units
}

/// Builds [`ExportPlan`]s for a located encoder.
#[derive(Debug, Clone, Default)]
pub struct ExportCompiler {
    encoder: Option<PathBuf>,
}

impl ExportCompiler {
    /// Compiler using whatever encoder [`locate_encoder`] finds.
    pub fn detect() -> Self {
        Self {
            encoder: locate_encoder(),
        }
    }

    /// Compiler using an explicit encoder path.
    pub fn with_encoder(path: impl Into<PathBuf>) -> Self {
        Self {
            encoder: Some(path.into()),
        }
    }

    pub fn encoder(&self) -> Option<&Path> {
        self.encoder.as_deref()
    }

    pub fn set_encoder(&mut self, path: impl Into<PathBuf>) {
        self.encoder = Some(path.into());
    }

    /// Compile a session's current edit.
    pub fn compile_session(
        &self,
        session: &EditSession,
        settings: &ExportSettings,
    ) -> ExportResult<ExportPlan> {
        self.compile(session.timeline(), session.segments(), settings)
    }

    /// Compile the kept segments of `timeline` into an export plan.
    ///
    /// All validation happens here, before anything is spawned.
    pub fn compile(
        &self,
        timeline: &Timeline,
        segments: &SegmentSet,
        settings: &ExportSettings,
    ) -> ExportResult<ExportPlan> {
        let program = self.encoder.clone().ok_or(ExportError::NoEncoderFound)?;
        if timeline.is_empty() {
            return Err(ExportError::EmptyPlaylist);
        }
        if segments.is_empty() {
            return Err(ExportError::EmptySegments);
        }
        settings.validate()?;

        for clip in timeline.clips() {
            require_file(clip.path())?;
        }
        if let Some(audio) = &settings.external_audio {
            require_file(audio)?;
        }

        let trims = trim_units(timeline, segments);
        if trims.is_empty() {
            return Err(ExportError::NoExportableContent);
        }

        let mut inputs: Vec<PlanInput> = timeline
            .clips()
            .iter()
            .enumerate()
            .map(|(index, clip)| PlanInput {
                path: clip.path().to_path_buf(),
                role: InputRole::Clip(index),
            })
            .collect();

        let external_audio = settings.external_audio.as_ref().map(|path| {
            inputs.push(PlanInput {
                path: path.clone(),
                role: InputRole::ExternalAudio,
            });
            AudioSource::External {
                input: inputs.len() - 1,
                path: path.clone(),
            }
        });

        let mut stages = Vec::new();
        let mut video_pads = Vec::with_capacity(trims.len());
        let mut audio_pads = Vec::with_capacity(trims.len());

        for (i, unit) in trims.iter().enumerate() {
            let trimmed = format!("vt{i}");
            let scaled = format!("v{i}");
            stages.push(Stage::TrimVideo {
                input: unit.clip_index,
                start_ms: unit.local_start_ms,
                end_ms: unit.local_end_ms,
                output: trimmed.clone(),
            });
            stages.push(Stage::Scale {
                input: trimmed,
                width: settings.width,
                height: settings.height,
                output: scaled.clone(),
            });
            video_pads.push(scaled);

            if external_audio.is_none() {
                let audio = format!("a{i}");
                if timeline.clips()[unit.clip_index].has_audio() {
                    stages.push(Stage::TrimAudio {
                        input: unit.clip_index,
                        start_ms: unit.local_start_ms,
                        end_ms: unit.local_end_ms,
                        output: audio.clone(),
                    });
                } else {
                    // Referencing `[i:a]` on a silent input would fail in the encoder.
                    stages.push(Stage::SilentAudio {
                        duration_ms: unit.duration_ms(),
                        output: audio.clone(),
                    });
                }
                audio_pads.push(audio);
            }
        }

        stages.push(Stage::ConcatVideo {
            inputs: video_pads,
            output: VIDEO_OUT.into(),
        });

        let audio = match external_audio {
            Some(source) => source,
            None => {
                stages.push(Stage::ConcatAudio {
                    inputs: audio_pads,
                    output: AUDIO_OUT.into(),
                });
                AudioSource::Concat {
                    pad: AUDIO_OUT.into(),
                }
            }
        };

        stages.push(Stage::MapOutput {
            video: VIDEO_OUT.into(),
            audio,
        });

        let plan = ExportPlan {
            program,
            inputs,
            trims,
            stages,
            codec: CodecProfile::select(settings.container, settings.encoder_preference),
            bitrate_mbps: settings.bitrate_mbps,
            frame_rate: settings.frame_rate,
            output_path: settings.output_path.clone(),
        };

        info!(
            "Compiled export to {}: {} trim units, {}ms, {} via {}",
            plan.output_path.display(),
            plan.trims.len(),
            plan.output_duration_ms(),
            settings.container,
            plan.codec.video.ffmpeg_encoder()
        );
        debug!("Filter graph: {}", plan.filter_graph());

        Ok(plan)
    }
}

fn require_file(path: &Path) -> ExportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ExportError::SourceFileMissing(path.to_path_buf()))
    }
}
