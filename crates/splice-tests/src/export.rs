//! Integration tests for the export pipeline.
//!
//! Builds sessions over real (empty) files and checks the compiled plans.

use splice_media::{
    AudioSource, Container, EncoderPreference, ErrorKind, ExportCompiler, ExportError,
    ExportSettings, Stage,
};
use splice_timeline::EditSession;
use std::fs::File;
use std::path::PathBuf;
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    fn session(&self, durations: &[i64]) -> EditSession {
        let mut session = EditSession::new();
        for (i, d) in durations.iter().enumerate() {
            let path = self.file(&format!("clip{i}.mp4"));
            session.add_clip(path, *d, 1920, 1080).unwrap();
        }
        session
    }

    fn settings(&self, name: &str) -> ExportSettings {
        ExportSettings::new(self.dir.path().join(name)).unwrap()
    }
}

fn compiler() -> ExportCompiler {
    ExportCompiler::with_encoder("/usr/bin/ffmpeg")
}

fn units(plan: &splice_media::ExportPlan) -> Vec<(usize, f64, f64)> {
    plan.trims
        .iter()
        .map(|u| (u.clip_index, u.start_seconds(), u.end_seconds()))
        .collect()
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn single_clip_without_cuts() {
    let ws = Workspace::new();
    let session = ws.session(&[10_000]);
    let plan = compiler()
        .compile_session(&session, &ws.settings("out.mp4"))
        .unwrap();

    assert_eq!(units(&plan), vec![(0, 0.0, 10.0)]);
    assert_eq!(plan.video_trim_count(), 1);
    assert_eq!(plan.audio_trim_count(), 1);

    let concat_inputs: Vec<usize> = plan
        .stages
        .iter()
        .filter_map(|s| match s {
            Stage::ConcatVideo { inputs, .. } | Stage::ConcatAudio { inputs, .. } => {
                Some(inputs.len())
            }
            _ => None,
        })
        .collect();
    assert_eq!(concat_inputs, vec![1, 1]);
}

#[test]
fn cut_across_two_clips() {
    let ws = Workspace::new();
    let mut session = ws.session(&[5_000, 5_000]);
    session.cut(2_000, 7_000);

    let kept: Vec<_> = session
        .segments()
        .iter()
        .map(|s| (s.start_ms, s.end_ms))
        .collect();
    assert_eq!(kept, vec![(0, 2_000), (7_000, 10_000)]);

    let plan = compiler()
        .compile_session(&session, &ws.settings("out.mkv"))
        .unwrap();
    assert_eq!(units(&plan), vec![(0, 0.0, 2.0), (1, 2.0, 5.0)]);
    assert_eq!(plan.output_duration_ms(), 5_000);

    let graph = plan.filter_graph();
    assert!(graph.contains("[0:v]trim=start=0.000:end=2.000"));
    assert!(graph.contains("[1:v]trim=start=2.000:end=5.000"));
    assert!(graph.contains("[1:a]atrim=start=2.000:end=5.000"));
}

#[test]
fn external_audio_replaces_clip_audio() {
    let ws = Workspace::new();
    let mut session = ws.session(&[5_000, 5_000]);
    session.cut(2_000, 7_000);
    let music = ws.file("music.mp3");

    let settings = ws.settings("out.webm").with_external_audio(&music);
    let plan = compiler().compile_session(&session, &settings).unwrap();

    assert_eq!(plan.audio_trim_count(), 0);
    assert!(!plan
        .stages
        .iter()
        .any(|s| matches!(s, Stage::ConcatAudio { .. })));
    assert_eq!(
        plan.audio_source(),
        Some(&AudioSource::External {
            input: 2,
            path: music.clone()
        })
    );

    let args = plan.to_args();
    assert_eq!(args.iter().filter(|a| *a == "-i").count(), 3);
    assert!(args.contains(&"2:a".to_string()));
    assert!(args.contains(&"-shortest".to_string()));
}

#[test]
fn compiling_twice_is_identical() {
    let ws = Workspace::new();
    let mut session = ws.session(&[3_000, 4_000, 5_000]);
    session.cut(1_000, 2_500);
    session.cut(6_000, 9_000);
    let settings = ws
        .settings("out.mp4")
        .with_encoder_preference(EncoderPreference::Hardware);

    let first = compiler().compile_session(&session, &settings).unwrap();
    let second = compiler().compile_session(&session, &settings).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.command(), second.command());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn every_container_and_preference_compiles() {
    let ws = Workspace::new();
    let session = ws.session(&[2_000]);

    for container in Container::ALL {
        for preference in EncoderPreference::ALL {
            let settings = ws
                .settings(&format!("out.{}", container.extension()))
                .with_encoder_preference(preference);
            let plan = compiler().compile_session(&session, &settings).unwrap();
            let args = plan.to_args();
            assert!(args.contains(&"-c:v".to_string()));
            assert!(args.contains(&"-c:a".to_string()));
        }
    }
}

#[test]
fn silent_screen_recording_is_padded_with_silence() {
    let ws = Workspace::new();
    let mut session = ws.session(&[5_000]);
    let screen = ws.file("screen.mp4");
    session
        .add_probed_clip(&screen, 5_000, 2560, 1440, false)
        .unwrap();
    session.cut(4_000, 6_000);

    let plan = compiler()
        .compile_session(&session, &ws.settings("out.mp4"))
        .unwrap();
    assert_eq!(units(&plan), vec![(0, 0.0, 4.0), (1, 1.0, 5.0)]);
    assert_eq!(plan.audio_trim_count(), 1);
    assert_eq!(plan.silent_audio_count(), 1);
    assert!(!plan.filter_graph().contains("[1:a]"));
}

// ── Failures ───────────────────────────────────────────────────

#[test]
fn out_of_range_bitrate_is_rejected_before_args() {
    let ws = Workspace::new();
    let session = ws.session(&[5_000]);
    let settings = ws.settings("out.mp4").with_bitrate(u32::MAX);

    let err = compiler().compile_session(&session, &settings).unwrap_err();
    assert!(matches!(err, ExportError::InvalidSettings(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn empty_segments_is_reported_specifically() {
    let ws = Workspace::new();
    let mut session = ws.session(&[5_000]);
    session.cut(0, 5_000);

    let err = compiler()
        .compile_session(&session, &ws.settings("out.mp4"))
        .unwrap_err();
    assert!(matches!(err, ExportError::EmptySegments));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn failed_compile_leaves_session_untouched() {
    let ws = Workspace::new();
    let mut session = ws.session(&[5_000]);
    session.cut(1_000, 2_000);
    let before = session.segments().clone();

    let missing = ws.dir.path().join("missing.wav");
    let settings = ws.settings("out.mp4").with_external_audio(&missing);
    let err = compiler().compile_session(&session, &settings).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingResource);
    assert!(err.to_string().contains("missing.wav"));
    assert_eq!(session.segments(), &before);
}

#[test]
fn unsupported_output_extension() {
    let err = ExportSettings::new("out.avi").unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedContainer(_)));
}
