//! Integration tests for the editing flow.
//!
//! Exercises the session the way a player and editor use it together.

use splice_core::format_clock;
use splice_timeline::{EditSession, PlaybackTarget, Selection};

// ── Helpers ────────────────────────────────────────────────────

fn build_session() -> EditSession {
    let mut session = EditSession::new();
    session.add_clip("media/intro.mp4", 5_000, 1920, 1080).unwrap();
    session.add_clip("media/body.mkv", 30_000, 3840, 2160).unwrap();
    session.add_clip("media/outro.webm", 10_000, 1280, 720).unwrap();
    session
}

fn kept(session: &EditSession) -> Vec<(i64, i64)> {
    session
        .segments()
        .iter()
        .map(|s| (s.start_ms, s.end_ms))
        .collect()
}

// ── Layout & lookup ────────────────────────────────────────────

#[test]
fn total_duration_is_sum_of_clips() {
    let session = build_session();
    assert_eq!(session.timeline().total_duration_ms(), 45_000);
    assert_eq!(format_clock(session.timeline().total_duration_ms()), "00:00:45");
}

#[test]
fn locate_walks_clip_boundaries() {
    let session = build_session();

    let (clip, local) = session.locate(0).unwrap();
    assert!(clip.path().ends_with("intro.mp4"));
    assert_eq!(local, 0);

    let (clip, local) = session.locate(6_000).unwrap();
    assert!(clip.path().ends_with("body.mkv"));
    assert_eq!(local, 1_000);

    let (clip, local) = session.locate(35_000).unwrap();
    assert!(clip.path().ends_with("outro.webm"));
    assert_eq!(local, 0);

    assert!(session.locate(45_000).is_none());
}

#[test]
fn player_follows_next_clip_chain() {
    let session = build_session();
    let timeline = session.timeline();

    let mut names = Vec::new();
    let mut current = timeline.get(0);
    while let Some(clip) = current {
        names.push(clip.path().file_name().unwrap().to_string_lossy().into_owned());
        current = timeline.next_clip(clip);
    }
    assert_eq!(names, vec!["intro.mp4", "body.mkv", "outro.webm"]);
}

// ── Editing ────────────────────────────────────────────────────

#[test]
fn marker_driven_cut_across_clip_boundary() {
    let mut session = build_session();
    session.set_in(3_000);
    session.set_out(8_000);
    assert!(session.apply_cut());

    assert_eq!(kept(&session), vec![(0, 3_000), (8_000, 35_000), (35_000, 45_000)]);
    assert_eq!(session.selection(), Selection::default());
    assert_eq!(session.kept_duration_ms(), 40_000);
}

#[test]
fn player_skips_cut_regions() {
    let mut session = build_session();
    session.cut(3_000, 8_000);
    session.cut(40_000, 45_000);

    assert_eq!(session.gap_jump(1_000), PlaybackTarget::Inside);
    assert_eq!(session.gap_jump(3_000), PlaybackTarget::JumpTo(8_000));
    assert_eq!(session.gap_jump(41_000), PlaybackTarget::EndOfContent);
}

#[test]
fn cutting_everything_then_appending_keeps_only_new_clip() {
    let mut session = build_session();
    session.reset_selection();
    session.apply_cut();
    assert!(session.segments().is_empty());

    session.add_clip("media/extra.mp4", 2_000, 1920, 1080).unwrap();
    assert_eq!(kept(&session), vec![(45_000, 47_000)]);
}
