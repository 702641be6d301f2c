//! Property tests for timeline lookup and the cut algebra.

use proptest::prelude::*;
use splice_core::TimeSpan;
use splice_timeline::{SegmentSet, Timeline};

fn timeline_from(durations: &[i64]) -> Timeline {
    let mut timeline = Timeline::new();
    for (i, d) in durations.iter().enumerate() {
        timeline.add_clip(format!("clip{i}.mp4"), *d, 1920, 1080).unwrap();
    }
    timeline
}

fn full_keep(timeline: &Timeline) -> SegmentSet {
    SegmentSet::from_spans(timeline.clips().iter().map(|c| c.span()))
}

fn assert_well_formed(set: &SegmentSet) {
    for s in set.iter() {
        assert!(s.start_ms < s.end_ms, "empty segment {s}");
    }
    for pair in set.as_slice().windows(2) {
        assert!(pair[0].start_ms <= pair[1].start_ms, "unsorted");
        assert!(pair[0].end_ms <= pair[1].start_ms, "overlap {} {}", pair[0], pair[1]);
    }
}

fn durations() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..20_000, 1..12)
}

fn cuts() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((-1_000i64..250_000, -1_000i64..250_000), 0..8)
}

proptest! {
    #[test]
    fn locate_is_total_and_exclusive(durations in durations(), probe in 0.0f64..1.0) {
        let timeline = timeline_from(&durations);
        let total = timeline.total_duration_ms();
        let t = ((total as f64) * probe) as i64 % total;

        let (clip, local) = timeline.locate(t).unwrap();
        prop_assert!(clip.span().contains(t));
        prop_assert_eq!(local, t - clip.global_start_ms());

        let holders = timeline.clips().iter().filter(|c| c.span().contains(t)).count();
        prop_assert_eq!(holders, 1);
    }

    #[test]
    fn locate_at_boundary_picks_right_clip(durations in durations()) {
        let timeline = timeline_from(&durations);
        for pair in timeline.clips().windows(2) {
            prop_assert_eq!(pair[0].global_end_ms(), pair[1].global_start_ms());
            let (clip, local) = timeline.locate(pair[0].global_end_ms()).unwrap();
            prop_assert_eq!(clip.id(), pair[1].id());
            prop_assert_eq!(local, 0);
        }
        prop_assert_eq!(timeline.clips()[0].global_start_ms(), 0);
    }

    #[test]
    fn cuts_keep_set_well_formed(durations in durations(), cuts in cuts()) {
        let timeline = timeline_from(&durations);
        let mut keep = full_keep(&timeline);
        for (a, b) in cuts {
            keep.apply_cut(a, b);
            assert_well_formed(&keep);
        }
    }

    #[test]
    fn cut_is_idempotent(durations in durations(), a in 0i64..200_000, len in 1i64..50_000) {
        let timeline = timeline_from(&durations);
        let mut keep = full_keep(&timeline);
        keep.apply_cut(a, a + len);
        let once = keep.clone();
        keep.apply_cut(a, a + len);
        prop_assert_eq!(keep, once);
    }

    #[test]
    fn cut_removes_exactly_the_range(durations in durations(), a in 0i64..200_000, len in 1i64..50_000) {
        let timeline = timeline_from(&durations);
        let total = timeline.total_duration_ms();
        let mut keep = full_keep(&timeline);
        keep.apply_cut(a, a + len);

        let removed = TimeSpan::new(a, a + len)
            .intersection(TimeSpan::new(0, total))
            .map_or(0, |s| s.duration_ms());
        prop_assert_eq!(keep.kept_duration_ms(), total - removed);
        prop_assert!(!keep.contains(a));
    }

    #[test]
    fn inverted_cut_is_noop(durations in durations(), a in 0i64..200_000, back in 0i64..50_000) {
        let timeline = timeline_from(&durations);
        let mut keep = full_keep(&timeline);
        let before = keep.clone();
        prop_assert!(!keep.apply_cut(a, a - back));
        prop_assert_eq!(keep, before);
    }

    #[test]
    fn full_cut_empties(durations in durations()) {
        let timeline = timeline_from(&durations);
        let mut keep = full_keep(&timeline);
        keep.apply_cut(0, timeline.total_duration_ms());
        prop_assert!(keep.is_empty());
    }
}
