use proptest::prelude::*;

use shotlist_sequence_engine::signature::{dirty_signature, render_signature};
use shotlist_sequence_engine::store::SegmentStore;
use shotlist_sequence_engine::trim::{compute_trim, TrimBase, TrimSide, MIN_DURATION};
use shotlist_sequence_model::{RenderParams, Segment};

const EPS: f64 = 1e-9;

fn sequence(durations: &[f64]) -> Vec<Segment> {
    durations
        .iter()
        .enumerate()
        .map(|(i, d)| Segment::new(format!("seg-{i}"), *d))
        .collect()
}

fn assert_orders(store: &SegmentStore) {
    for (idx, seg) in store.segments().iter().enumerate() {
        assert_eq!(seg.order as usize, idx + 1);
    }
}

proptest! {
    #[test]
    fn reorder_keeps_orders_contiguous(
        durations in prop::collection::vec(0.5f64..10.0, 1..12),
        moves in prop::collection::vec((0usize..16, 0usize..16), 0..20),
    ) {
        let mut store = SegmentStore::new(sequence(&durations));
        let mut ids: Vec<String> = store.segments().iter().map(|s| s.id.clone()).collect();
        ids.sort();

        for (from, to) in moves {
            let before = store.revision();
            match store.reorder(from, to) {
                Ok(()) => prop_assert!(from == to || store.revision() > before),
                Err(_) => prop_assert_eq!(store.revision(), before),
            }
            assert_orders(&store);
        }

        let mut after: Vec<String> = store.segments().iter().map(|s| s.id.clone()).collect();
        after.sort();
        prop_assert_eq!(ids, after);
    }

    #[test]
    fn remove_and_restore_keep_orders_contiguous(
        durations in prop::collection::vec(0.5f64..10.0, 1..10),
        picks in prop::collection::vec(0usize..10, 0..5),
    ) {
        let mut store = SegmentStore::new(sequence(&durations));
        let len = store.len();
        let ids: Vec<String> = picks
            .into_iter()
            .filter(|i| *i < len)
            .map(|i| format!("seg-{i}"))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        let removed = store.remove(&ids).unwrap();
        assert_orders(&store);
        for _ in 0..removed {
            prop_assert!(store.restore_last().is_some());
            assert_orders(&store);
        }
        prop_assert_eq!(store.len(), len);
        prop_assert!(store.restore_last().is_none());
    }

    #[test]
    fn left_trim_stays_in_bounds(
        start in 0.0f64..20.0,
        length in 0.1f64..20.0,
        delta in -50.0f64..50.0,
    ) {
        let base = TrimBase { start, end: start + length };
        let r = compute_trim(TrimSide::Left, base, delta);
        prop_assert!(r.start >= 0.0);
        prop_assert!(r.start <= base.end - MIN_DURATION + EPS);
        prop_assert!((r.end - base.end).abs() < EPS);
        prop_assert!((r.duration - (r.end - r.start)).abs() < EPS);
        prop_assert!(r.duration >= MIN_DURATION - EPS);
    }

    #[test]
    fn right_trim_stays_in_bounds(
        start in 0.0f64..20.0,
        length in 0.1f64..20.0,
        delta in -50.0f64..50.0,
    ) {
        let base = TrimBase { start, end: start + length };
        let r = compute_trim(TrimSide::Right, base, delta);
        prop_assert!((r.start - base.start).abs() < EPS);
        prop_assert!(r.end >= base.start + MIN_DURATION - EPS);
        prop_assert!((r.duration - (r.end - r.start)).abs() < EPS);
    }

    #[test]
    fn signatures_are_deterministic(
        durations in prop::collection::vec(0.5f64..10.0, 1..8),
        title in "[a-zA-Z ]{0,16}",
        font_size in 12u32..120,
    ) {
        let segs = sequence(&durations);
        let params = RenderParams { font_size, ..RenderParams::default() };

        let first = render_signature(&segs, &params).unwrap();
        prop_assert_eq!(&first, &render_signature(&segs.clone(), &params.clone()).unwrap());

        let mut titled = segs.clone();
        titled[0].scene_title = Some(title);
        prop_assert_eq!(&first, &render_signature(&titled, &params).unwrap());
        prop_assert_eq!(dirty_signature(&segs).unwrap(), dirty_signature(&titled).unwrap());

        let mut longer = segs.clone();
        longer[0].duration += 0.25;
        prop_assert_ne!(&first, &render_signature(&longer, &params).unwrap());

        let bigger = RenderParams { font_size: font_size + 1, ..params };
        prop_assert_ne!(&first, &render_signature(&segs, &bigger).unwrap());
    }
}
