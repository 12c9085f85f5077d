use approx::assert_relative_eq;
use bf_core::vec3;
use bf_path::{Beam, BeamSettings, Path, Segment, SegmentMode};
use proptest::prelude::*;

#[test]
fn dwell_then_line_scan() {
    let path = Path::from_segments(
        vec![
            Segment::point_dwell(vec3(0.0, 0.0, 0.0), 0.0, 0.0),
            Segment::line_scan(vec3(1.0, 0.0, 0.0), 100.0, 0.5),
        ],
        10.0,
    )
    .unwrap();
    assert_relative_eq!(path.segments()[1].time(), 2.0, epsilon = 1e-12);

    let beam = Beam::new(path, BeamSettings::default()).unwrap();
    let mut state = beam.initial_state(0.0);

    beam.move_to(&mut state, 1.0);
    assert!(state.active);
    assert_relative_eq!(state.position, vec3(0.5, 0.0, 0.0), epsilon = 1e-12);
    assert_eq!(state.power, 100.0);
    assert_eq!(beam.mode(state.index, 1.0), SegmentMode::LineScan);
    assert_relative_eq!(beam.speed(state.index, 1.0), 0.5);

    beam.move_to(&mut state, 3.0);
    assert!(!state.active);
    assert_eq!(state.power, 0.0);
    assert!(beam.position(state.index, 3.0).is_none());
}

#[test]
fn dwell_holds_position_and_power() {
    let path = Path::from_segments(
        vec![
            Segment::point_dwell(vec3(0.0, 0.0, 0.0), 0.0, 0.0),
            Segment::point_dwell(vec3(2.0, 1.0, 0.0), 150.0, 1.0),
            Segment::line_scan(vec3(3.0, 1.0, 0.0), 50.0, 1.0),
        ],
        10.0,
    )
    .unwrap();
    let beam = Beam::new(path, BeamSettings::default()).unwrap();
    for t in [0.1, 0.5, 0.99] {
        assert_eq!(beam.position(0, t), Some(vec3(2.0, 1.0, 0.0)));
        assert_eq!(beam.power(0, t), 150.0);
    }
    assert_eq!(beam.power(0, 1.5), 50.0);
    assert_relative_eq!(
        beam.position(0, 1.5).unwrap(),
        vec3(2.5, 1.0, 0.0),
        epsilon = 1e-12
    );
}

#[test]
fn scan_path_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("bf_path_test_{}", std::process::id()));
    let pattern = bf_path::HatchPattern {
        min: [0.0, 0.0],
        max: [2e-3, 1e-3],
        hatch: 1e-4,
        angle_deg: 67.0,
        rotations: 3,
        power: 195.0,
        speed: 0.8,
        dwell_time: 1e-4,
        bidirectional: true,
    };
    let files = bf_path::write_scan_path(&dir, &pattern).unwrap();
    assert_eq!(files.len(), 3);
    for (i, file) in files.iter().enumerate() {
        let path = Path::read(file, 1.0).unwrap();
        assert_eq!(path.len(), pattern.segments(i).len());
        assert!(path.end_time() > 0.0);
    }
    let _ = std::fs::remove_dir_all(&dir);
}

fn arb_segment() -> impl Strategy<Value = Segment> {
    (
        prop_oneof![Just(SegmentMode::LineScan), Just(SegmentMode::PointDwell)],
        -1.0f64..1.0,
        -1.0f64..1.0,
        prop_oneof![Just(0.0f64), 1.0f64..500.0],
        prop_oneof![Just(0.0f64), 0.01f64..2.0],
    )
        .prop_map(|(mode, x, y, power, param)| match mode {
            SegmentMode::LineScan => Segment::line_scan(vec3(x, y, 0.0), power, param + 0.1),
            SegmentMode::PointDwell => Segment::point_dwell(vec3(x, y, 0.0), power, param),
        })
}

proptest! {
    #[test]
    fn segment_times_non_decreasing(
        segments in prop::collection::vec(arb_segment(), 1..20),
        sim_end in 0.1f64..50.0,
    ) {
        let path = Path::from_segments(segments, sim_end).unwrap();
        for pair in path.segments().windows(2) {
            prop_assert!(pair[1].time() >= pair[0].time());
        }
        prop_assert!(path.end_time() <= sim_end);
        prop_assert!(path.end_time() >= 0.0);
    }

    #[test]
    fn find_index_monotone_with_threaded_cursor(
        segments in prop::collection::vec(arb_segment(), 1..20),
        mut times in prop::collection::vec(0.0f64..40.0, 1..30),
    ) {
        times.sort_by(|a, b| a.total_cmp(b));
        let path = Path::from_segments(segments, 100.0).unwrap();
        let n = path.len();
        let beam = Beam::new(path, BeamSettings::default()).unwrap();

        let mut cursor = 0;
        for t in times {
            let next = beam.find_index(cursor, t);
            prop_assert!(next >= cursor);
            prop_assert!(next < n);
            cursor = next;
        }
    }

    #[test]
    fn adjusted_step_never_grows(
        segments in prop::collection::vec(arb_segment(), 1..10),
        t in 0.0f64..10.0,
        dt in 1e-4f64..1.0,
    ) {
        let path = Path::from_segments(segments, 100.0).unwrap();
        let beam = Beam::new(path, BeamSettings::default()).unwrap();
        let adjusted = beam.adjust_step(0, t, dt);
        prop_assert!(adjusted <= dt);
        prop_assert!(adjusted > 0.0);
    }
}
