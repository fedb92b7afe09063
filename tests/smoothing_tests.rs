//! Moving average behavior on scalar and point streams

use gaze_gesture_control::{
    filters::{MovingAverageFilter, PointSmoother},
    geometry::Point2,
};
use proptest::prelude::*;

#[test]
fn test_warm_up_averages_what_is_there() {
    let mut filter = MovingAverageFilter::<f64>::new(4);
    assert_eq!(filter.average(), None);
    assert_eq!(filter.push(2.0), 2.0);
    assert_eq!(filter.push(4.0), 3.0);
    assert_eq!(filter.push(6.0), 4.0);
}

#[test]
fn test_oldest_sample_is_evicted() {
    let mut filter = MovingAverageFilter::<f64>::new(3);
    for v in [1.0, 2.0, 3.0] {
        filter.push(v);
    }
    assert_eq!(filter.push(10.0), 5.0);
    assert_eq!(filter.len(), 3);
    assert_eq!(filter.samples().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 10.0]);
}

#[test]
fn test_window_of_one_passes_through() {
    let mut filter = MovingAverageFilter::<f64>::new(1);
    for v in [0.3, -1.5, 8.25] {
        assert_eq!(filter.push(v), v);
    }
}

#[test]
fn test_reset_restarts_window() {
    let mut smoother = PointSmoother::new(5);
    smoother.push(Point2::new(100.0, 100.0));
    smoother.push(Point2::new(200.0, 300.0));
    smoother.reset();
    assert!(smoother.is_empty());
    assert_eq!(smoother.push(Point2::new(7.0, 9.0)), Point2::new(7.0, 9.0));
}

#[test]
fn test_point_average() {
    let mut smoother = PointSmoother::new(2);
    smoother.push(Point2::new(0.0, 10.0));
    assert_eq!(smoother.push(Point2::new(4.0, 20.0)), Point2::new(2.0, 15.0));
}

#[test]
#[should_panic(expected = "Window size must be greater than 0")]
fn test_zero_window_rejected() {
    let _ = MovingAverageFilter::<f64>::new(0);
}

proptest! {
    #[test]
    fn test_average_within_window_bounds(
        window in 1usize..12,
        values in prop::collection::vec(-1000.0f64..1000.0, 1..64),
    ) {
        let mut filter = MovingAverageFilter::<f64>::new(window);
        for (i, &v) in values.iter().enumerate() {
            let avg = filter.push(v);
            let start = (i + 1).saturating_sub(window);
            let recent = &values[start..=i];
            let min = recent.iter().copied().fold(f64::INFINITY, f64::min);
            let max = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(avg >= min - 1e-9 && avg <= max + 1e-9);
        }
    }

    #[test]
    fn test_constant_stream_is_fixed_point(value in -1.0f64..2.0, window in 1usize..10) {
        let mut smoother = PointSmoother::new(window);
        let point = Point2::new(value, 1.0 - value);
        for _ in 0..window * 2 {
            let avg = smoother.push(point);
            prop_assert!(avg.distance(point) < 1e-9);
        }
    }
}
