//! Swipe trajectory and static pose tests for the hand gesture recognizer


use gaze_gesture_control::{
    config::HandGestureConfig,
    geometry::Point2,
    gestures::{GestureEvent, GestureKind},
    hand_gestures::HandGestureRecognizer,
    landmarks::HandLandmarks,
};
use test_helpers::{frame_times, hand, neutral_hand, FRAME};

fn recognizer() -> HandGestureRecognizer {
    HandGestureRecognizer::new(HandGestureConfig::default(), 0.5)
}

fn feed<F>(r: &mut HandGestureRecognizer, start: f64, count: usize, pose: F) -> Vec<GestureEvent>
where
    F: Fn(f64) -> HandLandmarks,
{
    frame_times(start, count)
        .flat_map(|t| r.update(&pose(t - start), t))
        .collect()
}

fn swipes(events: &[GestureEvent]) -> Vec<GestureKind> {
    events
        .iter()
        .map(|e| e.kind)
        .filter(|k| {
            matches!(
                k,
                GestureKind::SwipeLeft
                    | GestureKind::SwipeRight
                    | GestureKind::SwipeUp
                    | GestureKind::SwipeDown
            )
        })
        .collect()
}

#[test]
fn test_monotone_swipe_right() {
    let mut r = recognizer();
    // 150 px over the 0.5 s window at 30 fps
    let events = feed(&mut r, 0.0, 16, |dt| {
        neutral_hand(Point2::new(300.0 + 300.0 * dt, 400.0))
    });
    assert_eq!(swipes(&events), vec![GestureKind::SwipeRight]);
    assert!(r.buffer().is_empty());
}

#[test]
fn test_zigzag_is_not_a_swipe() {
    let mut r = recognizer();
    // Two 37.5 px steps forward and one 45 px back, five times over the
    // window: net 150 px along a 600 px path
    let events = feed(&mut r, 0.0, 16, |dt| {
        let step = (dt / FRAME).round() as usize;
        let x = 300.0 + 30.0 * (step / 3) as f64 + 37.5 * (step % 3) as f64;
        neutral_hand(Point2::new(x, 400.0))
    });
    assert!(swipes(&events).is_empty());
    let net = r.buffer().net_displacement();
    assert!((net.x - 150.0).abs() < 1e-9);
    assert!((r.buffer().path_length() - 600.0).abs() < 1e-9);
}

#[test]
fn test_swipe_directions() {
    let cases = [
        (Point2::new(-300.0, 0.0), GestureKind::SwipeLeft),
        (Point2::new(0.0, -300.0), GestureKind::SwipeUp),
        (Point2::new(0.0, 300.0), GestureKind::SwipeDown),
    ];
    for (velocity, expected) in cases {
        let mut r = recognizer();
        let events = feed(&mut r, 0.0, 16, |dt| {
            neutral_hand(Point2::new(500.0, 500.0) + velocity * dt)
        });
        assert_eq!(swipes(&events), vec![expected]);
    }
}

#[test]
fn test_slow_motion_is_not_a_swipe() {
    let mut r = recognizer();
    // 60 px over the window stays under the threshold
    let events = feed(&mut r, 0.0, 30, |dt| {
        neutral_hand(Point2::new(300.0 + 120.0 * dt, 400.0))
    });
    assert!(swipes(&events).is_empty());
}

#[test]
fn test_swipe_supersedes_static() {
    let mut r = recognizer();
    // A fist held still stabilizes first, then sweeps right
    let mut events = feed(&mut r, 0.0, 3, |_| hand([false; 5], Point2::new(300.0, 400.0)));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, GestureKind::Fist);

    events = feed(&mut r, 3.0 * FRAME, 16, |dt| {
        hand([false; 5], Point2::new(300.0 + 400.0 * dt, 400.0))
    });
    let swipe_frames: Vec<f64> = events
        .iter()
        .filter(|e| e.kind == GestureKind::SwipeRight)
        .map(|e| e.timestamp)
        .collect();
    assert_eq!(swipe_frames.len(), 1);
    // No static gesture reported in the frame of the swipe
    assert!(!events
        .iter()
        .any(|e| e.kind == GestureKind::Fist && (e.timestamp - swipe_frames[0]).abs() < 1e-9));
}

#[test]
fn test_static_gesture_cooldown() {
    let mut r = recognizer();
    let peace = hand([false, true, true, false, false], Point2::new(300.0, 400.0));
    let events: Vec<_> = frame_times(0.0, 30).flat_map(|t| r.update(&peace, t)).collect();
    // Stable from the third frame, then once per 0.5 s
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.kind == GestureKind::Peace));
}

#[test]
fn test_pose_change_restarts_stability() {
    let mut r = recognizer();
    let at = Point2::new(300.0, 400.0);
    let mut events = Vec::new();
    events.extend(r.update(&hand([false; 5], at), 0.0));
    events.extend(r.update(&hand([false; 5], at), FRAME));
    events.extend(r.update(&hand([true; 5], at), 2.0 * FRAME));
    events.extend(r.update(&hand([true; 5], at), 3.0 * FRAME));
    assert!(events.is_empty());
    let events = r.update(&hand([true; 5], at), 4.0 * FRAME);
    assert_eq!(events[0].kind, GestureKind::OpenPalm);
}

#[test]
fn test_hand_loss_clears_trajectory() {
    let mut r = recognizer();
    feed(&mut r, 0.0, 10, |dt| {
        neutral_hand(Point2::new(300.0 + 300.0 * dt, 400.0))
    });
    r.on_hand_lost();
    assert!(r.buffer().is_empty());

    // The remaining motion alone is too short to span the window
    let events = feed(&mut r, 10.0 * FRAME, 6, |dt| {
        neutral_hand(Point2::new(400.0 + 300.0 * dt, 400.0))
    });
    assert!(swipes(&events).is_empty());
}

#[test]
fn test_incomplete_hand_counts_as_lost() {
    let mut r = recognizer();
    let mut partial = neutral_hand(Point2::new(0.0, 0.0));
    partial.joints.truncate(5);
    assert!(r.update(&partial, 0.0).is_empty());
    assert!(r.buffer().is_empty());
}
