//! End-to-end frame pipeline tests with a recording sink


use gaze_gesture_control::{
    action_controller::ClickMode,
    actions::MouseButton,
    app::{CalibrationUpdate, GazeControlApp},
    config::{Config, GestureSources},
    constants::DWELL_TIME_MIN,
    geometry::Point2,
    gestures::GestureKind,
    landmarks::{LandmarkFrame, ReplaySource},
    sink::{RecordingSink, SinkCall},
};
use test_helpers::{face_frame, frame_times, gaze_frame, hand, hand_frame, CLOSED, OPEN};

const CENTER: Point2 = Point2::new(0.5, 0.5);

fn app(config: Config) -> GazeControlApp<RecordingSink> {
    GazeControlApp::new(config, RecordingSink::new()).unwrap()
}

/// Ratio that the uncalibrated mapping sends to `screen`
fn ratio_at(screen: Point2, config: &Config) -> Point2 {
    Point2::new(
        screen.x / f64::from(config.screen.width),
        screen.y / f64::from(config.screen.height),
    )
}

#[test]
fn test_gaze_moves_cursor() {
    let mut app = app(Config::default());
    let report = app.process_frame(&gaze_frame(0.0, CENTER));

    assert!(report.face_detected());
    assert_eq!(report.screen_target, Some(Point2::new(960.0, 540.0)));
    assert_eq!(app.sink().calls, vec![SinkCall::MoveTo(960, 540)]);
}

#[test]
fn test_calibration_suspends_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibration.yaml");
    let mut config = Config::default();
    config.calibration.num_points = 4;
    config.calibration.samples_per_point = 5;
    config.calibration.file = Some(path.clone());
    let screen = config.clone();
    let mut app = app(config);

    app.start_calibration();
    let mut completed = false;
    for t in frame_times(0.0, 100) {
        let Some(target) = app.calibration().current_target() else {
            break;
        };
        let report = app.process_frame(&gaze_frame(t, ratio_at(target, &screen)));
        assert!(report.actions.is_empty());
        assert!(report.screen_target.is_none());
        if report.calibration == Some(CalibrationUpdate::Completed) {
            completed = true;
            break;
        }
    }

    assert!(completed);
    assert!(app.sink().calls.is_empty());
    assert!(app.calibration().is_calibrated());
    assert!(path.exists());

    let report = app.process_frame(&gaze_frame(10.0, CENTER));
    assert!(report.calibration.is_none());
    assert!(!report.actions.is_empty());
}

#[test]
fn test_calibrated_targets_map_back_exactly() {
    let mut config = Config::default();
    config.calibration.num_points = 4;
    config.calibration.samples_per_point = 5;
    config.calibration.outlier_std_devs = 0.0;
    let screen = config.clone();
    let mut app = app(config);

    app.start_calibration();
    for t in frame_times(0.0, 100) {
        let Some(target) = app.calibration().current_target() else {
            break;
        };
        if app.process_frame(&gaze_frame(t, ratio_at(target, &screen))).calibration
            == Some(CalibrationUpdate::Completed)
        {
            break;
        }
    }
    assert!(app.calibration().is_calibrated());

    let targets = app.calibration().targets().to_vec();
    let mut times = frame_times(10.0, 5 * targets.len());
    for target in targets {
        let ratio = ratio_at(target, &screen);
        let mut mapped = None;
        for t in times.by_ref().take(5) {
            mapped = app.process_frame(&gaze_frame(t, ratio)).screen_target;
        }
        let mapped = mapped.unwrap();
        assert!(
            mapped.distance(target) < 1e-6,
            "target {target:?} mapped to {mapped:?}"
        );
    }
}

#[test]
fn test_non_finite_sensitivity_does_not_jump_to_origin() {
    let mut config = Config::default();
    config.control.sensitivity = f64::NAN;
    config.control.dwell_time = 0.0;
    let mut app = app(config);

    assert!(app.controller().sensitivity().is_finite());
    assert_eq!(app.controller().dwell_time(), DWELL_TIME_MIN);
    app.process_frame(&gaze_frame(0.0, CENTER));
    assert_eq!(app.sink().last_move(), Some((960, 540)));
}

#[test]
fn test_failed_calibration_resumes_control() {
    let mut config = Config::default();
    config.calibration.num_points = 4;
    let mut app = app(config);

    app.start_calibration();
    let mut failure = None;
    for t in frame_times(0.0, 90) {
        if let Some(CalibrationUpdate::Failed(message)) = app.process_frame(&LandmarkFrame::empty(t)).calibration {
            failure = Some(message);
            break;
        }
    }
    assert!(failure.is_some());
    assert!(!app.calibration().is_calibrated());

    let report = app.process_frame(&gaze_frame(5.0, CENTER));
    assert!(report.calibration.is_none());
    assert_eq!(app.sink().last_move(), Some((960, 540)));
}

#[test]
fn test_no_face_holds_cursor() {
    let mut app = app(Config::default());
    app.process_frame(&gaze_frame(0.0, Point2::new(0.25, 0.25)));
    let before = app.sink().calls.len();

    let report = app.process_frame(&LandmarkFrame::empty(0.1));
    assert!(!report.face_detected());
    assert!(report.actions.is_empty());
    assert_eq!(app.sink().calls.len(), before);
    assert_eq!(app.sink().last_move(), Some((480, 270)));
}

#[test]
fn test_run_summary() {
    let frames: Vec<LandmarkFrame> = frame_times(0.0, 15)
        .enumerate()
        .map(|(i, t)| if i % 3 == 2 { LandmarkFrame::empty(t) } else { gaze_frame(t, CENTER) })
        .collect();
    let mut source = ReplaySource::new(frames);
    let mut app = app(Config::default());

    let summary = app.run(&mut source).unwrap();
    assert_eq!(summary.frames, 15);
    assert_eq!(summary.frames_without_face, 5);
    assert_eq!(summary.gestures_recognized, 0);
    assert_eq!(summary.actions_dispatched, 10);
    assert_eq!(summary.sink_errors, 0);
    assert_eq!(source.remaining(), 0);
}

/// Eyes closed for a second, then open
fn long_blink_frames() -> Vec<LandmarkFrame> {
    frame_times(0.0, 45)
        .map(|t| face_frame(t, if t < 1.0 { CLOSED } else { OPEN }, CENTER))
        .collect()
}

fn gesture_config(sources: GestureSources) -> Config {
    let mut config = Config::default();
    config.control.click_mode = ClickMode::Gesture;
    config.gestures.sources = sources;
    config
}

#[test]
fn test_eye_source_drives_clicks() {
    let mut app = app(gesture_config(GestureSources::Eye));
    let gestures: Vec<GestureKind> = long_blink_frames()
        .iter()
        .flat_map(|f| app.process_frame(f).gestures)
        .map(|g| g.kind)
        .collect();

    assert_eq!(gestures, vec![GestureKind::LongBlink]);
    assert!(app
        .sink()
        .non_moves()
        .any(|c| *c == SinkCall::Click(MouseButton::Right)));
}

#[test]
fn test_hand_only_sources_ignore_eyes() {
    let mut app = app(gesture_config(GestureSources::Hand));
    let gestures: usize = long_blink_frames()
        .iter()
        .map(|f| app.process_frame(f).gestures.len())
        .sum();
    assert_eq!(gestures, 0);
    assert_eq!(app.sink().non_moves().count(), 0);
}

#[test]
fn test_low_confidence_hand_is_ignored() {
    let mut app = app(gesture_config(GestureSources::Hand));
    let mut weak = hand([false; 5], Point2::new(400.0, 400.0));
    weak.confidence = 0.5;
    let events: usize = frame_times(0.0, 10)
        .map(|t| app.process_frame(&hand_frame(t, weak.clone())).gestures.len())
        .sum();
    assert_eq!(events, 0);

    let mut strong = weak;
    strong.confidence = 0.9;
    let kinds: Vec<GestureKind> = frame_times(1.0, 10)
        .flat_map(|t| app.process_frame(&hand_frame(t, strong.clone())).gestures)
        .map(|g| g.kind)
        .collect();
    assert_eq!(kinds.first(), Some(&GestureKind::Fist));
    assert!(app
        .sink()
        .non_moves()
        .any(|c| *c == SinkCall::Click(MouseButton::Left)));
}

#[test]
fn test_sink_errors_are_counted_not_fatal() {
    let mut sink = RecordingSink::new();
    sink.fail_with = Some("display gone".to_string());
    let mut app = GazeControlApp::new(Config::default(), sink).unwrap();

    let frames: Vec<LandmarkFrame> = frame_times(0.0, 6).map(|t| gaze_frame(t, CENTER)).collect();
    let summary = app.run(&mut ReplaySource::new(frames)).unwrap();

    assert_eq!(summary.frames, 6);
    assert_eq!(summary.sink_errors, 6);
    assert_eq!(app.sink().calls.len(), 6);
}

#[test]
fn test_manual_click_dispatches_in_manual_mode() {
    let mut config = Config::default();
    config.control.click_mode = ClickMode::Manual;
    let mut app = app(config);

    assert!(app.manual_click(0.0).is_some());
    assert_eq!(app.sink().calls, vec![SinkCall::Click(MouseButton::Left)]);
}

#[test]
fn test_keyboard_enter_types_buffer() {
    let mut config = Config::default();
    config.keyboard.visible = true;
    let screen = config.clone();
    let mut app = app(config);
    app.keyboard_mut().set_text("hi you");

    let enter = app
        .keyboard()
        .keys()
        .iter()
        .find(|k| k.label == "ENTER")
        .map(|k| Point2::new(f64::from(k.x + k.width / 2), f64::from(k.y + k.height / 2)))
        .unwrap();
    let ratio = ratio_at(enter, &screen);
    for t in frame_times(0.0, 60) {
        app.process_frame(&gaze_frame(t, ratio));
    }

    let keys: Vec<&str> = app
        .sink()
        .non_moves()
        .filter_map(|c| match c {
            SinkCall::Key(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec!["h", "i", "space", "y", "o", "u"]);
    assert!(app.keyboard().text().is_empty());
    // Resting on a key types it without a dwell click underneath
    assert!(!app
        .sink()
        .non_moves()
        .any(|c| matches!(c, SinkCall::Click(_) | SinkCall::DoubleClick)));
}

#[test]
fn test_disabled_controller_skips_keyboard() {
    let mut config = Config::default();
    config.keyboard.visible = true;
    let mut app = app(config);
    app.controller_mut().set_enabled(false);

    for t in frame_times(0.0, 60) {
        app.process_frame(&gaze_frame(t, Point2::new(0.04, 0.07)));
    }
    assert!(app.sink().calls.is_empty());
    assert!(app.keyboard().text().is_empty());
}
