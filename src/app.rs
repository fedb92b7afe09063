//! Frame pipeline tying estimation, calibration, gestures and output together.

use crate::{
    action_controller::ActionController,
    actions::{ActionEvent, ActionSource},
    calibration::{CalibrationEngine, SessionStatus},
    config::Config,
    eye_gestures::EyeGestureMachine,
    filters::PointSmoother,
    gaze_estimation::{GazeEstimator, GazeSample},
    geometry::Point2,
    gestures::GestureEvent,
    hand_gestures::HandGestureRecognizer,
    landmarks::{LandmarkFrame, LandmarkSource},
    sink::{dispatch, ActionSink},
    virtual_keyboard::VirtualKeyboard,
    Result,
};
use log::{debug, info, warn};

/// Calibration activity during one frame
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationUpdate {
    /// Still collecting for `point`
    Collecting { point: usize, collected: usize },
    /// Session finished and the new model is active
    Completed,
    /// Session failed; the previous model is still active
    Failed(String),
}

/// What happened while processing one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub timestamp: f64,
    /// Gaze measurement, `None` when no usable face was found
    pub gaze: Option<GazeSample>,
    /// Mapped screen target before cursor smoothing
    pub screen_target: Option<Point2>,
    pub gestures: Vec<GestureEvent>,
    /// Actions handed to the sink
    pub actions: Vec<ActionEvent>,
    pub calibration: Option<CalibrationUpdate>,
    /// Sink calls that failed this frame
    pub sink_errors: usize,
}

impl FrameReport {
    #[must_use]
    pub const fn face_detected(&self) -> bool {
        self.gaze.is_some()
    }
}

/// Totals over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub frames_without_face: usize,
    pub gestures_recognized: usize,
    pub actions_dispatched: usize,
    pub sink_errors: usize,
}

impl RunSummary {
    /// Add one frame's outcome
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if !report.face_detected() {
            self.frames_without_face += 1;
        }
        self.gestures_recognized += report.gestures.len();
        self.actions_dispatched += report.actions.len();
        self.sink_errors += report.sink_errors;
    }
}

/// Gaze and gesture control application
pub struct GazeControlApp<S: ActionSink> {
    config: Config,
    estimator: GazeEstimator,
    gaze_smoother: PointSmoother,
    calibration: CalibrationEngine,
    eye_gestures: EyeGestureMachine,
    hand_gestures: HandGestureRecognizer,
    controller: ActionController,
    keyboard: VirtualKeyboard,
    sink: S,
}

impl<S: ActionSink> GazeControlApp<S> {
    /// Build the pipeline from a configuration
    ///
    /// A calibration file named in the configuration is loaded when it
    /// exists; a broken file is reported and ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration does not validate
    pub fn new(config: Config, sink: S) -> Result<Self> {
        config.validate()?;
        info!("Initializing gaze and gesture control");

        let mut calibration = CalibrationEngine::new(&config.calibration, &config.screen)?;
        if let Some(path) = config.calibration.file.as_ref().filter(|p| p.exists()) {
            if let Err(e) = calibration.load_from_file(path) {
                warn!("Ignoring calibration file {}: {}", path.display(), e);
            }
        }

        let cooldown = config.gestures.gesture_cooldown;
        Ok(Self {
            estimator: GazeEstimator::new(&config.gaze),
            gaze_smoother: PointSmoother::new(config.gaze.smoothing_window),
            calibration,
            eye_gestures: EyeGestureMachine::new(config.eye_gestures.clone(), cooldown),
            hand_gestures: HandGestureRecognizer::new(config.hand_gestures.clone(), cooldown),
            controller: ActionController::new(&config.control, &config.gestures, &config.screen),
            keyboard: VirtualKeyboard::new(&config.keyboard),
            config,
            sink,
        })
    }

    /// Run one frame through the pipeline
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameReport {
        let timestamp = frame.timestamp;
        let mut report = FrameReport {
            timestamp,
            ..FrameReport::default()
        };

        report.gaze = match self.estimator.estimate(frame) {
            Ok(sample) => Some(sample),
            Err(e) if e.is_per_frame() => {
                debug!("Frame at {:.3}s skipped: {}", timestamp, e);
                None
            }
            Err(e) => {
                warn!("Gaze estimation failed at {:.3}s: {}", timestamp, e);
                None
            }
        };
        // Calibration sessions take unsmoothed ratios
        if self.calibration.is_collecting() {
            let raw = report.gaze.map(|g| g.ratio());
            report.calibration = Some(self.feed_calibration(raw, timestamp));
            return report;
        }

        let ratio = report.gaze.map(|g| self.gaze_smoother.push(g.ratio()));

        let target = ratio.map(|r| self.calibration.map_to_screen(r));
        report.screen_target = target;

        let sources = self.config.gestures.sources;
        if sources.eye_enabled() {
            if let (Some(gaze), Some(ratio)) = (report.gaze, ratio) {
                report
                    .gestures
                    .extend(self.eye_gestures.update(gaze.ear(), ratio, timestamp));
            }
        }
        if sources.hand_enabled() {
            let min_confidence = self.config.hand_gestures.hand_detection_confidence;
            match frame.hand.as_ref().filter(|h| h.confidence >= min_confidence) {
                Some(hand) => report
                    .gestures
                    .extend(self.hand_gestures.update(hand, timestamp)),
                None => self.hand_gestures.on_hand_lost(),
            }
        }

        let mut actions = self.controller.process(target, &report.gestures, timestamp);

        if self.controller.is_enabled() {
            let cursor = target.and(self.controller.cursor());
            if cursor.is_some_and(|p| self.keyboard.key_at(p).is_some()) {
                // Keys run their own dwell
                actions.retain(|a| !(a.source == ActionSource::Dwell && a.kind.is_click()));
            }
            if let Some(activation) = self.keyboard.update(cursor, timestamp) {
                actions.extend(
                    activation
                        .actions
                        .into_iter()
                        .map(|kind| ActionEvent::new(kind, ActionSource::Dwell, timestamp)),
                );
            }
        }

        report.sink_errors = self.dispatch_all(&actions);
        report.actions = actions;
        report
    }

    /// Drain a landmark source
    ///
    /// # Errors
    ///
    /// Returns an error only if the source itself fails
    pub fn run(&mut self, source: &mut dyn LandmarkSource) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        while let Some(frame) = source.next_frame()? {
            let report = self.process_frame(&frame);
            summary.record(&report);
        }
        info!(
            "Processed {} frames ({} without face), {} gestures, {} actions",
            summary.frames,
            summary.frames_without_face,
            summary.gestures_recognized,
            summary.actions_dispatched
        );
        Ok(summary)
    }

    /// Explicit click, honoured in manual click mode
    pub fn manual_click(&mut self, timestamp: f64) -> Option<ActionEvent> {
        let event = self.controller.manual_click(timestamp)?;
        self.dispatch_all(std::slice::from_ref(&event));
        Some(event)
    }

    /// Begin a calibration session; dispatch pauses until it ends
    pub fn start_calibration(&mut self) {
        self.calibration.start_session();
        self.gaze_smoother.reset();
    }

    /// Cancel the running calibration session
    pub fn abort_calibration(&mut self) {
        self.calibration.abort();
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn calibration(&self) -> &CalibrationEngine {
        &self.calibration
    }

    pub fn calibration_mut(&mut self) -> &mut CalibrationEngine {
        &mut self.calibration
    }

    #[must_use]
    pub const fn controller(&self) -> &ActionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ActionController {
        &mut self.controller
    }

    #[must_use]
    pub const fn keyboard(&self) -> &VirtualKeyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut VirtualKeyboard {
        &mut self.keyboard
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn feed_calibration(&mut self, ratio: Option<Point2>, timestamp: f64) -> CalibrationUpdate {
        match self.calibration.feed(ratio, timestamp) {
            Ok(SessionStatus::Collecting { point, collected }) => {
                CalibrationUpdate::Collecting { point, collected }
            }
            Ok(SessionStatus::Complete(_)) => {
                self.gaze_smoother.reset();
                self.controller.reset();
                self.eye_gestures.reset();
                self.hand_gestures.reset();
                if let Some(path) = self.config.calibration.file.as_ref() {
                    if let Err(e) = self.calibration.save_to_file(path) {
                        warn!("Failed to save calibration: {}", e);
                    }
                }
                CalibrationUpdate::Completed
            }
            Err(e) => {
                self.gaze_smoother.reset();
                warn!("Calibration failed: {}", e);
                CalibrationUpdate::Failed(e.to_string())
            }
        }
    }

    fn dispatch_all(&mut self, actions: &[ActionEvent]) -> usize {
        let mut failures = 0;
        for action in actions {
            debug!("Dispatching {} from {:?}", action.kind, action.source);
            if let Err(e) = dispatch(&mut self.sink, action) {
                warn!("Sink error for {}: {}", action.kind, e);
                failures += 1;
            }
        }
        failures
    }
}
