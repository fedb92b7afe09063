//! Turns screen targets and gesture events into desktop actions.

use crate::{
    actions::{ActionEvent, ActionKind, ActionSource, GestureBindings, MouseButton},
    config::{ControlConfig, GestureConfig, ScreenConfig},
    constants::{DWELL_TIME_MAX, DWELL_TIME_MIN, SENSITIVITY_MAX, SENSITIVITY_MIN},
    dwell::DwellDetector,
    filters::PointSmoother,
    geometry::Point2,
    gestures::{GestureEvent, GestureSource},
    utils::safe_cast::{f64_to_i32_clamp, max_pixel_index},
    Error,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Which path is allowed to fire clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    /// Resting the cursor clicks
    #[default]
    Dwell,
    /// Bound gestures click
    Gesture,
    /// Only explicit manual clicks
    Manual,
}

impl ClickMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dwell => "dwell",
            Self::Gesture => "gesture",
            Self::Manual => "manual",
        }
    }

    /// Click-class actions from `source` pass in this mode
    #[must_use]
    pub const fn allows_clicks_from(self, source: ActionSource) -> bool {
        matches!(
            (self, source),
            (Self::Dwell, ActionSource::Dwell)
                | (Self::Gesture, ActionSource::Eye | ActionSource::Hand)
                | (Self::Manual, ActionSource::Manual)
        )
    }
}

impl fmt::Display for ClickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClickMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dwell" => Ok(Self::Dwell),
            "gesture" => Ok(Self::Gesture),
            "manual" => Ok(Self::Manual),
            other => Err(Error::InvalidConfiguration(format!(
                "Unknown click mode '{other}', expected dwell, gesture or manual"
            ))),
        }
    }
}

/// Cursor smoothing, dwell clicking and gesture dispatch
#[derive(Debug, Clone)]
pub struct ActionController {
    width: u32,
    height: u32,
    sensitivity: f64,
    click_mode: ClickMode,
    scroll_amount: i32,
    bindings: GestureBindings,
    smoother: PointSmoother,
    dwell: DwellDetector,
    cursor: Option<Point2>,
    enabled: bool,
    clicking: bool,
}

impl ActionController {
    /// Sensitivity and dwell time are clamped like their setters do
    #[must_use]
    pub fn new(control: &ControlConfig, gestures: &GestureConfig, screen: &ScreenConfig) -> Self {
        let mut controller = Self {
            width: screen.width,
            height: screen.height,
            sensitivity: 1.0,
            click_mode: control.click_mode,
            scroll_amount: control.scroll_amount,
            bindings: gestures.bindings.clone(),
            smoother: PointSmoother::new(control.smoothing.max(1)),
            dwell: DwellDetector::new(control.dwell_time, control.dwell_tolerance),
            cursor: None,
            enabled: true,
            clicking: true,
        };
        controller.set_sensitivity(control.sensitivity);
        controller.set_dwell_time(control.dwell_time);
        controller
    }

    /// Process one frame
    ///
    /// `target` is the mapped gaze position, `None` when no face was seen;
    /// the cursor then holds its last position. Gesture events are
    /// dispatched eye first, at most one click-class action per frame, with
    /// identical non-click actions collapsed.
    pub fn process(
        &mut self,
        target: Option<Point2>,
        gestures: &[GestureEvent],
        timestamp: f64,
    ) -> Vec<ActionEvent> {
        if !self.enabled {
            return Vec::new();
        }

        let mut candidates = Vec::new();

        if let Some(target) = target {
            let smoothed = self.smoother.push(target);
            let position = self.scale(smoothed);
            self.cursor = Some(position);

            let (x, y) = self.to_pixels(position);
            candidates.push(ActionEvent::new(ActionKind::Move { x, y }, ActionSource::Eye, timestamp));

            if self.clicking
                && self.click_mode == ClickMode::Dwell
                && self.dwell.update(position, timestamp)
            {
                info!("Dwell click at ({x}, {y})");
                candidates.push(ActionEvent::new(
                    ActionKind::Click(MouseButton::Left),
                    ActionSource::Dwell,
                    timestamp,
                ));
            }
        }

        let ordered = gestures
            .iter()
            .filter(|g| g.kind.source() == GestureSource::Eye)
            .chain(gestures.iter().filter(|g| g.kind.source() == GestureSource::Hand));

        for gesture in ordered {
            let Some(action) = self.bindings.get(gesture.kind) else {
                debug!("Gesture {} is unbound", gesture.kind);
                continue;
            };
            let source = match gesture.kind.source() {
                GestureSource::Eye => ActionSource::Eye,
                GestureSource::Hand => ActionSource::Hand,
            };
            candidates.push(ActionEvent::new(
                action.to_action_kind(self.scroll_amount),
                source,
                gesture.timestamp,
            ));
        }

        self.apply_frame_policy(candidates)
    }

    /// Explicit click, honoured only in manual mode
    pub fn manual_click(&mut self, timestamp: f64) -> Option<ActionEvent> {
        let allowed = self.enabled
            && self.clicking
            && self.click_mode.allows_clicks_from(ActionSource::Manual);
        if !allowed {
            debug!("Manual click ignored in {} mode", self.click_mode);
            return None;
        }
        Some(ActionEvent::new(
            ActionKind::Click(MouseButton::Left),
            ActionSource::Manual,
            timestamp,
        ))
    }

    /// Stop or resume dispatching; disabling clears the smoothing window
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Action dispatch {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        if !enabled {
            self.smoother.reset();
            self.dwell.reset();
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Allow or suppress click-class actions; the cursor keeps moving
    pub fn set_clicking_enabled(&mut self, clicking: bool) {
        if self.clicking != clicking {
            info!("Clicking {}", if clicking { "enabled" } else { "disabled" });
        }
        self.clicking = clicking;
        if !clicking {
            self.dwell.reset();
        }
    }

    /// Flip clicking on or off; returns the new state
    pub fn toggle_clicking(&mut self) -> bool {
        self.set_clicking_enabled(!self.clicking);
        self.clicking
    }

    #[must_use]
    pub const fn is_clicking_enabled(&self) -> bool {
        self.clicking
    }

    /// Clear smoothing and dwell state
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.dwell.reset();
    }

    /// Dwell progress in `[0, 1]`, always 0 outside dwell mode
    #[must_use]
    pub fn dwell_progress(&self) -> f64 {
        if self.click_mode == ClickMode::Dwell {
            self.dwell.progress()
        } else {
            0.0
        }
    }

    /// Last cursor position
    #[must_use]
    pub const fn cursor(&self) -> Option<Point2> {
        self.cursor
    }

    #[must_use]
    pub const fn click_mode(&self) -> ClickMode {
        self.click_mode
    }

    pub fn set_click_mode(&mut self, mode: ClickMode) {
        info!("Click mode set to {}", mode);
        self.click_mode = mode;
        self.dwell.reset();
    }

    #[must_use]
    pub const fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Set the movement gain, clamped to the supported range
    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        let clamped = if sensitivity.is_nan() {
            SENSITIVITY_MIN
        } else {
            sensitivity.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
        };
        if (clamped - sensitivity).abs() > f64::EPSILON || sensitivity.is_nan() {
            warn!("Sensitivity {sensitivity} clamped to {clamped}");
        }
        self.sensitivity = clamped;
    }

    #[must_use]
    pub const fn dwell_time(&self) -> f64 {
        self.dwell.dwell_time()
    }

    /// Set the dwell click time, clamped to the supported range
    pub fn set_dwell_time(&mut self, dwell_time: f64) {
        let clamped = if dwell_time.is_nan() {
            DWELL_TIME_MIN
        } else {
            dwell_time.clamp(DWELL_TIME_MIN, DWELL_TIME_MAX)
        };
        if (clamped - dwell_time).abs() > f64::EPSILON || dwell_time.is_nan() {
            warn!("Dwell time {dwell_time} clamped to {clamped}");
        }
        self.dwell.set_dwell_time(clamped);
    }

    fn scale(&self, position: Point2) -> Point2 {
        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let center = Point2::new(width / 2.0, height / 2.0);
        let scaled = center + (position - center) * self.sensitivity;
        Point2::new(scaled.x.clamp(0.0, width), scaled.y.clamp(0.0, height))
    }

    fn to_pixels(&self, position: Point2) -> (i32, i32) {
        (
            f64_to_i32_clamp(position.x, 0, max_pixel_index(self.width)),
            f64_to_i32_clamp(position.y, 0, max_pixel_index(self.height)),
        )
    }

    fn apply_frame_policy(&self, candidates: Vec<ActionEvent>) -> Vec<ActionEvent> {
        let mut accepted: Vec<ActionEvent> = Vec::with_capacity(candidates.len());
        let mut clicked = false;

        for event in candidates {
            if event.kind.is_click() {
                if !self.clicking {
                    debug!("{} dropped while clicking is off", event.kind);
                    continue;
                }
                if !self.click_mode.allows_clicks_from(event.source) {
                    debug!("{} from {:?} blocked in {} mode", event.kind, event.source, self.click_mode);
                    continue;
                }
                if clicked {
                    debug!("Dropping extra click-class action {}", event.kind);
                    continue;
                }
                clicked = true;
            } else if accepted.iter().any(|a| a.kind == event.kind) {
                continue;
            }
            accepted.push(event);
        }

        accepted
    }
}
