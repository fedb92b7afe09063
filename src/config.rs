//! Configuration management for the gaze and gesture control application

use crate::{
    action_controller::ClickMode,
    actions::GestureBindings,
    constants::{
        DEFAULT_BLINK_THRESHOLD, DEFAULT_CALIBRATION_POINTS, DEFAULT_CURSOR_SMOOTHING_WINDOW,
        DEFAULT_DOUBLE_BLINK_INTERVAL, DEFAULT_DWELL_TIME, DEFAULT_DWELL_TOLERANCE,
        DEFAULT_GAZE_DIRECTION_THRESHOLD, DEFAULT_GAZE_HOLD_DURATION, DEFAULT_GAZE_SMOOTHING_WINDOW,
        DEFAULT_GESTURE_COOLDOWN, DEFAULT_HAND_DETECTION_CONFIDENCE, DEFAULT_IDW_EPSILON,
        DEFAULT_IDW_POWER, DEFAULT_LONG_BLINK_DURATION, DEFAULT_OK_SIGN_RATIO,
        DEFAULT_OUTLIER_STD_DEVS, DEFAULT_POINT_DURATION, DEFAULT_SAMPLES_PER_POINT,
        DEFAULT_SCROLL_AMOUNT, DEFAULT_SENSITIVITY, DEFAULT_SINGLE_BLINK_MIN,
        DEFAULT_STATIC_HOLD_FRAMES, DEFAULT_SWIPE_BUFFER_CAPACITY, DEFAULT_SWIPE_STRAIGHTNESS,
        DEFAULT_SWIPE_THRESHOLD, DEFAULT_SWIPE_WINDOW, DWELL_TIME_MAX, DWELL_TIME_MIN,
        SENSITIVITY_MAX, SENSITIVITY_MIN,
    },
    Error, Result,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen geometry used for mapping and calibration layout
    pub screen: ScreenConfig,

    /// Gaze estimation configuration
    pub gaze: GazeConfig,

    /// Eye gesture thresholds
    pub eye_gestures: EyeGestureConfig,

    /// Hand gesture thresholds
    pub hand_gestures: HandGestureConfig,

    /// Gesture cooldown, sources and action bindings
    pub gestures: GestureConfig,

    /// Cursor control configuration
    pub control: ControlConfig,

    /// Calibration session configuration
    pub calibration: CalibrationConfig,

    /// Virtual keyboard configuration
    pub keyboard: KeyboardConfig,
}

/// Screen geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Screen width in pixels
    pub width: u32,

    /// Screen height in pixels
    pub height: u32,
}

/// Gaze estimation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Minimum face confidence for a usable frame (0.0-1.0)
    pub face_detection_confidence: f32,

    /// How far past [0, 1] a gaze ratio may extend before clamping
    pub ratio_margin: f64,

    /// Moving average window for the gaze ratio
    pub smoothing_window: usize,
}

/// Eye gesture parameters (durations in seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeGestureConfig {
    /// EAR below which the eyes count as closed
    pub blink_threshold: f64,

    /// Shorter closures are noise
    pub single_blink_min: f64,

    /// Closures at least this long are long blinks
    pub long_blink_duration: f64,

    /// Window after a blink in which a second blink makes a double blink
    pub double_blink_interval: f64,

    /// Offset from the gaze center that counts as looking in a direction
    pub gaze_direction_threshold: f64,

    /// How long a direction must be held before it fires
    pub gaze_hold_duration: f64,
}

/// Hand gesture parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandGestureConfig {
    /// Minimum hand confidence for a usable frame (0.0-1.0)
    pub hand_detection_confidence: f32,

    /// Minimum net displacement of a swipe in pixels
    pub swipe_threshold: f64,

    /// Time window a swipe is measured over (seconds)
    pub swipe_window: f64,

    /// Minimum ratio of net displacement to path length
    pub swipe_straightness: f64,

    /// Maximum number of centroid samples kept
    pub swipe_buffer_capacity: usize,

    /// Thumb-index distance for an OK sign, as a fraction of palm size
    pub ok_sign_ratio: f64,

    /// Consecutive frames a static gesture must be seen before it fires
    pub static_hold_frames: usize,
}

/// Which recognizers feed the action controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureSources {
    /// Eye gestures only
    Eye,
    /// Hand gestures only
    Hand,
    /// Eye and hand gestures
    #[default]
    Both,
}

impl GestureSources {
    /// Eye gestures are evaluated
    #[must_use]
    pub const fn eye_enabled(self) -> bool {
        matches!(self, Self::Eye | Self::Both)
    }

    /// Hand gestures are evaluated
    #[must_use]
    pub const fn hand_enabled(self) -> bool {
        matches!(self, Self::Hand | Self::Both)
    }
}

/// Gesture dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Minimum time between two firings of the same gesture (seconds)
    pub gesture_cooldown: f64,

    /// Enabled gesture sources
    pub sources: GestureSources,

    /// Gesture to action table
    pub bindings: GestureBindings,
}

/// Cursor control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Which path fires clicks
    pub click_mode: ClickMode,

    /// Movement gain around the screen center
    pub sensitivity: f64,

    /// Moving average window for the cursor position
    pub smoothing: usize,

    /// Seconds the cursor must stay still for a dwell click
    pub dwell_time: f64,

    /// Radius in pixels the cursor may wander during a dwell
    pub dwell_tolerance: f64,

    /// Wheel steps per scroll action
    pub scroll_amount: i32,
}

/// Calibration session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Number of targets (4, 5 or 9)
    pub num_points: u8,

    /// Gaze samples collected per target
    pub samples_per_point: usize,

    /// Seconds allowed per target before the session fails
    pub point_duration: f64,

    /// Outlier rejection in standard deviations (0 disables)
    pub outlier_std_devs: f64,

    /// Inverse distance weighting exponent
    pub idw_power: f64,

    /// Inverse distance weighting regularizer
    pub idw_epsilon: f64,

    /// Where calibration models are loaded from and saved to
    pub file: Option<PathBuf>,
}

/// Virtual keyboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Show the keyboard at startup
    pub visible: bool,

    /// Top-left corner of the keyboard in screen pixels
    pub origin: [i32; 2],

    /// Width and height of a regular key
    pub key_size: [i32; 2],

    /// Gap between keys
    pub spacing: i32,

    /// Seconds of hovering that activates a key
    pub dwell_time: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            face_detection_confidence: 0.5,
            ratio_margin: 0.2,
            smoothing_window: DEFAULT_GAZE_SMOOTHING_WINDOW,
        }
    }
}

impl Default for EyeGestureConfig {
    fn default() -> Self {
        Self {
            blink_threshold: DEFAULT_BLINK_THRESHOLD,
            single_blink_min: DEFAULT_SINGLE_BLINK_MIN,
            long_blink_duration: DEFAULT_LONG_BLINK_DURATION,
            double_blink_interval: DEFAULT_DOUBLE_BLINK_INTERVAL,
            gaze_direction_threshold: DEFAULT_GAZE_DIRECTION_THRESHOLD,
            gaze_hold_duration: DEFAULT_GAZE_HOLD_DURATION,
        }
    }
}

impl Default for HandGestureConfig {
    fn default() -> Self {
        Self {
            hand_detection_confidence: DEFAULT_HAND_DETECTION_CONFIDENCE,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            swipe_window: DEFAULT_SWIPE_WINDOW,
            swipe_straightness: DEFAULT_SWIPE_STRAIGHTNESS,
            swipe_buffer_capacity: DEFAULT_SWIPE_BUFFER_CAPACITY,
            ok_sign_ratio: DEFAULT_OK_SIGN_RATIO,
            static_hold_frames: DEFAULT_STATIC_HOLD_FRAMES,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            gesture_cooldown: DEFAULT_GESTURE_COOLDOWN,
            sources: GestureSources::default(),
            bindings: GestureBindings::default(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            click_mode: ClickMode::default(),
            sensitivity: DEFAULT_SENSITIVITY,
            smoothing: DEFAULT_CURSOR_SMOOTHING_WINDOW,
            dwell_time: DEFAULT_DWELL_TIME,
            dwell_tolerance: DEFAULT_DWELL_TOLERANCE,
            scroll_amount: DEFAULT_SCROLL_AMOUNT,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_CALIBRATION_POINTS,
            samples_per_point: DEFAULT_SAMPLES_PER_POINT,
            point_duration: DEFAULT_POINT_DURATION,
            outlier_std_devs: DEFAULT_OUTLIER_STD_DEVS,
            idw_power: DEFAULT_IDW_POWER,
            idw_epsilon: DEFAULT_IDW_EPSILON,
            file: None,
        }
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            visible: false,
            origin: [50, 50],
            key_size: [60, 60],
            spacing: 10,
            dwell_time: 1.5,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to parse config: {e}")))
    }

    /// Load, clamp and validate a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or a value is out of range
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.clamp_adjustable_values();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Clamp comfort settings into their safe range, warning on change
    pub fn clamp_adjustable_values(&mut self) {
        let sensitivity = self.control.sensitivity.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX);
        if (sensitivity - self.control.sensitivity).abs() > f64::EPSILON || self.control.sensitivity.is_nan() {
            warn!(
                "Sensitivity {} outside [{SENSITIVITY_MIN}, {SENSITIVITY_MAX}], using {sensitivity}",
                self.control.sensitivity
            );
            self.control.sensitivity = if sensitivity.is_nan() { SENSITIVITY_MIN } else { sensitivity };
        }

        let dwell_time = self.control.dwell_time.clamp(DWELL_TIME_MIN, DWELL_TIME_MAX);
        if (dwell_time - self.control.dwell_time).abs() > f64::EPSILON || self.control.dwell_time.is_nan() {
            warn!(
                "Dwell time {} outside [{DWELL_TIME_MIN}, {DWELL_TIME_MAX}], using {dwell_time}",
                self.control.dwell_time
            );
            self.control.dwell_time = if dwell_time.is_nan() { DWELL_TIME_MIN } else { dwell_time };
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first offending value
    pub fn validate(&self) -> Result<()> {
        // Screen
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(invalid("Screen dimensions must be greater than 0"));
        }

        // Gaze estimation
        if !(0.0..=1.0).contains(&self.gaze.face_detection_confidence) {
            return Err(invalid("Face detection confidence must be between 0.0 and 1.0"));
        }
        if !(0.0..=0.5).contains(&self.gaze.ratio_margin) {
            return Err(invalid("Gaze ratio margin must be between 0.0 and 0.5"));
        }
        if self.gaze.smoothing_window == 0 {
            return Err(invalid("Gaze smoothing window must be greater than 0"));
        }

        // Eye gestures
        let eye = &self.eye_gestures;
        if !(eye.blink_threshold > 0.0 && eye.blink_threshold < 1.0) {
            return Err(invalid("Blink threshold must be between 0.0 and 1.0"));
        }
        if !(eye.single_blink_min >= 0.0 && eye.single_blink_min < eye.long_blink_duration) {
            return Err(invalid(
                "Single blink minimum must be non-negative and shorter than the long blink duration",
            ));
        }
        if !(eye.double_blink_interval > 0.0) {
            return Err(invalid("Double blink interval must be positive"));
        }
        if !(eye.gaze_direction_threshold > 0.0 && eye.gaze_direction_threshold < 0.5) {
            return Err(invalid("Gaze direction threshold must be between 0.0 and 0.5"));
        }
        if !(eye.gaze_hold_duration >= 0.0) {
            return Err(invalid("Gaze hold duration must be non-negative"));
        }

        // Hand gestures
        let hand = &self.hand_gestures;
        if !(0.0..=1.0).contains(&hand.hand_detection_confidence) {
            return Err(invalid("Hand detection confidence must be between 0.0 and 1.0"));
        }
        if !(hand.swipe_threshold > 0.0) {
            return Err(invalid("Swipe threshold must be positive"));
        }
        if !(hand.swipe_window > 0.0) {
            return Err(invalid("Swipe window must be positive"));
        }
        if !(hand.swipe_straightness > 0.0 && hand.swipe_straightness <= 1.0) {
            return Err(invalid("Swipe straightness must be in (0, 1]"));
        }
        if hand.swipe_buffer_capacity < 2 {
            return Err(invalid("Swipe buffer capacity must be at least 2"));
        }
        if !(hand.ok_sign_ratio > 0.0) {
            return Err(invalid("OK sign ratio must be positive"));
        }
        if hand.static_hold_frames == 0 {
            return Err(invalid("Static hold frames must be greater than 0"));
        }

        // Gestures
        if !(self.gestures.gesture_cooldown >= 0.0) {
            return Err(invalid("Gesture cooldown must be non-negative"));
        }

        // Cursor control
        if self.control.smoothing == 0 {
            return Err(invalid("Cursor smoothing window must be greater than 0"));
        }
        if !(self.control.dwell_tolerance > 0.0) {
            return Err(invalid("Dwell tolerance must be positive"));
        }
        if self.control.scroll_amount == 0 {
            return Err(invalid("Scroll amount must not be 0"));
        }

        // Calibration
        let calibration = &self.calibration;
        if !matches!(calibration.num_points, 4 | 5 | 9) {
            return Err(invalid(&format!(
                "Calibration point count must be 4, 5 or 9, got {}",
                calibration.num_points
            )));
        }
        if calibration.samples_per_point == 0 {
            return Err(invalid("Samples per point must be greater than 0"));
        }
        if !(calibration.point_duration > 0.0) {
            return Err(invalid("Calibration point duration must be positive"));
        }
        if !(calibration.outlier_std_devs >= 0.0) {
            return Err(invalid("Outlier rejection must be non-negative"));
        }
        if !(calibration.idw_power > 0.0) {
            return Err(invalid("IDW power must be positive"));
        }
        if !(calibration.idw_epsilon > 0.0) {
            return Err(invalid("IDW epsilon must be positive"));
        }

        // Keyboard
        if self.keyboard.key_size[0] <= 0 || self.keyboard.key_size[1] <= 0 {
            return Err(invalid("Key size must be greater than 0"));
        }
        if self.keyboard.spacing < 0 {
            return Err(invalid("Key spacing must be non-negative"));
        }
        if !(self.keyboard.dwell_time > 0.0) {
            return Err(invalid("Keyboard dwell time must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfiguration(message.to_string())
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze & Gesture Control Configuration

# Screen geometry
screen:
  width: 1920
  height: 1080

# Gaze estimation
gaze:
  face_detection_confidence: 0.5
  ratio_margin: 0.2
  smoothing_window: 5

# Eye gestures (seconds)
eye_gestures:
  blink_threshold: 0.25
  single_blink_min: 0.1
  long_blink_duration: 0.8
  double_blink_interval: 0.5
  gaze_direction_threshold: 0.15
  gaze_hold_duration: 0.5

# Hand gestures
hand_gestures:
  hand_detection_confidence: 0.75
  swipe_threshold: 100.0
  swipe_window: 0.5
  swipe_straightness: 0.8
  swipe_buffer_capacity: 64
  ok_sign_ratio: 0.35
  static_hold_frames: 3

# Gesture dispatch
gestures:
  gesture_cooldown: 0.5
  sources: both
  bindings:
    single_blink: click
    double_blink: double_click
    long_blink: context_menu
    look_up: scroll_up
    look_down: scroll_down
    fist: click
    open_palm: context_menu
    peace: double_click
    thumbs_up: scroll_up
    thumbs_down: scroll_down
    ok_sign: confirm
    swipe_left: navigate_back
    swipe_right: navigate_forward
    swipe_up: scroll_up
    swipe_down: scroll_down

# Cursor control
control:
  click_mode: dwell
  sensitivity: 1.0
  smoothing: 5
  dwell_time: 1.5
  dwell_tolerance: 50.0
  scroll_amount: 3

# Calibration
calibration:
  num_points: 9
  samples_per_point: 30
  point_duration: 2.0
  outlier_std_devs: 2.5
  idw_power: 2.0
  idw_epsilon: 0.000001

# Virtual keyboard
keyboard:
  visible: false
  origin: [50, 50]
  key_size: [60, 60]
  spacing: 10
  dwell_time: 1.5
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_point_count() {
        let mut config = Config::default();
        config.calibration.num_points = 6;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sensitivity_is_clamped() {
        let mut config = Config::default();
        config.control.sensitivity = 10.0;
        config.clamp_adjustable_values();
        assert_eq!(config.control.sensitivity, SENSITIVITY_MAX);
        assert!(config.validate().is_ok());
    }
}
