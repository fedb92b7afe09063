//! Constants used throughout the application

/// Number of contour points per eye (EAR order `p1..p6`)
pub const EYE_CONTOUR_POINTS: usize = 6;

/// Minimum number of iris points needed to locate the iris center
pub const MIN_IRIS_POINTS: usize = 1;

/// Number of hand joints reported by the detector
pub const NUM_HAND_JOINTS: usize = 21;

/// Gaze ratio of a centered iris
pub const GAZE_CENTER: f64 = 0.5;

/// Default window sizes for smoothing
pub const DEFAULT_GAZE_SMOOTHING_WINDOW: usize = 5;
pub const DEFAULT_CURSOR_SMOOTHING_WINDOW: usize = 5;

/// Default eye gesture parameters (seconds unless noted)
pub const DEFAULT_BLINK_THRESHOLD: f64 = 0.25;
pub const DEFAULT_SINGLE_BLINK_MIN: f64 = 0.1;
pub const DEFAULT_LONG_BLINK_DURATION: f64 = 0.8;
pub const DEFAULT_DOUBLE_BLINK_INTERVAL: f64 = 0.5;
pub const DEFAULT_GAZE_DIRECTION_THRESHOLD: f64 = 0.15;
pub const DEFAULT_GAZE_HOLD_DURATION: f64 = 0.5;

/// Default cooldown between identical gesture events (seconds)
pub const DEFAULT_GESTURE_COOLDOWN: f64 = 0.5;

/// Default hand gesture parameters
pub const DEFAULT_HAND_DETECTION_CONFIDENCE: f32 = 0.75;
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 100.0;
pub const DEFAULT_SWIPE_WINDOW: f64 = 0.5;
pub const DEFAULT_SWIPE_STRAIGHTNESS: f64 = 0.8;
pub const DEFAULT_SWIPE_BUFFER_CAPACITY: usize = 64;
pub const DEFAULT_OK_SIGN_RATIO: f64 = 0.35;
pub const DEFAULT_STATIC_HOLD_FRAMES: usize = 3;

/// Default cursor control parameters
pub const DEFAULT_SENSITIVITY: f64 = 1.0;
pub const DEFAULT_DWELL_TIME: f64 = 1.5;
pub const DEFAULT_DWELL_TOLERANCE: f64 = 50.0;
pub const DEFAULT_SCROLL_AMOUNT: i32 = 3;

/// Sensitivity bounds; values outside are clamped with a warning
pub const SENSITIVITY_MIN: f64 = 0.1;
pub const SENSITIVITY_MAX: f64 = 3.0;

/// Dwell time bounds; values outside are clamped with a warning
pub const DWELL_TIME_MIN: f64 = 0.5;
pub const DWELL_TIME_MAX: f64 = 5.0;

/// Default calibration parameters
pub const DEFAULT_CALIBRATION_POINTS: u8 = 9;
pub const DEFAULT_SAMPLES_PER_POINT: usize = 30;
pub const DEFAULT_POINT_DURATION: f64 = 2.0;
pub const DEFAULT_OUTLIER_STD_DEVS: f64 = 2.5;
pub const DEFAULT_IDW_POWER: f64 = 2.0;
pub const DEFAULT_IDW_EPSILON: f64 = 1e-6;

/// Fraction of the screen kept free around calibration targets
pub const CALIBRATION_MARGIN: f64 = 0.1;

/// Distance in ratio space below which a query snaps to a calibration point
pub const CALIBRATION_SNAP_DISTANCE: f64 = 1e-9;

/// Tolerance for timestamp comparisons (seconds)
pub const TIME_EPSILON: f64 = 1e-9;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
