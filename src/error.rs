//! Error types for the gaze and gesture control library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// The landmark source returned nothing usable for this frame
    #[error("No detection: {0}")]
    NoDetection(String),

    /// A calibration target did not gather enough valid samples in time
    #[error(
        "Calibration point {point} collected {collected} of {required} required samples before its time ran out"
    )]
    CalibrationInsufficientSamples {
        /// Index of the target point in the calibration layout
        point: usize,
        /// Samples gathered before the deadline
        collected: usize,
        /// Samples the configuration asks for
        required: usize,
    },

    /// The calibration session was cancelled
    #[error("Calibration aborted")]
    CalibrationAborted,

    /// Imported or constructed calibration model is unusable
    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `X11` window system operation failed
    #[error("X11 error: {0}")]
    X11(String),

    /// Action sink rejected a command
    #[error("Action sink error: {0}")]
    Sink(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error only affects the current frame
    #[must_use]
    pub const fn is_per_frame(&self) -> bool {
        matches!(self, Self::NoDetection(_) | Self::Sink(_) | Self::X11(_))
    }
}
