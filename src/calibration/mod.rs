//! Gaze-to-screen calibration.
//!
//! A session shows the user a fixed set of targets and records the gaze
//! ratio while they look at each one. The finished session yields a
//! [`CalibrationModel`] that maps gaze ratios to screen pixels by
//! inverse-distance weighting. Without a model the engine falls back to a
//! linear mapping of the raw ratio.

/// Deterministic target layouts
pub mod layout;
/// Finalized calibration model and IDW mapping
pub mod model;
/// Sample collection across targets
pub mod session;

pub use layout::target_positions;
pub use model::{CalibrationModel, MappedPoint};
pub use session::{
    representative_ratio, CalibrationPoint, CalibrationSession, SessionState, SessionStatus,
};

use crate::{
    config::{CalibrationConfig, ScreenConfig},
    geometry::Point2,
    Error, Result,
};
use log::{info, warn};
use std::path::Path;

/// Owns the active calibration model and any running session
#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    config: CalibrationConfig,
    width: f64,
    height: f64,
    targets: Vec<Point2>,
    model: Option<CalibrationModel>,
    session: Option<CalibrationSession>,
}

impl CalibrationEngine {
    /// Create an uncalibrated engine
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an unsupported point count
    pub fn new(config: &CalibrationConfig, screen: &ScreenConfig) -> Result<Self> {
        let targets = target_positions(config.num_points, screen.width, screen.height)?;
        Ok(Self {
            config: config.clone(),
            width: f64::from(screen.width),
            height: f64::from(screen.height),
            targets,
            model: None,
            session: None,
        })
    }

    /// Start a new session, replacing any unfinished one
    pub fn start_session(&mut self) {
        let mut session = CalibrationSession::new(&self.targets, &self.config);
        session.start();
        self.session = Some(session);
    }

    /// Feed one frame to the running session
    ///
    /// A completed session installs its model and ends. A failed session
    /// stays around in the aborted state; the previous model is kept.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` without a session, otherwise whatever the
    /// session reports
    pub fn feed(&mut self, sample: Option<Point2>, timestamp: f64) -> Result<SessionStatus> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::InvalidInput("no calibration session".to_string()))?;

        let status = session.feed(sample, timestamp)?;
        if let SessionStatus::Complete(model) = &status {
            self.model = Some(model.clone());
            self.session = None;
        }
        Ok(status)
    }

    /// Cancel the running session; the current model is untouched
    pub fn abort(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.abort();
        }
    }

    /// A session is running and accepting samples
    #[must_use]
    pub fn is_collecting(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(CalibrationSession::is_collecting)
    }

    /// Progress of the running session, 0 without one
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.session.as_ref().map_or(0.0, CalibrationSession::progress)
    }

    /// Target the user should look at
    #[must_use]
    pub fn current_target(&self) -> Option<Point2> {
        self.session.as_ref().and_then(CalibrationSession::current_target)
    }

    #[must_use]
    pub fn session(&self) -> Option<&CalibrationSession> {
        self.session.as_ref()
    }

    /// Target layout used by new sessions
    #[must_use]
    pub fn targets(&self) -> &[Point2] {
        &self.targets
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.model.is_some()
    }

    #[must_use]
    pub const fn model(&self) -> Option<&CalibrationModel> {
        self.model.as_ref()
    }

    /// Map a gaze ratio to screen pixels
    #[must_use]
    pub fn map_to_screen(&self, ratio: Point2) -> Point2 {
        match &self.model {
            Some(model) => model.map(ratio),
            None => Point2::new(
                (ratio.x * self.width).clamp(0.0, self.width),
                (ratio.y * self.height).clamp(0.0, self.height),
            ),
        }
    }

    /// Drop the model and return to raw mapping
    pub fn reset(&mut self) {
        if self.model.take().is_some() {
            info!("Calibration reset, using raw gaze mapping");
        }
    }

    /// Serialize the current model as YAML
    ///
    /// # Errors
    ///
    /// Returns `InvalidCalibration` when uncalibrated
    pub fn export(&self) -> Result<String> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::InvalidCalibration("no calibration to export".to_string()))?;
        Ok(serde_yaml::to_string(model)?)
    }

    /// Replace the model with one parsed from YAML
    ///
    /// # Errors
    ///
    /// Returns `Yaml` for malformed data or `InvalidCalibration` when the
    /// model fails validation; the current model is kept in both cases
    pub fn import(&mut self, data: &str) -> Result<()> {
        let model: CalibrationModel = serde_yaml::from_str(data)?;
        model.validate()?;
        if model.points().len() != self.targets.len() {
            warn!(
                "Imported calibration has {} points, configured layout has {}",
                model.points().len(),
                self.targets.len()
            );
        }
        self.model = Some(model);
        Ok(())
    }

    /// Write the current model to a file
    ///
    /// # Errors
    ///
    /// Returns an error when uncalibrated or the file cannot be written
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = self.export()?;
        std::fs::write(path.as_ref(), data)?;
        info!("Calibration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Load and install a model from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds an invalid model
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let data = std::fs::read_to_string(path.as_ref())?;
        self.import(&data)?;
        info!("Calibration loaded from {}", path.as_ref().display());
        Ok(())
    }
}
