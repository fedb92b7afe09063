use super::model::{CalibrationModel, MappedPoint};
use crate::{
    config::CalibrationConfig,
    constants::TIME_EPSILON,
    geometry::Point2,
    utils::calculate_stats,
    Error, Result,
};
use log::{debug, info, warn};

/// One calibration target and the gaze ratios gathered for it
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationPoint {
    pub screen_x: f64,
    pub screen_y: f64,
    pub collected_samples: Vec<Point2>,
}

impl CalibrationPoint {
    fn new(screen: Point2) -> Self {
        Self {
            screen_x: screen.x,
            screen_y: screen.y,
            collected_samples: Vec::new(),
        }
    }

    /// Target position on screen
    #[must_use]
    pub const fn screen(&self) -> Point2 {
        Point2::new(self.screen_x, self.screen_y)
    }
}

/// Life cycle of a calibration session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Collecting { point: usize },
    Complete,
    Aborted,
}

/// Outcome of feeding one frame to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// Still gathering samples for `point`
    Collecting { point: usize, collected: usize },
    /// Every target finished; the model is ready to install
    Complete(CalibrationModel),
}

/// Walks the user through the calibration targets
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    points: Vec<CalibrationPoint>,
    state: SessionState,
    point_started: Option<f64>,
    samples_per_point: usize,
    point_duration: f64,
    outlier_std_devs: f64,
    idw_power: f64,
    idw_epsilon: f64,
}

impl CalibrationSession {
    /// Create a session over the given target positions
    #[must_use]
    pub fn new(targets: &[Point2], config: &CalibrationConfig) -> Self {
        Self {
            points: targets.iter().copied().map(CalibrationPoint::new).collect(),
            state: SessionState::NotStarted,
            point_started: None,
            samples_per_point: config.samples_per_point,
            point_duration: config.point_duration,
            outlier_std_devs: config.outlier_std_devs,
            idw_power: config.idw_power,
            idw_epsilon: config.idw_epsilon,
        }
    }

    /// Begin collecting for the first target
    pub fn start(&mut self) {
        if self.state == SessionState::NotStarted {
            info!("Calibration started with {} points", self.points.len());
            self.state = SessionState::Collecting { point: 0 };
        }
    }

    /// Feed one frame; `sample` is `None` when no face was found
    ///
    /// The clock of each target starts at the first frame fed for it.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationInsufficientSamples` and aborts the session when a
    /// target runs out of time, `CalibrationAborted` when fed after an abort,
    /// and `InvalidInput` when fed after completion
    pub fn feed(&mut self, sample: Option<Point2>, timestamp: f64) -> Result<SessionStatus> {
        let point = match self.state {
            SessionState::NotStarted => {
                self.start();
                0
            }
            SessionState::Collecting { point } => point,
            SessionState::Aborted => return Err(Error::CalibrationAborted),
            SessionState::Complete => {
                return Err(Error::InvalidInput(
                    "calibration session already complete".to_string(),
                ))
            }
        };

        let started = *self.point_started.get_or_insert(timestamp);
        let required = self.samples_per_point;
        let target = self
            .points
            .get_mut(point)
            .ok_or_else(|| Error::InvalidInput("calibration session has no targets".to_string()))?;

        if let Some(ratio) = sample.filter(|r| r.is_finite()) {
            target.collected_samples.push(ratio);
        }
        let collected = target.collected_samples.len();

        if collected >= required {
            debug!("Calibration point {} collected {} samples", point, collected);
            self.point_started = None;
            let next = point + 1;
            if next == self.points.len() {
                let model = self.build_model()?;
                self.state = SessionState::Complete;
                info!("Calibration complete");
                return Ok(SessionStatus::Complete(model));
            }
            self.state = SessionState::Collecting { point: next };
            return Ok(SessionStatus::Collecting {
                point: next,
                collected: 0,
            });
        }

        if timestamp - started >= self.point_duration - TIME_EPSILON {
            warn!(
                "Calibration point {} timed out with {}/{} samples",
                point, collected, required
            );
            self.state = SessionState::Aborted;
            return Err(Error::CalibrationInsufficientSamples {
                point,
                collected,
                required,
            });
        }

        Ok(SessionStatus::Collecting { point, collected })
    }

    /// Cancel the session
    pub fn abort(&mut self) {
        if matches!(self.state, SessionState::NotStarted | SessionState::Collecting { .. }) {
            info!("Calibration aborted");
            self.state = SessionState::Aborted;
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The session still accepts samples
    #[must_use]
    pub const fn is_collecting(&self) -> bool {
        matches!(
            self.state,
            SessionState::NotStarted | SessionState::Collecting { .. }
        )
    }

    /// Fraction of the session done, in `[0, 1]`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        match self.state {
            SessionState::NotStarted => 0.0,
            SessionState::Complete => 1.0,
            SessionState::Collecting { .. } | SessionState::Aborted => {
                let total = self.points.len() * self.samples_per_point;
                let done: usize = self
                    .points
                    .iter()
                    .map(|p| p.collected_samples.len().min(self.samples_per_point))
                    .sum();
                if total == 0 {
                    0.0
                } else {
                    (done as f64 / total as f64).clamp(0.0, 1.0)
                }
            }
        }
    }

    /// Screen position the user should be looking at
    #[must_use]
    pub fn current_target(&self) -> Option<Point2> {
        match self.state {
            SessionState::NotStarted => self.points.first().map(CalibrationPoint::screen),
            SessionState::Collecting { point } => self.points.get(point).map(CalibrationPoint::screen),
            SessionState::Complete | SessionState::Aborted => None,
        }
    }

    /// Targets with the samples gathered so far
    #[must_use]
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    fn build_model(&self) -> Result<CalibrationModel> {
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let ratio = representative_ratio(&point.collected_samples, self.outlier_std_devs)
                    .ok_or(Error::CalibrationInsufficientSamples {
                        point: index,
                        collected: 0,
                        required: self.samples_per_point,
                    })?;
                Ok(MappedPoint {
                    ratio,
                    screen: point.screen(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        CalibrationModel::new(points, self.idw_power, self.idw_epsilon)
    }
}

/// Mean of the samples after discarding outliers on either axis
///
/// `std_devs == 0` disables rejection. Falls back to the plain mean if
/// every sample would be discarded.
#[must_use]
pub fn representative_ratio(samples: &[Point2], std_devs: f64) -> Option<Point2> {
    let mean = Point2::centroid(samples)?;
    if std_devs <= 0.0 {
        return Some(mean);
    }

    let stats_x = calculate_stats(samples.iter().map(|p| p.x))?;
    let stats_y = calculate_stats(samples.iter().map(|p| p.y))?;

    let inliers: Vec<Point2> = samples
        .iter()
        .copied()
        .filter(|p| {
            (p.x - stats_x.mean).abs() <= std_devs * stats_x.std_dev
                && (p.y - stats_y.mean).abs() <= std_devs * stats_y.std_dev
        })
        .collect();

    if inliers.len() < samples.len() {
        debug!(
            "Rejected {} of {} calibration samples",
            samples.len() - inliers.len(),
            samples.len()
        );
    }

    Point2::centroid(&inliers).or(Some(mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(samples: usize) -> CalibrationConfig {
        CalibrationConfig {
            samples_per_point: samples,
            ..CalibrationConfig::default()
        }
    }

    fn targets() -> Vec<Point2> {
        vec![
            Point2::new(100.0, 100.0),
            Point2::new(900.0, 100.0),
            Point2::new(100.0, 500.0),
            Point2::new(900.0, 500.0),
        ]
    }

    #[test]
    fn test_outlier_rejected() {
        let mut samples = vec![Point2::new(0.5, 0.5); 20];
        samples.push(Point2::new(0.95, 0.5));
        let ratio = representative_ratio(&samples, 2.5).unwrap();
        assert!((ratio.x - 0.5).abs() < 1e-12);

        let plain = representative_ratio(&samples, 0.0).unwrap();
        assert!(plain.x > 0.5);
    }

    #[test]
    fn test_identical_samples_kept() {
        let samples = vec![Point2::new(0.3, 0.7); 5];
        assert_eq!(representative_ratio(&samples, 2.5), Some(Point2::new(0.3, 0.7)));
        assert_eq!(representative_ratio(&[], 2.5), None);
    }

    #[test]
    fn test_session_walks_all_points() {
        let mut session = CalibrationSession::new(&targets(), &config(2));
        assert_eq!(session.current_target(), Some(Point2::new(100.0, 100.0)));

        let ratios = [(0.3, 0.3), (0.7, 0.3), (0.3, 0.7), (0.7, 0.7)];
        let mut t = 0.0;
        let mut model = None;
        for &(x, y) in &ratios {
            for _ in 0..2 {
                t += 0.1;
                if let SessionStatus::Complete(m) = session.feed(Some(Point2::new(x, y)), t).unwrap() {
                    model = Some(m);
                }
            }
        }

        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.progress(), 1.0);
        let model = model.unwrap();
        assert_eq!(model.map(Point2::new(0.7, 0.3)), Point2::new(900.0, 100.0));
    }

    #[test]
    fn test_timeout_aborts() {
        let mut session = CalibrationSession::new(&targets(), &config(30));
        session.feed(Some(Point2::new(0.5, 0.5)), 10.0).unwrap();
        session.feed(None, 11.0).unwrap();

        let err = session.feed(None, 12.0).unwrap_err();
        assert!(matches!(
            err,
            Error::CalibrationInsufficientSamples {
                point: 0,
                collected: 1,
                required: 30
            }
        ));
        assert_eq!(session.state(), SessionState::Aborted);
        assert!(matches!(session.feed(None, 12.1), Err(Error::CalibrationAborted)));
    }

    #[test]
    fn test_progress_and_abort() {
        let mut session = CalibrationSession::new(&targets(), &config(2));
        session.feed(Some(Point2::new(0.5, 0.5)), 0.0).unwrap();
        assert!((session.progress() - 0.125).abs() < 1e-12);

        session.abort();
        assert!(!session.is_collecting());
        assert_eq!(session.current_target(), None);
    }
}
