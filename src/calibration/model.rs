use crate::{constants::CALIBRATION_SNAP_DISTANCE, geometry::Point2, Error, Result};
use serde::{Deserialize, Serialize};

/// A calibrated pairing of averaged gaze ratio and screen position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappedPoint {
    /// Representative gaze ratio measured while looking at the target
    pub ratio: Point2,
    /// Target position on screen in pixels
    pub screen: Point2,
}

/// Inverse-distance-weighted mapping from gaze ratio to screen position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    points: Vec<MappedPoint>,
    idw_power: f64,
    idw_epsilon: f64,
}

impl CalibrationModel {
    /// Build a model from finalized points
    ///
    /// # Errors
    ///
    /// Returns `InvalidCalibration` if the model fails [`Self::validate`]
    pub fn new(points: Vec<MappedPoint>, idw_power: f64, idw_epsilon: f64) -> Result<Self> {
        let model = Self {
            points,
            idw_power,
            idw_epsilon,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check point count, finiteness and weighting parameters
    ///
    /// # Errors
    ///
    /// Returns `InvalidCalibration` describing the problem
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.points.len(), 4 | 5 | 9) {
            return Err(Error::InvalidCalibration(format!(
                "expected 4, 5 or 9 points, got {}",
                self.points.len()
            )));
        }
        if !self
            .points
            .iter()
            .all(|p| p.ratio.is_finite() && p.screen.is_finite())
        {
            return Err(Error::InvalidCalibration(
                "calibration points must be finite".to_string(),
            ));
        }
        if !(self.idw_power.is_finite() && self.idw_power > 0.0) {
            return Err(Error::InvalidCalibration(format!(
                "IDW power must be positive, got {}",
                self.idw_power
            )));
        }
        if !(self.idw_epsilon.is_finite() && self.idw_epsilon > 0.0) {
            return Err(Error::InvalidCalibration(format!(
                "IDW epsilon must be positive, got {}",
                self.idw_epsilon
            )));
        }
        Ok(())
    }

    /// Map a gaze ratio to a screen position
    ///
    /// Returns a stored screen position exactly when `ratio` coincides with
    /// its calibration ratio, otherwise the weighted average of all targets
    /// with weights `1 / (d^p + eps)`.
    #[must_use]
    pub fn map(&self, ratio: Point2) -> Point2 {
        let mut weighted = Point2::default();
        let mut total = 0.0;

        for point in &self.points {
            let distance = ratio.distance(point.ratio);
            if distance < CALIBRATION_SNAP_DISTANCE {
                return point.screen;
            }
            let weight = 1.0 / (distance.powf(self.idw_power) + self.idw_epsilon);
            weighted = weighted + point.screen * weight;
            total += weight;
        }

        weighted / total
    }

    /// Calibrated points in layout order
    #[must_use]
    pub fn points(&self) -> &[MappedPoint] {
        &self.points
    }

    #[must_use]
    pub const fn idw_power(&self) -> f64 {
        self.idw_power
    }

    #[must_use]
    pub const fn idw_epsilon(&self) -> f64 {
        self.idw_epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_model() -> CalibrationModel {
        let points = [
            ((0.3, 0.3), (100.0, 100.0)),
            ((0.7, 0.3), (900.0, 100.0)),
            ((0.3, 0.7), (100.0, 500.0)),
            ((0.7, 0.7), (900.0, 500.0)),
        ]
        .into_iter()
        .map(|(r, s)| MappedPoint {
            ratio: r.into(),
            screen: s.into(),
        })
        .collect();
        CalibrationModel::new(points, 2.0, 1e-6).unwrap()
    }

    #[test]
    fn test_exact_at_calibration_points() {
        let model = corner_model();
        for point in model.points() {
            assert_eq!(model.map(point.ratio), point.screen);
        }
    }

    #[test]
    fn test_symmetric_center() {
        let model = corner_model();
        let center = model.map(Point2::new(0.5, 0.5));
        assert!((center.x - 500.0).abs() < 1e-6);
        assert!((center.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_partial_model() {
        let points = vec![
            MappedPoint {
                ratio: Point2::new(0.5, 0.5),
                screen: Point2::new(10.0, 10.0),
            };
            3
        ];
        assert!(matches!(
            CalibrationModel::new(points, 2.0, 1e-6),
            Err(Error::InvalidCalibration(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut points = corner_model().points().to_vec();
        points[1].ratio.x = f64::NAN;
        assert!(CalibrationModel::new(points, 2.0, 1e-6).is_err());
    }
}
