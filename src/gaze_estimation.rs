//! Gaze ratio and eye aspect ratio estimation from eye landmarks.
//!
//! The gaze ratio is the iris center expressed in the coordinates of the
//! eye's bounding box, so `(0.5, 0.5)` means looking straight ahead. The
//! eye aspect ratio (EAR) drops towards zero as the lids close.

use crate::{
    config::GazeConfig,
    constants::{EPSILON, EYE_CONTOUR_POINTS, GAZE_CENTER, MIN_IRIS_POINTS},
    geometry::Point2,
    landmarks::{EyeLandmarks, LandmarkFrame},
    Error, Result,
};

/// Per-frame gaze measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    /// Horizontal gaze ratio, 0 = left edge of the eye, 1 = right edge
    pub ratio_x: f64,
    /// Vertical gaze ratio, 0 = top of the eye, 1 = bottom
    pub ratio_y: f64,
    /// Eye aspect ratio of the left eye
    pub ear_left: f64,
    /// Eye aspect ratio of the right eye
    pub ear_right: f64,
    /// Capture time in seconds
    pub timestamp: f64,
}

impl GazeSample {
    /// Gaze ratio as a point
    #[must_use]
    pub const fn ratio(&self) -> Point2 {
        Point2::new(self.ratio_x, self.ratio_y)
    }

    /// Mean EAR of both eyes
    #[must_use]
    pub fn ear(&self) -> f64 {
        (self.ear_left + self.ear_right) / 2.0
    }
}

/// Converts landmark frames into gaze samples
#[derive(Debug, Clone)]
pub struct GazeEstimator {
    min_confidence: f32,
    ratio_margin: f64,
}

impl GazeEstimator {
    /// Create an estimator from the gaze configuration
    #[must_use]
    pub fn new(config: &GazeConfig) -> Self {
        Self {
            min_confidence: config.face_detection_confidence,
            ratio_margin: config.ratio_margin,
        }
    }

    /// Estimate gaze for one frame
    ///
    /// # Errors
    ///
    /// Returns `NoDetection` when the face is missing, below the confidence
    /// threshold, or its eye landmarks are degenerate
    pub fn estimate(&self, frame: &LandmarkFrame) -> Result<GazeSample> {
        let face = frame
            .face
            .as_ref()
            .ok_or_else(|| Error::NoDetection("no face in frame".to_string()))?;

        if face.confidence < self.min_confidence {
            return Err(Error::NoDetection(format!(
                "face confidence {:.2} below {:.2}",
                face.confidence, self.min_confidence
            )));
        }

        let left = self.measure_eye(&face.left_eye)?;
        let right = self.measure_eye(&face.right_eye)?;
        let ratio = left.ratio.midpoint(right.ratio);

        Ok(GazeSample {
            ratio_x: ratio.x,
            ratio_y: ratio.y,
            ear_left: left.ear,
            ear_right: right.ear,
            timestamp: frame.timestamp,
        })
    }

    fn measure_eye(&self, eye: &EyeLandmarks) -> Result<EyeMeasurement> {
        if eye.contour.len() < EYE_CONTOUR_POINTS || eye.iris.len() < MIN_IRIS_POINTS {
            return Err(Error::NoDetection("incomplete eye landmarks".to_string()));
        }
        if !eye.contour.iter().chain(eye.iris.iter()).all(|p| p.is_finite()) {
            return Err(Error::NoDetection("non-finite eye landmarks".to_string()));
        }

        let ear = eye_aspect_ratio(&eye.contour)?;
        let ratio = self.gaze_ratio(eye)?;
        Ok(EyeMeasurement { ratio, ear })
    }

    fn gaze_ratio(&self, eye: &EyeLandmarks) -> Result<Point2> {
        let contour = &eye.contour[..EYE_CONTOUR_POINTS];
        let min_x = contour.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = contour.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = contour.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = contour.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let width = max_x - min_x;
        let height = max_y - min_y;
        if width < EPSILON {
            return Err(Error::NoDetection("degenerate eye bounding box".to_string()));
        }

        let iris = Point2::centroid(&eye.iris)
            .ok_or_else(|| Error::NoDetection("missing iris".to_string()))?;

        let lo = -self.ratio_margin;
        let hi = 1.0 + self.ratio_margin;
        // A fully closed lid has no vertical extent
        let vertical = if height < EPSILON {
            GAZE_CENTER
        } else {
            ((iris.y - min_y) / height).clamp(lo, hi)
        };
        Ok(Point2::new(((iris.x - min_x) / width).clamp(lo, hi), vertical))
    }
}

struct EyeMeasurement {
    ratio: Point2,
    ear: f64,
}

/// EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)
///
/// # Errors
///
/// Returns `NoDetection` when fewer than six points are given or the eye
/// corners coincide
pub fn eye_aspect_ratio(contour: &[Point2]) -> Result<f64> {
    if contour.len() < EYE_CONTOUR_POINTS {
        return Err(Error::NoDetection("incomplete eye contour".to_string()));
    }

    let vertical = contour[1].distance(contour[5]) + contour[2].distance(contour[4]);
    let horizontal = contour[0].distance(contour[3]);
    if horizontal < EPSILON {
        return Err(Error::NoDetection("eye corners coincide".to_string()));
    }

    Ok(vertical / (2.0 * horizontal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::FaceLandmarks;

    fn eye(center_x: f64, openness: f64, iris_offset: f64) -> EyeLandmarks {
        // Corners 40 px apart, lids `openness` px from the axis
        let contour = vec![
            Point2::new(center_x - 20.0, 100.0),
            Point2::new(center_x - 7.0, 100.0 - openness),
            Point2::new(center_x + 7.0, 100.0 - openness),
            Point2::new(center_x + 20.0, 100.0),
            Point2::new(center_x + 7.0, 100.0 + openness),
            Point2::new(center_x - 7.0, 100.0 + openness),
        ];
        let iris_center = Point2::new(center_x + iris_offset, 100.0);
        let iris = vec![
            iris_center + Point2::new(-3.0, 0.0),
            iris_center + Point2::new(3.0, 0.0),
            iris_center + Point2::new(0.0, -3.0),
            iris_center + Point2::new(0.0, 3.0),
        ];
        EyeLandmarks { contour, iris }
    }

    fn frame(openness: f64, iris_offset: f64) -> LandmarkFrame {
        LandmarkFrame {
            timestamp: 1.0,
            face: Some(FaceLandmarks {
                left_eye: eye(200.0, openness, iris_offset),
                right_eye: eye(300.0, openness, iris_offset),
                confidence: 0.9,
            }),
            hand: None,
        }
    }

    #[test]
    fn test_centered_gaze() {
        let estimator = GazeEstimator::new(&GazeConfig::default());
        let sample = estimator.estimate(&frame(8.0, 0.0)).unwrap();
        assert!((sample.ratio_x - 0.5).abs() < 1e-9);
        assert!((sample.ratio_y - 0.5).abs() < 1e-9);
        assert!((sample.ear() - 0.4).abs() < 1e-9);
        assert_eq!(sample.timestamp, 1.0);
    }

    #[test]
    fn test_extreme_gaze_keeps_direction() {
        let mut config = GazeConfig::default();
        config.ratio_margin = 0.2;
        let estimator = GazeEstimator::new(&config);

        // Iris 30 px right of center in a 40 px wide eye
        let sample = estimator.estimate(&frame(8.0, 30.0)).unwrap();
        assert!((sample.ratio_x - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_closed_eyes_still_measured() {
        let estimator = GazeEstimator::new(&GazeConfig::default());
        let sample = estimator.estimate(&frame(0.0, 0.0)).unwrap();
        assert!(sample.ear() < 1e-9);
        assert!((sample.ratio_y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_face_is_no_detection() {
        let estimator = GazeEstimator::new(&GazeConfig::default());
        let result = estimator.estimate(&LandmarkFrame::empty(0.0));
        assert!(matches!(result, Err(Error::NoDetection(_))));
    }

    #[test]
    fn test_low_confidence_is_no_detection() {
        let estimator = GazeEstimator::new(&GazeConfig::default());
        let mut low = frame(8.0, 0.0);
        if let Some(face) = low.face.as_mut() {
            face.confidence = 0.1;
        }
        assert!(matches!(estimator.estimate(&low), Err(Error::NoDetection(_))));
    }

    #[test]
    fn test_coincident_corners_is_no_detection() {
        let contour = vec![Point2::new(10.0, 10.0); 6];
        assert!(matches!(
            eye_aspect_ratio(&contour),
            Err(Error::NoDetection(_))
        ));
    }
}
