//! Landmark frames consumed by the pipeline and the sources that produce them.
//!
//! The landmark detector is an external component. It reports, per video
//! frame, the eye contour and iris points of one face and the 21 joints of
//! one hand, each region with a confidence score. Missing regions are
//! `None`; the core treats them as "no face" / "no hand" for that frame.

use crate::{constants::NUM_HAND_JOINTS, geometry::Point2, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, path::Path};

/// Landmarks of a single eye
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EyeLandmarks {
    /// Six contour points in EAR order `p1..p6`; `p1` and `p4` are the corners
    pub contour: Vec<Point2>,
    /// Iris boundary points
    pub iris: Vec<Point2>,
}

/// Face region of a landmark frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Eye on the left side of the image
    pub left_eye: EyeLandmarks,
    /// Eye on the right side of the image
    pub right_eye: EyeLandmarks,
    /// Detector confidence for the face region (0.0-1.0)
    pub confidence: f32,
}

/// Named hand joints, in detector order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum HandJoint {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

/// Hand region of a landmark frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    /// 21 joints in detector order, pixel coordinates
    pub joints: Vec<Point2>,
    /// Detector confidence for the hand region (0.0-1.0)
    pub confidence: f32,
}

impl HandLandmarks {
    /// Position of a named joint, `None` if the detector omitted it
    #[must_use]
    pub fn joint(&self, joint: HandJoint) -> Option<Point2> {
        self.joints.get(joint as usize).copied()
    }

    /// All joints are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.joints.len() >= NUM_HAND_JOINTS && self.joints.iter().all(|p| p.is_finite())
    }

    /// Palm center: midpoint of the wrist and the middle finger knuckle
    #[must_use]
    pub fn palm_center(&self) -> Option<Point2> {
        let wrist = self.joint(HandJoint::Wrist)?;
        let middle_mcp = self.joint(HandJoint::MiddleMcp)?;
        Some(wrist.midpoint(middle_mcp))
    }
}

/// One frame of detector output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time in seconds (monotonic)
    pub timestamp: f64,
    /// Face region, absent when no face was found
    #[serde(default)]
    pub face: Option<FaceLandmarks>,
    /// Hand region, absent when no hand was found
    #[serde(default)]
    pub hand: Option<HandLandmarks>,
}

impl LandmarkFrame {
    /// A frame where the detector found nothing
    #[must_use]
    pub const fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            face: None,
            hand: None,
        }
    }
}

/// Producer of landmark frames
pub trait LandmarkSource {
    /// Next frame, `None` when the stream has ended
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

/// Replays recorded frames, e.g. a dump from an external detector
#[derive(Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<LandmarkFrame>,
}

impl ReplaySource {
    /// Replay the given frames in order
    #[must_use]
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Load a YAML list of frames
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let frames: Vec<LandmarkFrame> = serde_yaml::from_str(&content)?;
        info!(
            "Loaded {} landmark frames from {}",
            frames.len(),
            path.as_ref().display()
        );
        Ok(Self::new(frames))
    }

    /// Frames left to replay
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_hand() -> HandLandmarks {
        HandLandmarks {
            joints: (0..NUM_HAND_JOINTS)
                .map(|i| Point2::new(100.0, 300.0 - 10.0 * i as f64))
                .collect(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_palm_center() {
        let hand = straight_hand();
        let center = hand.palm_center().unwrap();
        assert_eq!(center, Point2::new(100.0, 255.0));
        assert!(hand.is_complete());
    }

    #[test]
    fn test_incomplete_hand() {
        let mut hand = straight_hand();
        hand.joints.truncate(10);
        assert!(!hand.is_complete());
        assert!(hand.joint(HandJoint::PinkyTip).is_none());
    }

    #[test]
    fn test_replay_source_parses_yaml() {
        let yaml = r"
- timestamp: 0.0
- timestamp: 0.033
  hand:
    joints: [{x: 1.0, y: 2.0}]
    confidence: 0.8
";
        let frames: Vec<LandmarkFrame> = serde_yaml::from_str(yaml).unwrap();
        let mut source = ReplaySource::new(frames);
        assert_eq!(source.remaining(), 2);

        let first = source.next_frame().unwrap().unwrap();
        assert!(first.face.is_none());
        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.hand.unwrap().joints.len(), 1);
        assert!(source.next_frame().unwrap().is_none());
    }
}
