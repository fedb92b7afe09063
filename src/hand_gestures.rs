//! Hand gesture recognition from 21-joint hand landmarks.
//!
//! Static gestures come from which fingers are extended. Swipes come from
//! the palm center trajectory over a short time window.

use crate::{
    config::HandGestureConfig,
    cooldown::CooldownTracker,
    geometry::Point2,
    gestures::{GestureEvent, GestureKind},
    landmarks::{HandJoint, HandLandmarks},
};
use log::debug;
use std::collections::VecDeque;

/// Extension state of each finger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    /// Measure finger extension against the palm center
    ///
    /// A finger is extended when its tip is farther from the palm center
    /// than its reference joint. Returns `None` for incomplete hands.
    #[must_use]
    pub fn from_landmarks(hand: &HandLandmarks) -> Option<Self> {
        if !hand.is_complete() {
            return None;
        }
        let palm = hand.palm_center()?;
        let extended = |tip: HandJoint, reference: HandJoint| -> Option<bool> {
            Some(hand.joint(tip)?.distance(palm) > hand.joint(reference)?.distance(palm))
        };

        Some(Self {
            thumb: extended(HandJoint::ThumbTip, HandJoint::ThumbIp)?,
            index: extended(HandJoint::IndexTip, HandJoint::IndexPip)?,
            middle: extended(HandJoint::MiddleTip, HandJoint::MiddlePip)?,
            ring: extended(HandJoint::RingTip, HandJoint::RingPip)?,
            pinky: extended(HandJoint::PinkyTip, HandJoint::PinkyPip)?,
        })
    }

    /// Number of extended fingers
    #[must_use]
    pub fn count(self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .into_iter()
            .filter(|&e| e)
            .count()
    }
}

/// Classify a single frame into a static gesture
#[must_use]
pub fn classify_static(hand: &HandLandmarks, ok_sign_ratio: f64) -> Option<GestureKind> {
    let fingers = FingerStates::from_landmarks(hand)?;
    let wrist = hand.joint(HandJoint::Wrist)?;
    let middle_mcp = hand.joint(HandJoint::MiddleMcp)?;
    let thumb_tip = hand.joint(HandJoint::ThumbTip)?;
    let index_tip = hand.joint(HandJoint::IndexTip)?;

    let palm_size = wrist.distance(middle_mcp);
    if palm_size > 0.0
        && thumb_tip.distance(index_tip) < ok_sign_ratio * palm_size
        && fingers.middle
        && fingers.ring
        && fingers.pinky
    {
        return Some(GestureKind::OkSign);
    }

    let FingerStates {
        thumb,
        index,
        middle,
        ring,
        pinky,
    } = fingers;

    match (thumb, index, middle, ring, pinky) {
        (false, false, false, false, false) => Some(GestureKind::Fist),
        (true, true, true, true, true) => Some(GestureKind::OpenPalm),
        (false, true, false, false, false) => Some(GestureKind::Point),
        (false, true, true, false, false) => Some(GestureKind::Peace),
        (true, false, false, false, false) => {
            if thumb_tip.y < wrist.y {
                Some(GestureKind::ThumbsUp)
            } else {
                Some(GestureKind::ThumbsDown)
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct TimedPoint {
    position: Point2,
    timestamp: f64,
}

/// Recent palm center positions for swipe detection
#[derive(Debug, Clone)]
pub struct HandGestureBuffer {
    samples: VecDeque<TimedPoint>,
    capacity: usize,
    window: f64,
}

impl HandGestureBuffer {
    #[must_use]
    pub fn new(capacity: usize, window: f64) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            window,
        }
    }

    /// Append a position and trim samples
    ///
    /// An old sample is evicted only while the remainder still spans the
    /// window, so a buffer that spans the window keeps doing so.
    pub fn push(&mut self, position: Point2, timestamp: f64) {
        self.samples.push_back(TimedPoint { position, timestamp });

        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        while self.samples.len() > 2 && timestamp - self.samples[1].timestamp >= self.window {
            self.samples.pop_front();
        }
    }

    /// Time between the oldest and newest sample
    #[must_use]
    pub fn span(&self) -> f64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// The buffer covers a full swipe window
    #[must_use]
    pub fn spans_window(&self) -> bool {
        self.samples.len() >= 2 && self.span() >= self.window - crate::constants::TIME_EPSILON
    }

    /// Vector from the oldest to the newest sample
    #[must_use]
    pub fn net_displacement(&self) -> Point2 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.position - first.position,
            _ => Point2::default(),
        }
    }

    /// Sum of the distances between consecutive samples
    #[must_use]
    pub fn path_length(&self) -> f64 {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| a.position.distance(b.position))
            .sum()
    }

    /// Net displacement over path length, 0 for a stationary hand
    #[must_use]
    pub fn straightness(&self) -> f64 {
        let path = self.path_length();
        if path <= 0.0 {
            0.0
        } else {
            self.net_displacement().length() / path
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Static and dynamic hand gesture recognizer
#[derive(Debug, Clone)]
pub struct HandGestureRecognizer {
    config: HandGestureConfig,
    buffer: HandGestureBuffer,
    candidate: Option<GestureKind>,
    stable_frames: usize,
    cooldown: CooldownTracker<GestureKind>,
}

impl HandGestureRecognizer {
    #[must_use]
    pub fn new(config: HandGestureConfig, gesture_cooldown: f64) -> Self {
        let buffer = HandGestureBuffer::new(config.swipe_buffer_capacity, config.swipe_window);
        Self {
            config,
            buffer,
            candidate: None,
            stable_frames: 0,
            cooldown: CooldownTracker::new(gesture_cooldown),
        }
    }

    /// Feed one frame with a detected hand
    pub fn update(&mut self, hand: &HandLandmarks, timestamp: f64) -> Vec<GestureEvent> {
        let Some(palm) = hand.palm_center().filter(|_| hand.is_complete()) else {
            self.on_hand_lost();
            return Vec::new();
        };

        self.buffer.push(palm, timestamp);
        let stable = self.track_static(classify_static(hand, self.config.ok_sign_ratio));

        if let Some(swipe) = self.detect_swipe() {
            self.buffer.clear();
            return self.fire(swipe, timestamp).into_iter().collect();
        }

        stable
            .and_then(|kind| self.fire(kind, timestamp))
            .into_iter()
            .collect()
    }

    /// Forget the trajectory and the static candidate
    pub fn on_hand_lost(&mut self) {
        self.buffer.clear();
        self.candidate = None;
        self.stable_frames = 0;
    }

    /// Full reset including cooldowns
    pub fn reset(&mut self) {
        self.on_hand_lost();
        self.cooldown.reset();
    }

    #[must_use]
    pub const fn buffer(&self) -> &HandGestureBuffer {
        &self.buffer
    }

    fn track_static(&mut self, kind: Option<GestureKind>) -> Option<GestureKind> {
        if kind.is_some() && kind == self.candidate {
            self.stable_frames += 1;
        } else {
            self.candidate = kind;
            self.stable_frames = usize::from(kind.is_some());
        }

        if self.stable_frames >= self.config.static_hold_frames {
            self.candidate
        } else {
            None
        }
    }

    fn detect_swipe(&self) -> Option<GestureKind> {
        if !self.buffer.spans_window() {
            return None;
        }

        let net = self.buffer.net_displacement();
        if net.length() <= self.config.swipe_threshold
            || self.buffer.straightness() < self.config.swipe_straightness
        {
            return None;
        }

        let kind = if net.x.abs() >= net.y.abs() {
            if net.x > 0.0 {
                GestureKind::SwipeRight
            } else {
                GestureKind::SwipeLeft
            }
        } else if net.y < 0.0 {
            GestureKind::SwipeUp
        } else {
            GestureKind::SwipeDown
        };
        Some(kind)
    }

    fn fire(&mut self, kind: GestureKind, timestamp: f64) -> Option<GestureEvent> {
        if self.cooldown.try_fire(kind, timestamp) {
            debug!("Hand gesture {} at {:.3}s", kind, timestamp);
            Some(GestureEvent::new(kind, timestamp))
        } else {
            None
        }
    }
}
