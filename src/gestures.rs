//! Closed set of gesture kinds emitted by the eye and hand recognizers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognizer a gesture comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureSource {
    Eye,
    Hand,
}

/// Every gesture the recognizers can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    // Eye gestures
    SingleBlink,
    DoubleBlink,
    LongBlink,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,

    // Static hand gestures
    Fist,
    OpenPalm,
    Point,
    Peace,
    ThumbsUp,
    ThumbsDown,
    OkSign,

    // Dynamic hand gestures
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
}

impl GestureKind {
    /// All gesture kinds, eye gestures first
    pub const ALL: [Self; 18] = [
        Self::SingleBlink,
        Self::DoubleBlink,
        Self::LongBlink,
        Self::LookLeft,
        Self::LookRight,
        Self::LookUp,
        Self::LookDown,
        Self::Fist,
        Self::OpenPalm,
        Self::Point,
        Self::Peace,
        Self::ThumbsUp,
        Self::ThumbsDown,
        Self::OkSign,
        Self::SwipeLeft,
        Self::SwipeRight,
        Self::SwipeUp,
        Self::SwipeDown,
    ];

    /// Recognizer that emits this kind
    #[must_use]
    pub const fn source(self) -> GestureSource {
        match self {
            Self::SingleBlink
            | Self::DoubleBlink
            | Self::LongBlink
            | Self::LookLeft
            | Self::LookRight
            | Self::LookUp
            | Self::LookDown => GestureSource::Eye,
            _ => GestureSource::Hand,
        }
    }

    /// String representation for logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleBlink => "single_blink",
            Self::DoubleBlink => "double_blink",
            Self::LongBlink => "long_blink",
            Self::LookLeft => "look_left",
            Self::LookRight => "look_right",
            Self::LookUp => "look_up",
            Self::LookDown => "look_down",
            Self::Fist => "fist",
            Self::OpenPalm => "open_palm",
            Self::Point => "point",
            Self::Peace => "peace",
            Self::ThumbsUp => "thumbs_up",
            Self::ThumbsDown => "thumbs_down",
            Self::OkSign => "ok_sign",
            Self::SwipeLeft => "swipe_left",
            Self::SwipeRight => "swipe_right",
            Self::SwipeUp => "swipe_up",
            Self::SwipeDown => "swipe_down",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    /// What was recognized
    pub kind: GestureKind,
    /// Timestamp of the sample that completed the gesture (seconds)
    pub timestamp: f64,
}

impl GestureEvent {
    #[must_use]
    pub const fn new(kind: GestureKind, timestamp: f64) -> Self {
        Self { kind, timestamp }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources() {
        assert_eq!(GestureKind::DoubleBlink.source(), GestureSource::Eye);
        assert_eq!(GestureKind::LookDown.source(), GestureSource::Eye);
        assert_eq!(GestureKind::OkSign.source(), GestureSource::Hand);
        assert_eq!(GestureKind::SwipeUp.source(), GestureSource::Hand);
    }

    #[test]
    fn test_names_match_serde() {
        for kind in GestureKind::ALL {
            let yaml = serde_yaml::to_string(&kind).unwrap();
            assert_eq!(yaml.trim(), kind.as_str());
        }
    }
}
