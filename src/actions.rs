//! Actions dispatched to the desktop and the gesture binding table.

use crate::gestures::GestureKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mouse buttons the sinks can press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// X11 core protocol button number
    #[must_use]
    pub const fn x11_button(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 3,
        }
    }
}

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Browser-style history navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigateDirection {
    Back,
    Forward,
}

impl NavigateDirection {
    /// Key used to trigger the navigation
    #[must_use]
    pub const fn key_name(self) -> &'static str {
        match self {
            Self::Back => "alt+Left",
            Self::Forward => "alt+Right",
        }
    }
}

/// What an action does
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Move the cursor to a screen position
    Move { x: i32, y: i32 },
    /// Single click
    Click(MouseButton),
    /// Left double click
    DoubleClick,
    /// Right click
    ContextMenu,
    /// Wheel scroll by `amount` steps
    Scroll {
        direction: ScrollDirection,
        amount: i32,
    },
    /// History navigation
    Navigate(NavigateDirection),
    /// Return key
    Confirm,
    /// Named key (keysym name or a single character)
    Key(String),
}

impl ActionKind {
    /// Click, double click and context menu share the click gate
    #[must_use]
    pub const fn is_click(&self) -> bool {
        matches!(self, Self::Click(_) | Self::DoubleClick | Self::ContextMenu)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { x, y } => write!(f, "move({x}, {y})"),
            Self::Click(button) => write!(f, "click({button:?})"),
            Self::DoubleClick => f.write_str("double_click"),
            Self::ContextMenu => f.write_str("context_menu"),
            Self::Scroll { direction, amount } => write!(f, "scroll({direction:?}, {amount})"),
            Self::Navigate(direction) => write!(f, "navigate({direction:?})"),
            Self::Confirm => f.write_str("confirm"),
            Self::Key(name) => write!(f, "key({name})"),
        }
    }
}

/// Where an action originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionSource {
    Eye,
    Hand,
    Dwell,
    Manual,
}

/// An action ready for the sink
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub kind: ActionKind,
    pub source: ActionSource,
    /// Timestamp of the frame that produced the action (seconds)
    pub timestamp: f64,
}

impl ActionEvent {
    #[must_use]
    pub const fn new(kind: ActionKind, source: ActionSource, timestamp: f64) -> Self {
        Self {
            kind,
            source,
            timestamp,
        }
    }
}

/// Action a gesture can be bound to in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureAction {
    Click,
    DoubleClick,
    ContextMenu,
    ScrollUp,
    ScrollDown,
    NavigateBack,
    NavigateForward,
    Confirm,
}

impl GestureAction {
    /// Concrete action, using `scroll_amount` wheel steps for scrolls
    #[must_use]
    pub const fn to_action_kind(self, scroll_amount: i32) -> ActionKind {
        match self {
            Self::Click => ActionKind::Click(MouseButton::Left),
            Self::DoubleClick => ActionKind::DoubleClick,
            Self::ContextMenu => ActionKind::ContextMenu,
            Self::ScrollUp => ActionKind::Scroll {
                direction: ScrollDirection::Up,
                amount: scroll_amount,
            },
            Self::ScrollDown => ActionKind::Scroll {
                direction: ScrollDirection::Down,
                amount: scroll_amount,
            },
            Self::NavigateBack => ActionKind::Navigate(NavigateDirection::Back),
            Self::NavigateForward => ActionKind::Navigate(NavigateDirection::Forward),
            Self::Confirm => ActionKind::Confirm,
        }
    }
}

/// Gesture to action table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureBindings(BTreeMap<GestureKind, GestureAction>);

impl GestureBindings {
    /// Table without any binding
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Action bound to a gesture, if any
    #[must_use]
    pub fn get(&self, kind: GestureKind) -> Option<GestureAction> {
        self.0.get(&kind).copied()
    }

    /// Bind a gesture, replacing any previous binding
    pub fn bind(&mut self, kind: GestureKind, action: GestureAction) {
        self.0.insert(kind, action);
    }

    /// Remove a binding
    pub fn unbind(&mut self, kind: GestureKind) {
        self.0.remove(&kind);
    }

    /// Number of bound gestures
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings in gesture order
    pub fn iter(&self) -> impl Iterator<Item = (GestureKind, GestureAction)> + '_ {
        self.0.iter().map(|(k, a)| (*k, *a))
    }
}

impl Default for GestureBindings {
    fn default() -> Self {
        use GestureAction as A;
        use GestureKind as G;

        Self(BTreeMap::from([
            (G::SingleBlink, A::Click),
            (G::DoubleBlink, A::DoubleClick),
            (G::LongBlink, A::ContextMenu),
            (G::LookUp, A::ScrollUp),
            (G::LookDown, A::ScrollDown),
            (G::Fist, A::Click),
            (G::OpenPalm, A::ContextMenu),
            (G::Peace, A::DoubleClick),
            (G::ThumbsUp, A::ScrollUp),
            (G::ThumbsDown, A::ScrollDown),
            (G::OkSign, A::Confirm),
            (G::SwipeLeft, A::NavigateBack),
            (G::SwipeRight, A::NavigateForward),
            (G::SwipeUp, A::ScrollUp),
            (G::SwipeDown, A::ScrollDown),
        ]))
    }
}
