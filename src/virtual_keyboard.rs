//! Gaze-typed on-screen keyboard model.
//!
//! Only geometry and typing state live here; drawing is left to whatever
//! overlay shows the keyboard. A key activates after the gaze has rested on
//! it for the configured dwell time. `ENTER` types the collected text into
//! the focused window as key actions.

use crate::{
    actions::ActionKind, config::KeyboardConfig, constants::TIME_EPSILON, geometry::Point2,
};
use log::{debug, info};

const LAYOUT: [&[&str]; 5] = [
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"],
    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L", ";"],
    &["Z", "X", "C", "V", "B", "N", "M", ",", ".", "?"],
    &["SPACE", "BACK", "CLEAR", "ENTER"],
];

/// What a key does when activated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFunction {
    Char(char),
    Space,
    Back,
    Clear,
    Enter,
}

impl KeyFunction {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "SPACE" => Some(Self::Space),
            "BACK" => Some(Self::Back),
            "CLEAR" => Some(Self::Clear),
            "ENTER" => Some(Self::Enter),
            other => {
                let mut chars = other.chars();
                let c = chars.next()?;
                chars.next().is_none().then_some(Self::Char(c))
            }
        }
    }

    /// Width in regular key widths
    const fn width_units(self) -> i32 {
        match self {
            Self::Space => 3,
            Self::Back | Self::Clear | Self::Enter => 2,
            Self::Char(_) => 1,
        }
    }
}

/// A key and its screen rectangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualKey {
    pub label: &'static str,
    pub function: KeyFunction,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl VirtualKey {
    /// Point lies inside the key, edges included
    #[must_use]
    pub fn contains(&self, point: Point2) -> bool {
        point.x >= f64::from(self.x)
            && point.x <= f64::from(self.x + self.width)
            && point.y >= f64::from(self.y)
            && point.y <= f64::from(self.y + self.height)
    }
}

/// Result of a key activation
#[derive(Debug, Clone, PartialEq)]
pub struct KeyActivation {
    pub function: KeyFunction,
    /// Key actions to send to the desktop (only `ENTER` produces any)
    pub actions: Vec<ActionKind>,
}

#[derive(Debug, Clone, Copy)]
struct Hover {
    key: usize,
    since: f64,
    fired: bool,
}

/// Dwell-activated virtual keyboard
#[derive(Debug, Clone)]
pub struct VirtualKeyboard {
    keys: Vec<VirtualKey>,
    dwell_time: f64,
    visible: bool,
    hover: Option<Hover>,
    progress: f64,
    text: String,
}

impl VirtualKeyboard {
    #[must_use]
    pub fn new(config: &KeyboardConfig) -> Self {
        let [origin_x, origin_y] = config.origin;
        let [key_width, key_height] = config.key_size;

        let mut keys = Vec::new();
        let mut y = origin_y;
        for row in LAYOUT {
            let mut x = origin_x;
            for &label in row {
                let Some(function) = KeyFunction::from_label(label) else {
                    continue;
                };
                let width = key_width * function.width_units();
                keys.push(VirtualKey {
                    label,
                    function,
                    x,
                    y,
                    width,
                    height: key_height,
                });
                x += width + config.spacing;
            }
            y += key_height + config.spacing;
        }

        Self {
            keys,
            dwell_time: config.dwell_time,
            visible: config.visible,
            hover: None,
            progress: 0.0,
            text: String::new(),
        }
    }

    /// Feed the gaze position; returns the activation this frame, if any
    ///
    /// A key fires once per hover; the gaze must move to another key (or off
    /// the keyboard) before it can fire again.
    pub fn update(&mut self, position: Option<Point2>, timestamp: f64) -> Option<KeyActivation> {
        if !self.visible {
            return None;
        }

        let hovered = position.and_then(|p| self.keys.iter().position(|k| k.contains(p)));
        let Some(key) = hovered else {
            self.hover = None;
            self.progress = 0.0;
            return None;
        };

        let hover = match self.hover {
            Some(h) if h.key == key => h,
            _ => Hover {
                key,
                since: timestamp,
                fired: false,
            },
        };

        let elapsed = timestamp - hover.since;
        if hover.fired {
            self.hover = Some(hover);
            self.progress = 0.0;
            return None;
        }

        if elapsed >= self.dwell_time - TIME_EPSILON {
            self.hover = Some(Hover { fired: true, ..hover });
            self.progress = 0.0;
            return Some(self.activate(key));
        }

        self.hover = Some(hover);
        self.progress = (elapsed / self.dwell_time).clamp(0.0, 1.0);
        None
    }

    fn activate(&mut self, key: usize) -> KeyActivation {
        let function = self.keys[key].function;
        let mut actions = Vec::new();

        match function {
            KeyFunction::Char(c) => self.text.push(c),
            KeyFunction::Space => self.text.push(' '),
            KeyFunction::Back => {
                self.text.pop();
            }
            KeyFunction::Clear => self.text.clear(),
            KeyFunction::Enter => {
                actions = self
                    .text
                    .chars()
                    .map(|c| {
                        if c == ' ' {
                            ActionKind::Key("space".to_string())
                        } else {
                            ActionKind::Key(c.to_string())
                        }
                    })
                    .collect();
                if !self.text.is_empty() {
                    info!("Typing {} characters from the virtual keyboard", self.text.len());
                }
                self.text.clear();
            }
        }

        debug!("Virtual key {} activated", self.keys[key].label);
        KeyActivation { function, actions }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.hover = None;
        self.progress = 0.0;
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Dwell progress on the hovered key, in `[0, 1]`
    #[must_use]
    pub const fn hover_progress(&self) -> f64 {
        self.progress
    }

    /// Key under `point`, `None` while hidden
    #[must_use]
    pub fn key_at(&self, point: Point2) -> Option<&VirtualKey> {
        if !self.visible {
            return None;
        }
        self.keys.iter().find(|k| k.contains(point))
    }

    /// Label of the hovered key
    #[must_use]
    pub fn hovered_key(&self) -> Option<&VirtualKey> {
        self.hover.and_then(|h| self.keys.get(h.key))
    }

    /// Text typed so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    #[must_use]
    pub fn keys(&self) -> &[VirtualKey] {
        &self.keys
    }
}
