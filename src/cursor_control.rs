//! Cursor and input control for X11-based systems.
//!
//! Pointer moves use `warp_pointer`; clicks, wheel steps and key presses are
//! injected through the XTEST extension.

use crate::{
    actions::MouseButton,
    sink::ActionSink,
    utils::safe_cast::{i32_to_i16_clamp, max_pixel_index},
    Error, Result,
};
use log::{debug, info};
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{
            ConnectionExt as _, Keycode, Keysym, Screen, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT,
            KEY_PRESS_EVENT, KEY_RELEASE_EVENT,
        },
        xtest::ConnectionExt as _,
    },
    rust_connection::RustConnection,
};

const XK_SHIFT_L: Keysym = 0xffe1;

/// Keysym for a key name: a few X11 names, modifiers, or one Latin-1 char
#[must_use]
pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    let keysym = match name.to_ascii_lowercase().as_str() {
        "return" | "enter" => 0xff0d,
        "backspace" => 0xff08,
        "tab" => 0xff09,
        "escape" | "esc" => 0xff1b,
        "left" => 0xff51,
        "up" => 0xff52,
        "right" => 0xff53,
        "down" => 0xff54,
        "page_up" | "prior" => 0xff55,
        "page_down" | "next" => 0xff56,
        "space" => 0x20,
        "shift" => XK_SHIFT_L,
        "ctrl" | "control" => 0xffe3,
        "alt" => 0xffe9,
        "super" => 0xffeb,
        _ => {
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() || !(' '..='~').contains(&c) {
                return None;
            }
            u32::from(c)
        }
    };
    Some(keysym)
}

/// X11 sink driving the real pointer and keyboard
pub struct CursorController {
    connection: RustConnection,
    screen: Screen,
    screen_width: u16,
    screen_height: u16,
    min_keycode: Keycode,
    keysyms_per_keycode: usize,
    keymap: Vec<Keysym>,
}

impl CursorController {
    /// Connect to the default display
    ///
    /// # Errors
    ///
    /// Returns `X11` if the display or its keyboard mapping is unavailable
    pub fn new() -> Result<Self> {
        info!("Initializing X11 cursor controller");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| Error::X11(format!("Failed to connect to X11: {e}")))?;

        let setup = connection.setup();
        let screen = setup
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::X11("Failed to get screen".to_string()))?
            .clone();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode.saturating_sub(min_keycode).saturating_add(1);

        let mapping = connection
            .get_keyboard_mapping(min_keycode, count)
            .map_err(|e| Error::X11(format!("Failed to request keyboard mapping: {e}")))?
            .reply()
            .map_err(|e| Error::X11(format!("Failed to read keyboard mapping: {e}")))?;

        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;
        info!(
            "Connected to X11 display, screen: {}x{}",
            screen_width, screen_height
        );

        Ok(Self {
            connection,
            screen,
            screen_width,
            screen_height,
            min_keycode,
            keysyms_per_keycode: usize::from(mapping.keysyms_per_keycode),
            keymap: mapping.keysyms,
        })
    }

    /// Screen dimensions in pixels
    #[must_use]
    pub const fn screen_size(&self) -> (u16, u16) {
        (self.screen_width, self.screen_height)
    }

    /// Keycode carrying `keysym` and whether it sits on the shifted level
    fn resolve(&self, keysym: Keysym) -> Option<(Keycode, bool)> {
        if self.keysyms_per_keycode == 0 {
            return None;
        }
        self.keymap
            .chunks(self.keysyms_per_keycode)
            .enumerate()
            .find_map(|(offset, syms)| {
                let level = syms.iter().take(2).position(|&s| s == keysym)?;
                let keycode = self.min_keycode.checked_add(u8::try_from(offset).ok()?)?;
                Some((keycode, level == 1))
            })
    }

    fn fake(&self, event_type: u8, detail: u8) -> Result<()> {
        self.connection
            .xtest_fake_input(event_type, detail, x11rb::CURRENT_TIME, self.screen.root, 0, 0, 0)
            .map_err(|e| Error::X11(format!("Failed to send fake input: {e}")))?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.connection
            .flush()
            .map_err(|e| Error::X11(format!("Failed to flush connection: {e}")))?;
        Ok(())
    }

    fn press_button(&self, button: u8) -> Result<()> {
        self.fake(BUTTON_PRESS_EVENT, button)?;
        self.fake(BUTTON_RELEASE_EVENT, button)
    }
}

impl ActionSink for CursorController {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let x = i32_to_i16_clamp(x.clamp(0, max_pixel_index(u32::from(self.screen_width))));
        let y = i32_to_i16_clamp(y.clamp(0, max_pixel_index(u32::from(self.screen_height))));

        debug!("Setting cursor position to ({}, {})", x, y);

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| Error::X11(format!("Failed to warp pointer: {e}")))?;
        self.flush()
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        debug!("Clicking {:?}", button);
        self.press_button(button.x11_button())?;
        self.flush()
    }

    fn double_click(&mut self) -> Result<()> {
        let button = MouseButton::Left.x11_button();
        self.press_button(button)?;
        self.press_button(button)?;
        self.flush()
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        // Wheel buttons: 4 up, 5 down, 6 left, 7 right
        let vertical = if dy > 0 { 4 } else { 5 };
        for _ in 0..dy.unsigned_abs() {
            self.press_button(vertical)?;
        }
        let horizontal = if dx > 0 { 7 } else { 6 };
        for _ in 0..dx.unsigned_abs() {
            self.press_button(horizontal)?;
        }
        self.flush()
    }

    fn key_action(&mut self, name: &str) -> Result<()> {
        let mut keys = Vec::new();
        for part in name.split('+').filter(|p| !p.is_empty()) {
            let keysym =
                keysym_from_name(part).ok_or_else(|| Error::Sink(format!("Unknown key: {part}")))?;
            let (keycode, shifted) = self
                .resolve(keysym)
                .ok_or_else(|| Error::Sink(format!("No keycode for key: {part}")))?;
            if shifted {
                if let Some((shift, _)) = self.resolve(XK_SHIFT_L) {
                    keys.push(shift);
                }
            }
            keys.push(keycode);
        }

        debug!("Pressing {} ({} keycodes)", name, keys.len());
        for &key in &keys {
            self.fake(KEY_PRESS_EVENT, key)?;
        }
        for &key in keys.iter().rev() {
            self.fake(KEY_RELEASE_EVENT, key)?;
        }
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires X11 display
    fn test_cursor_controller_creation() {
        let controller = CursorController::new();
        assert!(controller.is_ok() || controller.is_err());
    }

    #[test]
    fn test_keysym_names() {
        assert_eq!(keysym_from_name("Return"), Some(0xff0d));
        assert_eq!(keysym_from_name("alt"), Some(0xffe9));
        assert_eq!(keysym_from_name("a"), Some(0x61));
        assert_eq!(keysym_from_name("?"), Some(0x3f));
        assert_eq!(keysym_from_name("NotAKey"), None);
    }
}
