//! Output side of the pipeline: where actions end up.
//!
//! The core only ever pushes commands into an [`ActionSink`]; it never
//! queries the desktop. The X11 implementation lives in
//! [`crate::cursor_control`].

use crate::{
    actions::{ActionEvent, ActionKind, MouseButton, ScrollDirection},
    Result,
};
use log::{debug, info};

/// Receiver of desktop input commands
pub trait ActionSink {
    /// Move the pointer to absolute screen coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press and release a button
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered
    fn click(&mut self, button: MouseButton) -> Result<()>;

    /// Two left clicks in quick succession
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered
    fn double_click(&mut self) -> Result<()>;

    /// Scroll by wheel steps; positive `dy` scrolls up, positive `dx` right
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered
    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()>;

    /// Press a named key or `+`-joined combination such as `alt+Left`
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or cannot be delivered
    fn key_action(&mut self, name: &str) -> Result<()>;
}

/// Route one action event to the matching sink call
///
/// # Errors
///
/// Returns whatever the sink reports
pub fn dispatch(sink: &mut dyn ActionSink, event: &ActionEvent) -> Result<()> {
    match &event.kind {
        ActionKind::Move { x, y } => sink.move_to(*x, *y),
        ActionKind::Click(button) => sink.click(*button),
        ActionKind::DoubleClick => sink.double_click(),
        ActionKind::ContextMenu => sink.click(MouseButton::Right),
        ActionKind::Scroll { direction, amount } => match direction {
            ScrollDirection::Up => sink.scroll(0, *amount),
            ScrollDirection::Down => sink.scroll(0, -*amount),
        },
        ActionKind::Navigate(direction) => sink.key_action(direction.key_name()),
        ActionKind::Confirm => sink.key_action("Return"),
        ActionKind::Key(name) => sink.key_action(name),
    }
}

/// Sink that only logs, for dry runs and replays
#[derive(Debug, Default)]
pub struct LogSink {
    moves: usize,
}

impl LogSink {
    #[must_use]
    pub const fn new() -> Self {
        Self { moves: 0 }
    }

    /// Pointer moves seen so far
    #[must_use]
    pub const fn moves(&self) -> usize {
        self.moves
    }
}

impl ActionSink for LogSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.moves += 1;
        debug!("move_to({x}, {y})");
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        info!("click {button:?}");
        Ok(())
    }

    fn double_click(&mut self) -> Result<()> {
        info!("double click");
        Ok(())
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        info!("scroll dx={dx} dy={dy}");
        Ok(())
    }

    fn key_action(&mut self, name: &str) -> Result<()> {
        info!("key {name}");
        Ok(())
    }
}

/// A call received by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    MoveTo(i32, i32),
    Click(MouseButton),
    DoubleClick,
    Scroll(i32, i32),
    Key(String),
}

/// Sink that remembers every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    /// When set, every call fails with this message after being recorded
    pub fail_with: Option<String>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls other than pointer moves
    pub fn non_moves(&self) -> impl Iterator<Item = &SinkCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, SinkCall::MoveTo(..)))
    }

    /// Last pointer position sent
    #[must_use]
    pub fn last_move(&self) -> Option<(i32, i32)> {
        self.calls.iter().rev().find_map(|c| match c {
            SinkCall::MoveTo(x, y) => Some((*x, *y)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: SinkCall) -> Result<()> {
        self.calls.push(call);
        match &self.fail_with {
            Some(message) => Err(crate::Error::Sink(message.clone())),
            None => Ok(()),
        }
    }
}

impl ActionSink for RecordingSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(SinkCall::MoveTo(x, y))
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.record(SinkCall::Click(button))
    }

    fn double_click(&mut self) -> Result<()> {
        self.record(SinkCall::DoubleClick)
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.record(SinkCall::Scroll(dx, dy))
    }

    fn key_action(&mut self, name: &str) -> Result<()> {
        self.record(SinkCall::Key(name.to_string()))
    }
}
