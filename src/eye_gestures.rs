//! Eye gesture state machine: blink patterns and directional gaze holds.
//!
//! Blinks are classified from the duration of each closure (EAR below the
//! blink threshold). A normal-length blink is held back for the double
//! blink interval so that a second blink can upgrade it to a double blink;
//! a long closure fires as soon as the eyes reopen. Directional gaze is
//! tracked independently from the gaze ratio and fires once the same
//! direction has been held long enough.

use crate::{
    config::EyeGestureConfig,
    constants::{GAZE_CENTER, TIME_EPSILON},
    cooldown::CooldownTracker,
    geometry::Point2,
    gestures::{GestureEvent, GestureKind},
};
use log::debug;

/// Blink tracking phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EyePhase {
    /// Eyes open, no blink pending
    Open,
    /// Eyes closed since the given time
    Closed { since: f64 },
    /// One blink seen; waiting for a second until `deadline`
    AwaitingSecond { deadline: f64 },
    /// Closed again while a first blink is pending
    ClosedAgain { since: f64, deadline: f64 },
}

/// Observable state of the blink machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeGestureState {
    /// Current phase
    pub phase: EyePhase,
    /// Timestamp of the last phase change
    pub last_transition: f64,
    /// Blinks counted in the current double-blink window
    pub blink_count: u32,
}

impl Default for EyeGestureState {
    fn default() -> Self {
        Self {
            phase: EyePhase::Open,
            last_transition: 0.0,
            blink_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DirectionHold {
    direction: GestureKind,
    since: f64,
}

/// Classifies EAR and gaze ratio streams into eye gestures
#[derive(Debug, Clone)]
pub struct EyeGestureMachine {
    config: EyeGestureConfig,
    state: EyeGestureState,
    hold: Option<DirectionHold>,
    cooldown: CooldownTracker<GestureKind>,
}

impl EyeGestureMachine {
    /// Create a machine with the given thresholds and cooldown (seconds)
    #[must_use]
    pub fn new(config: EyeGestureConfig, gesture_cooldown: f64) -> Self {
        Self {
            config,
            state: EyeGestureState::default(),
            hold: None,
            cooldown: CooldownTracker::new(gesture_cooldown),
        }
    }

    /// Feed one sample; returns the gestures completed by it
    pub fn update(&mut self, ear: f64, ratio: Point2, timestamp: f64) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        let closed = ear < self.config.blink_threshold;

        self.update_blink(closed, timestamp, &mut events);
        self.update_direction(closed, ratio, timestamp, &mut events);

        events
    }

    /// Current blink state
    #[must_use]
    pub const fn state(&self) -> &EyeGestureState {
        &self.state
    }

    /// Eyes are closed in the current phase
    #[must_use]
    pub const fn eyes_closed(&self) -> bool {
        matches!(
            self.state.phase,
            EyePhase::Closed { .. } | EyePhase::ClosedAgain { .. }
        )
    }

    /// Duration of the ongoing closure at `now`, 0 when the eyes are open
    #[must_use]
    pub fn current_closure(&self, now: f64) -> f64 {
        match self.state.phase {
            EyePhase::Closed { since } | EyePhase::ClosedAgain { since, .. } => (now - since).max(0.0),
            _ => 0.0,
        }
    }

    /// Return to the open phase and forget pending holds and cooldowns
    pub fn reset(&mut self) {
        self.state = EyeGestureState::default();
        self.hold = None;
        self.cooldown.reset();
    }

    fn update_blink(&mut self, closed: bool, now: f64, events: &mut Vec<GestureEvent>) {
        match self.state.phase {
            EyePhase::Open => {
                if closed {
                    self.transition(EyePhase::Closed { since: now }, now);
                }
            }
            EyePhase::Closed { since } => {
                if closed {
                    return;
                }
                let duration = now - since;
                if self.is_long(duration) {
                    self.emit(GestureKind::LongBlink, now, events);
                    self.finish(now);
                } else if self.is_blink(duration) {
                    self.state.blink_count = 1;
                    let deadline = now + self.config.double_blink_interval;
                    self.transition(EyePhase::AwaitingSecond { deadline }, now);
                } else {
                    debug!("Ignoring {:.3}s eye closure", duration);
                    self.transition(EyePhase::Open, now);
                }
            }
            EyePhase::AwaitingSecond { deadline } => {
                if now >= deadline - TIME_EPSILON {
                    self.emit(GestureKind::SingleBlink, now, events);
                    self.finish(now);
                    if closed {
                        self.transition(EyePhase::Closed { since: now }, now);
                    }
                } else if closed {
                    self.transition(EyePhase::ClosedAgain { since: now, deadline }, now);
                }
            }
            EyePhase::ClosedAgain { since, deadline } => {
                if closed {
                    return;
                }
                let duration = now - since;
                if self.is_long(duration) {
                    self.emit(GestureKind::SingleBlink, now, events);
                    self.emit(GestureKind::LongBlink, now, events);
                    self.finish(now);
                } else if self.is_blink(duration) {
                    self.state.blink_count = 2;
                    self.emit(GestureKind::DoubleBlink, now, events);
                    self.finish(now);
                } else if now >= deadline - TIME_EPSILON {
                    self.emit(GestureKind::SingleBlink, now, events);
                    self.finish(now);
                } else {
                    self.transition(EyePhase::AwaitingSecond { deadline }, now);
                }
            }
        }
    }

    fn update_direction(&mut self, closed: bool, ratio: Point2, now: f64, events: &mut Vec<GestureEvent>) {
        // The iris is not visible through closed lids
        let direction = if closed { None } else { self.classify_direction(ratio) };

        let Some(direction) = direction else {
            self.hold = None;
            return;
        };

        let since = match self.hold {
            Some(hold) if hold.direction == direction => hold.since,
            _ => {
                self.hold = Some(DirectionHold { direction, since: now });
                now
            }
        };

        if now - since >= self.config.gaze_hold_duration - TIME_EPSILON {
            self.emit(direction, now, events);
        }
    }

    fn classify_direction(&self, ratio: Point2) -> Option<GestureKind> {
        let dx = ratio.x - GAZE_CENTER;
        let dy = ratio.y - GAZE_CENTER;
        let excess_x = dx.abs() - self.config.gaze_direction_threshold;
        let excess_y = dy.abs() - self.config.gaze_direction_threshold;

        if excess_x <= 0.0 && excess_y <= 0.0 {
            return None;
        }

        let kind = if excess_x >= excess_y {
            if dx < 0.0 {
                GestureKind::LookLeft
            } else {
                GestureKind::LookRight
            }
        } else if dy < 0.0 {
            GestureKind::LookUp
        } else {
            GestureKind::LookDown
        };
        Some(kind)
    }

    fn is_long(&self, duration: f64) -> bool {
        duration >= self.config.long_blink_duration - TIME_EPSILON
    }

    fn is_blink(&self, duration: f64) -> bool {
        duration >= self.config.single_blink_min - TIME_EPSILON
    }

    fn emit(&mut self, kind: GestureKind, now: f64, events: &mut Vec<GestureEvent>) {
        if self.cooldown.try_fire(kind, now) {
            debug!("Eye gesture {} at {:.3}s", kind, now);
            events.push(GestureEvent::new(kind, now));
        } else {
            debug!("Eye gesture {} suppressed by cooldown", kind);
        }
    }

    fn finish(&mut self, now: f64) {
        self.state.blink_count = 0;
        self.transition(EyePhase::Open, now);
    }

    fn transition(&mut self, phase: EyePhase, now: f64) {
        self.state.phase = phase;
        self.state.last_transition = now;
    }
}
