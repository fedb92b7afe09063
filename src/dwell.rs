//! Dwell detection: a click fires when the cursor rests in one place.

use crate::{constants::TIME_EPSILON, geometry::Point2};

/// Tracks how long the cursor has stayed near an anchor point
#[derive(Debug, Clone)]
pub struct DwellDetector {
    dwell_time: f64,
    tolerance: f64,
    anchor: Option<Point2>,
    since: f64,
    armed: bool,
    progress: f64,
}

impl DwellDetector {
    /// `dwell_time` in seconds, `tolerance` in pixels
    #[must_use]
    pub fn new(dwell_time: f64, tolerance: f64) -> Self {
        Self {
            dwell_time,
            tolerance,
            anchor: None,
            since: 0.0,
            armed: true,
            progress: 0.0,
        }
    }

    /// Feed a cursor position; returns `true` when a dwell completes
    ///
    /// After firing, the cursor must leave the tolerance radius before the
    /// next dwell can start.
    pub fn update(&mut self, position: Point2, timestamp: f64) -> bool {
        let Some(anchor) = self.anchor else {
            self.restart(position, timestamp);
            return false;
        };

        if position.distance(anchor) > self.tolerance {
            self.restart(position, timestamp);
            self.armed = true;
            return false;
        }

        if !self.armed {
            self.progress = 0.0;
            return false;
        }

        let elapsed = timestamp - self.since;
        self.progress = if self.dwell_time > 0.0 {
            (elapsed / self.dwell_time).clamp(0.0, 1.0)
        } else {
            1.0
        };

        if elapsed >= self.dwell_time - TIME_EPSILON {
            self.armed = false;
            self.progress = 0.0;
            return true;
        }
        false
    }

    /// Fraction of the dwell time elapsed, in `[0, 1]`
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// A dwell can fire without leaving the current spot first
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Change the dwell time; a dwell in progress keeps its start time
    pub fn set_dwell_time(&mut self, dwell_time: f64) {
        self.dwell_time = dwell_time;
    }

    #[must_use]
    pub const fn dwell_time(&self) -> f64 {
        self.dwell_time
    }

    pub fn reset(&mut self) {
        self.anchor = None;
        self.armed = true;
        self.progress = 0.0;
    }

    fn restart(&mut self, position: Point2, timestamp: f64) {
        self.anchor = Some(position);
        self.since = timestamp;
        self.progress = 0.0;
    }
}
