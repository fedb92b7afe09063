//! Per-kind cooldown bookkeeping shared by the gesture recognizers.

use crate::constants::TIME_EPSILON;
use std::{collections::HashMap, hash::Hash};

/// Remembers when each event kind last fired
#[derive(Debug, Clone)]
pub struct CooldownTracker<K> {
    cooldown: f64,
    last_fired: HashMap<K, f64>,
}

impl<K: Copy + Eq + Hash> CooldownTracker<K> {
    /// Create a tracker with the given cooldown in seconds
    #[must_use]
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown,
            last_fired: HashMap::new(),
        }
    }

    /// The kind may fire at `now`
    #[must_use]
    pub fn is_ready(&self, kind: K, now: f64) -> bool {
        self.last_fired
            .get(&kind)
            .map_or(true, |&last| now - last >= self.cooldown - TIME_EPSILON)
    }

    /// Record a firing at `now` if the kind is ready; returns whether it fired
    pub fn try_fire(&mut self, kind: K, now: f64) -> bool {
        if self.is_ready(kind, now) {
            self.last_fired.insert(kind, now);
            true
        } else {
            false
        }
    }

    /// Forget every firing
    pub fn reset(&mut self) {
        self.last_fired.clear();
    }

    /// Configured cooldown in seconds
    #[must_use]
    pub const fn cooldown(&self) -> f64 {
        self.cooldown
    }
}
