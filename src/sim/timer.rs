//! Countdown and periodic timers
//!
//! Every timed effect in the simulation is one of these two shapes: a
//! countdown that runs to zero, or an accumulator that fires once per period.

use serde::{Deserialize, Serialize};

/// A countdown in milliseconds that never goes negative
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining_ms: f32,
}

impl Countdown {
    pub fn new(ms: f32) -> Self {
        Self {
            remaining_ms: ms.max(0.0),
        }
    }

    /// Overwrite the remaining time
    pub fn set(&mut self, ms: f32) {
        self.remaining_ms = ms.max(0.0);
    }

    /// Raise the remaining time to `ms` if it is currently lower
    ///
    /// Re-applying the same duration never stacks beyond it.
    pub fn extend_to(&mut self, ms: f32) {
        self.remaining_ms = self.remaining_ms.max(ms);
    }

    /// Advance by `dt_ms`, clamping at zero
    pub fn tick(&mut self, dt_ms: f32) {
        self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
    }

    pub fn clear(&mut self) {
        self.remaining_ms = 0.0;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }

    #[inline]
    pub fn expired(&self) -> bool {
        !self.is_active()
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining_ms
    }
}

/// Accumulates elapsed time and reports whole periods
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Accumulator {
    elapsed_ms: f32,
}

impl Accumulator {
    /// Add `dt_ms` and return how many full periods elapsed, keeping the
    /// remainder. Several periods may fire from a single large step.
    pub fn drain_periods(&mut self, dt_ms: f32, period_ms: f32) -> u32 {
        if period_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        let mut fired = 0;
        while self.elapsed_ms >= period_ms {
            self.elapsed_ms -= period_ms;
            fired += 1;
        }
        fired
    }

    /// Add `dt_ms` and fire at most once; the accumulator restarts from zero
    /// after firing.
    pub fn fire_once(&mut self, dt_ms: f32, period_ms: f32) -> bool {
        self.elapsed_ms += dt_ms.max(0.0);
        if self.elapsed_ms >= period_ms {
            self.elapsed_ms = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_ms
    }
}
