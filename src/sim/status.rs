//! Timed status effects on the player
//!
//! Stun, slow and freeze gate movement; toxicity, suffocation and acid rain
//! deal damage on one-second periods; snow schedules freezes at random.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::timer::{Accumulator, Countdown};
use crate::consts::{DAMAGE_PERIOD_MS, O2_EPSILON};
use crate::stages::{AcidRain, Snow};

/// Every timer hanging off the player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    pub invuln: Countdown,
    pub stun: Countdown,
    pub slow: Countdown,
    pub freeze: Countdown,
    /// Time until the next snow freeze (snow stages only)
    pub next_freeze: Countdown,
    pub toxic: Countdown,
    pub toxic_tick: Accumulator,
    /// Position inside the acid on/off cycle
    pub acid_cycle_ms: f32,
    pub acid_on: bool,
    pub acid_damage: Accumulator,
    pub suffocating: bool,
    pub suffocation: Accumulator,
    pub periodic_o2: Accumulator,
    pub plant_cooldown: Countdown,
    pub water_cooldown: Countdown,
}

impl StatusEffects {
    /// Advance the plain countdowns. Damage-over-time timers are advanced by
    /// their own functions since they report damage.
    pub fn tick(&mut self, dt_ms: f32) {
        self.invuln.tick(dt_ms);
        self.stun.tick(dt_ms);
        self.slow.tick(dt_ms);
        self.freeze.tick(dt_ms);
        self.plant_cooldown.tick(dt_ms);
        self.water_cooldown.tick(dt_ms);
    }

    /// Slow only reduces speed; stun and freeze block every action
    pub fn can_act(&self) -> bool {
        self.stun.expired() && self.freeze.expired()
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln.is_active()
    }

    /// Multiplier applied to the horizontal speed cap
    pub fn speed_multiplier(&self, slow_mul: f32) -> f32 {
        if !self.can_act() {
            0.0
        } else if self.slow.is_active() {
            slow_mul
        } else {
            1.0
        }
    }

    /// Refresh the toxicity timer, keeping the tick phase if already running
    pub fn refresh_toxic(&mut self, ms: f32) {
        if self.toxic.expired() {
            self.toxic_tick.reset();
        }
        self.toxic.set(ms);
    }
}

/// Advance toxicity; returns the damage to apply this tick
pub fn tick_toxicity(status: &mut StatusEffects, dt_ms: f32, damage_per_period: f32) -> f32 {
    if status.toxic.expired() {
        return 0.0;
    }
    let active_ms = dt_ms.min(status.toxic.remaining());
    let periods = status.toxic_tick.drain_periods(active_ms, DAMAGE_PERIOD_MS);
    status.toxic.tick(dt_ms);
    if status.toxic.expired() {
        status.toxic_tick.reset();
    }
    periods as f32 * damage_per_period
}

/// Advance suffocation; returns true when an HP loss is due
///
/// One hit per full second spent at empty oxygen. The accumulator restarts
/// after each hit and whenever oxygen comes back.
pub fn tick_suffocation(status: &mut StatusEffects, o2: f32, dt_ms: f32) -> bool {
    status.suffocating = o2 <= O2_EPSILON;
    if !status.suffocating {
        status.suffocation.reset();
        return false;
    }
    status.suffocation.fire_once(dt_ms, DAMAGE_PERIOD_MS)
}

/// Whether acid is falling at `stage_elapsed_ms`
pub fn acid_phase(rain: &AcidRain, stage_elapsed_ms: f32) -> (f32, bool) {
    let period = rain.on_ms + rain.off_ms;
    if period <= 0.0 {
        return (0.0, false);
    }
    let cycle = stage_elapsed_ms.rem_euclid(period);
    (cycle, cycle < rain.on_ms)
}

/// Advance the acid cycle; returns the damage to apply this tick
pub fn tick_acid(
    status: &mut StatusEffects,
    rain: &AcidRain,
    stage_elapsed_ms: f32,
    dt_ms: f32,
) -> f32 {
    let (cycle, on) = acid_phase(rain, stage_elapsed_ms);
    status.acid_cycle_ms = cycle;
    status.acid_on = on;
    if !on {
        status.acid_damage.reset();
        return 0.0;
    }
    status.acid_damage.drain_periods(dt_ms, DAMAGE_PERIOD_MS) as f32 * rain.dps
}

/// Pick the delay before the next snow freeze
pub fn schedule_freeze<R: Rng>(status: &mut StatusEffects, snow: &Snow, rng: &mut R) {
    let (lo, hi) = if snow.freeze_min_ms <= snow.freeze_max_ms {
        (snow.freeze_min_ms, snow.freeze_max_ms)
    } else {
        (snow.freeze_max_ms, snow.freeze_min_ms)
    };
    let delay = if hi > lo { rng.random_range(lo..=hi) } else { lo };
    status.next_freeze.set(delay);
}

/// Advance the snow schedule; returns true when a freeze starts this tick
pub fn tick_snow<R: Rng>(status: &mut StatusEffects, snow: &Snow, dt_ms: f32, rng: &mut R) -> bool {
    status.next_freeze.tick(dt_ms);
    if status.next_freeze.is_active() {
        return false;
    }
    status.freeze.extend_to(snow.freeze_ms);
    schedule_freeze(status, snow, rng);
    true
}
