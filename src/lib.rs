//! Plant Back Earth - a side-scrolling planting platformer
//!
//! Core modules:
//! - `sim`: Simulation (physics, hazards, plants, cards, progression)
//! - `stages`: Stage descriptors consumed by the simulation
//! - `script`: Dialogue lines played between phases
//! - `tuning`: Data-driven game balance
//! - `error`: Failures when loading tuning or stage files

pub mod error;
pub mod script;
pub mod sim;
pub mod stages;
pub mod tuning;

pub use error::LoadError;
pub use stages::StageDef;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation integrates (ms)
    pub const MAX_FRAME_MS: f32 = 33.0;

    /// Player bounding box
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 36.0;
    /// Spawn x offset from stage start
    pub const PLAYER_SPAWN_X: f32 = 120.0;

    /// Vitals
    pub const MAX_HP_BASE: f32 = 100.0;
    pub const MAX_O2_BASE: f32 = 50.0;
    /// Oxygen lost per second while playing
    pub const O2_DRAIN_PER_SEC: f32 = 0.8;
    /// Oxygen at or below this counts as empty
    pub const O2_EPSILON: f32 = 0.001;

    /// Movement (pixels, seconds)
    pub const GRAVITY: f32 = 1500.0;
    pub const JUMP_VELOCITY: f32 = 520.0;
    pub const DOUBLE_JUMP_FACTOR: f32 = 0.92;
    pub const RUN_ACCEL: f32 = 2400.0;
    pub const MAX_SPEED_BASE: f32 = 240.0;
    pub const GROUND_FRICTION: f32 = 0.80;
    pub const AIR_FRICTION: f32 = 0.95;
    pub const TERMINAL_VELOCITY: f32 = 1100.0;
    pub const SIDE_PUSH_DAMPING: f32 = 0.3;
    /// Distance below the ground line that counts as a fall
    pub const PIT_DEPTH: f32 = 400.0;

    /// Debuff speed multipliers
    pub const SLOW_SPEED_MUL: f32 = 0.20;

    /// Status effects (ms)
    pub const TOXIC_DURATION_MS: f32 = 3000.0;
    pub const TOXIC_DAMAGE: f32 = 4.0;
    pub const SUFFOCATION_DAMAGE: f32 = 5.0;
    pub const DAMAGE_PERIOD_MS: f32 = 1000.0;

    /// Hazards
    pub const INVULN_MS: f32 = 650.0;
    pub const SPIKE_DAMAGE: f32 = 18.0;
    pub const SPIKE_DAMAGE_PER_STAGE: f32 = 3.0;
    pub const ORB_DAMAGE: f32 = 10.0;
    pub const ORB_DAMAGE_PER_STAGE: f32 = 2.0;
    pub const KNOCKBACK_SPEED: f32 = 260.0;
    pub const KNOCKBACK_HOP: f32 = 280.0;
    pub const ORB_AMPLITUDE: f32 = 18.0;
    pub const ORB_AMPLITUDE_PER_STAGE: f32 = 4.0;
    pub const ORB_SPEED: f32 = 2.0;
    pub const ORB_SPEED_PER_STAGE: f32 = 0.25;
    pub const TORNADO_STUN_MS: f32 = 700.0;
    pub const TORNADO_SLOW_MS: f32 = 2000.0;
    pub const TORNADO_WOBBLE: f32 = 40.0;
    pub const TORNADO_WOBBLE_SPEED: f32 = 1.2;

    /// Plants
    pub const PLANT_RANGE: (f32, f32) = (40.0, 50.0);
    pub const WATER_RANGE: (f32, f32) = (60.0, 70.0);
    pub const PLANT_COOLDOWN_MS: f32 = 300.0;
    pub const WATER_COOLDOWN_MS: f32 = 300.0;
    pub const PLANT_TO_WATER_MS: f32 = 800.0;
    pub const DWELL_HOLD_MS: f32 = 1500.0;
    pub const DWELL_HOLD_MIN_MS: f32 = 300.0;
    pub const O2_REWARD: f32 = 20.0;
    pub const REWARD_SCORE: u64 = 100;
    pub const PERIODIC_O2_MS: f32 = 10_000.0;
    pub const PERIODIC_O2_AMOUNT: f32 = 5.0;

    /// Flow
    pub const CARD_PICK_MS: f32 = 5000.0;
    pub const CARD_OPTIONS: usize = 3;
    pub const DIALOGUE_AUTO_MS: f32 = 2200.0;
    pub const HINT_MS: f32 = 1400.0;
}

/// Clamp `value` into `[0, max]`
#[inline]
pub fn clamp_vital(value: f32, max: f32) -> f32 {
    value.clamp(0.0, max.max(0.0))
}

/// Frame-rate independent damping: `factor` is the per-1/60s retention
#[inline]
pub fn damp(value: f32, factor: f32, dt_secs: f32) -> f32 {
    value * factor.powf(dt_secs * 60.0)
}
