//! Data-driven game balance
//!
//! Every section defaults to the values in [`crate::consts`] and can be
//! overridden piecemeal from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{LoadError, read_file};

/// Movement and collision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub double_jump_factor: f32,
    pub run_accel: f32,
    pub max_speed: f32,
    pub ground_friction: f32,
    pub air_friction: f32,
    pub terminal_velocity: f32,
    pub side_push_damping: f32,
    pub slow_speed_mul: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            double_jump_factor: DOUBLE_JUMP_FACTOR,
            run_accel: RUN_ACCEL,
            max_speed: MAX_SPEED_BASE,
            ground_friction: GROUND_FRICTION,
            air_friction: AIR_FRICTION,
            terminal_velocity: TERMINAL_VELOCITY,
            side_push_damping: SIDE_PUSH_DAMPING,
            slow_speed_mul: SLOW_SPEED_MUL,
        }
    }
}

/// Vitals and damage-over-time effects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTuning {
    pub max_hp: f32,
    pub max_o2: f32,
    pub o2_drain_per_sec: f32,
    pub toxic_ms: f32,
    pub toxic_damage: f32,
    pub suffocation_damage: f32,
}

impl Default for StatusTuning {
    fn default() -> Self {
        Self {
            max_hp: MAX_HP_BASE,
            max_o2: MAX_O2_BASE,
            o2_drain_per_sec: O2_DRAIN_PER_SEC,
            toxic_ms: TOXIC_DURATION_MS,
            toxic_damage: TOXIC_DAMAGE,
            suffocation_damage: SUFFOCATION_DAMAGE,
        }
    }
}

/// Spikes, orbs and wind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    pub invuln_ms: f32,
    pub spike_damage: f32,
    pub spike_damage_per_stage: f32,
    pub orb_damage: f32,
    pub orb_damage_per_stage: f32,
    pub knockback_speed: f32,
    pub knockback_hop: f32,
    pub tornado_stun_ms: f32,
    pub tornado_slow_ms: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            invuln_ms: INVULN_MS,
            spike_damage: SPIKE_DAMAGE,
            spike_damage_per_stage: SPIKE_DAMAGE_PER_STAGE,
            orb_damage: ORB_DAMAGE,
            orb_damage_per_stage: ORB_DAMAGE_PER_STAGE,
            knockback_speed: KNOCKBACK_SPEED,
            knockback_hop: KNOCKBACK_HOP,
            tornado_stun_ms: TORNADO_STUN_MS,
            tornado_slow_ms: TORNADO_SLOW_MS,
        }
    }
}

impl HazardTuning {
    pub fn spike_damage_at(&self, stage_index: usize) -> f32 {
        self.spike_damage + self.spike_damage_per_stage * stage_index as f32
    }

    pub fn orb_damage_at(&self, stage_index: usize) -> f32 {
        self.orb_damage + self.orb_damage_per_stage * stage_index as f32
    }
}

/// Planting, watering and oxygen rewards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantTuning {
    /// Half extents (x, y) of the planting proximity box
    pub plant_range: (f32, f32),
    /// Half extents (x, y) of the watering and dwell proximity box
    pub water_range: (f32, f32),
    pub plant_cooldown_ms: f32,
    pub water_cooldown_ms: f32,
    pub plant_to_water_ms: f32,
    pub hold_ms: f32,
    pub hold_min_ms: f32,
    pub o2_reward: f32,
    pub reward_score: u64,
    pub periodic_o2_ms: f32,
    pub periodic_o2_amount: f32,
}

impl Default for PlantTuning {
    fn default() -> Self {
        Self {
            plant_range: PLANT_RANGE,
            water_range: WATER_RANGE,
            plant_cooldown_ms: PLANT_COOLDOWN_MS,
            water_cooldown_ms: WATER_COOLDOWN_MS,
            plant_to_water_ms: PLANT_TO_WATER_MS,
            hold_ms: DWELL_HOLD_MS,
            hold_min_ms: DWELL_HOLD_MIN_MS,
            o2_reward: O2_REWARD,
            reward_score: REWARD_SCORE,
            periodic_o2_ms: PERIODIC_O2_MS,
            periodic_o2_amount: PERIODIC_O2_AMOUNT,
        }
    }
}

/// Card draw weights (common, rare, epic, legendary)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTuning {
    pub rarity_weights: [u32; 4],
    pub options: usize,
}

impl Default for CardTuning {
    fn default() -> Self {
        Self {
            rarity_weights: [60, 28, 10, 2],
            options: CARD_OPTIONS,
        }
    }
}

/// Phase pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTuning {
    pub max_frame_ms: f32,
    pub card_pick_ms: f32,
    pub dialogue_auto_ms: f32,
    pub hint_ms: f32,
}

impl Default for FlowTuning {
    fn default() -> Self {
        Self {
            max_frame_ms: MAX_FRAME_MS,
            card_pick_ms: CARD_PICK_MS,
            dialogue_auto_ms: DIALOGUE_AUTO_MS,
            hint_ms: HINT_MS,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub status: StatusTuning,
    pub hazards: HazardTuning,
    pub plants: PlantTuning,
    pub cards: CardTuning,
    pub flow: FlowTuning,
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let tuning = Self::from_json(&read_file(path)?)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("{e}, using default tuning");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "physics": { "gravity": 900.0 } }"#).unwrap();
        assert_eq!(tuning.physics.gravity, 900.0);
        assert_eq!(tuning.physics.jump_velocity, JUMP_VELOCITY);
        assert_eq!(tuning.plants.hold_ms, DWELL_HOLD_MS);
    }

    #[test]
    fn test_damage_scales_with_stage() {
        let hazards = HazardTuning::default();
        assert_eq!(hazards.spike_damage_at(0), 18.0);
        assert!(hazards.spike_damage_at(3) > hazards.spike_damage_at(0));
        assert!(hazards.spike_damage_at(0) > hazards.orb_damage_at(0));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ nope"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = Tuning::load_or_default(Path::new("/definitely/not/here.json"));
        assert_eq!(tuning.flow.card_pick_ms, CARD_PICK_MS);
    }
}
