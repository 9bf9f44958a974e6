//! Runtime stage built from a `StageDef`

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cards::Ability;
use super::collision::Rect;
use super::hazard::{Hazard, TornadoZone, random_phase};
use super::plant::{PlantSlot, SeedPickup};
use super::state::{Platform, PlatformKind};
use crate::consts::*;
use crate::stages::{GroundSpan, StageDef, StageRules};

/// Depth of the ground slabs below the ground line
const GROUND_DEPTH: f32 = 120.0;
const SPIKE_HEIGHT: f32 = 18.0;
const ORB_SIZE: f32 = 24.0;
const TORNADO_WIDTH: f32 = 70.0;
const TORNADO_HEIGHT: f32 = 160.0;
const SEED_SIZE: f32 = 20.0;
/// Seed pickups float this far above the ground line (to their bottom edge)
const SEED_LIFT: f32 = 20.0;

/// Mutable copy of a stage for the current attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub index: usize,
    pub length: f32,
    pub ground_y: f32,
    /// Falling below this line is fatal
    pub kill_y: f32,
    pub spawn: Vec2,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub tornadoes: Vec<TornadoZone>,
    pub seeds: Vec<SeedPickup>,
    pub plots: Vec<PlantSlot>,
    pub rules: StageRules,
    /// Time spent in this attempt (ms); drives orbs, tornadoes and acid
    pub elapsed_ms: f32,
}

impl Stage {
    pub fn build<R: Rng>(def: &StageDef, index: usize, rng: &mut R) -> Self {
        let ground_y = def.ground_y;
        let full = [GroundSpan {
            x: 0.0,
            w: def.length,
        }];
        let spans: &[GroundSpan] = if def.ground.is_empty() {
            &full
        } else {
            &def.ground
        };

        let mut platforms: Vec<Platform> = spans
            .iter()
            .map(|span| Platform {
                rect: Rect::new(span.x, ground_y, span.w, GROUND_DEPTH),
                kind: PlatformKind::Ground,
                toxic: false,
            })
            .collect();
        platforms.extend(def.platforms.iter().map(|p| Platform {
            rect: Rect::new(p.x, p.y, p.w, p.h),
            kind: PlatformKind::Rock,
            toxic: p.toxic,
        }));

        let mut hazards: Vec<Hazard> = def
            .spikes
            .iter()
            .map(|s| Hazard::Spike {
                rect: Rect::new(s.x, s.y - SPIKE_HEIGHT, s.w, SPIKE_HEIGHT),
            })
            .collect();
        hazards.extend(def.orbs.iter().map(|o| Hazard::Orb {
            x: o.x - ORB_SIZE / 2.0,
            base_y: o.y - ORB_SIZE / 2.0,
            w: ORB_SIZE,
            h: ORB_SIZE,
            phase: random_phase(rng),
        }));

        let zone_count = def.rules.wind_zones.map_or(0, |w| w.count);
        let tornadoes = (0..zone_count)
            .map(|i| {
                let center = def.length * (i + 1) as f32 / (zone_count + 1) as f32;
                TornadoZone {
                    rect: Rect::new(
                        center - TORNADO_WIDTH / 2.0,
                        ground_y - TORNADO_HEIGHT,
                        TORNADO_WIDTH,
                        TORNADO_HEIGHT,
                    ),
                    phase: random_phase(rng),
                }
            })
            .collect();

        let seeds = def
            .seeds
            .iter()
            .map(|&x| SeedPickup::new(Rect::new(
                x - SEED_SIZE / 2.0,
                ground_y - SEED_LIFT - SEED_SIZE,
                SEED_SIZE,
                SEED_SIZE,
            )))
            .collect();
        let plots = def.seeds.iter().map(|&x| PlantSlot::new(x, ground_y)).collect();

        log::debug!(
            "Built stage {} '{}': {} platforms, {} hazards, {} plots",
            index + 1,
            def.name,
            platforms.len(),
            hazards.len(),
            def.seeds.len()
        );

        Self {
            index,
            length: def.length,
            ground_y,
            kill_y: ground_y + PIT_DEPTH,
            spawn: Vec2::new(PLAYER_SPAWN_X, ground_y - PLAYER_HEIGHT),
            platforms,
            hazards,
            tornadoes,
            seeds,
            plots,
            rules: def.rules.clone(),
            elapsed_ms: 0.0,
        }
    }

    pub fn rewarded_count(&self) -> usize {
        self.plots.iter().filter(|p| p.rewarded).count()
    }

    /// Every plot has paid out; vacuously true for a stage without plots
    pub fn all_rewarded(&self) -> bool {
        self.plots.iter().all(|p| p.rewarded)
    }

    /// Remove the hazards an activated ability clears; returns how many went
    pub fn clear_hazards(&mut self, ability: Ability) -> usize {
        let before = self.hazards.len();
        match ability {
            Ability::ClearSpikes => self.hazards.retain(|h| !h.is_spike()),
            Ability::ClearToxic => self.hazards.retain(|h| !h.is_orb()),
        }
        before - self.hazards.len()
    }
}
