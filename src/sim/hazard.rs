//! Hazard evaluation
//!
//! Spikes and toxic orbs hurt on contact (or burn a matching shield),
//! tornado zones stun and slow, toxic platforms poison. Every hit grants a
//! short invulnerability window so a single contact is counted once.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use super::cards::{ShieldKind, Upgrades};
use super::collision::Rect;
use super::state::{DamageSource, GameEvent, Player};
use super::stage::Stage;
use crate::consts::*;
use crate::tuning::HazardTuning;

/// A damaging object in the stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hazard {
    Spike { rect: Rect },
    /// Bobs vertically around `base_y`
    Orb {
        x: f32,
        base_y: f32,
        w: f32,
        h: f32,
        phase: f32,
    },
}

impl Hazard {
    /// Bounding box at `elapsed_ms` into stage `stage_index`
    pub fn rect_at(&self, elapsed_ms: f32, stage_index: usize) -> Rect {
        match *self {
            Hazard::Spike { rect } => rect,
            Hazard::Orb { x, base_y, w, h, phase } => {
                Rect::new(x, base_y + orb_offset(elapsed_ms, phase, stage_index), w, h)
            }
        }
    }

    pub fn is_spike(&self) -> bool {
        matches!(self, Hazard::Spike { .. })
    }

    pub fn is_orb(&self) -> bool {
        matches!(self, Hazard::Orb { .. })
    }

    /// Shield that blocks this hazard
    pub fn shield(&self) -> ShieldKind {
        match self {
            Hazard::Spike { .. } => ShieldKind::Spike,
            Hazard::Orb { .. } => ShieldKind::Poison,
        }
    }

    pub fn source(&self) -> DamageSource {
        match self {
            Hazard::Spike { .. } => DamageSource::Spike,
            Hazard::Orb { .. } => DamageSource::Orb,
        }
    }

    pub fn damage(&self, tuning: &HazardTuning, stage_index: usize) -> f32 {
        match self {
            Hazard::Spike { .. } => tuning.spike_damage_at(stage_index),
            Hazard::Orb { .. } => tuning.orb_damage_at(stage_index),
        }
    }
}

/// Vertical orb displacement; later stages swing wider and faster
pub fn orb_offset(elapsed_ms: f32, phase: f32, stage_index: usize) -> f32 {
    let stage = stage_index as f32;
    let amplitude = ORB_AMPLITUDE + ORB_AMPLITUDE_PER_STAGE * stage;
    let omega = ORB_SPEED + ORB_SPEED_PER_STAGE * stage;
    ((elapsed_ms / 1000.0) * omega + phase).sin() * amplitude
}

/// A wind column that drifts side to side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TornadoZone {
    /// Rest position
    pub rect: Rect,
    pub phase: f32,
}

impl TornadoZone {
    pub fn rect_at(&self, elapsed_ms: f32) -> Rect {
        let wobble = ((elapsed_ms / 1000.0) * TORNADO_WOBBLE_SPEED + self.phase).sin() * TORNADO_WOBBLE;
        self.rect.offset_x(wobble)
    }
}

/// Result of a hazard touching the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitResult {
    /// Player was invulnerable
    Ignored,
    Shielded,
    Damaged(f32),
}

/// Apply one hazard contact: shield first, otherwise damage plus knockback
pub fn hit_player(
    player: &mut Player,
    upgrades: &mut Upgrades,
    tuning: &HazardTuning,
    hazard: &Hazard,
    hazard_center_x: f32,
    stage_index: usize,
    events: &mut Vec<GameEvent>,
) -> HitResult {
    if player.status.is_invulnerable() {
        return HitResult::Ignored;
    }

    let shield = hazard.shield();
    if upgrades.consume_shield(shield) {
        player.status.invuln.set(tuning.invuln_ms);
        events.push(GameEvent::ShieldAbsorbed { kind: shield });
        return HitResult::Shielded;
    }

    let dealt = player.damage(hazard.damage(tuning, stage_index));
    player.status.invuln.set(tuning.invuln_ms);

    let dx = player.center().x - hazard_center_x;
    let away = if dx.abs() > f32::EPSILON {
        dx.signum()
    } else {
        -player.facing.sign()
    };
    player.vel.x = away * tuning.knockback_speed;
    player.vel.y = -tuning.knockback_hop;
    player.grounded = false;

    events.push(GameEvent::Damaged {
        source: hazard.source(),
        amount: dealt,
    });
    HitResult::Damaged(dealt)
}

/// Check every spike, orb and tornado against the player
pub fn evaluate_hazards(
    stage: &Stage,
    player: &mut Player,
    upgrades: &mut Upgrades,
    tuning: &HazardTuning,
    events: &mut Vec<GameEvent>,
) {
    for hazard in &stage.hazards {
        let rect = hazard.rect_at(stage.elapsed_ms, stage.index);
        if !player.rect().overlaps(&rect) {
            continue;
        }
        hit_player(
            player,
            upgrades,
            tuning,
            hazard,
            rect.center().x,
            stage.index,
            events,
        );
    }

    for zone in &stage.tornadoes {
        if player.rect().overlaps(&zone.rect_at(stage.elapsed_ms)) {
            apply_tornado(player, tuning, events);
        }
    }
}

/// Stun and slow up to their fixed ceilings; repeated contact never stacks
pub fn apply_tornado(player: &mut Player, tuning: &HazardTuning, events: &mut Vec<GameEvent>) {
    let was_stunned = player.status.stun.is_active();
    player.status.stun.extend_to(tuning.tornado_stun_ms);
    player.status.slow.extend_to(tuning.tornado_slow_ms);
    if !was_stunned {
        events.push(GameEvent::Stunned);
    }
}

/// Standing on a toxic platform
///
/// Contact always poisons, invulnerable or not, and a running timer is simply
/// refreshed. A poison shield absorbs a fresh contact instead.
pub fn touch_toxic_platform(
    player: &mut Player,
    upgrades: &mut Upgrades,
    tuning: &HazardTuning,
    toxic_ms: f32,
    events: &mut Vec<GameEvent>,
) {
    let status = &mut player.status;
    if status.toxic.is_active() {
        status.refresh_toxic(toxic_ms);
        return;
    }
    if upgrades.consume_shield(ShieldKind::Poison) {
        status.invuln.set(tuning.invuln_ms);
        events.push(GameEvent::ShieldAbsorbed {
            kind: ShieldKind::Poison,
        });
        return;
    }
    status.refresh_toxic(toxic_ms);
}

/// Random starting phase so orbs and tornadoes do not move in lockstep
pub fn random_phase<R: rand::Rng>(rng: &mut R) -> f32 {
    rng.random_range(0.0..TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cards::CardId;
    use glam::Vec2;

    fn spike_at(x: f32) -> Hazard {
        Hazard::Spike {
            rect: Rect::new(x, 100.0, 40.0, 18.0),
        }
    }

    fn player_at(x: f32) -> Player {
        let mut p = Player::new(100.0, 50.0);
        p.pos = Vec2::new(x, 80.0);
        p
    }

    #[test]
    fn test_spike_hit_then_invulnerable() {
        let tuning = HazardTuning::default();
        let mut upgrades = Upgrades::default();
        let mut player = player_at(100.0);
        let mut events = Vec::new();
        let spike = spike_at(110.0);

        let hit = hit_player(&mut player, &mut upgrades, &tuning, &spike, 130.0, 0, &mut events);
        assert_eq!(hit, HitResult::Damaged(18.0));
        assert_eq!(player.hp, 82.0);
        assert_eq!(player.status.invuln.remaining(), 650.0);

        player.status.tick(200.0);
        let again = hit_player(&mut player, &mut upgrades, &tuning, &spike, 130.0, 0, &mut events);
        assert_eq!(again, HitResult::Ignored);
        assert_eq!(player.hp, 82.0);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_knockback_pushes_away_and_up() {
        let tuning = HazardTuning::default();
        let mut upgrades = Upgrades::default();
        let mut player = player_at(100.0); // centre x = 116
        let mut events = Vec::new();

        hit_player(&mut player, &mut upgrades, &tuning, &spike_at(120.0), 140.0, 0, &mut events);
        assert!(player.vel.x < 0.0);
        assert!(player.vel.y < 0.0);
    }

    #[test]
    fn test_shield_absorbs_matching_hazard_only() {
        let tuning = HazardTuning::default();
        let mut upgrades = Upgrades::default();
        let mut player = player_at(100.0);
        let mut events = Vec::new();
        upgrades.apply(CardId::PoisonShield, &mut player);

        // Spike is not blocked by a poison shield
        let hit = hit_player(&mut player, &mut upgrades, &tuning, &spike_at(110.0), 130.0, 0, &mut events);
        assert!(matches!(hit, HitResult::Damaged(_)));

        player.status.invuln.clear();
        let orb = Hazard::Orb { x: 100.0, base_y: 80.0, w: 24.0, h: 24.0, phase: 0.0 };
        let hit = hit_player(&mut player, &mut upgrades, &tuning, &orb, 112.0, 0, &mut events);
        assert_eq!(hit, HitResult::Shielded);
        assert_eq!(player.status.invuln.remaining(), 650.0);
        assert_eq!(upgrades.shield_count(ShieldKind::Poison), 0);
    }

    #[test]
    fn test_damage_scales_by_stage() {
        let tuning = HazardTuning::default();
        let spike = spike_at(0.0);
        let orb = Hazard::Orb { x: 0.0, base_y: 0.0, w: 24.0, h: 24.0, phase: 0.0 };
        assert!(spike.damage(&tuning, 0) > orb.damage(&tuning, 0));
        assert!(spike.damage(&tuning, 4) > spike.damage(&tuning, 0));
        assert!(orb.damage(&tuning, 4) > orb.damage(&tuning, 0));
    }

    #[test]
    fn test_orb_swings_wider_on_later_stages() {
        let peak = |stage| {
            (0..2000)
                .map(|ms| orb_offset(ms as f32 * 5.0, 0.0, stage).abs())
                .fold(0.0f32, f32::max)
        };
        assert!(peak(5) > peak(0));
    }

    #[test]
    fn test_tornado_never_compounds() {
        let tuning = HazardTuning::default();
        let mut player = player_at(0.0);
        let mut events = Vec::new();
        for _ in 0..10 {
            apply_tornado(&mut player, &tuning, &mut events);
            player.status.tick(50.0);
        }
        apply_tornado(&mut player, &tuning, &mut events);
        assert_eq!(player.status.stun.remaining(), tuning.tornado_stun_ms);
        assert_eq!(player.status.slow.remaining(), tuning.tornado_slow_ms);
        assert_eq!(events, vec![GameEvent::Stunned]);
    }

    #[test]
    fn test_toxic_platform_refreshes_running_timer() {
        let tuning = HazardTuning::default();
        let mut upgrades = Upgrades::default();
        let mut player = player_at(0.0);
        let mut events = Vec::new();

        touch_toxic_platform(&mut player, &mut upgrades, &tuning, 3000.0, &mut events);
        assert_eq!(player.status.toxic.remaining(), 3000.0);
        player.status.toxic.tick(1200.0);
        touch_toxic_platform(&mut player, &mut upgrades, &tuning, 3000.0, &mut events);
        assert_eq!(player.status.toxic.remaining(), 3000.0);
    }

    #[test]
    fn test_poison_shield_blocks_first_toxic_contact() {
        let tuning = HazardTuning::default();
        let mut upgrades = Upgrades::default();
        let mut player = player_at(0.0);
        let mut events = Vec::new();
        upgrades.apply(CardId::PoisonShield, &mut player);

        touch_toxic_platform(&mut player, &mut upgrades, &tuning, 3000.0, &mut events);
        assert!(player.status.toxic.expired());
        assert_eq!(events, vec![GameEvent::ShieldAbsorbed { kind: ShieldKind::Poison }]);
    }

    #[test]
    fn test_toxic_platform_poisons_while_invulnerable() {
        let tuning = HazardTuning::default();
        let mut upgrades = Upgrades::default();
        let mut player = player_at(0.0);
        let mut events = Vec::new();
        player.status.invuln.set(650.0);

        touch_toxic_platform(&mut player, &mut upgrades, &tuning, 3000.0, &mut events);
        assert_eq!(player.status.toxic.remaining(), 3000.0);
        assert!(events.is_empty());
    }
}
