//! Player movement
//!
//! One integration step per tick: horizontal acceleration or friction, speed
//! cap, jump, gravity, then platform resolution and stage bounds.

use super::cards::Upgrades;
use super::collision::{CollisionResult, resolve_platforms};
use super::stage::Stage;
use super::state::{Facing, Player};
use crate::damp;
use crate::tuning::PhysicsTuning;

/// Movement part of the tick input
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    /// Edge-triggered
    pub jump: bool,
}

/// What the step ran into
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    pub collision: CollisionResult,
    /// Standing on a toxic platform after resolution
    pub toxic_contact: bool,
    /// Dropped below the stage kill line
    pub fell: bool,
    pub jumped: bool,
}

/// Horizontal speed cap after upgrades, stage rules and debuffs
pub fn speed_cap(player: &Player, stage: &Stage, upgrades: &Upgrades, tuning: &PhysicsTuning) -> f32 {
    (tuning.max_speed
        * upgrades.speed_multiplier()
        * stage.rules.speed_mul
        * player.status.speed_multiplier(tuning.slow_speed_mul))
        .max(0.0)
}

/// Advance the player by `dt_ms`
pub fn step_player(
    player: &mut Player,
    input: MoveInput,
    stage: &Stage,
    upgrades: &Upgrades,
    tuning: &PhysicsTuning,
    dt_ms: f32,
) -> StepResult {
    let dt = dt_ms / 1000.0;
    let can_act = player.can_act();
    let mut result = StepResult::default();

    let dir = if can_act {
        (input.right as i8 - input.left as i8) as f32
    } else {
        0.0
    };
    if dir != 0.0 {
        player.vel.x += dir * tuning.run_accel * dt;
        player.facing = if dir < 0.0 { Facing::Left } else { Facing::Right };
    } else {
        let friction = if player.grounded {
            tuning.ground_friction
        } else {
            tuning.air_friction
        };
        player.vel.x = damp(player.vel.x, friction, dt);
    }
    let cap = speed_cap(player, stage, upgrades, tuning);
    player.vel.x = player.vel.x.clamp(-cap, cap);

    if input.jump && can_act {
        if player.grounded {
            player.vel.y = -tuning.jump_velocity;
            player.grounded = false;
            player.extra_jump_used = false;
            result.jumped = true;
        } else if upgrades.has_double_jump() && !player.extra_jump_used {
            player.vel.y = -tuning.jump_velocity * tuning.double_jump_factor;
            player.extra_jump_used = true;
            result.jumped = true;
        }
    }

    player.vel.y = (player.vel.y + tuning.gravity * dt)
        .clamp(-tuning.terminal_velocity, tuning.terminal_velocity);

    let prev = player.pos;
    player.pos += player.vel * dt;
    result.collision = resolve_platforms(
        &mut player.pos,
        &mut player.vel,
        player.size,
        prev,
        &stage.platforms,
        tuning.side_push_damping,
    );
    player.grounded = result.collision.grounded;
    if player.grounded {
        player.extra_jump_used = false;
    }

    let max_x = (stage.length - player.size.x).max(0.0);
    if player.pos.x < 0.0 || player.pos.x > max_x {
        player.pos.x = player.pos.x.clamp(0.0, max_x);
        player.vel.x = 0.0;
    }

    result.toxic_contact = result
        .collision
        .ground_platform
        .is_some_and(|i| stage.platforms[i].toxic);
    result.fell = player.pos.y > stage.kill_y;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cards::CardId;
    use crate::stages::{StageDef, builtin_stages};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 16.0;

    fn stage(def: &StageDef, index: usize) -> Stage {
        Stage::build(def, index, &mut Pcg32::seed_from_u64(9))
    }

    fn spawn_on(stage: &Stage) -> Player {
        let mut p = Player::new(100.0, 50.0);
        p.reset_for_stage(stage.spawn);
        p
    }

    fn run(player: &mut Player, stage: &Stage, upgrades: &Upgrades, input: MoveInput, ticks: usize) {
        let tuning = Tuning::default().physics;
        for _ in 0..ticks {
            step_player(player, input, stage, upgrades, &tuning, DT);
        }
    }

    #[test]
    fn test_rests_on_ground() {
        let stage = stage(&builtin_stages()[0], 0);
        let mut p = spawn_on(&stage);
        run(&mut p, &stage, &Upgrades::default(), MoveInput::default(), 60);
        assert!(p.grounded);
        assert_eq!(p.pos.y, stage.ground_y - p.size.y);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn test_run_speed_capped() {
        let stage = stage(&builtin_stages()[0], 0);
        let mut p = spawn_on(&stage);
        let right = MoveInput { right: true, ..Default::default() };
        run(&mut p, &stage, &Upgrades::default(), right, 60);
        assert_eq!(p.vel.x, 240.0);
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn test_speed_upgrade_and_slow() {
        let stage = stage(&builtin_stages()[0], 0);
        let tuning = Tuning::default().physics;
        let mut p = spawn_on(&stage);
        let mut upgrades = Upgrades::default();
        let base = speed_cap(&p, &stage, &upgrades, &tuning);
        upgrades.apply(CardId::Speed1, &mut p);
        assert!(speed_cap(&p, &stage, &upgrades, &tuning) > base);

        p.status.slow.set(1000.0);
        assert!(speed_cap(&p, &stage, &upgrades, &tuning) < base);
        p.status.freeze.set(1000.0);
        assert_eq!(speed_cap(&p, &stage, &upgrades, &tuning), 0.0);
    }

    #[test]
    fn test_friction_stops_player() {
        let stage = stage(&builtin_stages()[0], 0);
        let mut p = spawn_on(&stage);
        run(&mut p, &stage, &Upgrades::default(), MoveInput::default(), 5);
        p.vel.x = 200.0;
        run(&mut p, &stage, &Upgrades::default(), MoveInput::default(), 60);
        assert!(p.vel.x.abs() < 1.0);
    }

    #[test]
    fn test_single_jump_without_upgrade() {
        let stage = stage(&builtin_stages()[0], 0);
        let tuning = Tuning::default().physics;
        let upgrades = Upgrades::default();
        let mut p = spawn_on(&stage);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 5);

        let jump = MoveInput { jump: true, ..Default::default() };
        assert!(step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);
        assert!(!p.grounded);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 5);
        assert!(!step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);
    }

    #[test]
    fn test_double_jump_once_per_airtime() {
        let stage = stage(&builtin_stages()[0], 0);
        let tuning = Tuning::default().physics;
        let mut upgrades = Upgrades::default();
        let mut p = spawn_on(&stage);
        upgrades.apply(CardId::DoubleJump, &mut p);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 5);

        let jump = MoveInput { jump: true, ..Default::default() };
        assert!(step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 5);
        assert!(step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);
        assert!(p.extra_jump_used);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 3);
        assert!(!step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);
    }

    #[test]
    fn test_air_jump_follows_owned_card() {
        let stage = stage(&builtin_stages()[0], 0);
        let tuning = Tuning::default().physics;
        let mut upgrades = Upgrades::default();
        let mut p = spawn_on(&stage);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 5);

        let jump = MoveInput { jump: true, ..Default::default() };
        assert!(step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 5);
        assert!(!step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);

        // Picking the card mid-air unlocks the extra jump straight away
        upgrades.apply(CardId::DoubleJump, &mut p);
        assert!(upgrades.has_double_jump());
        assert!(step_player(&mut p, jump, &stage, &upgrades, &tuning, DT).jumped);
        assert!(p.extra_jump_used);
    }

    #[test]
    fn test_stunned_cannot_move_or_jump() {
        let stage = stage(&builtin_stages()[0], 0);
        let tuning = Tuning::default().physics;
        let upgrades = Upgrades::default();
        let mut p = spawn_on(&stage);
        run(&mut p, &stage, &upgrades, MoveInput::default(), 5);
        p.status.stun.set(700.0);

        let all = MoveInput { left: false, right: true, jump: true };
        let result = step_player(&mut p, all, &stage, &upgrades, &tuning, DT);
        assert!(!result.jumped);
        assert_eq!(p.vel.x, 0.0);
        assert!(p.grounded);
    }

    #[test]
    fn test_clamped_to_stage_start() {
        let stage = stage(&builtin_stages()[0], 0);
        let mut p = spawn_on(&stage);
        let left = MoveInput { left: true, ..Default::default() };
        run(&mut p, &stage, &Upgrades::default(), left, 120);
        assert_eq!(p.pos.x, 0.0);
        assert_eq!(p.facing, Facing::Left);
    }

    #[test]
    fn test_toxic_platform_contact() {
        let json = r#"[{
            "name": "Toxic",
            "length": 800.0,
            "ground_y": 400.0,
            "platforms": [{ "x": 100.0, "y": 300.0, "w": 100.0, "h": 20.0, "toxic": true }]
        }]"#;
        let def = StageDef::list_from_json(json).unwrap().remove(0);
        let stage = stage(&def, 0);
        let tuning = Tuning::default().physics;
        let mut p = spawn_on(&stage);
        p.pos = Vec2::new(130.0, 250.0);

        let mut touched = false;
        for _ in 0..30 {
            touched |= step_player(&mut p, MoveInput::default(), &stage, &Upgrades::default(), &tuning, DT)
                .toxic_contact;
        }
        assert!(touched);
        assert_eq!(p.pos.y, 300.0 - p.size.y);
    }

    #[test]
    fn test_falling_into_pit() {
        let stage = stage(&builtin_stages()[2], 2);
        let tuning = Tuning::default().physics;
        let mut p = spawn_on(&stage);
        p.pos = Vec2::new(1444.0, stage.ground_y - p.size.y);

        let fell = (0..120).any(|_| {
            step_player(&mut p, MoveInput::default(), &stage, &Upgrades::default(), &tuning, DT).fell
        });
        assert!(fell);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn position_stays_in_bounds(
                stage_index in 0usize..7,
                moves in proptest::collection::vec(0u8..8, 10..200)
            ) {
                let stages = builtin_stages();
                let stage = stage(&stages[stage_index], stage_index);
                let tuning = Tuning::default().physics;
                let mut upgrades = Upgrades::default();
                let mut p = spawn_on(&stage);
                upgrades.apply(CardId::DoubleJump, &mut p);

                for bits in moves {
                    let input = MoveInput {
                        left: bits & 1 != 0,
                        right: bits & 2 != 0,
                        jump: bits & 4 != 0,
                    };
                    step_player(&mut p, input, &stage, &upgrades, &tuning, DT);
                    prop_assert!(p.pos.is_finite());
                    prop_assert!(p.pos.x >= 0.0 && p.pos.x <= stage.length - p.size.x);
                    prop_assert!(p.vel.y.abs() <= tuning.terminal_velocity);
                }
            }
        }
    }
}
