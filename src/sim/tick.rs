//! Simulation tick
//!
//! Progression state machine and the per-frame update of an active stage.

use super::cards::Upgrades;
use super::dialogue::{DialogueGate, DialogueLine};
use super::hazard::{evaluate_hazards, touch_toxic_platform};
use super::physics::{MoveInput, step_player};
use super::plant::{collect_seeds, tick_periodic_oxygen, try_plant, try_water, update_slots};
use super::stage::Stage;
use super::state::{
    CardPick, DamageSource, DialogueKind, GameEvent, GamePhase, GameState, HintKind, Player,
};
use super::status::{schedule_freeze, tick_acid, tick_snow, tick_suffocation, tick_toxicity};
use super::timer::Countdown;
use crate::script;

/// Input for a single tick
///
/// `left`/`right` are held state; everything else is edge-triggered.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump (also advances dialogue)
    pub jump: bool,
    pub plant: bool,
    pub water: bool,
    /// Rebuild the current stage
    pub restart: bool,
    /// Use the held ability card
    pub activate: bool,
    /// Next dialogue line
    pub advance: bool,
    /// Dismiss the whole dialogue sequence
    pub skip: bool,
    /// Toggle dialogue auto-advance
    pub toggle_auto: bool,
    /// Begin a run from the idle screen
    pub start: bool,
    /// Choose a card by offer index
    pub pick: Option<usize>,
}

/// Advance the game state by `dt_ms` (clamped to the frame cap)
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    let dt = if dt_ms.is_finite() {
        dt_ms.clamp(0.0, state.tuning.flow.max_frame_ms)
    } else {
        0.0
    };
    let first_event = state.events.len();
    state.time_ms += dt as f64;

    if state.hint.as_mut().is_some_and(|h| {
        h.remaining.tick(dt);
        h.remaining.expired()
    }) {
        state.hint = None;
    }
    if input.toggle_auto {
        state.dialogue_auto = !state.dialogue_auto;
    }

    match state.phase {
        GamePhase::Idle => {
            if input.start {
                start_run(state);
            }
        }
        GamePhase::CardPick(_) => tick_card_pick(state, input, dt),
        GamePhase::Dialogue { .. } => tick_dialogue(state, input, dt),
        GamePhase::Active => tick_active(state, input, dt),
    }

    for event in &state.events[first_event..] {
        log::debug!("{:?}", event);
    }
}

/// Fresh run from the first stage with no upgrades
fn start_run(state: &mut GameState) {
    log::info!("Starting run (seed {})", state.seed);
    state.upgrades = Upgrades::default();
    state.player = Player::new(state.tuning.status.max_hp, state.tuning.status.max_o2);
    state.score = 0;
    load_stage(state, 0);
    state.push_event(GameEvent::RunStarted);
    begin_dialogue(state, DialogueKind::Intro, script::intro());
}

/// Build stage `index` from its descriptor and put the player at its spawn
fn load_stage(state: &mut GameState, index: usize) {
    let index = index.min(state.stages.len().saturating_sub(1));
    let mut rng = state.rng_state.next_rng();
    state.stage_index = index;
    state.stage = Stage::build(&state.stages[index], index, &mut rng);
    state.player.reset_for_stage(state.stage.spawn);
    if let Some(snow) = state.stage.rules.snow {
        schedule_freeze(&mut state.player.status, &snow, &mut rng);
    }
    state.hint = None;
    log::info!(
        "Stage {} loaded: {}",
        index + 1,
        state.stages[index].name
    );
}

/// Rebuild the current stage and drop straight back into play
fn restart_stage(state: &mut GameState) {
    load_stage(state, state.stage_index);
    enter_active(state);
}

fn enter_active(state: &mut GameState) {
    state.phase = GamePhase::Active;
    state.push_event(GameEvent::StageStarted {
        stage: state.stage_index,
    });
}

fn begin_dialogue(state: &mut GameState, kind: DialogueKind, lines: Vec<DialogueLine>) {
    state.phase = GamePhase::Dialogue {
        kind,
        gate: DialogueGate::new(lines),
    };
    state.push_event(GameEvent::DialogueStarted { kind });
}

fn begin_stage_enter(state: &mut GameState) {
    let lines = script::stage_enter(state.current_stage_def(), state.stage_index);
    begin_dialogue(state, DialogueKind::StageEnter, lines);
}

/// Offer cards before a stage; with nothing eligible go straight to the briefing
fn begin_card_pick(state: &mut GameState) {
    let mut rng = state.rng_state.next_rng();
    let offers = state.upgrades.pick_candidates(
        state.tuning.cards.options,
        &state.tuning.cards.rarity_weights,
        &mut rng,
    );
    if offers.is_empty() {
        log::info!("No eligible cards left, skipping card pick");
        begin_stage_enter(state);
        return;
    }
    state.push_event(GameEvent::CardOffered {
        count: offers.len(),
    });
    state.phase = GamePhase::CardPick(CardPick {
        offers,
        remaining: Countdown::new(state.tuning.flow.card_pick_ms),
    });
}

fn tick_card_pick(state: &mut GameState, input: &TickInput, dt: f32) {
    let GamePhase::CardPick(pick) = &mut state.phase else {
        return;
    };
    pick.remaining.tick(dt);
    let chosen = input
        .pick
        .and_then(|i| pick.offers.get(i).copied())
        .map(|id| (id, false))
        .or_else(|| {
            pick.remaining
                .expired()
                .then(|| pick.offers.first().copied())
                .flatten()
                .map(|id| (id, true))
        });

    let Some((id, auto)) = chosen else {
        return;
    };
    if auto {
        log::info!("Card pick timed out, taking {:?}", id);
    }
    state.upgrades.apply(id, &mut state.player);
    state.push_event(GameEvent::CardPicked { id, auto });
    begin_stage_enter(state);
}

fn tick_dialogue(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.skip {
        state.dialogue_auto = false;
    }
    let auto_ms = state
        .dialogue_auto
        .then_some(state.tuning.flow.dialogue_auto_ms);
    let GamePhase::Dialogue { kind, gate } = &mut state.phase else {
        return;
    };
    if input.skip {
        gate.skip();
    } else if input.advance || input.jump {
        gate.advance();
    } else {
        gate.update(dt, auto_ms);
    }
    if !gate.is_finished() {
        return;
    }

    let kind = *kind;
    match kind {
        DialogueKind::Intro => begin_card_pick(state),
        DialogueKind::StageEnter => enter_active(state),
        DialogueKind::Failure => restart_stage(state),
        DialogueKind::StageExit => {
            load_stage(state, state.stage_index + 1);
            begin_card_pick(state);
        }
        DialogueKind::Ending => {
            state.clears += 1;
            state.phase = GamePhase::Idle;
            log::info!("Run complete, score {}", state.score);
        }
    }
}

fn hurt(player: &mut Player, events: &mut Vec<GameEvent>, source: DamageSource, amount: f32) {
    let dealt = player.damage(amount);
    if dealt > 0.0 {
        events.push(GameEvent::Damaged {
            source,
            amount: dealt,
        });
    }
}

/// Handle the edge-triggered actions; refusals become hints
fn handle_actions(state: &mut GameState, input: &TickInput) {
    if !(input.plant || input.water || input.activate) {
        return;
    }
    if !state.player.can_act() {
        state.show_hint(HintKind::CannotAct);
        return;
    }

    if input.activate {
        match state.upgrades.activate() {
            Some(ability) => {
                let removed = state.stage.clear_hazards(ability);
                log::info!("{:?} removed {} hazards", ability, removed);
                state.push_event(GameEvent::AbilityUsed { ability });
            }
            None => state.show_hint(HintKind::NoAbility),
        }
    }
    if input.plant {
        let planted = try_plant(
            &mut state.stage.plots,
            &mut state.player,
            &state.tuning.plants,
            &mut state.events,
        );
        if let Err(hint) = planted {
            state.show_hint(hint);
        }
    }
    if input.water {
        let watered = try_water(
            &mut state.stage.plots,
            &mut state.player,
            &state.upgrades,
            &state.tuning.plants,
            &mut state.score,
            &mut state.events,
        );
        if let Err(hint) = watered {
            state.show_hint(hint);
        }
    }
}

/// One frame of play
fn tick_active(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart {
        log::info!("Manual restart of stage {}", state.stage_index + 1);
        restart_stage(state);
        return;
    }

    handle_actions(state, input);

    let tuning = &state.tuning;
    let stage = &mut state.stage;
    let player = &mut state.player;
    let upgrades = &mut state.upgrades;
    let events = &mut state.events;

    player.status.tick(dt);

    // Weather runs on the stage clock as it was at the start of the frame
    if let Some(snow) = stage.rules.snow {
        let mut rng = state.rng_state.next_rng();
        if tick_snow(&mut player.status, &snow, dt, &mut rng) {
            events.push(GameEvent::Frozen);
        }
    }
    if let Some(rain) = stage.rules.acid_rain {
        let burn = tick_acid(&mut player.status, &rain, stage.elapsed_ms, dt);
        hurt(player, events, DamageSource::Acid, burn);
    }
    stage.elapsed_ms += dt;

    let movement = MoveInput {
        left: input.left,
        right: input.right,
        jump: input.jump,
    };
    let step = step_player(player, movement, stage, upgrades, &tuning.physics, dt);
    if step.toxic_contact {
        touch_toxic_platform(player, upgrades, &tuning.hazards, tuning.status.toxic_ms, events);
    }
    if step.fell {
        let hp = player.hp;
        hurt(player, events, DamageSource::Fall, hp);
    }

    collect_seeds(&mut stage.seeds, player, events);
    evaluate_hazards(stage, player, upgrades, &tuning.hazards, events);

    let toxic = tick_toxicity(&mut player.status, dt, tuning.status.toxic_damage);
    hurt(player, events, DamageSource::Toxic, toxic);

    player.drain_o2(tuning.status.o2_drain_per_sec * upgrades.o2_drain_multiplier() * dt / 1000.0);
    let o2 = player.o2;
    if tick_suffocation(&mut player.status, o2, dt) {
        hurt(player, events, DamageSource::Suffocation, tuning.status.suffocation_damage);
    }

    update_slots(
        &mut stage.plots,
        player,
        upgrades,
        &tuning.plants,
        dt,
        &mut state.score,
        events,
    );
    tick_periodic_oxygen(player, upgrades, &tuning.plants, dt, events);

    finish_frame(state);
}

/// Death first, then stage and game clear
fn finish_frame(state: &mut GameState) {
    let stage = state.stage_index;
    if state.player.is_dead() {
        log::info!("Player died on stage {}", stage + 1);
        state.push_event(GameEvent::PlayerDied { stage });
        begin_dialogue(state, DialogueKind::Failure, script::failure());
        return;
    }
    if !state.stage.all_rewarded() {
        return;
    }

    state.push_event(GameEvent::StageCleared { stage });
    if state.is_final_stage() {
        log::info!("Final stage restored");
        state.push_event(GameEvent::GameCleared);
        begin_dialogue(state, DialogueKind::Ending, script::ending());
    } else {
        log::info!("Stage {} restored", stage + 1);
        let lines = script::stage_exit(state.current_stage_def());
        begin_dialogue(state, DialogueKind::StageExit, lines);
    }
}
