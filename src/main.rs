//! Plant Back Earth - headless runner
//!
//! Drives the simulation with a simple autopilot and logs what happens.
//!
//! Usage: `plant-back-earth [tuning.json] [stages.json] [seed]`
//! (pass `-` to keep the built-in tuning or stages)

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
use plant_back_earth::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
#[cfg(not(target_arch = "wasm32"))]
use plant_back_earth::stages::builtin_stages;
#[cfg(not(target_arch = "wasm32"))]
use plant_back_earth::{StageDef, Tuning};

/// Simulated frame length (ms)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: f32 = 1000.0 / 60.0;
/// Give up after ten simulated minutes
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u32 = 60 * 600;

/// Walks right, collects seeds, plants, waters and waits for each bloom
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct Autopilot {
    frame: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl Autopilot {
    fn input(&mut self, state: &GameState) -> TickInput {
        self.frame += 1;
        // Edge-triggered actions only every other frame so they register as presses
        let press = self.frame % 2 == 0;
        match &state.phase {
            GamePhase::Idle => TickInput {
                start: press,
                ..Default::default()
            },
            GamePhase::Dialogue { .. } => TickInput {
                advance: press,
                ..Default::default()
            },
            GamePhase::CardPick(_) => TickInput {
                pick: press.then_some(0),
                ..Default::default()
            },
            GamePhase::Active => self.play(state, press),
        }
    }

    fn play(&self, state: &GameState, press: bool) -> TickInput {
        let player = &state.player;
        let feet = player.feet();
        let plants = &state.tuning.plants;
        let mut input = TickInput::default();

        let target = state
            .stage
            .plots
            .iter()
            .filter(|p| !p.rewarded)
            .min_by(|a, b| (a.x - feet.x).abs().total_cmp(&(b.x - feet.x).abs()));
        let Some(plot) = target else {
            return input;
        };

        if plot.is_near(feet, plants.plant_range) {
            if !plot.planted {
                input.plant = press;
            } else if !plot.watered {
                input.water = press && plot.age_ms >= plants.plant_to_water_ms;
            }
            // Otherwise stand still and let it bloom
            return input;
        }

        input.right = plot.x > feet.x;
        input.left = !input.right;
        let ahead = if input.right { 1.0 } else { -1.0 };
        let danger = state.stage.hazards.iter().any(|h| {
            let rect = h.rect_at(state.stage.elapsed_ms, state.stage.index);
            let dx = (rect.center().x - feet.x) * ahead;
            (0.0..90.0).contains(&dx)
        });
        let blocked = player.grounded && player.vel.x.abs() < 5.0 && self.frame % 30 == 0;
        input.jump = press && player.grounded && (danger || blocked);
        input
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Plant Back Earth (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| args.get(i).filter(|a| a.as_str() != "-");

    let tuning = arg(0)
        .map(|path| Tuning::load_or_default(Path::new(path)))
        .unwrap_or_default();
    let stages = match arg(1).map(|path| StageDef::load_list(Path::new(path))) {
        Some(Ok(stages)) => stages,
        Some(Err(e)) => {
            log::warn!("{}, using built-in stages", e);
            builtin_stages()
        }
        None => builtin_stages(),
    };
    let seed = arg(2).and_then(|s| s.parse().ok()).unwrap_or(0x5EED_u64);

    let mut state = GameState::new(seed, stages, tuning);
    let mut autopilot = Autopilot::default();
    let mut deaths = 0u32;
    log::info!("Game initialized with seed: {}", seed);

    for _ in 0..MAX_FRAMES {
        let input = autopilot.input(&state);
        let before = state.phase.name();
        tick(&mut state, &input, FRAME_MS);

        for event in state.drain_events() {
            match event {
                GameEvent::CardPicked { id, auto } => {
                    log::info!("Picked {} (auto: {})", id.card().name, auto)
                }
                GameEvent::OxygenRestored { slot, amount } => {
                    log::info!("Plot {} bloomed, +{:.1} O2", slot, amount)
                }
                GameEvent::PlayerDied { .. } => deaths += 1,
                _ => {}
            }
        }
        if let GamePhase::Dialogue { gate, .. } = &state.phase
            && let Some(line) = gate.current()
        {
            log::trace!("{}: {}", line.speaker.name(), line.text);
        }
        if before != state.phase.name() {
            log::info!("Phase {} -> {}", before, state.phase.name());
        }
        if state.clears > 0 {
            break;
        }
    }

    let ui = state.ui_state();
    log::info!(
        "Finished after {:.1}s: stage {} ({}), score {}, deaths {}, clears {}",
        state.time_ms / 1000.0,
        ui.stage_number,
        ui.stage_name,
        ui.score,
        deaths,
        state.clears
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host page on wasm
}
