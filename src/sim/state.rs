//! Game state and core simulation types
//!
//! Everything the renderer reads lives here, owned by one `GameState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cards::{Ability, CardId, ShieldKind, UpgradeCard, Upgrades};
use super::collision::Rect;
use super::dialogue::{DialogueGate, DialogueLine};
use super::stage::Stage;
use super::status::StatusEffects;
use super::timer::Countdown;
use crate::clamp_vital;
use crate::consts::*;
use crate::stages::{StageDef, builtin_stages};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Rock,
}

/// Static solid rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
    /// Standing here poisons the player
    pub toxic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// The robot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub grounded: bool,
    pub hp: f32,
    pub max_hp_base: f32,
    pub max_hp_bonus: f32,
    pub o2: f32,
    pub max_o2_base: f32,
    pub max_o2_bonus: f32,
    /// Seeds carried
    pub seeds: u32,
    /// Seeds planted this stage
    pub planted: u32,
    pub status: StatusEffects,
    pub extra_jump_used: bool,
}

impl Player {
    pub fn new(max_hp: f32, max_o2: f32) -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, 0.0),
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            facing: Facing::Right,
            grounded: false,
            hp: max_hp,
            max_hp_base: max_hp,
            max_hp_bonus: 0.0,
            o2: max_o2,
            max_o2_base: max_o2,
            max_o2_bonus: 0.0,
            seeds: 0,
            planted: 0,
            status: StatusEffects::default(),
            extra_jump_used: false,
        }
    }

    pub fn max_hp(&self) -> f32 {
        self.max_hp_base + self.max_hp_bonus
    }

    pub fn max_o2(&self) -> f32 {
        self.max_o2_base + self.max_o2_bonus
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Feet position (bottom centre)
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y)
    }

    /// Lose HP; returns the amount actually lost
    pub fn damage(&mut self, amount: f32) -> f32 {
        let before = self.hp;
        self.hp = clamp_vital(self.hp - amount.max(0.0), self.max_hp());
        before - self.hp
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = clamp_vital(self.hp + amount.max(0.0), self.max_hp());
    }

    /// Gain oxygen; returns the amount actually gained
    pub fn add_o2(&mut self, amount: f32) -> f32 {
        let before = self.o2;
        self.o2 = clamp_vital(self.o2 + amount.max(0.0), self.max_o2());
        self.o2 - before
    }

    pub fn drain_o2(&mut self, amount: f32) {
        self.o2 = clamp_vital(self.o2 - amount.max(0.0), self.max_o2());
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn can_act(&self) -> bool {
        self.status.can_act()
    }

    /// Back to the stage spawn with full vitals and no lingering effects
    pub fn reset_for_stage(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.facing = Facing::Right;
        self.grounded = false;
        self.hp = self.max_hp();
        self.o2 = self.max_o2();
        self.seeds = 0;
        self.planted = 0;
        self.status = StatusEffects::default();
        self.extra_jump_used = false;
    }
}

/// Where damage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Spike,
    Orb,
    Toxic,
    Acid,
    Suffocation,
    Fall,
}

/// Which scripted sequence a dialogue phase is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueKind {
    Intro,
    StageEnter,
    StageExit,
    Failure,
    Ending,
}

/// Things that happened during a tick, for audio/UI feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    StageStarted { stage: usize },
    DialogueStarted { kind: DialogueKind },
    CardOffered { count: usize },
    CardPicked { id: CardId, auto: bool },
    SeedCollected,
    Planted { slot: usize },
    Watered { slot: usize },
    OxygenRestored { slot: usize, amount: f32 },
    PeriodicOxygen { amount: f32 },
    Damaged { source: DamageSource, amount: f32 },
    ShieldAbsorbed { kind: ShieldKind },
    Stunned,
    Frozen,
    AbilityUsed { ability: Ability },
    PlayerDied { stage: usize },
    StageCleared { stage: usize },
    GameCleared,
}

/// Card choice on offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPick {
    pub offers: Vec<CardId>,
    pub remaining: Countdown,
}

/// Current phase of play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start action (fresh boot or after the ending)
    Idle,
    /// Choosing an upgrade before a stage
    CardPick(CardPick),
    /// A scripted sequence blocks everything else until dismissed
    Dialogue { kind: DialogueKind, gate: DialogueGate },
    /// Simulation running
    Active,
}

impl GamePhase {
    pub fn name(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::CardPick(_) => "card_pick",
            GamePhase::Dialogue { .. } => "dialogue",
            GamePhase::Active => "active",
        }
    }
}

/// Reasons an action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintKind {
    NoSeeds,
    NoPlot,
    NothingToWater,
    SeedSettling,
    Cooldown,
    CannotAct,
    NoAbility,
}

impl HintKind {
    pub fn message(self) -> &'static str {
        match self {
            HintKind::NoSeeds => "No seeds. Find one first.",
            HintKind::NoPlot => "Stand next to an empty plot to plant.",
            HintKind::NothingToWater => "Nothing here needs water.",
            HintKind::SeedSettling => "The seed needs a moment to settle.",
            HintKind::Cooldown => "Still recharging...",
            HintKind::CannotAct => "Systems locked!",
            HintKind::NoAbility => "No ability ready.",
        }
    }
}

/// Transient message for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub kind: HintKind,
    pub remaining: Countdown,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Fresh generator for the next random decision
    pub fn next_rng(&mut self) -> Pcg32 {
        self.draws += 1;
        Pcg32::seed_from_u64(self.seed ^ self.draws.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub tuning: Tuning,
    /// Stage descriptors, in play order
    pub stages: Vec<StageDef>,
    pub stage_index: usize,
    /// Runtime copy of the current stage
    pub stage: Stage,
    pub player: Player,
    pub upgrades: Upgrades,
    pub score: u64,
    pub phase: GamePhase,
    /// Dialogue auto-advance toggle, kept across sequences
    pub dialogue_auto: bool,
    pub hint: Option<Hint>,
    /// Total simulated time (ms)
    pub time_ms: f64,
    /// Completed runs this session
    pub clears: u32,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a game in the idle phase with the first stage built
    pub fn new(seed: u64, stages: Vec<StageDef>, tuning: Tuning) -> Self {
        let stages = if stages.is_empty() {
            log::warn!("No stages supplied, using the built-in set");
            builtin_stages()
        } else {
            stages
        };
        let mut rng_state = RngState::new(seed);
        let stage = Stage::build(&stages[0], 0, &mut rng_state.next_rng());
        let mut player = Player::new(tuning.status.max_hp, tuning.status.max_o2);
        player.reset_for_stage(stage.spawn);

        Self {
            seed,
            rng_state,
            tuning,
            stages,
            stage_index: 0,
            stage,
            player,
            upgrades: Upgrades::default(),
            score: 0,
            phase: GamePhase::Idle,
            dialogue_auto: false,
            hint: None,
            time_ms: 0.0,
            clears: 0,
            events: Vec::new(),
        }
    }

    /// Built-in stages with default tuning
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(seed, builtin_stages(), Tuning::default())
    }

    pub fn current_stage_def(&self) -> &StageDef {
        &self.stages[self.stage_index]
    }

    pub fn is_final_stage(&self) -> bool {
        self.stage_index + 1 >= self.stages.len()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Surface a refused action to the HUD
    pub fn show_hint(&mut self, kind: HintKind) {
        self.hint = Some(Hint {
            kind,
            remaining: Countdown::new(self.tuning.flow.hint_ms),
        });
    }

    /// Read-only view for the HUD and overlays
    pub fn ui_state(&self) -> UiState<'_> {
        let (card_timer_ms, offers) = match &self.phase {
            GamePhase::CardPick(pick) => (
                Some(pick.remaining.remaining()),
                pick.offers.iter().map(|id| id.card()).collect(),
            ),
            _ => (None, Vec::new()),
        };
        let dialogue = match &self.phase {
            GamePhase::Dialogue { gate, .. } => gate.current(),
            _ => None,
        };
        let status = &self.player.status;

        UiState {
            phase: self.phase.name(),
            stage_number: self.stage_index + 1,
            stage_name: &self.current_stage_def().name,
            hp: self.player.hp,
            max_hp: self.player.max_hp(),
            o2: self.player.o2,
            max_o2: self.player.max_o2(),
            seeds: self.player.seeds,
            planted: self.player.planted,
            plots_total: self.stage.plots.len(),
            plots_rewarded: self.stage.rewarded_count(),
            score: self.score,
            card_timer_ms,
            offers,
            dialogue,
            dialogue_auto: self.dialogue_auto,
            hint: self.hint.map(|h| h.kind.message()),
            held_ability: self.upgrades.held_ability(),
            o2_warning: status.suffocating,
            stunned: status.stun.is_active(),
            slowed: status.slow.is_active(),
            frozen: status.freeze.is_active(),
            toxic: status.toxic.is_active(),
            acid_on: status.acid_on,
        }
    }
}

/// Per-frame data for the HUD and overlays
#[derive(Debug)]
pub struct UiState<'a> {
    pub phase: &'static str,
    /// 1-based
    pub stage_number: usize,
    pub stage_name: &'a str,
    pub hp: f32,
    pub max_hp: f32,
    pub o2: f32,
    pub max_o2: f32,
    pub seeds: u32,
    pub planted: u32,
    pub plots_total: usize,
    pub plots_rewarded: usize,
    pub score: u64,
    pub card_timer_ms: Option<f32>,
    pub offers: Vec<&'static UpgradeCard>,
    pub dialogue: Option<&'a DialogueLine>,
    pub dialogue_auto: bool,
    pub hint: Option<&'static str>,
    pub held_ability: Option<Ability>,
    pub o2_warning: bool,
    pub stunned: bool,
    pub slowed: bool,
    pub frozen: bool,
    pub toxic: bool,
    pub acid_on: bool,
}
