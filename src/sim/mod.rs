//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame delta clamped, never trusted as-is
//! - Seeded RNG only
//! - Stable iteration order (stage data order)
//! - No rendering or platform dependencies

pub mod cards;
pub mod collision;
pub mod dialogue;
pub mod hazard;
pub mod physics;
pub mod plant;
pub mod stage;
pub mod state;
pub mod status;
pub mod tick;
pub mod timer;

pub use cards::{Ability, CardId, Effect, Rarity, ShieldKind, UpgradeCard, Upgrades};
pub use collision::{CollisionResult, Rect, resolve_platforms};
pub use dialogue::{DialogueGate, DialogueLine, Speaker};
pub use hazard::{Hazard, TornadoZone};
pub use plant::{PlantSlot, SeedPickup};
pub use stage::Stage;
pub use state::{
    DamageSource, DialogueKind, GameEvent, GamePhase, GameState, HintKind, Platform, PlatformKind,
    Player, UiState,
};
pub use status::StatusEffects;
pub use tick::{TickInput, tick};
pub use timer::{Accumulator, Countdown};
