//! Upgrade cards
//!
//! The catalogue is static data. `Upgrades` holds what the player owns and
//! answers every rule query the simulation needs (speed multiplier, vital
//! caps, shields, oxygen modifiers). Ownership only grows; one-shot cards
//! drop their single use to zero when spent and are never offered again.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Player;

/// Card identifiers, in catalogue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardId {
    Hp1,
    Hp2,
    Hp3,
    Speed1,
    Speed2,
    Speed3,
    O2Bonus1,
    O2Bonus2,
    O2Tank,
    O2Saver,
    QuickBloom1,
    QuickBloom2,
    InstantO2,
    PeriodicO2,
    DoubleJump,
    SpikeShield,
    PoisonShield,
    ClearSpikes,
    ClearToxic,
}

impl CardId {
    /// Catalogue entry for this id
    pub fn card(self) -> &'static UpgradeCard {
        &CATALOGUE[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    /// Rolled rarity first, then the rest from most to least common
    fn fallback_order(self) -> impl Iterator<Item = Rarity> {
        std::iter::once(self).chain(Self::ALL.into_iter().filter(move |r| *r != self))
    }
}

/// Families whose cards are ranked by tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierFamily {
    Hp,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldKind {
    /// Blocks one spike hit
    Spike,
    /// Blocks one orb hit or toxic platform contact
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    ClearSpikes,
    ClearToxic,
}

/// What a card does once owned
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    HpBoost { tier: u8 },
    SpeedBoost { tier: u8 },
    /// Added to every plant's oxygen reward
    OxygenBonus { value: f32 },
    /// Raises the oxygen cap
    OxygenTank { value: f32 },
    /// Reduces passive oxygen drain by a fraction
    OxygenSaver { percent: f32 },
    /// Shortens the dwell needed for a watered plant to pay out
    QuickBloom { ms: f32 },
    InstantOxygen,
    PeriodicOxygen,
    DoubleJump,
    Shield { kind: ShieldKind },
    Activatable { ability: Ability },
}

impl Effect {
    fn tier(&self) -> Option<(TierFamily, u8)> {
        match *self {
            Effect::HpBoost { tier } => Some((TierFamily::Hp, tier)),
            Effect::SpeedBoost { tier } => Some((TierFamily::Speed, tier)),
            _ => None,
        }
    }
}

/// Max HP added by each hp tier (index = tier)
const HP_TIER_BONUS: [f32; 4] = [0.0, 20.0, 40.0, 70.0];
/// Speed multiplier granted by each speed tier
const SPEED_TIER_MUL: [f32; 4] = [1.0, 1.10, 1.20, 1.35];

/// Catalogue entry
#[derive(Debug)]
pub struct UpgradeCard {
    pub id: CardId,
    pub rarity: Rarity,
    pub effect: Effect,
    /// Every listed card must already be owned before this one is offered
    pub requires: &'static [CardId],
    /// Single use, spent when triggered
    pub one_time: bool,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

#[allow(clippy::too_many_arguments)]
const fn card(
    id: CardId,
    rarity: Rarity,
    effect: Effect,
    requires: &'static [CardId],
    one_time: bool,
    name: &'static str,
    emoji: &'static str,
    description: &'static str,
) -> UpgradeCard {
    UpgradeCard { id, rarity, effect, requires, one_time, name, emoji, description }
}

use CardId as C;
use Rarity::*;

/// Every acquirable card, indexed by `CardId`
pub static CATALOGUE: [UpgradeCard; 19] = [
    card(C::Hp1, Common, Effect::HpBoost { tier: 1 }, &[], false, "Reinforced Frame", "🛡️", "Max HP +20"),
    card(C::Hp2, Rare, Effect::HpBoost { tier: 2 }, &[], false, "Armored Frame", "🛡️", "Max HP +40"),
    card(C::Hp3, Epic, Effect::HpBoost { tier: 3 }, &[], false, "Titan Frame", "🛡️", "Max HP +70"),
    card(C::Speed1, Common, Effect::SpeedBoost { tier: 1 }, &[], false, "Quick Step", "🏃", "Move speed +10%"),
    card(C::Speed2, Rare, Effect::SpeedBoost { tier: 2 }, &[], false, "Sprint Servos", "🏃", "Move speed +20%"),
    card(C::Speed3, Epic, Effect::SpeedBoost { tier: 3 }, &[], false, "Overdrive", "🏃", "Move speed +35%"),
    card(C::O2Bonus1, Common, Effect::OxygenBonus { value: 5.0 }, &[], false, "Lush Leaves", "🌿", "Plants give +5 O2"),
    card(C::O2Bonus2, Rare, Effect::OxygenBonus { value: 10.0 }, &[C::O2Bonus1], false, "Canopy", "🌳", "Plants give +10 more O2"),
    card(C::O2Tank, Common, Effect::OxygenTank { value: 15.0 }, &[], false, "Spare Tank", "🫙", "Max O2 +15"),
    card(C::O2Saver, Rare, Effect::OxygenSaver { percent: 0.2 }, &[], false, "Breath Control", "🫁", "O2 drain -20%"),
    card(C::QuickBloom1, Common, Effect::QuickBloom { ms: 400.0 }, &[], false, "Fertilizer", "🌱", "Plants bloom 0.4s sooner"),
    card(C::QuickBloom2, Epic, Effect::QuickBloom { ms: 600.0 }, &[C::QuickBloom1], false, "Growth Serum", "🧪", "Plants bloom 0.6s sooner"),
    card(C::InstantO2, Epic, Effect::InstantOxygen, &[C::O2Bonus1], false, "Photosynthesis", "☀️", "Watering pays O2 at once"),
    card(C::PeriodicO2, Rare, Effect::PeriodicOxygen, &[], false, "Air Filter", "🌀", "+5 O2 every 10s"),
    card(C::DoubleJump, Epic, Effect::DoubleJump, &[], false, "Double Jump!", "🦘", "One extra jump in the air"),
    card(C::SpikeShield, Rare, Effect::Shield { kind: ShieldKind::Spike }, &[], true, "Spike Guard", "🦾", "Blocks one spike hit"),
    card(C::PoisonShield, Rare, Effect::Shield { kind: ShieldKind::Poison }, &[], true, "Filter Mask", "😷", "Blocks one toxic hit"),
    card(C::ClearSpikes, Legendary, Effect::Activatable { ability: Ability::ClearSpikes }, &[], true, "Demolition", "💥", "Remove every spike in a stage"),
    card(C::ClearToxic, Legendary, Effect::Activatable { ability: Ability::ClearToxic }, &[], true, "Purifier", "✨", "Remove every toxic orb in a stage"),
];

/// Weighted draw over the four rarities (weights in `Rarity::ALL` order)
pub fn roll_rarity<R: Rng>(weights: &[u32; 4], rng: &mut R) -> Rarity {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return Rarity::Common;
    }
    let mut roll = rng.random_range(0..total);
    for (rarity, &weight) in Rarity::ALL.iter().zip(weights) {
        if roll < weight {
            return *rarity;
        }
        roll -= weight;
    }
    Rarity::Common
}

/// A card the player holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnedCard {
    pub id: CardId,
    /// `Some` for one-shot cards; only ever goes 1 -> 0
    pub uses_left: Option<u8>,
}

impl OwnedCard {
    fn is_charged(&self) -> bool {
        matches!(self.uses_left, Some(n) if n > 0)
    }

    fn spend(&mut self) {
        if self.is_charged() {
            self.uses_left = Some(0);
        }
    }
}

/// The player's owned cards and the rule queries derived from them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Upgrades {
    owned: Vec<OwnedCard>,
}

impl Upgrades {
    /// Owned cards in pick order
    pub fn owned(&self) -> &[OwnedCard] {
        &self.owned
    }

    pub fn owns(&self, id: CardId) -> bool {
        self.owned.iter().any(|c| c.id == id)
    }

    fn effects(&self) -> impl Iterator<Item = Effect> + '_ {
        self.owned.iter().map(|c| c.id.card().effect)
    }

    /// Highest owned tier in a family (0 = none)
    pub fn tier(&self, family: TierFamily) -> u8 {
        self.effects()
            .filter_map(|e| e.tier())
            .filter(|(f, _)| *f == family)
            .map(|(_, tier)| tier)
            .max()
            .unwrap_or(0)
    }

    pub fn max_hp_bonus(&self) -> f32 {
        HP_TIER_BONUS[(self.tier(TierFamily::Hp) as usize).min(HP_TIER_BONUS.len() - 1)]
    }

    pub fn speed_multiplier(&self) -> f32 {
        SPEED_TIER_MUL[(self.tier(TierFamily::Speed) as usize).min(SPEED_TIER_MUL.len() - 1)]
    }

    pub fn max_o2_bonus(&self) -> f32 {
        self.effects()
            .map(|e| match e {
                Effect::OxygenTank { value } => value,
                _ => 0.0,
            })
            .sum()
    }

    /// Extra oxygen paid by each plant
    pub fn o2_reward_bonus(&self) -> f32 {
        self.effects()
            .map(|e| match e {
                Effect::OxygenBonus { value } => value,
                _ => 0.0,
            })
            .sum()
    }

    pub fn hold_reduction_ms(&self) -> f32 {
        self.effects()
            .map(|e| match e {
                Effect::QuickBloom { ms } => ms,
                _ => 0.0,
            })
            .sum()
    }

    /// Multiplier on passive oxygen drain
    pub fn o2_drain_multiplier(&self) -> f32 {
        self.effects()
            .map(|e| match e {
                Effect::OxygenSaver { percent } => (1.0 - percent).clamp(0.0, 1.0),
                _ => 1.0,
            })
            .product()
    }

    pub fn has_instant_oxygen(&self) -> bool {
        self.effects().any(|e| e == Effect::InstantOxygen)
    }

    pub fn has_periodic_oxygen(&self) -> bool {
        self.effects().any(|e| e == Effect::PeriodicOxygen)
    }

    pub fn has_double_jump(&self) -> bool {
        self.effects().any(|e| e == Effect::DoubleJump)
    }

    /// Unspent shields of a kind
    pub fn shield_count(&self, kind: ShieldKind) -> usize {
        self.owned
            .iter()
            .filter(|c| c.is_charged() && c.id.card().effect == Effect::Shield { kind })
            .count()
    }

    /// Spend one shield of `kind`; false if none is charged
    pub fn consume_shield(&mut self, kind: ShieldKind) -> bool {
        match self
            .owned
            .iter_mut()
            .find(|c| c.is_charged() && c.id.card().effect == Effect::Shield { kind })
        {
            Some(owned) => {
                owned.spend();
                log::debug!("Shield {:?} consumed", owned.id);
                true
            }
            None => false,
        }
    }

    /// The activatable ability currently held, if its use is not spent
    pub fn held_ability(&self) -> Option<Ability> {
        self.owned.iter().filter(|c| c.is_charged()).find_map(|c| match c.id.card().effect {
            Effect::Activatable { ability } => Some(ability),
            _ => None,
        })
    }

    /// Spend the held ability, returning what to trigger
    pub fn activate(&mut self) -> Option<Ability> {
        let owned = self.owned.iter_mut().find(|c| {
            c.is_charged() && matches!(c.id.card().effect, Effect::Activatable { .. })
        })?;
        owned.spend();
        match owned.id.card().effect {
            Effect::Activatable { ability } => Some(ability),
            _ => None,
        }
    }

    /// Whether `card` may appear in a pick offer
    pub fn is_eligible(&self, card: &UpgradeCard) -> bool {
        if self.owns(card.id) {
            return false;
        }
        if !card.requires.iter().all(|id| self.owns(*id)) {
            return false;
        }
        if let Some((family, tier)) = card.effect.tier() {
            if self.tier(family) >= tier {
                return false;
            }
        }
        if matches!(card.effect, Effect::Activatable { .. }) && self.held_ability().is_some() {
            return false;
        }
        true
    }

    /// Draw up to `n` distinct eligible cards
    ///
    /// Each slot rolls a rarity and falls back through the other rarities
    /// when that pool is empty. Stops early once nothing eligible remains.
    pub fn pick_candidates<R: Rng>(&self, n: usize, weights: &[u32; 4], rng: &mut R) -> Vec<CardId> {
        let mut picked: Vec<CardId> = Vec::with_capacity(n);
        let max_attempts = n * 16;
        let mut attempts = 0;

        while picked.len() < n && attempts < max_attempts {
            attempts += 1;
            let rolled = roll_rarity(weights, rng);
            let pool = rolled.fallback_order().find_map(|rarity| {
                let pool: Vec<CardId> = CATALOGUE
                    .iter()
                    .filter(|c| c.rarity == rarity && !picked.contains(&c.id))
                    .filter(|c| self.is_eligible(c))
                    .map(|c| c.id)
                    .collect();
                (!pool.is_empty()).then_some(pool)
            });
            let Some(pool) = pool else {
                break;
            };
            picked.push(pool[rng.random_range(0..pool.len())]);
        }

        picked
    }

    /// Take ownership of a card and apply its immediate effect
    ///
    /// Returns false (and changes nothing) if the card is not eligible.
    pub fn apply(&mut self, id: CardId, player: &mut Player) -> bool {
        let card = id.card();
        if !self.is_eligible(card) {
            return false;
        }
        self.owned.push(OwnedCard {
            id,
            uses_left: card.one_time.then_some(1),
        });
        apply_effect(card.effect, self, player);
        log::info!("Card acquired: {} ({:?})", card.name, card.rarity);
        true
    }
}

/// Push an effect's immediate consequences onto the player
fn apply_effect(effect: Effect, upgrades: &Upgrades, player: &mut Player) {
    match effect {
        Effect::HpBoost { .. } => {
            let gained = upgrades.max_hp_bonus() - player.max_hp_bonus;
            player.max_hp_bonus = upgrades.max_hp_bonus();
            player.heal(gained.max(0.0));
        }
        Effect::OxygenTank { .. } => {
            let gained = upgrades.max_o2_bonus() - player.max_o2_bonus;
            player.max_o2_bonus = upgrades.max_o2_bonus();
            player.add_o2(gained.max(0.0));
        }
        // Everything else is read through the query methods each tick
        Effect::DoubleJump
        | Effect::SpeedBoost { .. }
        | Effect::OxygenBonus { .. }
        | Effect::OxygenSaver { .. }
        | Effect::QuickBloom { .. }
        | Effect::InstantOxygen
        | Effect::PeriodicOxygen
        | Effect::Shield { .. }
        | Effect::Activatable { .. } => {}
    }
}
