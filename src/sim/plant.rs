//! Plant lifecycle
//!
//! Each slot moves empty -> planted -> watered -> rewarded. Refused actions
//! come back as a `HintKind` for the HUD; nothing here fails hard.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::Upgrades;
use super::collision::Rect;
use super::state::{GameEvent, HintKind, Player};
use crate::tuning::PlantTuning;

/// A seed lying in the stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedPickup {
    pub rect: Rect,
    pub collected: bool,
}

impl SeedPickup {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            collected: false,
        }
    }
}

/// A plot of ground that can take one seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantSlot {
    /// Centre of the plot on the ground line
    pub x: f32,
    pub y: f32,
    pub planted: bool,
    pub watered: bool,
    pub rewarded: bool,
    /// Time since planting (ms)
    pub age_ms: f32,
    /// Continuous time the player has stayed close after watering (ms)
    pub dwell_ms: f32,
    pub since_watered_ms: f32,
}

impl PlantSlot {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            planted: false,
            watered: false,
            rewarded: false,
            age_ms: 0.0,
            dwell_ms: 0.0,
            since_watered_ms: 0.0,
        }
    }

    /// Whether `feet` lies inside the box of half extents `range` around the plot
    pub fn is_near(&self, feet: Vec2, range: (f32, f32)) -> bool {
        (feet.x - self.x).abs() <= range.0 && (feet.y - self.y).abs() <= range.1
    }
}

/// Index of the closest slot near `feet` that satisfies `pred`
fn nearest(
    slots: &[PlantSlot],
    feet: Vec2,
    range: (f32, f32),
    pred: impl Fn(&PlantSlot) -> bool,
) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .filter(|(_, s)| pred(s) && s.is_near(feet, range))
        .min_by(|(_, a), (_, b)| (a.x - feet.x).abs().total_cmp(&(b.x - feet.x).abs()))
        .map(|(i, _)| i)
}

/// Pick up every seed the player touches; returns how many were taken
pub fn collect_seeds(seeds: &mut [SeedPickup], player: &mut Player, events: &mut Vec<GameEvent>) -> u32 {
    let body = player.rect();
    let mut taken = 0;
    for seed in seeds.iter_mut().filter(|s| !s.collected) {
        if body.overlaps(&seed.rect) {
            seed.collected = true;
            player.seeds += 1;
            taken += 1;
            events.push(GameEvent::SeedCollected);
        }
    }
    taken
}

/// Put a seed into the nearest empty plot
pub fn try_plant(
    slots: &mut [PlantSlot],
    player: &mut Player,
    tuning: &PlantTuning,
    events: &mut Vec<GameEvent>,
) -> Result<usize, HintKind> {
    if player.status.plant_cooldown.is_active() {
        return Err(HintKind::Cooldown);
    }
    if player.seeds == 0 {
        return Err(HintKind::NoSeeds);
    }
    let index = nearest(slots, player.feet(), tuning.plant_range, |s| !s.planted)
        .ok_or(HintKind::NoPlot)?;

    let slot = &mut slots[index];
    slot.planted = true;
    slot.age_ms = 0.0;
    slot.dwell_ms = 0.0;
    player.seeds -= 1;
    player.planted += 1;
    player.status.plant_cooldown.set(tuning.plant_cooldown_ms);
    events.push(GameEvent::Planted { slot: index });
    Ok(index)
}

/// Water the nearest planted plot; with instant oxygen it pays out at once
pub fn try_water(
    slots: &mut [PlantSlot],
    player: &mut Player,
    upgrades: &Upgrades,
    tuning: &PlantTuning,
    score: &mut u64,
    events: &mut Vec<GameEvent>,
) -> Result<usize, HintKind> {
    if player.status.water_cooldown.is_active() {
        return Err(HintKind::Cooldown);
    }
    let feet = player.feet();
    let Some(index) = nearest(slots, feet, tuning.water_range, |s| s.planted && !s.watered) else {
        return Err(HintKind::NothingToWater);
    };
    if slots[index].age_ms < tuning.plant_to_water_ms {
        return Err(HintKind::SeedSettling);
    }

    let slot = &mut slots[index];
    slot.watered = true;
    slot.dwell_ms = 0.0;
    slot.since_watered_ms = 0.0;
    player.status.water_cooldown.set(tuning.water_cooldown_ms);
    events.push(GameEvent::Watered { slot: index });

    if upgrades.has_instant_oxygen() {
        reward(index, slot, player, upgrades, tuning, score, events);
    }
    Ok(index)
}

/// Dwell time needed next to a watered plot
pub fn hold_ms(upgrades: &Upgrades, tuning: &PlantTuning) -> f32 {
    (tuning.hold_ms - upgrades.hold_reduction_ms()).max(tuning.hold_min_ms)
}

/// Age every plot and pay out the ones the player has stayed beside
pub fn update_slots(
    slots: &mut [PlantSlot],
    player: &mut Player,
    upgrades: &Upgrades,
    tuning: &PlantTuning,
    dt_ms: f32,
    score: &mut u64,
    events: &mut Vec<GameEvent>,
) {
    let feet = player.feet();
    let hold = hold_ms(upgrades, tuning);

    for (index, slot) in slots.iter_mut().enumerate() {
        if !slot.planted {
            continue;
        }
        slot.age_ms += dt_ms;
        if !slot.watered {
            continue;
        }
        slot.since_watered_ms += dt_ms;
        if slot.rewarded {
            continue;
        }

        if slot.is_near(feet, tuning.water_range) {
            slot.dwell_ms += dt_ms;
            if slot.dwell_ms >= hold {
                reward(index, slot, player, upgrades, tuning, score, events);
            }
        } else {
            slot.dwell_ms = 0.0;
        }
    }
}

fn reward(
    index: usize,
    slot: &mut PlantSlot,
    player: &mut Player,
    upgrades: &Upgrades,
    tuning: &PlantTuning,
    score: &mut u64,
    events: &mut Vec<GameEvent>,
) {
    if slot.rewarded {
        return;
    }
    slot.rewarded = true;
    let amount = player.add_o2(tuning.o2_reward + upgrades.o2_reward_bonus());
    *score += tuning.reward_score;
    events.push(GameEvent::OxygenRestored { slot: index, amount });
}

/// Flat oxygen on a fixed interval while the upgrade is owned
pub fn tick_periodic_oxygen(
    player: &mut Player,
    upgrades: &Upgrades,
    tuning: &PlantTuning,
    dt_ms: f32,
    events: &mut Vec<GameEvent>,
) {
    if !upgrades.has_periodic_oxygen() {
        return;
    }
    let periods = player
        .status
        .periodic_o2
        .drain_periods(dt_ms, tuning.periodic_o2_ms);
    for _ in 0..periods {
        let amount = player.add_o2(tuning.periodic_o2_amount);
        events.push(GameEvent::PeriodicOxygen { amount });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_HEIGHT;
    use crate::sim::cards::CardId;

    const GROUND: f32 = 480.0;

    /// Player standing with feet centred on `x`
    fn player_at(x: f32) -> Player {
        let mut p = Player::new(100.0, 50.0);
        p.pos = Vec2::new(x - p.size.x / 2.0, GROUND - PLAYER_HEIGHT);
        p
    }

    fn setup() -> (Vec<PlantSlot>, Player, Upgrades, PlantTuning, Vec<GameEvent>) {
        (
            vec![PlantSlot::new(500.0, GROUND)],
            player_at(500.0),
            Upgrades::default(),
            PlantTuning::default(),
            Vec::new(),
        )
    }

    /// Age plots while keeping the player in place
    fn wait(slots: &mut [PlantSlot], player: &mut Player, upgrades: &Upgrades, tuning: &PlantTuning, ms: f32) -> u64 {
        let mut score = 0;
        let mut events = Vec::new();
        let mut left = ms;
        while left > 0.0 {
            let dt = left.min(16.0);
            player.status.tick(dt);
            update_slots(slots, player, upgrades, tuning, dt, &mut score, &mut events);
            left -= dt;
        }
        score
    }

    #[test]
    fn test_plant_consumes_seed() {
        let (mut slots, mut player, _, tuning, mut events) = setup();
        player.seeds = 1;
        assert_eq!(try_plant(&mut slots, &mut player, &tuning, &mut events), Ok(0));
        assert_eq!(player.seeds, 0);
        assert!(slots[0].planted);
        assert!(!slots[0].watered);
        assert_eq!(events, vec![GameEvent::Planted { slot: 0 }]);
    }

    #[test]
    fn test_plant_refusals() {
        let (mut slots, mut player, _, tuning, mut events) = setup();
        assert_eq!(try_plant(&mut slots, &mut player, &tuning, &mut events), Err(HintKind::NoSeeds));

        player.seeds = 1;
        player.pos.x += 200.0;
        assert_eq!(try_plant(&mut slots, &mut player, &tuning, &mut events), Err(HintKind::NoPlot));

        player.status.plant_cooldown.set(100.0);
        assert_eq!(try_plant(&mut slots, &mut player, &tuning, &mut events), Err(HintKind::Cooldown));
        assert!(events.is_empty());
        assert_eq!(player.seeds, 1);
    }

    #[test]
    fn test_replant_on_planted_plot_refused() {
        let (mut slots, mut player, upgrades, tuning, mut events) = setup();
        player.seeds = 2;
        try_plant(&mut slots, &mut player, &tuning, &mut events).unwrap();
        wait(&mut slots, &mut player, &upgrades, &tuning, tuning.plant_cooldown_ms + 16.0);
        let before = slots[0];
        events.clear();

        assert_eq!(try_plant(&mut slots, &mut player, &tuning, &mut events), Err(HintKind::NoPlot));
        assert_eq!(player.seeds, 1);
        assert_eq!(player.planted, 1);
        assert_eq!(slots[0], before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_second_water_refused() {
        let (mut slots, mut player, upgrades, tuning, mut events) = setup();
        let mut score = 0;
        slots[0].planted = true;
        slots[0].age_ms = 1000.0;
        try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events).unwrap();
        wait(&mut slots, &mut player, &upgrades, &tuning, 700.0);
        let before = slots[0];
        assert!(before.dwell_ms >= 690.0);
        events.clear();

        assert_eq!(
            try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events),
            Err(HintKind::NothingToWater)
        );
        assert_eq!(slots[0], before);
        assert_eq!(slots[0].dwell_ms, before.dwell_ms);
        assert!(slots[0].watered && !slots[0].rewarded);
        assert!(events.is_empty());
        assert_eq!(score, 0);
    }

    #[test]
    fn test_water_empty_plot_refused() {
        let (mut slots, mut player, upgrades, tuning, mut events) = setup();
        let mut score = 0;
        assert_eq!(
            try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events),
            Err(HintKind::NothingToWater)
        );
        assert!(!slots[0].planted && !slots[0].watered);
        assert!(!player.status.water_cooldown.is_active());
    }

    #[test]
    fn test_water_waits_for_seed_to_settle() {
        let (mut slots, mut player, upgrades, tuning, mut events) = setup();
        let mut score = 0;
        player.seeds = 1;
        try_plant(&mut slots, &mut player, &tuning, &mut events).unwrap();

        wait(&mut slots, &mut player, &upgrades, &tuning, 500.0);
        assert_eq!(
            try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events),
            Err(HintKind::SeedSettling)
        );
        assert!(!slots[0].watered);

        wait(&mut slots, &mut player, &upgrades, &tuning, 400.0);
        assert_eq!(
            try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events),
            Ok(0)
        );
        assert!(slots[0].watered);
        assert!(!slots[0].rewarded);
    }

    #[test]
    fn test_dwell_rewards_once() {
        let (mut slots, mut player, upgrades, tuning, mut events) = setup();
        let mut score = 0;
        slots[0].planted = true;
        slots[0].age_ms = 1000.0;
        player.o2 = 10.0;
        try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events).unwrap();

        score += wait(&mut slots, &mut player, &upgrades, &tuning, 1400.0);
        assert!(!slots[0].rewarded);
        score += wait(&mut slots, &mut player, &upgrades, &tuning, 200.0);
        assert!(slots[0].rewarded);
        assert_eq!(player.o2, 30.0);
        assert_eq!(score, 100);

        score += wait(&mut slots, &mut player, &upgrades, &tuning, 3000.0);
        assert_eq!(player.o2, 30.0);
        assert_eq!(score, 100);
    }

    #[test]
    fn test_leaving_resets_dwell() {
        let (mut slots, mut player, upgrades, tuning, mut events) = setup();
        let mut score = 0;
        slots[0].planted = true;
        slots[0].age_ms = 1000.0;
        try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events).unwrap();

        wait(&mut slots, &mut player, &upgrades, &tuning, 1000.0);
        assert!(slots[0].dwell_ms > 900.0);

        player.pos.x += 300.0;
        wait(&mut slots, &mut player, &upgrades, &tuning, 16.0);
        assert_eq!(slots[0].dwell_ms, 0.0);

        player.pos.x -= 300.0;
        wait(&mut slots, &mut player, &upgrades, &tuning, 1000.0);
        assert!(!slots[0].rewarded);
    }

    #[test]
    fn test_instant_oxygen_rewards_on_water() {
        let (mut slots, mut player, mut upgrades, tuning, mut events) = setup();
        let mut score = 0;
        upgrades.apply(CardId::O2Bonus1, &mut player);
        upgrades.apply(CardId::InstantO2, &mut player);
        slots[0].planted = true;
        slots[0].age_ms = 1000.0;
        player.o2 = 0.0;

        try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events).unwrap();
        assert!(slots[0].rewarded);
        assert_eq!(player.o2, (20.0 + upgrades.o2_reward_bonus()).min(player.max_o2()));
        assert_eq!(score, 100);
    }

    #[test]
    fn test_reward_clamped_to_max() {
        let (mut slots, mut player, upgrades, tuning, mut events) = setup();
        let mut score = 0;
        slots[0].planted = true;
        slots[0].age_ms = 1000.0;
        player.o2 = 45.0;
        try_water(&mut slots, &mut player, &upgrades, &tuning, &mut score, &mut events).unwrap();
        wait(&mut slots, &mut player, &upgrades, &tuning, 2000.0);
        assert_eq!(player.o2, 50.0);
    }

    #[test]
    fn test_quick_bloom_shortens_hold() {
        let (_, mut player, mut upgrades, tuning, _) = setup();
        let base = hold_ms(&upgrades, &tuning);
        upgrades.apply(CardId::QuickBloom1, &mut player);
        assert!(hold_ms(&upgrades, &tuning) < base);
        assert!(hold_ms(&upgrades, &tuning) >= tuning.hold_min_ms);
    }

    #[test]
    fn test_collect_seeds_once() {
        let mut player = player_at(300.0);
        let mut seeds = vec![SeedPickup::new(Rect::new(290.0, GROUND - 40.0, 20.0, 20.0))];
        let mut events = Vec::new();
        assert_eq!(collect_seeds(&mut seeds, &mut player, &mut events), 1);
        assert_eq!(collect_seeds(&mut seeds, &mut player, &mut events), 0);
        assert_eq!(player.seeds, 1);
    }

    #[test]
    fn test_periodic_oxygen_needs_upgrade() {
        let (_, mut player, mut upgrades, tuning, mut events) = setup();
        player.o2 = 10.0;
        tick_periodic_oxygen(&mut player, &upgrades, &tuning, 10_000.0, &mut events);
        assert_eq!(player.o2, 10.0);

        upgrades.apply(CardId::PeriodicO2, &mut player);
        tick_periodic_oxygen(&mut player, &upgrades, &tuning, 9_990.0, &mut events);
        assert_eq!(player.o2, 10.0);
        tick_periodic_oxygen(&mut player, &upgrades, &tuning, 20.0, &mut events);
        assert_eq!(player.o2, 15.0);
    }
}
