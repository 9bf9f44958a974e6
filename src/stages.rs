//! Stage descriptors
//!
//! Stages are plain data: geometry, hazard coordinates, seed locations and
//! optional rule blocks. The simulation only ever reads them. A built-in set
//! of seven stages ships with the crate; replacements can be loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, read_file};

/// Acid rain duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcidRain {
    pub on_ms: f32,
    pub off_ms: f32,
    pub dps: f32,
}

/// Periodic freezing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snow {
    pub freeze_ms: f32,
    pub freeze_min_ms: f32,
    pub freeze_max_ms: f32,
}

/// Tornado wind zones spread evenly along the stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindZones {
    pub count: u32,
}

/// Optional stage-wide rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageRules {
    pub acid_rain: Option<AcidRain>,
    pub snow: Option<Snow>,
    pub wind_zones: Option<WindZones>,
    pub speed_mul: f32,
}

impl Default for StageRules {
    fn default() -> Self {
        Self {
            acid_rain: None,
            snow: None,
            wind_zones: None,
            speed_mul: 1.0,
        }
    }
}

/// A horizontal run of solid ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSpan {
    pub x: f32,
    pub w: f32,
}

/// A raised step or ledge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub toxic: bool,
}

/// A static spike strip, standing on `y`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeDef {
    pub x: f32,
    pub y: f32,
    pub w: f32,
}

/// A floating toxic orb centred on (x, y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbDef {
    pub x: f32,
    pub y: f32,
}

/// One stage of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub name: String,
    /// Warning shown in the stage entry dialogue
    #[serde(default)]
    pub rule_text: String,
    /// Background reference for the renderer
    #[serde(default)]
    pub background: String,
    pub length: f32,
    pub ground_y: f32,
    /// Empty means solid ground across the whole stage
    #[serde(default)]
    pub ground: Vec<GroundSpan>,
    #[serde(default)]
    pub platforms: Vec<PlatformDef>,
    #[serde(default)]
    pub spikes: Vec<SpikeDef>,
    #[serde(default)]
    pub orbs: Vec<OrbDef>,
    /// Seed pickup x positions; each gets a plant slot
    #[serde(default)]
    pub seeds: Vec<f32>,
    #[serde(default)]
    pub rules: StageRules,
}

impl StageDef {
    /// Parse a stage list from JSON
    pub fn list_from_json(json: &str) -> Result<Vec<StageDef>, LoadError> {
        let stages: Vec<StageDef> = serde_json::from_str(json)?;
        if stages.is_empty() {
            return Err(LoadError::EmptyStageList);
        }
        Ok(stages)
    }

    /// Load a stage list from a JSON file
    pub fn load_list(path: &Path) -> Result<Vec<StageDef>, LoadError> {
        let stages = Self::list_from_json(&read_file(path)?)?;
        log::info!("Loaded {} stages from {}", stages.len(), path.display());
        Ok(stages)
    }

    fn flat(name: &str, rule_text: &str, length: f32) -> Self {
        Self {
            name: name.to_string(),
            rule_text: rule_text.to_string(),
            background: String::new(),
            length,
            ground_y: GROUND_Y,
            ground: Vec::new(),
            platforms: Vec::new(),
            spikes: Vec::new(),
            orbs: Vec::new(),
            seeds: Vec::new(),
            rules: StageRules::default(),
        }
    }
}

const GROUND_Y: f32 = 480.0;

/// Evenly spaced x positions across `[start, end]`
fn spread(count: usize, start: f32, end: f32) -> impl Iterator<Item = f32> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f32
    } else {
        0.0
    };
    (0..count).map(move |i| start + step * i as f32)
}

/// The seven stages of the standard run
pub fn builtin_stages() -> Vec<StageDef> {
    let mut stages = Vec::with_capacity(7);

    // 1: open wasteland, nothing hostile
    let mut s = StageDef::flat("Wasteland Edge", "Oxygen drains over time", 2000.0);
    s.background = "bg_wasteland".into();
    s.seeds = spread(3, 400.0, 1700.0).collect();
    s.platforms = vec![PlatformDef { x: 900.0, y: 400.0, w: 160.0, h: 20.0, toxic: false }];
    stages.push(s);

    // 2: toxic sludge
    let mut s = StageDef::flat("Sludge Flats", "Toxic platforms and floating orbs", 2600.0);
    s.background = "bg_sludge".into();
    s.seeds = spread(4, 450.0, 2300.0).collect();
    s.platforms = spread(4, 650.0, 2100.0)
        .enumerate()
        .map(|(i, x)| PlatformDef { x, y: 390.0, w: 140.0, h: 20.0, toxic: i % 2 == 1 })
        .collect();
    s.orbs = spread(3, 800.0, 2000.0).map(|x| OrbDef { x, y: 360.0 }).collect();
    stages.push(s);

    // 3: spike field with a pit
    let mut s = StageDef::flat("Scrap Canyon", "Spikes and a collapsed floor", 3000.0);
    s.background = "bg_canyon".into();
    s.seeds = spread(4, 400.0, 2700.0).collect();
    s.ground = vec![GroundSpan { x: 0.0, w: 1400.0 }, GroundSpan { x: 1520.0, w: 1480.0 }];
    s.spikes = spread(4, 700.0, 2400.0)
        .map(|x| SpikeDef { x, y: GROUND_Y, w: 48.0 })
        .collect();
    s.platforms = vec![PlatformDef { x: 1380.0, y: 400.0, w: 160.0, h: 20.0, toxic: false }];
    stages.push(s);

    // 4: acid rain
    let mut s = StageDef::flat("Acid Plains", "Acid rain falls in cycles", 3200.0);
    s.background = "bg_acid".into();
    s.seeds = spread(5, 400.0, 2900.0).collect();
    s.spikes = spread(3, 900.0, 2500.0)
        .map(|x| SpikeDef { x, y: GROUND_Y, w: 48.0 })
        .collect();
    s.rules.acid_rain = Some(AcidRain { on_ms: 3000.0, off_ms: 5000.0, dps: 5.0 });
    stages.push(s);

    // 5: tornado belt
    let mut s = StageDef::flat("Storm Belt", "Tornadoes stun and slow", 3400.0);
    s.background = "bg_storm".into();
    s.seeds = spread(5, 400.0, 3100.0).collect();
    s.orbs = spread(3, 1000.0, 2800.0).map(|x| OrbDef { x, y: 380.0 }).collect();
    s.rules.wind_zones = Some(WindZones { count: 3 });
    s.rules.speed_mul = 0.9;
    stages.push(s);

    // 6: frozen ruins
    let mut s = StageDef::flat("Frozen Ruins", "Blizzards freeze you in place", 3600.0);
    s.background = "bg_frozen".into();
    s.seeds = spread(5, 450.0, 3300.0).collect();
    s.spikes = spread(4, 800.0, 3000.0)
        .map(|x| SpikeDef { x, y: GROUND_Y, w: 48.0 })
        .collect();
    s.rules.snow = Some(Snow { freeze_ms: 1200.0, freeze_min_ms: 5000.0, freeze_max_ms: 9000.0 });
    s.rules.speed_mul = 0.85;
    stages.push(s);

    // 7: everything at once
    let mut s = StageDef::flat("Last Garden", "Acid, wind, frost and toxins together", 4000.0);
    s.background = "bg_final".into();
    s.seeds = spread(6, 450.0, 3700.0).collect();
    s.platforms = spread(5, 700.0, 3300.0)
        .enumerate()
        .map(|(i, x)| PlatformDef { x, y: 385.0, w: 150.0, h: 20.0, toxic: i % 2 == 0 })
        .collect();
    s.spikes = spread(4, 1000.0, 3500.0)
        .map(|x| SpikeDef { x, y: GROUND_Y, w: 48.0 })
        .collect();
    s.orbs = spread(4, 900.0, 3400.0).map(|x| OrbDef { x, y: 350.0 }).collect();
    s.rules = StageRules {
        acid_rain: Some(AcidRain { on_ms: 2500.0, off_ms: 6000.0, dps: 6.0 }),
        snow: Some(Snow { freeze_ms: 1000.0, freeze_min_ms: 7000.0, freeze_max_ms: 11000.0 }),
        wind_zones: Some(WindZones { count: 2 }),
        speed_mul: 0.9,
    };
    stages.push(s);

    stages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_seven_stages_with_seeds() {
        let stages = builtin_stages();
        assert_eq!(stages.len(), 7);
        for stage in &stages {
            assert!(!stage.seeds.is_empty(), "{} has no seeds", stage.name);
            assert!(stage.seeds.iter().all(|&x| x > 0.0 && x < stage.length));
        }
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"[{ "name": "Test", "length": 800.0, "ground_y": 400.0 }]"#;
        let stages = StageDef::list_from_json(json).unwrap();
        assert_eq!(stages[0].rules.speed_mul, 1.0);
        assert!(stages[0].seeds.is_empty());
        assert!(stages[0].rules.acid_rain.is_none());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            StageDef::list_from_json("[]"),
            Err(LoadError::EmptyStageList)
        ));
    }
}
