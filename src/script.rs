//! Dialogue script played between phases

use crate::sim::dialogue::{DialogueLine, Speaker};
use crate::stages::StageDef;

use Speaker::{Guide, Robot, System};

fn lines(script: &[(Speaker, &str)]) -> Vec<DialogueLine> {
    script
        .iter()
        .map(|(speaker, text)| DialogueLine::new(*speaker, *text))
        .collect()
}

/// Opening of a fresh run
pub fn intro() -> Vec<DialogueLine> {
    lines(&[
        (Guide, "Year 20XX. Pollution broke the Earth, and humanity left for other worlds."),
        (Guide, "What remained... abandoned robots, scrap, and a restoration system about to fail."),
        (Guide, "...Signal confirmed. Restarting restoration unit."),
        (Robot, "...Boot complete. Environment: uninhabitable. Awaiting orders."),
        (Guide, "Good. Quick tutorial: move with left/right, jump with Space."),
        (Guide, "Collect seeds, plant them with E, water them with F to restore oxygen."),
        (Guide, "Oxygen runs down over time. Keep planting as you push forward."),
        (Robot, "...Mission accepted. Executing Earth regeneration protocol."),
        (System, "Left/Right move, Space jump. E plant, F water."),
    ])
}

/// Warning before a stage starts
pub fn stage_enter(stage: &StageDef, index: usize) -> Vec<DialogueLine> {
    let rule = if stage.rule_text.is_empty() {
        "unknown conditions"
    } else {
        stage.rule_text.as_str()
    };
    vec![
        DialogueLine::new(Guide, format!("Entering stage {}: {}.", index + 1, stage.name)),
        DialogueLine::new(Guide, format!("Caution: {rule}.")),
        DialogueLine::new(Robot, "Acknowledged. Continuing mission."),
    ]
}

/// After every plant in a stage has bloomed, before the next one
pub fn stage_exit(stage: &StageDef) -> Vec<DialogueLine> {
    vec![
        DialogueLine::new(Guide, format!("{} is breathing again.", stage.name)),
        DialogueLine::new(Robot, "Sector restored. Moving to the next zone."),
    ]
}

/// After the robot breaks down
pub fn failure() -> Vec<DialogueLine> {
    lines(&[
        (System, "Unit critical. Emergency reboot in progress..."),
        (Guide, "Careful out there. Try that stretch again."),
    ])
}

/// After the final stage is restored
pub fn ending() -> Vec<DialogueLine> {
    lines(&[
        (Guide, "...Final sector purified."),
        (Guide, "There is a long way to go, but right now this is hope."),
        (Robot, "Detected: faint biological signal... a sprout."),
        (Guide, "Good. This is where it really begins."),
    ])
}
