//! Dialogue gate
//!
//! Holds a queued sequence of lines and reports when the last one has been
//! dismissed. Text reveal and avatars belong to the presentation layer; the
//! simulation only waits here until the queue is exhausted.

use serde::{Deserialize, Serialize};

use super::timer::Accumulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    /// The unnamed voice guiding the robot
    Guide,
    Robot,
    System,
}

impl Speaker {
    pub fn name(&self) -> &'static str {
        match self {
            Speaker::Guide => "??",
            Speaker::Robot => "Robot",
            Speaker::System => "SYSTEM",
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Speaker::Guide => "GUIDE",
            Speaker::Robot => "UNIT",
            Speaker::System => "SIGNAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: Speaker,
    pub text: String,
}

impl DialogueLine {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// A dialogue sequence being played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueGate {
    lines: Vec<DialogueLine>,
    index: usize,
    auto_timer: Accumulator,
}

impl DialogueGate {
    pub fn new(lines: Vec<DialogueLine>) -> Self {
        Self {
            lines,
            index: 0,
            auto_timer: Accumulator::default(),
        }
    }

    /// Line currently on screen
    pub fn current(&self) -> Option<&DialogueLine> {
        self.lines.get(self.index)
    }

    /// Index of the current line and total count
    pub fn progress(&self) -> (usize, usize) {
        (self.index.min(self.lines.len()), self.lines.len())
    }

    pub fn advance(&mut self) {
        if self.index < self.lines.len() {
            self.index += 1;
        }
        self.auto_timer.reset();
    }

    /// Dismiss every remaining line
    pub fn skip(&mut self) {
        self.index = self.lines.len();
    }

    /// Auto-advance one line per `auto_ms` when auto mode is on
    pub fn update(&mut self, dt_ms: f32, auto_ms: Option<f32>) {
        match auto_ms {
            Some(period) => {
                if self.auto_timer.fire_once(dt_ms, period) {
                    self.advance();
                }
            }
            None => self.auto_timer.reset(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.lines.len()
    }
}
