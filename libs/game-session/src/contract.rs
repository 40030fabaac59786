//! The contract every game session satisfies.

use serde::{Deserialize, Serialize};
use story_core::{progress_percent, Annotated, GameDescriptor, GameKind, ProgressReport, Verdict};

use crate::view::GameView;

/// A running game. One instance per play; discarded after `close`.
pub trait GameSession: Send + Sync {
    fn kind(&self) -> GameKind;

    /// Feed one input event. Events that do not apply to the current step are ignored.
    fn dispatch(&self, event: GameEvent);

    /// Current declarative view, `None` once closed.
    fn view(&self) -> Option<GameView>;

    /// Tear the session down. Idempotent.
    ///
    /// The first call cancels all timers, reports progress when `save` is set
    /// and the game has items, and notifies the host's `on_close`.
    fn close(&self, save: bool);

    fn is_closed(&self) -> bool;
}

/// Discrete input events coming from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Quiz: pick an option by index.
    SelectOption { index: usize },
    /// Sentences: move a word tile between the bank and the answer line.
    PlaceWord { index: usize },
    /// Sentences: check the assembled sentence.
    Submit,
    /// Memory: flip a card by board position.
    Flip { index: usize },
    /// Blanks: use a letter choice.
    PickLetter { index: usize },
    /// Blanks: clear the last filled slot.
    DeleteLastLetter,
    /// Move on after an evaluated step.
    Advance,
    Close {
        #[serde(default = "default_save")]
        save: bool,
    },
}

fn default_save() -> bool {
    true
}

/// Step lifecycle shared by all games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    AwaitingInput,
    Evaluated,
    Completed,
}

/// Item cursor and answer counters.
///
/// `current_index` never exceeds `total`; the counters only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub current_index: usize,
    pub total: usize,
    pub correct: u32,
    pub errors: u32,
}

impl Tally {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Incorrect => self.errors += 1,
        }
    }

    /// Move the cursor forward; returns whether an item remains.
    pub fn step(&mut self) -> bool {
        if self.current_index < self.total {
            self.current_index += 1;
        }
        self.has_current()
    }

    pub fn has_current(&self) -> bool {
        self.current_index < self.total
    }

    pub fn percent(&self) -> u8 {
        progress_percent(self.correct, self.total as u32)
    }
}

/// Identity of a running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub story_id: String,
    pub game_id: String,
    pub kind: GameKind,
    pub heading: Annotated,
}

impl SessionContext {
    pub fn new(story_id: &str, descriptor: &GameDescriptor) -> Self {
        Self {
            story_id: story_id.to_string(),
            game_id: descriptor.id.clone(),
            kind: descriptor.kind(),
            heading: descriptor.heading(),
        }
    }

    pub fn report(&self, percent: u8, errors: u32) -> ProgressReport {
        ProgressReport {
            story_id: self.story_id.clone(),
            game_id: self.game_id.clone(),
            percent,
            errors,
        }
    }
}
