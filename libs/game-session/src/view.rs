//! Declarative views handed to the presentation layer.
//!
//! The core never reads rendered output back; it only emits these snapshots.

use serde::{Deserialize, Serialize};
use story_core::GameKind;

use crate::contract::{Phase, SessionContext};

/// Snapshot of a session's current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub story_id: String,
    pub game_id: String,
    pub kind: GameKind,
    pub title: String,
    pub subtitle: String,
    pub phase: Phase,
    /// Running score shown in the header, 0-100.
    pub score_percent: u8,
    pub step: StepView,
}

impl GameView {
    pub(crate) fn new(ctx: &SessionContext, phase: Phase, score_percent: u8, step: StepView) -> Self {
        Self {
            story_id: ctx.story_id.clone(),
            game_id: ctx.game_id.clone(),
            kind: ctx.kind,
            title: ctx.heading.primary.clone(),
            subtitle: ctx.heading.secondary.clone(),
            phase,
            score_percent,
            step,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepView {
    Quiz(QuizStep),
    Memory(MemoryStep),
    Sentence(SentenceStep),
    Blanks(BlanksStep),
    Completed(CompletionView),
}

/// Feedback line under the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    Incorrect,
    TimeUp,
}

/// Color escalation of the quiz timer bar. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Calm,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    None,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionView {
    pub text: String,
    pub mark: OptionMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizStep {
    /// 1-based question number.
    pub position: usize,
    pub total: usize,
    pub prompt: String,
    pub prompt_subtitle: String,
    pub options: Vec<OptionView>,
    /// Options accept input only while this is set.
    pub enabled: bool,
    pub time_left: u32,
    pub urgency: Urgency,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFace {
    Hidden,
    FaceUp,
    Matched,
}

/// A memory card. Term and image are only revealed when the card is not hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub index: usize,
    pub face: CardFace,
    pub shaking: bool,
    pub term: Option<String>,
    pub translation: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStep {
    /// Image resolution progress while the board is loading.
    pub loading_percent: Option<u8>,
    pub cards: Vec<CardView>,
    pub matched_pairs: u32,
    pub total_pairs: usize,
    pub mismatches: u32,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTile {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceStep {
    pub position: usize,
    pub total: usize,
    pub bank: Vec<WordTile>,
    pub answer: Vec<WordTile>,
    pub can_check: bool,
    /// Glossary translation of every answer word once the sentence is solved.
    pub word_translations: Vec<String>,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterChoice {
    pub index: usize,
    pub letter: char,
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlanksStep {
    pub position: usize,
    pub total: usize,
    pub before: String,
    pub after: String,
    pub slots: Vec<Option<char>>,
    pub choices: Vec<LetterChoice>,
    pub can_delete: bool,
    /// Translated sentence with the answer filled in, once solved.
    pub translation: Option<String>,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionView {
    pub correct: u32,
    pub total: usize,
    pub percent: u8,
    /// Memory games report their mismatches instead of wrong answers.
    pub mismatches: Option<u32>,
}
