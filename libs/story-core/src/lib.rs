//! Core story library shared by the game sessions and the backend.
//!
//! Provides:
//! - Annotation parser for `text <translation>` content strings
//! - Vocabulary parser for memory-card term pairs
//! - Uniform shuffling used for word banks, card layouts and letter choices
//! - Answer checks for the sentence and fill-the-blanks games
//! - Progress scoring
//! - Shared types (GameDescriptor, GameContent, ProgressReport, etc.)

pub mod annotation;
pub mod content;
pub mod error;
pub mod matching;
pub mod scoring;
pub mod shuffle;
pub mod types;
pub mod vocabulary;

pub use annotation::{parse_annotation, Annotated};
pub use content::{GameSummary, Glossary, GlossaryEntry, Story, StorySummary};
pub use error::{ContentError, Result};
pub use matching::{
    check_spelling, check_word_order, fill_blank, gloss_key, letter_choices, sentence_words,
    split_blank, BLANK_MARKER,
};
pub use scoring::{memory_error_count, progress_percent, FREE_MISMATCHES};
pub use shuffle::{shuffle, shuffled};
pub use types::{
    BlankRecord, GameContent, GameDescriptor, GameKind, ProgressReport, QuestionRecord, SoundKind,
    Verdict,
};
pub use vocabulary::{parse_vocabulary, VocabPair};
