//! Core types for the activity games.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::annotation::{parse_annotation, Annotated};
use crate::vocabulary::{parse_vocabulary, VocabPair};

/// Game type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Sentences,
    Quiz,
    Memory,
    Blanks,
}

impl GameKind {
    /// Get the game kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentences => "sentences",
            Self::Quiz => "quiz",
            Self::Memory => "memory",
            Self::Blanks => "blanks",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sound cue requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    Click,
    Ok,
    Wrong,
    Congrats,
}

/// Outcome of evaluating one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn from_bool(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }
}

/// Multiple-choice question. All three fields are annotation strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(alias = "q")]
    pub prompt: String,
    #[serde(alias = "o")]
    pub options: Vec<String>,
    #[serde(alias = "a")]
    pub answer: String,
}

/// Fill-the-blank question. The sentence carries the `_____` marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlankRecord {
    #[serde(alias = "s")]
    pub sentence: String,
    #[serde(alias = "a")]
    pub answer: String,
}

/// Playable content of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameContent {
    Sentences {
        #[serde(alias = "it")]
        items: Vec<String>,
    },
    Quiz {
        #[serde(alias = "q")]
        questions: Vec<QuestionRecord>,
    },
    Memory {
        #[serde(alias = "v_str")]
        vocabulary: String,
    },
    Blanks {
        #[serde(alias = "q")]
        questions: Vec<BlankRecord>,
    },
}

impl GameContent {
    pub fn kind(&self) -> GameKind {
        match self {
            Self::Sentences { .. } => GameKind::Sentences,
            Self::Quiz { .. } => GameKind::Quiz,
            Self::Memory { .. } => GameKind::Memory,
            Self::Blanks { .. } => GameKind::Blanks,
        }
    }

    /// Number of progressable items (sentences, questions or pairs).
    pub fn item_count(&self) -> usize {
        match self {
            Self::Sentences { items } => items.len(),
            Self::Quiz { questions } => questions.len(),
            Self::Memory { vocabulary } => parse_vocabulary(vocabulary).len(),
            Self::Blanks { questions } => questions.len(),
        }
    }

    /// Vocabulary pairs of a memory game, empty for other kinds.
    pub fn vocabulary(&self) -> Vec<VocabPair> {
        match self {
            Self::Memory { vocabulary } => parse_vocabulary(vocabulary),
            _ => Vec::new(),
        }
    }
}

/// Immutable description of one game inside a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDescriptor {
    pub id: String,
    /// Title annotation string; the secondary part is the subtitle.
    #[serde(alias = "t")]
    pub title: String,
    #[serde(flatten)]
    pub content: GameContent,
}

impl GameDescriptor {
    pub fn kind(&self) -> GameKind {
        self.content.kind()
    }

    pub fn heading(&self) -> Annotated {
        parse_annotation(&self.title)
    }
}

/// Final or partial progress handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub story_id: String,
    pub game_id: String,
    /// 0-100.
    pub percent: u8,
    pub errors: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize_compact_quiz() {
        let json = r#"{
            "id": "quiz-1",
            "type": "quiz",
            "t": "Quiz <Trivia>",
            "q": [{"q": "Color of the sky? <¿Color del cielo?>", "o": ["Blue <Azul>", "Red"], "a": "Blue"}]
        }"#;
        let game: GameDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(game.kind(), GameKind::Quiz);
        assert_eq!(game.heading().secondary, "Trivia");
        match &game.content {
            GameContent::Quiz { questions } => {
                assert_eq!(questions[0].options.len(), 2);
                assert_eq!(questions[0].answer, "Blue");
            }
            other => panic!("unexpected content {:?}", other.kind()),
        }
    }

    #[test]
    fn deserialize_long_form_memory() {
        let json = r#"{"id": "mem", "type": "memory", "title": "Animals", "vocabulary": "dog<perro>|cat<gato>"}"#;
        let game: GameDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(game.kind(), GameKind::Memory);
        assert_eq!(game.content.item_count(), 2);
        assert_eq!(game.content.vocabulary()[1].translation, "gato");
    }

    #[test]
    fn deserialize_compact_sentences_and_blanks() {
        let sentences: GameDescriptor =
            serde_json::from_str(r#"{"id": "s", "type": "sentences", "t": "Order", "it": ["I run <Corro>"]}"#)
                .unwrap();
        assert_eq!(sentences.content.item_count(), 1);

        let blanks: GameDescriptor = serde_json::from_str(
            r#"{"id": "b", "type": "blanks", "t": "Spell", "q": [{"s": "A _____ <Un _____>", "a": "dog <perro>"}]}"#,
        )
        .unwrap();
        assert_eq!(blanks.kind(), GameKind::Blanks);
    }

    #[test]
    fn sound_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&SoundKind::Congrats).unwrap(), "\"congrats\"");
    }
}
