//! Story content loading.
//!
//! # Format
//! ```json
//! {
//!   "id": "the-lost-cat",
//!   "title": "The Lost Cat <El gato perdido>",
//!   "glossary": [{"word": "cat", "translation": "gato"}],
//!   "games": [
//!     {"id": "order", "type": "sentences", "t": "Order <Ordena>", "it": ["The cat sleeps. <El gato duerme.>"]}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::annotation::parse_annotation;
use crate::error::{ContentError, Result};
use crate::matching::gloss_key;
use crate::types::{GameDescriptor, GameKind};

/// One glossary word with its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub word: String,
    pub translation: String,
}

/// Story glossary keyed by [`gloss_key`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<GlossaryEntry>", into = "Vec<GlossaryEntry>")]
pub struct Glossary {
    entries: HashMap<String, GlossaryEntry>,
}

impl Glossary {
    pub fn get(&self, word: &str) -> Option<&GlossaryEntry> {
        self.entries.get(&gloss_key(word))
    }

    /// Translation of a word tile, `...` when the glossary has no entry.
    pub fn translate(&self, word: &str) -> String {
        self.get(word)
            .map(|entry| entry.translation.clone())
            .unwrap_or_else(|| "...".to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<GlossaryEntry>> for Glossary {
    fn from(list: Vec<GlossaryEntry>) -> Self {
        let entries = list
            .into_iter()
            .map(|entry| (gloss_key(&entry.word), entry))
            .collect();
        Self { entries }
    }
}

impl From<Glossary> for Vec<GlossaryEntry> {
    fn from(glossary: Glossary) -> Self {
        let mut list: Vec<_> = glossary.entries.into_values().collect();
        list.sort_by(|a, b| a.word.cmp(&b.word));
        list
    }
}

/// A story with its games and glossary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub glossary: Glossary,
    pub games: Vec<GameDescriptor>,
}

impl Story {
    /// Parse and validate a story from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let story: Story = serde_json::from_str(json)?;
        story.validate()?;
        Ok(story)
    }

    fn validate(&self) -> Result<()> {
        if self.games.is_empty() {
            return Err(ContentError::EmptyStory {
                id: self.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        for game in &self.games {
            if !seen.insert(game.id.as_str()) {
                return Err(ContentError::DuplicateGame {
                    id: game.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn game(&self, game_id: &str) -> Option<&GameDescriptor> {
        self.games.iter().find(|g| g.id == game_id)
    }

    pub fn summary(&self) -> StorySummary {
        let heading = parse_annotation(&self.title);
        StorySummary {
            id: self.id.clone(),
            title: heading.primary,
            subtitle: heading.secondary,
            games: self
                .games
                .iter()
                .map(|g| GameSummary {
                    id: g.id.clone(),
                    kind: g.kind(),
                    title: g.heading().primary,
                    items: g.content.item_count(),
                })
                .collect(),
        }
    }
}

/// Story listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySummary {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: String,
    pub kind: GameKind,
    pub title: String,
    pub items: usize,
}
