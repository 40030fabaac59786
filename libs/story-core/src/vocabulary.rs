//! Vocabulary parser for memory-card games.
//!
//! # Format
//! ```text
//! dog <perro> | cat <gato> | house <casa>
//! ```

use serde::{Deserialize, Serialize};

/// One vocabulary term and its translation.
///
/// `id` is the pair-id shared by both memory cards of the term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabPair {
    pub id: usize,
    pub term: String,
    pub translation: String,
}

/// Parse a pipe-delimited vocabulary string.
///
/// Blank segments are skipped. A segment without `<` keeps its text as the
/// term with an empty translation.
pub fn parse_vocabulary(source: &str) -> Vec<VocabPair> {
    source
        .split('|')
        .filter(|segment| !segment.trim().is_empty())
        .enumerate()
        .map(|(id, segment)| {
            let (term, translation) = match segment.split_once('<') {
                Some((term, rest)) => (term, rest.replace('>', "")),
                None => (segment, String::new()),
            };
            VocabPair {
                id,
                term: term.trim().to_string(),
                translation: translation.trim().to_string(),
            }
        })
        .collect()
}
