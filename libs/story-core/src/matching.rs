//! Answer checks for the sentence and fill-the-blanks games.

use rand::Rng;

use crate::shuffle::{shuffle, shuffled};

/// Marker a fill-the-blank sentence uses for the missing word.
pub const BLANK_MARKER: &str = "_____";

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letter choices offered for a blank never drop below this many distractors.
const MIN_DISTRACTORS: usize = 4;

/// Target size of the letter keyboard before the minimum kicks in.
const KEYBOARD_SIZE: usize = 12;

/// Split a sentence into the word tiles of the ordering game.
pub fn sentence_words(primary: &str) -> Vec<String> {
    primary.split_whitespace().map(str::to_string).collect()
}

/// Check a word ordering against the sentence's primary text.
///
/// Words are joined with single spaces; comparison is exact.
pub fn check_word_order<S: AsRef<str>>(placed: &[S], expected_primary: &str) -> bool {
    let typed = placed.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
    typed == normalize_whitespace(expected_primary)
}

/// Check a spelled answer. Case-insensitive, no annotation handling.
pub fn check_spelling(typed: &str, expected: &str) -> bool {
    typed.to_lowercase() == expected.to_lowercase()
}

/// Build the shuffled letter keyboard for a blank.
///
/// Contains every letter of the answer (uppercased, duplicates kept) plus
/// `max(4, 12 - len)` distinct distractors from A-Z that do not occur in
/// the answer.
pub fn letter_choices<R: Rng + ?Sized>(answer: &str, rng: &mut R) -> Vec<char> {
    let correct: Vec<char> = answer.chars().map(uppercase).collect();
    let wanted = MIN_DISTRACTORS.max(KEYBOARD_SIZE.saturating_sub(correct.len()));

    let pool: Vec<char> = ALPHABET.chars().filter(|c| !correct.contains(c)).collect();
    let distractors = shuffled(&pool, rng);

    let mut choices = correct;
    choices.extend(distractors.into_iter().take(wanted));
    shuffle(&mut choices, rng);
    choices
}

/// Glossary key for a word tile: lowercase, one trailing punctuation mark removed.
pub fn gloss_key(word: &str) -> String {
    let lower = word.to_lowercase();
    match lower.strip_suffix(['.', ',', ';', '!', '?', '"']) {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Split a blank sentence into the text before and after the marker.
pub fn split_blank(sentence: &str) -> (String, String) {
    match sentence.split_once(BLANK_MARKER) {
        Some((before, after)) => (before.to_string(), after.to_string()),
        None => (sentence.to_string(), String::new()),
    }
}

/// Replace the first blank marker with the answer.
pub fn fill_blank(sentence: &str, answer: &str) -> String {
    sentence.replacen(BLANK_MARKER, answer, 1)
}

/// Normalize whitespace in a string (trim and collapse multiple spaces).
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn uppercase(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}
