//! Sentence ordering: rebuild a sentence from its shuffled words.
//!
//! A wrong attempt counts an error and leaves the words in place so the
//! player can rearrange them and try again.

use std::sync::{Arc, Weak};

use rand::rngs::StdRng;
use story_core::{
    check_word_order, parse_annotation, sentence_words, shuffled, Annotated, GameContent,
    GameDescriptor, GameKind, Glossary, SoundKind, Verdict,
};
use tracing::debug;

use crate::config::SessionConfig;
use crate::contract::{GameEvent, GameSession, Phase, SessionContext, Tally};
use crate::engine::{GameState, SessionCore, Turn};
use crate::error::SessionError;
use crate::host::GameHost;
use crate::view::{CompletionView, Feedback, GameView, SentenceStep, StepView, WordTile};

struct SentenceState {
    sentences: Vec<Annotated>,
    glossary: Arc<Glossary>,
    tally: Tally,
    phase: Phase,
    /// Word tiles of the current sentence, in shuffled order.
    tiles: Vec<String>,
    /// Tile indices on the answer line, in placement order.
    placed: Vec<usize>,
    word_translations: Vec<String>,
    feedback: Option<Feedback>,
    feedback_generation: u64,
    rng: StdRng,
}

impl SentenceState {
    fn bank(&self) -> Vec<usize> {
        (0..self.tiles.len())
            .filter(|i| !self.placed.contains(i))
            .collect()
    }

    fn tile(&self, index: usize) -> WordTile {
        WordTile {
            index,
            text: self.tiles[index].clone(),
        }
    }

    fn placed_words(&self) -> Vec<&str> {
        self.placed.iter().map(|&i| self.tiles[i].as_str()).collect()
    }

    fn deal(&mut self) {
        let words = self
            .sentences
            .get(self.tally.current_index)
            .map(|sentence| sentence_words(&sentence.primary))
            .unwrap_or_default();
        self.tiles = shuffled(&words, &mut self.rng);
        self.placed.clear();
        self.word_translations.clear();
        self.feedback = None;
    }
}

impl GameState for SentenceState {
    fn tally(&self) -> Tally {
        self.tally
    }

    fn view(&self, ctx: &SessionContext) -> GameView {
        let step = match self.phase {
            Phase::Completed => StepView::Completed(CompletionView {
                correct: self.tally.correct,
                total: self.tally.total,
                percent: self.tally.percent(),
                mismatches: None,
            }),
            phase => {
                let bank = self.bank();
                StepView::Sentence(SentenceStep {
                    position: self.tally.current_index + 1,
                    total: self.tally.total,
                    can_check: phase == Phase::AwaitingInput && bank.is_empty(),
                    bank: bank.into_iter().map(|i| self.tile(i)).collect(),
                    answer: self.placed.iter().map(|&i| self.tile(i)).collect(),
                    word_translations: self.word_translations.clone(),
                    feedback: self.feedback,
                })
            }
        };
        GameView::new(ctx, self.phase, self.tally.percent(), step)
    }
}

/// A running sentence-ordering game.
pub struct SentenceSession {
    core: SessionCore<SentenceState>,
    me: Weak<SentenceSession>,
    config: SessionConfig,
}

impl SentenceSession {
    pub fn start(
        descriptor: &GameDescriptor,
        story_id: &str,
        glossary: Arc<Glossary>,
        host: Arc<dyn GameHost>,
        config: &SessionConfig,
    ) -> Result<Arc<Self>, SessionError> {
        let GameContent::Sentences { items } = &descriptor.content else {
            return Err(SessionError::ContentMismatch {
                game_id: descriptor.id.clone(),
                expected: GameKind::Sentences,
                found: descriptor.kind(),
            });
        };

        let sentences: Vec<Annotated> = items.iter().map(|s| parse_annotation(s)).collect();
        let state = SentenceState {
            tally: Tally::new(sentences.len()),
            sentences,
            glossary,
            phase: Phase::Loading,
            tiles: Vec::new(),
            placed: Vec::new(),
            word_translations: Vec::new(),
            feedback: None,
            feedback_generation: 0,
            rng: config.rng(),
        };

        let ctx = SessionContext::new(story_id, descriptor);
        let session = Arc::new_cyclic(|me| Self {
            core: SessionCore::new(ctx, host, state),
            me: me.clone(),
            config: config.clone(),
        });
        session.core.update(|state, turn| load_sentence(state, turn));
        Ok(session)
    }

    /// Move a tile between the bank and the answer line.
    pub fn place_word(&self, index: usize) -> bool {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::AwaitingInput || index >= state.tiles.len() {
                    return false;
                }
                turn.sound(SoundKind::Click);
                match state.placed.iter().position(|&i| i == index) {
                    Some(at) => {
                        state.placed.remove(at);
                    }
                    None => state.placed.push(index),
                }
                turn.touch();
                true
            })
            .unwrap_or(false)
    }

    /// Check the answer line. Only possible once the bank is empty.
    pub fn submit(&self) -> Option<Verdict> {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::AwaitingInput || !state.bank().is_empty() {
                    return None;
                }
                let expected = &state.sentences[state.tally.current_index].primary;
                let correct = check_word_order(&state.placed_words(), expected);
                let verdict = Verdict::from_bool(correct);
                state.tally.record(verdict);
                turn.touch();

                if verdict.is_correct() {
                    turn.sound(SoundKind::Ok);
                    state.phase = Phase::Evaluated;
                    state.feedback = Some(Feedback::Correct);
                    let translations: Vec<String> = state
                        .placed_words()
                        .iter()
                        .map(|word| state.glossary.translate(word))
                        .collect();
                    state.word_translations = translations;
                } else {
                    turn.sound(SoundKind::Wrong);
                    self.show_retry(state, turn);
                }
                Some(verdict)
            })
            .flatten()
    }

    pub fn advance(&self) {
        self.core.update(|state, turn| {
            if state.phase != Phase::Evaluated {
                return;
            }
            turn.sound(SoundKind::Click);
            state.tally.step();
            load_sentence(state, turn);
        });
    }

    fn show_retry(&self, state: &mut SentenceState, turn: &mut Turn<'_>) {
        state.feedback = Some(Feedback::Incorrect);
        state.feedback_generation += 1;
        let generation = state.feedback_generation;
        turn.after(
            self.config.sentence_feedback(),
            self.me.clone(),
            move |s: &SentenceSession| s.clear_feedback(generation),
        );
    }

    fn clear_feedback(&self, generation: u64) {
        self.core.update(|state, turn| {
            if state.feedback_generation == generation && state.feedback == Some(Feedback::Incorrect) {
                state.feedback = None;
                turn.touch();
            }
        });
    }
}

fn load_sentence(state: &mut SentenceState, turn: &mut Turn<'_>) {
    turn.touch();
    if !state.tally.has_current() {
        state.phase = Phase::Completed;
        turn.complete(state.tally.total, state.tally.percent(), state.tally.errors);
        return;
    }
    state.deal();
    state.phase = Phase::AwaitingInput;
}

impl GameSession for SentenceSession {
    fn kind(&self) -> GameKind {
        GameKind::Sentences
    }

    fn dispatch(&self, event: GameEvent) {
        match event {
            GameEvent::PlaceWord { index } => {
                self.place_word(index);
            }
            GameEvent::Submit => {
                self.submit();
            }
            GameEvent::Advance => self.advance(),
            GameEvent::Close { save } => self.close(save),
            other => debug!(?other, "event ignored by sentence game"),
        }
    }

    fn view(&self) -> Option<GameView> {
        self.core.view()
    }

    fn close(&self, save: bool) {
        self.core.close(save);
    }

    fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}
