//! Fill-the-blank spelling from a shuffled letter keyboard.

use std::sync::{Arc, Weak};

use rand::rngs::StdRng;
use story_core::{
    check_spelling, fill_blank, letter_choices, parse_annotation, split_blank, Annotated,
    BlankRecord, GameContent, GameDescriptor, GameKind, SoundKind, Verdict,
};
use tracing::debug;

use crate::config::SessionConfig;
use crate::contract::{GameEvent, GameSession, Phase, SessionContext, Tally};
use crate::engine::{GameState, SessionCore, Turn};
use crate::error::SessionError;
use crate::host::GameHost;
use crate::view::{BlanksStep, CompletionView, Feedback, GameView, LetterChoice, StepView};

struct Blank {
    sentence: Annotated,
    answer: Annotated,
}

impl Blank {
    fn parse(record: &BlankRecord) -> Self {
        Self {
            sentence: parse_annotation(&record.sentence),
            answer: parse_annotation(&record.answer),
        }
    }
}

struct BlanksState {
    blanks: Vec<Blank>,
    tally: Tally,
    phase: Phase,
    choices: Vec<char>,
    /// Choice index used for each letter slot, filled left to right.
    slots: Vec<Option<usize>>,
    translation: Option<String>,
    feedback: Option<Feedback>,
    feedback_generation: u64,
    rng: StdRng,
}

impl BlanksState {
    fn current(&self) -> Option<&Blank> {
        self.blanks.get(self.tally.current_index)
    }

    fn typed(&self) -> String {
        self.slots
            .iter()
            .flatten()
            .map(|&choice| self.choices[choice])
            .collect()
    }

    fn deal(&mut self) {
        let answer = self
            .current()
            .map(|blank| blank.answer.primary.clone())
            .unwrap_or_default();
        self.choices = letter_choices(&answer, &mut self.rng);
        self.slots = vec![None; answer.chars().count()];
        self.translation = None;
        self.feedback = None;
    }
}

impl GameState for BlanksState {
    fn tally(&self) -> Tally {
        self.tally
    }

    fn view(&self, ctx: &SessionContext) -> GameView {
        let step = match (self.phase, self.current()) {
            (Phase::Completed, _) | (_, None) => StepView::Completed(CompletionView {
                correct: self.tally.correct,
                total: self.tally.total,
                percent: self.tally.percent(),
                mismatches: None,
            }),
            (phase, Some(blank)) => {
                let (before, after) = split_blank(&blank.sentence.primary);
                StepView::Blanks(BlanksStep {
                    position: self.tally.current_index + 1,
                    total: self.tally.total,
                    before,
                    after,
                    slots: self
                        .slots
                        .iter()
                        .map(|slot| slot.map(|choice| self.choices[choice]))
                        .collect(),
                    choices: self
                        .choices
                        .iter()
                        .enumerate()
                        .map(|(index, &letter)| LetterChoice {
                            index,
                            letter,
                            used: self.slots.contains(&Some(index)),
                        })
                        .collect(),
                    can_delete: phase == Phase::AwaitingInput && self.slots.iter().any(Option::is_some),
                    translation: self.translation.clone(),
                    feedback: self.feedback,
                })
            }
        };
        GameView::new(ctx, self.phase, self.tally.percent(), step)
    }
}

/// A running fill-the-blanks game.
pub struct BlanksSession {
    core: SessionCore<BlanksState>,
    me: Weak<BlanksSession>,
    config: SessionConfig,
}

impl BlanksSession {
    pub fn start(
        descriptor: &GameDescriptor,
        story_id: &str,
        host: Arc<dyn GameHost>,
        config: &SessionConfig,
    ) -> Result<Arc<Self>, SessionError> {
        let GameContent::Blanks { questions } = &descriptor.content else {
            return Err(SessionError::ContentMismatch {
                game_id: descriptor.id.clone(),
                expected: GameKind::Blanks,
                found: descriptor.kind(),
            });
        };

        let blanks: Vec<Blank> = questions.iter().map(Blank::parse).collect();
        let state = BlanksState {
            tally: Tally::new(blanks.len()),
            blanks,
            phase: Phase::Loading,
            choices: Vec::new(),
            slots: Vec::new(),
            translation: None,
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
        session.core.update(|state, turn| load_blank(state, turn));
        Ok(session)
    }

    /// Put a letter choice into the first empty slot.
    ///
    /// Filling the last slot checks the word. Returns the verdict when a
    /// check happened.
    pub fn pick_letter(&self, choice: usize) -> Option<Verdict> {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::AwaitingInput
                    || choice >= state.choices.len()
                    || state.slots.contains(&Some(choice))
                {
                    return None;
                }
                turn.sound(SoundKind::Click);
                let has_slots = !state.slots.is_empty();
                match state.slots.iter_mut().find(|slot| slot.is_none()) {
                    Some(slot) => {
                        *slot = Some(choice);
                        turn.touch();
                    }
                    // An empty answer has no slots and is checked on the first pick.
                    None if has_slots => return None,
                    None => {}
                }

                if state.slots.iter().any(Option::is_none) {
                    return None;
                }
                Some(self.check(state, turn))
            })
            .flatten()
    }

    /// Clear the last filled slot and give its letter back.
    pub fn delete_last_letter(&self) -> bool {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::AwaitingInput {
                    return false;
                }
                turn.sound(SoundKind::Click);
                match state.slots.iter_mut().rev().find(|slot| slot.is_some()) {
                    Some(slot) => {
                        *slot = None;
                        turn.touch();
                        true
                    }
                    None => false,
                }
            })
            .unwrap_or(false)
    }

    pub fn advance(&self) {
        self.core.update(|state, turn| {
            if state.phase != Phase::Evaluated {
                return;
            }
            turn.sound(SoundKind::Click);
            state.tally.step();
            load_blank(state, turn);
        });
    }

    fn check(&self, state: &mut BlanksState, turn: &mut Turn<'_>) -> Verdict {
        let typed = state.typed();
        let (correct, translation) = match state.current() {
            Some(blank) => (
                check_spelling(&typed, &blank.answer.primary),
                fill_blank(&blank.sentence.secondary, &blank.answer.secondary),
            ),
            None => (false, String::new()),
        };
        let verdict = Verdict::from_bool(correct);
        state.tally.record(verdict);

        if verdict.is_correct() {
            turn.sound(SoundKind::Ok);
            state.phase = Phase::Evaluated;
            state.feedback = Some(Feedback::Correct);
            state.translation = Some(translation);
        } else {
            turn.sound(SoundKind::Wrong);
            state.feedback = Some(Feedback::Incorrect);
            state.feedback_generation += 1;
            let generation = state.feedback_generation;
            turn.after(
                self.config.blanks_feedback(),
                self.me.clone(),
                move |b: &BlanksSession| b.clear_feedback(generation),
            );
        }
        verdict
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

fn load_blank(state: &mut BlanksState, turn: &mut Turn<'_>) {
    turn.touch();
    if !state.tally.has_current() {
        state.phase = Phase::Completed;
        turn.complete(state.tally.total, state.tally.percent(), state.tally.errors);
        return;
    }
    state.deal();
    state.phase = Phase::AwaitingInput;
}

impl GameSession for BlanksSession {
    fn kind(&self) -> GameKind {
        GameKind::Blanks
    }

    fn dispatch(&self, event: GameEvent) {
        match event {
            GameEvent::PickLetter { index } => {
                self.pick_letter(index);
            }
            GameEvent::DeleteLastLetter => {
                self.delete_last_letter();
            }
            GameEvent::Advance => self.advance(),
            GameEvent::Close { save } => self.close(save),
            other => debug!(?other, "event ignored by blanks game"),
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
