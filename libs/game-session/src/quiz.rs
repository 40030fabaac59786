//! Timed multiple-choice quiz.
//!
//! Each question runs a one-second countdown. The countdown and the player's
//! answer race to evaluate the question; whichever runs first clears the
//! timer and leaves `AwaitingInput`, so the other finds nothing to do.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;

use story_core::{parse_annotation, Annotated, GameContent, GameDescriptor, GameKind, QuestionRecord, SoundKind, Verdict};
use tracing::debug;

use crate::config::{SessionConfig, CRITICAL_BELOW, WARNING_BELOW};
use crate::contract::{GameEvent, GameSession, Phase, SessionContext, Tally};
use crate::engine::{GameState, SessionCore, Turn};
use crate::error::SessionError;
use crate::host::GameHost;
use crate::timer::{countdown, TaskGuard};
use crate::view::{
    CompletionView, Feedback, GameView, OptionMark, OptionView, QuizStep, StepView, Urgency,
};

const TICK: Duration = Duration::from_secs(1);

struct Question {
    prompt: Annotated,
    options: Vec<Annotated>,
    answer: Annotated,
}

impl Question {
    fn parse(record: &QuestionRecord) -> Self {
        Self {
            prompt: parse_annotation(&record.prompt),
            options: record.options.iter().map(|o| parse_annotation(o)).collect(),
            answer: parse_annotation(&record.answer),
        }
    }

    /// Answers are compared on primary text, so translations never matter.
    fn is_correct(&self, option: usize) -> bool {
        self.options
            .get(option)
            .is_some_and(|o| o.primary == self.answer.primary)
    }
}

struct QuizState {
    questions: Vec<Question>,
    tally: Tally,
    phase: Phase,
    time_left: u32,
    timer: Option<TaskGuard>,
    /// Bumped on every new countdown; ticks of older countdowns are ignored.
    timer_generation: u64,
    selected: Option<usize>,
    feedback: Option<Feedback>,
}

impl QuizState {
    fn current(&self) -> Option<&Question> {
        self.questions.get(self.tally.current_index)
    }

    fn clear_timer(&mut self) {
        self.timer = None;
    }

    fn urgency(&self) -> Urgency {
        if self.time_left < CRITICAL_BELOW {
            Urgency::Critical
        } else if self.time_left < WARNING_BELOW {
            Urgency::Warning
        } else {
            Urgency::Calm
        }
    }

    fn option_mark(&self, question: &Question, index: usize) -> OptionMark {
        if self.phase != Phase::Evaluated {
            return OptionMark::None;
        }
        if question.is_correct(index) {
            OptionMark::Correct
        } else if self.selected == Some(index) {
            OptionMark::Wrong
        } else {
            OptionMark::None
        }
    }
}

impl GameState for QuizState {
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
            (_, Some(question)) => StepView::Quiz(QuizStep {
                position: self.tally.current_index + 1,
                total: self.tally.total,
                prompt: question.prompt.primary.clone(),
                prompt_subtitle: question.prompt.secondary.clone(),
                options: question
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, o)| OptionView {
                        text: o.primary.clone(),
                        mark: self.option_mark(question, i),
                    })
                    .collect(),
                enabled: self.phase == Phase::AwaitingInput,
                time_left: self.time_left,
                urgency: self.urgency(),
                feedback: self.feedback,
            }),
        };
        GameView::new(ctx, self.phase, self.tally.percent(), step)
    }

    fn release(&mut self) {
        self.clear_timer();
    }
}

/// A running quiz.
pub struct QuizSession {
    core: SessionCore<QuizState>,
    me: Weak<QuizSession>,
    seconds: u32,
}

impl QuizSession {
    pub fn start(
        descriptor: &GameDescriptor,
        story_id: &str,
        host: Arc<dyn GameHost>,
        config: &SessionConfig,
    ) -> Result<Arc<Self>, SessionError> {
        let GameContent::Quiz { questions } = &descriptor.content else {
            return Err(SessionError::ContentMismatch {
                game_id: descriptor.id.clone(),
                expected: GameKind::Quiz,
                found: descriptor.kind(),
            });
        };

        let questions: Vec<Question> = questions.iter().map(Question::parse).collect();
        let state = QuizState {
            tally: Tally::new(questions.len()),
            questions,
            phase: Phase::Loading,
            time_left: config.quiz_seconds,
            timer: None,
            timer_generation: 0,
            selected: None,
            feedback: None,
        };

        let ctx = SessionContext::new(story_id, descriptor);
        let session = Arc::new_cyclic(|me| Self {
            core: SessionCore::new(ctx, host, state),
            me: me.clone(),
            seconds: config.quiz_seconds,
        });
        session.core.update(|state, turn| session.load_question(state, turn));
        Ok(session)
    }

    /// Answer the current question. `None` when no answer is expected.
    pub fn answer(&self, option: usize) -> Option<Verdict> {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::AwaitingInput {
                    return None;
                }
                let question = state.current()?;
                if option >= question.options.len() {
                    return None;
                }
                let verdict = Verdict::from_bool(question.is_correct(option));

                state.clear_timer();
                turn.sound(SoundKind::Click);
                state.tally.record(verdict);
                state.selected = Some(option);
                state.phase = Phase::Evaluated;
                if verdict.is_correct() {
                    turn.sound(SoundKind::Ok);
                    state.feedback = Some(Feedback::Correct);
                } else {
                    turn.sound(SoundKind::Wrong);
                    state.feedback = Some(Feedback::Incorrect);
                }
                turn.touch();
                Some(verdict)
            })
            .flatten()
    }

    /// Move to the next question, or complete after the last one.
    pub fn advance(&self) {
        self.core.update(|state, turn| {
            if state.phase != Phase::Evaluated {
                return;
            }
            turn.sound(SoundKind::Click);
            state.tally.step();
            self.load_question(state, turn);
        });
    }

    fn load_question(&self, state: &mut QuizState, turn: &mut Turn<'_>) {
        state.clear_timer();
        state.selected = None;
        state.feedback = None;
        turn.touch();

        if !state.tally.has_current() {
            state.phase = Phase::Completed;
            turn.complete(state.tally.total, state.tally.percent(), state.tally.errors);
            return;
        }

        state.phase = Phase::AwaitingInput;
        self.start_timer(state);
    }

    fn start_timer(&self, state: &mut QuizState) {
        state.clear_timer();
        state.time_left = self.seconds;
        state.timer_generation += 1;
        let generation = state.timer_generation;
        state.timer = Some(countdown(self.me.clone(), TICK, move |quiz: &QuizSession| {
            quiz.tick(generation)
        }));
    }

    /// One countdown tick. Breaks once the countdown has nothing left to do.
    pub(crate) fn tick(&self, generation: u64) -> ControlFlow<()> {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::AwaitingInput || state.timer_generation != generation {
                    return ControlFlow::Break(());
                }
                state.time_left = state.time_left.saturating_sub(1);
                turn.touch();
                if state.time_left > 0 {
                    return ControlFlow::Continue(());
                }

                debug!(game = %self.core.ctx().game_id, question = state.tally.current_index, "question timed out");
                state.clear_timer();
                state.tally.record(Verdict::Incorrect);
                state.phase = Phase::Evaluated;
                state.feedback = Some(Feedback::TimeUp);
                turn.sound(SoundKind::Wrong);
                ControlFlow::Break(())
            })
            .unwrap_or(ControlFlow::Break(()))
    }

    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.core.update(|state, _| state.timer_generation).unwrap_or(0)
    }
}

impl GameSession for QuizSession {
    fn kind(&self) -> GameKind {
        GameKind::Quiz
    }

    fn dispatch(&self, event: GameEvent) {
        match event {
            GameEvent::SelectOption { index } => {
                self.answer(index);
            }
            GameEvent::Advance => self.advance(),
            GameEvent::Close { save } => self.close(save),
            other => debug!(?other, "event ignored by quiz"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingHost;
    use pretty_assertions::assert_eq;

    fn quiz(count: usize) -> GameDescriptor {
        let questions = (0..count)
            .map(|i| QuestionRecord {
                prompt: format!("Question {} <Pregunta {}>", i + 1, i + 1),
                options: vec!["Blue <Azul>".to_string(), "Red <Rojo>".to_string(), "Green".to_string()],
                answer: "Blue".to_string(),
            })
            .collect();
        GameDescriptor {
            id: "quiz".to_string(),
            title: "Colors <Colores>".to_string(),
            content: GameContent::Quiz { questions },
        }
    }

    fn start(count: usize) -> (Arc<QuizSession>, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let session = QuizSession::start(&quiz(count), "story", host.clone(), &SessionConfig::seeded(1)).unwrap();
        (session, host)
    }

    fn step(session: &QuizSession) -> QuizStep {
        match session.core.view().unwrap().step {
            StepView::Quiz(step) => step,
            other => panic!("expected quiz step, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_question_is_rendered_on_start() {
        let (session, host) = start(2);
        let step = step(&session);
        assert_eq!(step.position, 1);
        assert_eq!(step.prompt, "Question 1");
        assert_eq!(step.prompt_subtitle, "Pregunta 1");
        assert_eq!(step.options[0].text, "Blue");
        assert_eq!(step.time_left, 15);
        assert!(step.enabled);
        assert!(host.render_count() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn annotation_suffix_does_not_affect_correctness() {
        let (session, host) = start(1);
        assert_eq!(session.answer(0), Some(Verdict::Correct));
        assert_eq!(host.sounds(), vec![SoundKind::Click, SoundKind::Ok]);
        let step = step(&session);
        assert!(!step.enabled);
        assert_eq!(step.options[0].mark, OptionMark::Correct);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_answer_reveals_correct_option() {
        let (session, _host) = start(1);
        assert_eq!(session.answer(1), Some(Verdict::Incorrect));
        let step = step(&session);
        assert_eq!(step.options[0].mark, OptionMark::Correct);
        assert_eq!(step.options[1].mark, OptionMark::Wrong);
        assert_eq!(step.feedback, Some(Feedback::Incorrect));
    }

    #[tokio::test(start_paused = true)]
    async fn second_answer_is_rejected() {
        let (session, _host) = start(1);
        session.answer(1);
        assert_eq!(session.answer(0), None);
        let tally = session.core.update(|s, _| s.tally).unwrap();
        assert_eq!(tally.correct, 0);
        assert_eq!(tally.errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_option_is_ignored() {
        let (session, _host) = start(1);
        assert_eq!(session.answer(7), None);
        assert!(step(&session).enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_escalates_and_times_out() {
        let (session, host) = start(1);

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        let step_after_five = step(&session);
        assert_eq!(step_after_five.time_left, 10);
        assert_eq!(step_after_five.urgency, Urgency::Calm);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(step(&session).urgency, Urgency::Warning);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(step(&session).urgency, Urgency::Critical);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let timed_out = step(&session);
        assert_eq!(timed_out.time_left, 0);
        assert_eq!(timed_out.feedback, Some(Feedback::TimeUp));
        assert_eq!(timed_out.options[0].mark, OptionMark::Correct);
        assert!(!timed_out.enabled);
        assert_eq!(host.sounds(), vec![SoundKind::Wrong]);

        let tally = session.core.update(|s, _| s.tally).unwrap();
        assert_eq!(tally.errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_stops_the_timer() {
        let (session, _host) = start(1);
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        session.answer(0);
        tokio::time::sleep(Duration::from_secs(30)).await;
        let step = step(&session);
        assert_eq!(step.time_left, 12);
        assert_eq!(step.feedback, Some(Feedback::Correct));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_then_answer_counts_once() {
        let (session, _host) = start(1);
        let generation = session.generation();
        session.core.update(|s, _| s.time_left = 1);

        assert!(session.tick(generation).is_break());
        assert_eq!(session.answer(0), None);

        let tally = session.core.update(|s, _| s.tally).unwrap();
        assert_eq!((tally.correct, tally.errors), (0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn answer_then_timeout_counts_once() {
        let (session, _host) = start(1);
        let generation = session.generation();
        session.core.update(|s, _| s.time_left = 1);

        assert_eq!(session.answer(0), Some(Verdict::Correct));
        assert!(session.tick(generation).is_break());

        let tally = session.core.update(|s, _| s.tally).unwrap();
        assert_eq!((tally.correct, tally.errors), (1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_tick_is_ignored() {
        let (session, _host) = start(2);
        let first = session.generation();
        session.answer(0);
        session.advance();
        assert!(session.tick(first).is_break());
        assert_eq!(step(&session).time_left, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn advance_requires_evaluation() {
        let (session, host) = start(2);
        session.advance();
        assert_eq!(step(&session).position, 1);
        assert!(host.sounds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn completion_reports_progress_once() {
        let (session, host) = start(2);
        session.answer(0);
        session.advance();
        session.answer(2);
        session.advance();

        let view = session.core.view().unwrap();
        assert_eq!(view.phase, Phase::Completed);
        assert_eq!(
            view.step,
            StepView::Completed(CompletionView {
                correct: 1,
                total: 2,
                percent: 50,
                mismatches: None,
            })
        );
        assert_eq!(host.saves().len(), 1);
        assert_eq!(host.saves()[0].percent, 50);
        assert_eq!(host.sounds().last(), Some(&SoundKind::Congrats));

        session.close(true);
        assert_eq!(host.saves().len(), 1);
        assert_eq!(host.close_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_quiz_completes_without_saving() {
        let (session, host) = start(0);
        assert_eq!(session.core.view().unwrap().phase, Phase::Completed);
        session.close(true);
        assert!(host.saves().is_empty());
        assert_eq!(host.close_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_timer() {
        let (session, host) = start(1);
        session.close(false);
        let renders = host.render_count();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(host.render_count(), renders);
        assert!(host.sounds().is_empty());
        assert!(session.view().is_none());
    }
}
