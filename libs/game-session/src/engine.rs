//! State ownership shared by every session type.
//!
//! A session owns exactly one state value behind a mutex. Handlers mutate it
//! through [`SessionCore::update`]; side effects go into an outbox that is
//! flushed to the host after the lock is released. `close` takes the state
//! out, which turns every later handler and callback into a no-op.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use story_core::SoundKind;
use tracing::{debug, info};

use crate::contract::{SessionContext, Tally};
use crate::host::{Effect, GameHost, Outbox};
use crate::timer::Scheduled;
use crate::view::GameView;

/// Per-game state owned by a [`SessionCore`].
pub(crate) trait GameState: Send + 'static {
    fn tally(&self) -> Tally;

    fn view(&self, ctx: &SessionContext) -> GameView;

    /// Percent and error count reported on a saving close.
    fn report(&self) -> (u8, u32) {
        let tally = self.tally();
        (tally.percent(), tally.errors)
    }

    /// Stop background work owned by the state. Called once, on close.
    fn release(&mut self) {}
}

struct CoreInner<S> {
    state: Option<S>,
    tasks: Scheduled,
    reported: bool,
}

pub(crate) struct SessionCore<S> {
    ctx: SessionContext,
    host: Arc<dyn GameHost>,
    inner: Mutex<CoreInner<S>>,
}

/// Mutable access handed to a handler for the duration of one update.
pub(crate) struct Turn<'a> {
    tasks: &'a mut Scheduled,
    outbox: &'a mut Outbox,
    reported: &'a mut bool,
    ctx: &'a SessionContext,
    dirty: bool,
}

impl Turn<'_> {
    pub fn sound(&mut self, sound: SoundKind) {
        self.outbox.push(Effect::Sound(sound));
    }

    /// Mark the state changed so the host receives a fresh view.
    pub fn touch(&mut self) {
        self.dirty = true;
    }

    pub fn after<T, F>(&mut self, delay: Duration, target: Weak<T>, callback: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce(&T) + Send + 'static,
    {
        self.tasks.after(delay, target, callback);
    }

    /// Report the final result once: congratulate and save progress.
    ///
    /// Empty games complete silently.
    pub fn complete(&mut self, total: usize, percent: u8, errors: u32) {
        self.dirty = true;
        if *self.reported || total == 0 {
            return;
        }
        *self.reported = true;
        info!(
            story = %self.ctx.story_id,
            game = %self.ctx.game_id,
            percent,
            errors,
            "game completed"
        );
        self.outbox.push(Effect::Sound(SoundKind::Congrats));
        self.outbox.push(Effect::Save(self.ctx.report(percent, errors)));
    }
}

impl<S: GameState> SessionCore<S> {
    pub fn new(ctx: SessionContext, host: Arc<dyn GameHost>, state: S) -> Self {
        info!(story = %ctx.story_id, game = %ctx.game_id, kind = %ctx.kind, "session started");
        Self {
            ctx,
            host,
            inner: Mutex::new(CoreInner {
                state: Some(state),
                tasks: Scheduled::default(),
                reported: false,
            }),
        }
    }

    pub fn ctx(&self) -> &SessionContext {
        &self.ctx
    }

    /// Run a handler against the live state. Returns `None` after close.
    pub fn update<R>(&self, handler: impl FnOnce(&mut S, &mut Turn<'_>) -> R) -> Option<R> {
        let mut outbox = Outbox::default();
        let result = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            match inner.state.as_mut() {
                Some(state) => {
                    let mut turn = Turn {
                        tasks: &mut inner.tasks,
                        outbox: &mut outbox,
                        reported: &mut inner.reported,
                        ctx: &self.ctx,
                        dirty: false,
                    };
                    let result = handler(state, &mut turn);
                    if turn.dirty {
                        outbox.push(Effect::Render(state.view(&self.ctx)));
                    }
                    Some(result)
                }
                None => {
                    debug!(game = %self.ctx.game_id, "stale callback ignored");
                    None
                }
            }
        };
        outbox.flush(self.host.as_ref());
        result
    }

    pub fn view(&self) -> Option<GameView> {
        self.inner
            .lock()
            .state
            .as_ref()
            .map(|state| state.view(&self.ctx))
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().state.is_none()
    }

    pub fn close(&self, save: bool) {
        let mut outbox = Outbox::default();
        {
            let mut inner = self.inner.lock();
            let Some(mut state) = inner.state.take() else {
                return;
            };
            inner.tasks.cancel_all();
            state.release();

            let total = state.tally().total;
            if save && !inner.reported && total > 0 {
                let (percent, errors) = state.report();
                outbox.push(Effect::Save(self.ctx.report(percent, errors)));
            }
            info!(story = %self.ctx.story_id, game = %self.ctx.game_id, save, "session closed");
            outbox.push(Effect::Closed);
        }
        outbox.flush(self.host.as_ref());
    }

    #[cfg(test)]
    pub fn pending_tasks(&self) -> usize {
        self.inner.lock().tasks.pending()
    }
}
