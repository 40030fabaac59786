//! Memory-card matching.
//!
//! Starting a session fans out one image lookup per vocabulary pair. The board
//! is dealt once every lookup has settled. Flipping the second card of an
//! attempt locks the board until the pair has been resolved by a delayed
//! callback.

use std::sync::{Arc, Weak};

use rand::rngs::StdRng;
use story_core::{
    memory_error_count, progress_percent, shuffle, GameContent, GameDescriptor, GameKind,
    SoundKind, VocabPair,
};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::contract::{GameEvent, GameSession, Phase, SessionContext, Tally};
use crate::engine::{GameState, SessionCore, Turn};
use crate::error::SessionError;
use crate::host::{placeholder_image, GameHost, ImageLookup};
use crate::view::{CardFace, CardView, CompletionView, GameView, MemoryStep, StepView};

#[derive(Debug, Clone)]
struct Card {
    pair_id: usize,
    face: CardFace,
}

struct MemoryState {
    pairs: Vec<VocabPair>,
    /// Resolved illustration per pair id.
    images: Vec<Option<String>>,
    resolved: usize,
    phase: Phase,
    cards: Vec<Card>,
    /// Face-up, unmatched cards of the current attempt. Never more than two.
    flipped: Vec<usize>,
    matched_pairs: u32,
    mismatches: u32,
    lock_board: bool,
    shaking: bool,
    rng: StdRng,
    loading: CancellationToken,
}

impl MemoryState {
    fn total_pairs(&self) -> usize {
        self.pairs.len()
    }

    fn image_for(&self, pair_id: usize) -> String {
        match self.images.get(pair_id).cloned().flatten() {
            Some(url) => url,
            None => placeholder_image(&self.pairs[pair_id].term),
        }
    }

    /// Deal two cards per pair and shuffle them once.
    fn build_board(&mut self) {
        for pair_id in 0..self.pairs.len() {
            if self.images[pair_id].is_none() {
                self.images[pair_id] = Some(placeholder_image(&self.pairs[pair_id].term));
            }
        }
        let mut cards: Vec<Card> = (0..self.pairs.len())
            .chain(0..self.pairs.len())
            .map(|pair_id| Card {
                pair_id,
                face: CardFace::Hidden,
            })
            .collect();
        shuffle(&mut cards, &mut self.rng);
        self.cards = cards;
        self.phase = Phase::AwaitingInput;
    }

    fn card_view(&self, index: usize, card: &Card) -> CardView {
        let revealed = card.face != CardFace::Hidden;
        let pair = &self.pairs[card.pair_id];
        CardView {
            index,
            face: card.face,
            shaking: self.shaking && self.flipped.contains(&index),
            term: revealed.then(|| pair.term.clone()),
            translation: revealed.then(|| pair.translation.clone()),
            image: revealed.then(|| self.image_for(card.pair_id)),
        }
    }
}

impl GameState for MemoryState {
    fn tally(&self) -> Tally {
        Tally {
            current_index: self.matched_pairs as usize,
            total: self.total_pairs(),
            correct: self.matched_pairs,
            errors: self.mismatches,
        }
    }

    fn view(&self, ctx: &SessionContext) -> GameView {
        let total = self.total_pairs() as u32;
        let score = progress_percent(self.matched_pairs, total);
        let step = match self.phase {
            Phase::Completed => StepView::Completed(CompletionView {
                correct: self.matched_pairs,
                total: self.total_pairs(),
                percent: 100,
                mismatches: Some(self.mismatches),
            }),
            phase => StepView::Memory(MemoryStep {
                loading_percent: (phase == Phase::Loading)
                    .then(|| progress_percent(self.resolved as u32, total)),
                cards: self
                    .cards
                    .iter()
                    .enumerate()
                    .map(|(i, card)| self.card_view(i, card))
                    .collect(),
                matched_pairs: self.matched_pairs,
                total_pairs: self.total_pairs(),
                mismatches: self.mismatches,
                locked: self.lock_board,
            }),
        };
        GameView::new(ctx, self.phase, score, step)
    }

    fn report(&self) -> (u8, u32) {
        (
            progress_percent(self.matched_pairs, self.total_pairs() as u32),
            memory_error_count(self.mismatches),
        )
    }

    fn release(&mut self) {
        self.loading.cancel();
    }
}

/// A running memory game.
pub struct MemorySession {
    core: SessionCore<MemoryState>,
    me: Weak<MemorySession>,
    config: SessionConfig,
}

impl MemorySession {
    pub fn start(
        descriptor: &GameDescriptor,
        story_id: &str,
        host: Arc<dyn GameHost>,
        images: Arc<dyn ImageLookup>,
        config: &SessionConfig,
    ) -> Result<Arc<Self>, SessionError> {
        let GameContent::Memory { .. } = &descriptor.content else {
            return Err(SessionError::ContentMismatch {
                game_id: descriptor.id.clone(),
                expected: GameKind::Memory,
                found: descriptor.kind(),
            });
        };

        let pairs = descriptor.content.vocabulary();
        let loading = CancellationToken::new();
        let state = MemoryState {
            images: vec![None; pairs.len()],
            pairs: pairs.clone(),
            resolved: 0,
            phase: Phase::Loading,
            cards: Vec::new(),
            flipped: Vec::new(),
            matched_pairs: 0,
            mismatches: 0,
            lock_board: false,
            shaking: false,
            rng: config.rng(),
            loading: loading.clone(),
        };

        let ctx = SessionContext::new(story_id, descriptor);
        let session = Arc::new_cyclic(|me| Self {
            core: SessionCore::new(ctx, host, state),
            me: me.clone(),
            config: config.clone(),
        });

        if pairs.is_empty() {
            session.core.update(|state, turn| {
                state.phase = Phase::Completed;
                turn.complete(0, 100, 0);
            });
        } else {
            session.core.update(|_, turn| turn.touch());
            tokio::spawn(resolve_images(session.me.clone(), images, pairs, loading));
        }
        Ok(session)
    }

    /// Record one settled lookup. Deals the board once all pairs have settled.
    ///
    /// `pair_id` is `None` when the lookup task itself failed; the pair then
    /// keeps its placeholder. Returns false when the result was discarded.
    pub(crate) fn image_resolved(&self, pair_id: Option<usize>, url: Option<String>) -> bool {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::Loading {
                    return false;
                }
                if let Some(pair_id) = pair_id {
                    if let Some(slot) = state.images.get_mut(pair_id) {
                        *slot = url;
                    }
                }
                state.resolved += 1;
                if state.resolved >= state.total_pairs() {
                    state.build_board();
                    debug!(cards = state.cards.len(), "memory board dealt");
                }
                turn.touch();
                true
            })
            .unwrap_or(false)
    }

    /// Flip a card face up. Returns false when the flip is not allowed.
    pub fn flip(&self, index: usize) -> bool {
        self.core
            .update(|state, turn| {
                if state.phase != Phase::AwaitingInput || state.lock_board {
                    return false;
                }
                match state.cards.get_mut(index) {
                    Some(card) if card.face == CardFace::Hidden => card.face = CardFace::FaceUp,
                    _ => return false,
                }
                turn.sound(SoundKind::Click);
                state.flipped.push(index);
                turn.touch();
                if state.flipped.len() == 2 {
                    state.lock_board = true;
                    self.evaluate_pair(state, turn);
                }
                true
            })
            .unwrap_or(false)
    }

    fn evaluate_pair(&self, state: &mut MemoryState, turn: &mut Turn<'_>) {
        let (first, second) = (state.flipped[0], state.flipped[1]);
        if state.cards[first].pair_id == state.cards[second].pair_id {
            turn.after(self.config.match_settle(), self.me.clone(), |m: &MemorySession| {
                m.resolve_match()
            });
        } else {
            state.mismatches += 1;
            turn.after(self.config.mismatch_reveal(), self.me.clone(), |m: &MemorySession| {
                m.reveal_mismatch()
            });
        }
    }

    fn resolve_match(&self) {
        self.core.update(|state, turn| {
            if state.flipped.len() != 2 {
                return;
            }
            turn.sound(SoundKind::Ok);
            for index in state.flipped.drain(..) {
                state.cards[index].face = CardFace::Matched;
            }
            state.matched_pairs += 1;
            state.lock_board = false;
            turn.touch();

            if state.matched_pairs as usize == state.total_pairs() {
                state.phase = Phase::Evaluated;
                turn.after(self.config.completion_delay(), self.me.clone(), |m: &MemorySession| {
                    m.finish()
                });
            }
        });
    }

    fn reveal_mismatch(&self) {
        self.core.update(|state, turn| {
            if state.flipped.len() != 2 {
                return;
            }
            turn.sound(SoundKind::Wrong);
            state.shaking = true;
            turn.touch();
            turn.after(self.config.mismatch_shake(), self.me.clone(), |m: &MemorySession| {
                m.flip_back()
            });
        });
    }

    fn flip_back(&self) {
        self.core.update(|state, turn| {
            for index in state.flipped.drain(..) {
                state.cards[index].face = CardFace::Hidden;
            }
            state.shaking = false;
            state.lock_board = false;
            turn.touch();
        });
    }

    fn finish(&self) {
        self.core.update(|state, turn| {
            if state.phase != Phase::Evaluated {
                return;
            }
            state.phase = Phase::Completed;
            turn.complete(state.total_pairs(), 100, memory_error_count(state.mismatches));
        });
    }
}

/// Look up every pair concurrently and feed results back as they settle.
async fn resolve_images(
    session: Weak<MemorySession>,
    images: Arc<dyn ImageLookup>,
    pairs: Vec<VocabPair>,
    cancelled: CancellationToken,
) {
    let mut lookups = JoinSet::new();
    for pair in pairs {
        let images = images.clone();
        lookups.spawn(async move {
            let url = match images.lookup(&pair.term).await {
                Ok(url) => url,
                Err(e) => {
                    warn!(term = %pair.term, error = %e, "image lookup failed, using placeholder");
                    None
                }
            };
            (pair.id, url)
        });
    }

    loop {
        let joined = tokio::select! {
            biased;
            _ = cancelled.cancelled() => break,
            joined = lookups.join_next() => joined,
        };
        let Some(joined) = joined else {
            break;
        };
        let (pair_id, url) = match joined {
            Ok((pair_id, url)) => (Some(pair_id), url),
            Err(e) => {
                warn!(error = %e, "image lookup task failed");
                (None, None)
            }
        };
        let Some(live) = session.upgrade() else {
            break;
        };
        if !live.image_resolved(pair_id, url) {
            break;
        }
    }
}

impl GameSession for MemorySession {
    fn kind(&self) -> GameKind {
        GameKind::Memory
    }

    fn dispatch(&self, event: GameEvent) {
        match event {
            GameEvent::Flip { index } => {
                self.flip(index);
            }
            GameEvent::Close { save } => self.close(save),
            other => debug!(?other, "event ignored by memory"),
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
