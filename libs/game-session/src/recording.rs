//! In-memory host and image lookup that record everything they are asked to do.
//!
//! Useful for headless drivers and for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use story_core::{ProgressReport, SoundKind};

use crate::error::LookupError;
use crate::host::{GameHost, ImageLookup};
use crate::view::GameView;

#[derive(Debug, Default)]
struct Recorded {
    sounds: Vec<SoundKind>,
    saves: Vec<ProgressReport>,
    closes: u32,
    renders: u32,
    last_view: Option<GameView>,
}

/// Host that keeps every callback it receives.
#[derive(Debug, Default)]
pub struct RecordingHost {
    recorded: Mutex<Recorded>,
}

impl RecordingHost {
    pub fn sounds(&self) -> Vec<SoundKind> {
        self.recorded.lock().sounds.clone()
    }

    pub fn saves(&self) -> Vec<ProgressReport> {
        self.recorded.lock().saves.clone()
    }

    pub fn close_count(&self) -> u32 {
        self.recorded.lock().closes
    }

    pub fn render_count(&self) -> u32 {
        self.recorded.lock().renders
    }

    pub fn last_view(&self) -> Option<GameView> {
        self.recorded.lock().last_view.clone()
    }

    pub fn clear_sounds(&self) {
        self.recorded.lock().sounds.clear();
    }
}

impl GameHost for RecordingHost {
    fn play_sound(&self, sound: SoundKind) {
        self.recorded.lock().sounds.push(sound);
    }

    fn save_progress(&self, report: &ProgressReport) {
        self.recorded.lock().saves.push(report.clone());
    }

    fn on_close(&self) {
        self.recorded.lock().closes += 1;
    }

    fn render(&self, view: &GameView) {
        let mut recorded = self.recorded.lock();
        recorded.renders += 1;
        recorded.last_view = Some(view.clone());
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Found(String),
    Missing,
    Failing,
}

/// Image lookup with canned answers and per-term latency.
///
/// Terms without a script resolve to nothing after the default delay.
#[derive(Debug, Default)]
pub struct ScriptedImages {
    answers: HashMap<String, (Duration, Scripted)>,
    default_delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl ScriptedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn found(mut self, term: &str, url: &str, delay: Duration) -> Self {
        self.answers
            .insert(term.to_string(), (delay, Scripted::Found(url.to_string())));
        self
    }

    pub fn missing(mut self, term: &str, delay: Duration) -> Self {
        self.answers.insert(term.to_string(), (delay, Scripted::Missing));
        self
    }

    pub fn failing(mut self, term: &str, delay: Duration) -> Self {
        self.answers.insert(term.to_string(), (delay, Scripted::Failing));
        self
    }

    /// Terms looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ImageLookup for ScriptedImages {
    async fn lookup(&self, term: &str) -> Result<Option<String>, LookupError> {
        self.calls.lock().push(term.to_string());
        let (delay, answer) = self
            .answers
            .get(term)
            .cloned()
            .unwrap_or((self.default_delay, Scripted::Missing));
        tokio::time::sleep(delay).await;
        match answer {
            Scripted::Found(url) => Ok(Some(url)),
            Scripted::Missing => Ok(None),
            Scripted::Failing => Err(LookupError::Status { status: 503 }),
        }
    }
}
