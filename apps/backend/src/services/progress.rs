//! Background persistence of progress reports.
//!
//! Sessions hand reports over without waiting; a single task drains them
//! into the database in arrival order.

use std::sync::Arc;

use story_core::ProgressReport;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::db::Database;

/// Cheap handle for submitting progress reports.
#[derive(Debug, Clone)]
pub struct ProgressWriter {
    tx: mpsc::UnboundedSender<ProgressReport>,
}

impl ProgressWriter {
    /// A writer whose reports are delivered to the returned receiver.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Start the task that writes reports to the database.
    pub fn spawn(db: Arc<Database>) -> (Self, JoinHandle<()>) {
        let (writer, mut rx) = Self::channel();
        let handle = tokio::spawn(async move {
            while let Some(report) = rx.recv().await {
                match db.record_progress(&report).await {
                    Ok(progress) => tracing::info!(
                        story = %progress.story_id,
                        game = %progress.game_id,
                        percent = progress.last_percent,
                        best = progress.best_percent,
                        plays = progress.plays,
                        "progress saved"
                    ),
                    Err(e) => tracing::warn!(
                        story = %report.story_id,
                        game = %report.game_id,
                        error = %e,
                        "failed to save progress"
                    ),
                }
            }
            tracing::debug!("progress writer stopped");
        });
        (writer, handle)
    }

    pub fn submit(&self, report: ProgressReport) {
        if self.tx.send(report).is_err() {
            tracing::warn!("progress writer is gone, report dropped");
        }
    }
}
