//! Progress API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running them with `--ignored`.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use story_core::ProgressReport;

use common::TestContext;
use interactive_stories_backend::models::ProgressResponse;

fn report(game_id: &str, percent: u8, errors: u32) -> ProgressReport {
    ProgressReport {
        story_id: "lost-cat".to_string(),
        game_id: game_id.to_string(),
        percent,
        errors,
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_progress_empty() {
    let ctx = TestContext::with_database().await;
    ctx.cleanup_progress().await;

    let response = ctx.server().get("/api/progress/lost-cat").await;
    response.assert_status_ok();
    let body: ProgressResponse = response.json();
    assert_eq!(body.story_id, "lost-cat");
    assert!(body.games.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_progress_keeps_best_and_counts_plays() {
    let ctx = TestContext::with_database().await;
    ctx.cleanup_progress().await;

    ctx.db.record_progress(&report("quiz", 80, 1)).await.unwrap();
    ctx.db.record_progress(&report("quiz", 40, 3)).await.unwrap();
    ctx.db.record_progress(&report("cards", 100, 2)).await.unwrap();

    let body: ProgressResponse = ctx.server().get("/api/progress/lost-cat").await.json();
    let games: Vec<(&str, i16, i16, i32, i32)> = body
        .games
        .iter()
        .map(|g| (g.game_id.as_str(), g.best_percent, g.last_percent, g.last_errors, g.plays))
        .collect();
    assert_eq!(games, vec![("cards", 100, 100, 2, 1), ("quiz", 80, 40, 3, 2)]);

    ctx.cleanup_progress().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_reset_progress() {
    let ctx = TestContext::with_database().await;
    ctx.db.record_progress(&report("spell", 50, 0)).await.unwrap();

    let server = ctx.server();
    server
        .delete("/api/progress/lost-cat")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body: ProgressResponse = server.get("/api/progress/lost-cat").await.json();
    assert!(body.games.is_empty());
}
