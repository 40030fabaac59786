//! Lifecycle behaviour shared by every game, driven through the public event API.

use std::sync::Arc;
use std::time::Duration;

use game_session::{
    start_session, Feedback, GameEvent, GameSession, NoImages, Phase, QuizSession, RecordingHost,
    ScriptedImages, SessionConfig, SessionDeps, SessionError, StepView,
};
use pretty_assertions::assert_eq;
use story_core::{
    BlankRecord, GameContent, GameDescriptor, GameKind, Glossary, QuestionRecord, SoundKind, Story,
};

fn question(prompt: &str, answer: &str) -> QuestionRecord {
    QuestionRecord {
        prompt: prompt.to_string(),
        options: vec![
            "red <rojo>".to_string(),
            "blue <azul>".to_string(),
            "green <verde>".to_string(),
        ],
        answer: answer.to_string(),
    }
}

fn quiz() -> GameDescriptor {
    GameDescriptor {
        id: "colors".to_string(),
        title: "Colors <Colores>".to_string(),
        content: GameContent::Quiz {
            questions: vec![
                question("Sky? <¿Cielo?>", "blue"),
                question("Grass? <¿Pasto?>", "green"),
                question("Blood? <¿Sangre?>", "red"),
                question("Sea? <¿Mar?>", "blue"),
            ],
        },
    }
}

fn every_game() -> Vec<GameDescriptor> {
    vec![
        quiz(),
        GameDescriptor {
            id: "order".to_string(),
            title: "Order".to_string(),
            content: GameContent::Sentences {
                items: vec!["The cat sleeps. <El gato duerme.>".to_string()],
            },
        },
        GameDescriptor {
            id: "pairs".to_string(),
            title: "Pairs".to_string(),
            content: GameContent::Memory {
                vocabulary: "cat <gato> | dog <perro>".to_string(),
            },
        },
        GameDescriptor {
            id: "spell".to_string(),
            title: "Spell".to_string(),
            content: GameContent::Blanks {
                questions: vec![BlankRecord {
                    sentence: "The _____ sleeps.".to_string(),
                    answer: "cat".to_string(),
                }],
            },
        },
    ]
}

fn launch(descriptor: &GameDescriptor) -> (Arc<dyn GameSession>, Arc<RecordingHost>) {
    let host = Arc::new(RecordingHost::default());
    let session = start_session(
        descriptor,
        "forest-tale",
        Arc::new(Glossary::default()),
        SessionDeps::new(host.clone(), Arc::new(NoImages)),
        &SessionConfig::seeded(42),
    )
    .unwrap();
    (session, host)
}

fn correct_option(session: &dyn GameSession, answer: &str) -> usize {
    match session.view().unwrap().step {
        StepView::Quiz(step) => step.options.iter().position(|o| o.text == answer).unwrap(),
        other => panic!("expected quiz step, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn factory_starts_matching_session() {
    for descriptor in every_game() {
        let (session, host) = launch(&descriptor);
        assert_eq!(session.kind(), descriptor.kind());
        let view = session.view().unwrap();
        assert_eq!(view.game_id, descriptor.id);
        assert_eq!(view.story_id, "forest-tale");
        assert!(host.render_count() >= 1);
    }
}

#[tokio::test(start_paused = true)]
async fn quiz_with_one_timeout_scores_75() {
    let (session, host) = launch(&quiz());

    for (i, answer) in ["blue", "green", "red", "blue"].iter().enumerate() {
        if i == 2 {
            tokio::time::sleep(Duration::from_millis(15_500)).await;
            match session.view().unwrap().step {
                StepView::Quiz(step) => assert_eq!(step.feedback, Some(Feedback::TimeUp)),
                other => panic!("expected quiz step, got {:?}", other),
            }
        } else {
            let index = correct_option(session.as_ref(), answer);
            session.dispatch(GameEvent::SelectOption { index });
        }
        session.dispatch(GameEvent::Advance);
    }

    let view = session.view().unwrap();
    assert_eq!(view.phase, Phase::Completed);
    let saves = host.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].story_id, "forest-tale");
    assert_eq!(saves[0].game_id, "colors");
    assert_eq!((saves[0].percent, saves[0].errors), (75, 1));
    assert_eq!(host.sounds().last(), Some(&SoundKind::Congrats));
}

#[tokio::test(start_paused = true)]
async fn close_is_idempotent_for_every_game() {
    for descriptor in every_game() {
        let (session, host) = launch(&descriptor);
        tokio::time::sleep(Duration::from_millis(10)).await;

        session.dispatch(GameEvent::Close { save: true });
        session.close(true);
        session.close(false);

        assert!(session.is_closed());
        assert_eq!(host.close_count(), 1, "{}", descriptor.id);
        assert_eq!(host.saves().len(), 1, "{}", descriptor.id);
        assert_eq!(host.saves()[0].percent, 0);
    }
}

#[tokio::test(start_paused = true)]
async fn close_without_save_reports_nothing() {
    let (session, host) = launch(&quiz());
    session.close(false);
    assert!(host.saves().is_empty());
    assert_eq!(host.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn events_after_close_touch_nothing() {
    for descriptor in every_game() {
        let (session, host) = launch(&descriptor);
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.close(false);
        let renders = host.render_count();
        let sounds = host.sounds().len();

        for event in [
            GameEvent::SelectOption { index: 0 },
            GameEvent::PlaceWord { index: 0 },
            GameEvent::Submit,
            GameEvent::Flip { index: 0 },
            GameEvent::PickLetter { index: 0 },
            GameEvent::DeleteLastLetter,
            GameEvent::Advance,
        ] {
            session.dispatch(event);
        }
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(host.render_count(), renders);
        assert_eq!(host.sounds().len(), sounds);
        assert!(host.saves().is_empty());
        assert!(session.view().is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn memory_closed_while_loading_stays_quiet() {
    let host = Arc::new(RecordingHost::default());
    let images = ScriptedImages::new().with_default_delay(Duration::from_secs(5));
    let session = start_session(
        &every_game()[2],
        "forest-tale",
        Arc::new(Glossary::default()),
        SessionDeps::new(host.clone(), Arc::new(images)),
        &SessionConfig::default(),
    )
    .unwrap();

    session.close(false);
    let renders = host.render_count();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(host.render_count(), renders);
    assert_eq!(host.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropped_session_stops_its_timer() {
    let (session, host) = launch(&quiz());
    drop(session);
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert!(host.sounds().is_empty());
    assert_eq!(host.close_count(), 0);
}

#[test]
fn wrong_content_is_rejected() {
    let memory = &every_game()[2];
    let host = Arc::new(RecordingHost::default());
    let err = QuizSession::start(memory, "forest-tale", host, &SessionConfig::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        SessionError::ContentMismatch {
            expected: GameKind::Quiz,
            found: GameKind::Memory,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn story_json_drives_a_session() {
    let story = Story::from_json(
        r#"{
            "id": "forest-tale",
            "title": "The Forest <El bosque>",
            "glossary": [{"word": "cat", "translation": "gato"}],
            "games": [
                {"id": "order", "t": "Order <Ordena>", "type": "sentences", "it": ["The cat. <El gato.>"]}
            ]
        }"#,
    )
    .unwrap();

    let host = Arc::new(RecordingHost::default());
    let game = story.game("order").unwrap();
    let session = start_session(
        game,
        &story.id,
        Arc::new(story.glossary.clone()),
        SessionDeps::without_images(host.clone()),
        &SessionConfig::seeded(5),
    )
    .unwrap();

    let view = session.view().unwrap();
    assert_eq!(view.title, "Order");
    assert_eq!(view.subtitle, "Ordena");
    let StepView::Sentence(step) = view.step else {
        panic!("expected sentence step");
    };
    let the = step.bank.iter().find(|t| t.text == "The").unwrap().index;
    let cat = step.bank.iter().find(|t| t.text == "cat.").unwrap().index;
    session.dispatch(GameEvent::PlaceWord { index: the });
    session.dispatch(GameEvent::PlaceWord { index: cat });
    session.dispatch(GameEvent::Submit);

    let StepView::Sentence(step) = session.view().unwrap().step else {
        panic!("expected sentence step");
    };
    assert_eq!(step.word_translations, vec!["...", "gato"]);
}
