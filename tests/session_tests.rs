//! Session service tests: whole games, listings, concurrent requests.

use std::sync::Arc;

use onecard_engine::core::{Action, ActionPayload, GameStatus, SettingsPatch};
use onecard_engine::rules::legal_actions;
use onecard_engine::session::{GameService, ServiceConfig};
use onecard_engine::telemetry;
use onecard_engine::OneCardError;
use uuid::Uuid;

fn service(seed: u64) -> GameService {
    GameService::in_memory(ServiceConfig::default().with_seed(seed))
}

/// Wire payload for an engine action.
fn payload(action: &Action) -> ActionPayload {
    serde_json::from_value(serde_json::to_value(action).unwrap()).unwrap()
}

/// Take the human's first legal move, following a play with its effect.
async fn human_turn(service: &GameService, id: Uuid) {
    let state = service.get_game(id).unwrap().state;
    let action = legal_actions(&state)
        .into_iter()
        .next()
        .unwrap_or(Action::draw(1));

    let outcome = service.apply_action(id, payload(&action)).await.unwrap();
    if outcome.done {
        return;
    }
    if let Action::PlayCard {
        player_index,
        card_index,
    } = action
    {
        let card = state.players[player_index].hand[card_index];
        if onecard_engine::rules::has_special_effect(&card) {
            let effect = service.apply_action(id, payload(&Action::effect(card))).await.unwrap();
            if effect.done {
                return;
            }
        }
    }
    service
        .apply_action(id, ActionPayload::of_kind("NEXT_TURN"))
        .await
        .unwrap();
}

// ============================================================================
// Whole Games
// ============================================================================

/// Test that a human-vs-AI game keeps the table consistent round after round.
#[tokio::test]
async fn test_full_game_stays_consistent() {
    telemetry::init_for_tests();
    let service = service(77);
    let patch = SettingsPatch {
        number_of_players: Some(3),
        ..SettingsPatch::default()
    };
    let id = service.create_game(Some(patch)).unwrap().id;
    service
        .apply_action(id, ActionPayload::of_kind("START_GAME"))
        .await
        .unwrap();

    for _ in 0..200 {
        let state = service.get_game(id).unwrap().state;
        if state.is_finished() {
            break;
        }
        if state.is_ai_turn() {
            service.run_ai_turns(id).await.unwrap();
        } else {
            human_turn(&service, id).await;
        }
        service.get_game(id).unwrap().state.verify_integrity().unwrap();
    }

    let state = service.get_game(id).unwrap().state;
    if state.is_finished() {
        let winner = state.winner.as_ref().unwrap();
        assert_eq!(winner.hand_len(), 0);
        assert!(matches!(
            service.apply_action(id, ActionPayload::of_kind("NEXT_TURN")).await,
            Err(OneCardError::InvalidState(_))
        ));
    }
}

/// Test that the same seed replays the same game.
#[tokio::test]
async fn test_seeded_games_replay() {
    let a = service(5);
    let b = service(5);
    let id_a = a.create_game(None).unwrap().id;
    let id_b = b.create_game(None).unwrap().id;

    for id_service in [(id_a, &a), (id_b, &b)] {
        let (id, service) = id_service;
        service
            .apply_action(id, ActionPayload::of_kind("START_GAME"))
            .await
            .unwrap();
        human_turn(service, id).await;
        service.run_ai_turns(id).await.unwrap();
    }

    assert_eq!(a.get_game(id_a).unwrap().state, b.get_game(id_b).unwrap().state);
}

// ============================================================================
// Listing
// ============================================================================

/// Test that summaries reflect the stored state and use wire names.
#[tokio::test]
async fn test_summaries() {
    let service = service(1);
    let waiting = service.create_game(None).unwrap().id;
    let playing = service.create_game(None).unwrap().id;
    service
        .apply_action(playing, ActionPayload::of_kind("START_GAME"))
        .await
        .unwrap();

    let summaries = service.list_games();
    assert_eq!(summaries.len(), 2);
    let status_of = |id: Uuid| summaries.iter().find(|s| s.id == id).unwrap().game_status;
    assert_eq!(status_of(waiting), GameStatus::Waiting);
    assert_eq!(status_of(playing), GameStatus::Playing);

    let json = serde_json::to_value(&summaries[0]).unwrap();
    assert!(json.get("createdAt").is_some());
    assert!(json.get("currentPlayerIndex").is_some());
    assert!(json.get("gameStatus").is_some());
}

/// Test that unknown ids are reported as such.
#[tokio::test]
async fn test_unknown_session() {
    let service = service(1);
    let id = Uuid::new_v4();
    assert_eq!(service.get_game(id), Err(OneCardError::SessionNotFound(id)));
    assert!(matches!(
        service.apply_action(id, ActionPayload::of_kind("START_GAME")).await,
        Err(OneCardError::SessionNotFound(_))
    ));
    assert!(matches!(
        service.execute_ai_turn(id).await,
        Err(OneCardError::SessionNotFound(_))
    ));
}

// ============================================================================
// Concurrency
// ============================================================================

/// Test that concurrent actions on one game are applied one at a time.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_draws_are_serialized() {
    let service = Arc::new(service(9));
    let id = service.create_game(None).unwrap().id;
    service
        .apply_action(id, ActionPayload::of_kind("START_GAME"))
        .await
        .unwrap();
    let before = service.get_game(id).unwrap().state.players[0].hand_len();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .apply_action(id, ActionPayload::of_kind("DRAW_CARD"))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let state = service.get_game(id).unwrap().state;
    assert_eq!(state.players[0].hand_len(), before + 8);
    state.verify_integrity().unwrap();
}
