//! Game sessions: create, query, act, let the AI move.
//!
//! Every mutation of a session runs under that session's async mutex, so
//! two requests for the same game never interleave between reading the
//! stored state and writing the next one. Different games proceed in
//! parallel.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::config::ServiceConfig;
use super::store::{MemorySessionStore, SessionRecord, SessionStore};
use crate::ai::{AiTurnController, TurnOutcome};
use crate::core::{Action, ActionPayload, GameState, GameStatus, SettingsPatch};
use crate::error::{OneCardError, Result};
use crate::inference::{FileModelLoader, PolicyService, SessionFactory};
use crate::rules::{is_valid_play, step};

/// Listing entry for a stored game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub game_status: GameStatus,
    pub current_player_index: usize,
}

impl From<&SessionRecord> for GameSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            game_status: record.state.game_status,
            current_player_index: record.state.current_player_index,
        }
    }
}

/// Result of a client action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub state: GameState,
    pub done: bool,
    /// The applied action; `None` when the type was not recognized.
    pub action: Option<Action>,
}

/// Session orchestration over a store and the AI controller.
pub struct GameService {
    store: Arc<dyn SessionStore>,
    controller: AiTurnController,
    config: ServiceConfig,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl GameService {
    pub fn new(store: Arc<dyn SessionStore>, controller: AiTurnController, config: ServiceConfig) -> Self {
        Self {
            store,
            controller,
            config,
            locks: DashMap::new(),
        }
    }

    /// In-memory sessions with rule-based AI only.
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), AiTurnController::rule_based(), config)
    }

    /// In-memory sessions with medium seats served by models under
    /// `config.model_dir`.
    pub fn with_models(config: ServiceConfig, sessions: Arc<dyn SessionFactory>) -> Self {
        let loader = FileModelLoader::new(config.model_dir.clone(), sessions);
        let policy = PolicyService::new(Arc::new(loader));
        Self::new(
            Arc::new(MemorySessionStore::new()),
            AiTurnController::with_policy(Arc::new(policy)),
            config,
        )
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Create a waiting game from the defaults overlaid with `patch`.
    pub fn create_game(&self, patch: Option<SettingsPatch>) -> Result<SessionRecord> {
        let settings = match patch {
            Some(patch) => patch.merge_over(&self.config.default_settings),
            None => self.config.default_settings.clone(),
        };
        let state = match self.config.seed {
            Some(seed) => GameState::with_seed(settings, seed)?,
            None => GameState::new(settings)?,
        };

        let record = self.store.create(state);
        info!(
            game_id = %record.id,
            fingerprint = %record.settings.fingerprint(),
            players = record.settings.number_of_players,
            "Created game"
        );
        Ok(record)
    }

    pub fn get_game(&self, id: Uuid) -> Result<SessionRecord> {
        self.store.find(id).ok_or(OneCardError::SessionNotFound(id))
    }

    pub fn list_games(&self) -> Vec<GameSummary> {
        self.store.list().iter().map(GameSummary::from).collect()
    }

    pub async fn delete_game(&self, id: Uuid) -> Result<()> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().await;
        if !self.store.delete(id) {
            return Err(OneCardError::SessionNotFound(id));
        }
        self.locks.remove(&id);
        info!(game_id = %id, "Deleted game");
        Ok(())
    }

    /// Apply a client action.
    ///
    /// ## Errors
    ///
    /// - `SessionNotFound`: unknown `id`
    /// - `InvalidState`: anything but `START_GAME` before the game starts,
    ///   or any engine state error
    /// - `IllegalAction`: malformed payload or an unplayable card
    pub async fn apply_action(&self, id: Uuid, payload: ActionPayload) -> Result<ActionOutcome> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().await;
        let record = self.get_game(id)?;

        if record.state.game_status == GameStatus::Waiting && payload.kind != "START_GAME" {
            return Err(OneCardError::InvalidState("game has not started".into()));
        }

        let kind = payload.kind.clone();
        let Some(action) = payload.into_action()? else {
            debug!(game_id = %id, action_type = %kind, "ignoring unrecognized action type");
            return Ok(ActionOutcome {
                done: record.state.is_finished(),
                state: record.state,
                action: None,
            });
        };

        if let Action::PlayCard {
            player_index,
            card_index,
        } = action
        {
            check_playable(&record.state, player_index, card_index)?;
        }

        let result = step(&record.state, action)?;
        self.store
            .update(id, result.state.clone())
            .ok_or(OneCardError::SessionNotFound(id))?;
        Ok(ActionOutcome {
            state: result.state,
            done: result.done,
            action: Some(result.action),
        })
    }

    /// Play one AI turn for the current seat.
    ///
    /// Fails with `InvalidState` unless the game is playing and the current
    /// seat is an AI.
    pub async fn execute_ai_turn(&self, id: Uuid) -> Result<TurnOutcome> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().await;
        self.ai_turn_locked(id).await
    }

    /// Play AI turns until a human is to move or the game ends.
    ///
    /// Returns the turns played, possibly none.
    pub async fn run_ai_turns(&self, id: Uuid) -> Result<Vec<TurnOutcome>> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().await;

        let mut turns = Vec::new();
        loop {
            let record = self.get_game(id)?;
            if !record.state.is_playing() || !record.state.is_ai_turn() {
                break;
            }
            turns.push(self.ai_turn_locked(id).await?);
        }
        Ok(turns)
    }

    async fn ai_turn_locked(&self, id: Uuid) -> Result<TurnOutcome> {
        let record = self.get_game(id)?;
        if !record.state.is_playing() {
            return Err(OneCardError::InvalidState("game is not in progress".into()));
        }
        if !record.state.is_ai_turn() {
            return Err(OneCardError::InvalidState("current seat is not an AI".into()));
        }

        let game_id = id.to_string();
        let outcome = self.controller.play_turn(&record.state, Some(&game_id)).await?;
        self.store
            .update(id, outcome.state.clone())
            .ok_or(OneCardError::SessionNotFound(id))?;
        Ok(outcome)
    }

    /// Lock for a stored game. Unknown ids get no entry.
    fn session_lock(&self, id: Uuid) -> Result<Arc<Mutex<()>>> {
        if self.store.find(id).is_none() {
            return Err(OneCardError::SessionNotFound(id));
        }
        Ok(Arc::clone(self.locks.entry(id).or_default().value()))
    }
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("controller", &self.controller)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Reject a play the rules would not accept.
fn check_playable(state: &GameState, player_index: usize, card_index: usize) -> Result<()> {
    let player = state.players.get(player_index).ok_or_else(|| {
        OneCardError::IllegalAction(format!(
            "player index {player_index} out of {} seats",
            state.player_count()
        ))
    })?;
    let card = player.hand.get(card_index).ok_or_else(|| {
        OneCardError::IllegalAction(format!(
            "card index {card_index} out of a hand of {}",
            player.hand_len()
        ))
    })?;
    let top = state
        .top_card()
        .ok_or_else(|| OneCardError::IllegalAction("discard pile is empty".into()))?;
    if !is_valid_play(card, top, state.damage) {
        return Err(OneCardError::IllegalAction(format!("{card} cannot be played on {top}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, CardId, GameSettings, Rank, Suit};
    use im::Vector;

    fn service() -> GameService {
        GameService::in_memory(ServiceConfig::default().with_seed(5))
    }

    fn start() -> ActionPayload {
        ActionPayload::of_kind("START_GAME")
    }

    #[tokio::test]
    async fn test_create_merges_patch() {
        let service = service();
        let patch = SettingsPatch {
            number_of_players: Some(4),
            ..SettingsPatch::default()
        };

        let record = service.create_game(Some(patch)).unwrap();

        assert_eq!(record.settings.number_of_players, 4);
        assert_eq!(record.settings.init_hand_size, GameSettings::default().init_hand_size);
        assert_eq!(record.state.game_status, GameStatus::Waiting);
        assert_eq!(service.get_game(record.id).unwrap(), record);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_settings() {
        let patch = SettingsPatch {
            number_of_players: Some(1),
            ..SettingsPatch::default()
        };
        let result = service().create_game(Some(patch));
        assert!(matches!(result, Err(OneCardError::InvalidSettings(_))));
    }

    #[tokio::test]
    async fn test_actions_before_start_are_rejected() {
        let service = service();
        let id = service.create_game(None).unwrap().id;

        let result = service.apply_action(id, ActionPayload::of_kind("NEXT_TURN")).await;
        assert!(matches!(result, Err(OneCardError::InvalidState(_))));

        let started = service.apply_action(id, start()).await.unwrap();
        assert_eq!(started.state.game_status, GameStatus::Playing);
        assert_eq!(service.get_game(id).unwrap().state, started.state);
    }

    #[tokio::test]
    async fn test_unplayable_card_is_rejected() {
        let service = service();
        let id = service.create_game(None).unwrap().id;
        service.apply_action(id, start()).await.unwrap();

        // Rig the stored game: hearts 3 on clubs 7
        let mut state = service.get_game(id).unwrap().state;
        state.players[0].hand = Vector::unit(Card::suited(CardId(500), Suit::Hearts, Rank::new(3).unwrap()));
        state.discard_pile = Vector::unit(Card::suited(CardId(501), Suit::Clubs, Rank::new(7).unwrap()));
        service.store.update(id, state.clone());

        let payload = ActionPayload {
            player_index: Some(0),
            card_index: Some(0),
            ..ActionPayload::of_kind("PLAY_CARD")
        };
        let result = service.apply_action(id, payload).await;

        assert!(matches!(result, Err(OneCardError::IllegalAction(_))));
        assert_eq!(service.get_game(id).unwrap().state, state);
    }

    #[tokio::test]
    async fn test_unknown_action_is_ignored() {
        let service = service();
        let id = service.create_game(None).unwrap().id;
        let before = service.apply_action(id, start()).await.unwrap().state;

        let outcome = service.apply_action(id, ActionPayload::of_kind("SHUFFLE")).await.unwrap();

        assert_eq!(outcome.action, None);
        assert_eq!(outcome.state, before);
    }

    #[tokio::test]
    async fn test_ai_turn_requires_ai_seat() {
        let service = service();
        let id = service.create_game(None).unwrap().id;
        service.apply_action(id, start()).await.unwrap();

        let result = service.execute_ai_turn(id).await;
        assert!(matches!(result, Err(OneCardError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_run_ai_turns_stops_at_human() {
        let service = service();
        let id = service.create_game(None).unwrap().id;
        service.apply_action(id, start()).await.unwrap();
        service
            .apply_action(id, ActionPayload::of_kind("DRAW_CARD"))
            .await
            .unwrap();
        service
            .apply_action(id, ActionPayload::of_kind("NEXT_TURN"))
            .await
            .unwrap();

        let turns = service.run_ai_turns(id).await.unwrap();
        let state = service.get_game(id).unwrap().state;

        assert!(!turns.is_empty());
        assert!(state.is_finished() || !state.is_ai_turn());
        assert_eq!(turns.last().map(|t| &t.state), Some(&state));
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let service = service();
        let a = service.create_game(None).unwrap().id;
        let b = service.create_game(None).unwrap().id;
        assert_eq!(service.list_games().len(), 2);

        service.delete_game(a).await.unwrap();
        assert_eq!(service.delete_game(a).await, Err(OneCardError::SessionNotFound(a)));
        assert_eq!(service.get_game(a), Err(OneCardError::SessionNotFound(a)));

        let ids: Vec<Uuid> = service.list_games().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b]);
        assert!(!service.locks.contains_key(&a));
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_no_locks() {
        let service = service();
        for _ in 0..3 {
            let id = Uuid::new_v4();
            let draw = ActionPayload::of_kind("DRAW_CARD");
            assert_eq!(service.apply_action(id, draw).await, Err(OneCardError::SessionNotFound(id)));
            assert!(matches!(service.execute_ai_turn(id).await, Err(OneCardError::SessionNotFound(_))));
            assert!(matches!(service.run_ai_turns(id).await, Err(OneCardError::SessionNotFound(_))));
            assert_eq!(service.delete_game(id).await, Err(OneCardError::SessionNotFound(id)));
        }
        assert!(service.locks.is_empty());
    }
}
