//! AI turn controller.
//!
//! A turn is: one chosen move (play or draw), the played card's special
//! effect if it has one, then `NEXT_TURN` unless the game just ended. After
//! a draw the seat looks at its refreshed hand once more and plays a card
//! (with its effect) if one has become legal.
//!
//! ## Move Choice
//!
//! Seats playing at `medium` ask the configured [`MovePolicy`]. Every other
//! difficulty plays rule-based. If the policy fails for any reason (missing
//! model, shape mismatch, illegal suggestion), the turn is replayed
//! rule-based from the original state and tagged as a fallback, so an AI
//! turn always completes. A failed second choice after a policy draw only
//! skips the follow-up play.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{info, warn};

use super::rule_based::choose_rule_based_action;
use crate::core::{Action, Difficulty, GameState};
use crate::error::{OneCardError, Result};
use crate::inference::MovePolicy;
use crate::rules::{has_special_effect, is_valid_play, transition};

/// Engine actions applied during one turn, in order.
pub type TurnActions = SmallVec<[Action; 4]>;

/// Where the turn's move came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnSource {
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "onnx")]
    Policy,
    #[serde(rename = "fallback")]
    Fallback,
}

impl std::fmt::Display for TurnSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TurnSource::RuleBased => "rule-based",
            TurnSource::Policy => "onnx",
            TurnSource::Fallback => "fallback",
        })
    }
}

/// A completed AI turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub state: GameState,
    pub actions: TurnActions,
    pub source: TurnSource,
    /// Why the policy was bypassed, for fallbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub done: bool,
}

/// Plays AI turns.
#[derive(Clone, Default)]
pub struct AiTurnController {
    policy: Option<Arc<dyn MovePolicy>>,
}

impl AiTurnController {
    /// Controller without a policy: medium seats always fall back.
    #[must_use]
    pub fn rule_based() -> Self {
        Self { policy: None }
    }

    /// Controller consulting `policy` for medium seats.
    #[must_use]
    pub fn with_policy(policy: Arc<dyn MovePolicy>) -> Self {
        Self {
            policy: Some(policy),
        }
    }

    /// Play the current AI seat's turn.
    ///
    /// `game_id` only labels log events.
    ///
    /// ## Errors
    ///
    /// `InvalidState` unless the game is playing and the current seat is an
    /// AI. Policy errors never surface; they trigger the fallback.
    pub async fn play_turn(&self, state: &GameState, game_id: Option<&str>) -> Result<TurnOutcome> {
        if !state.is_playing() {
            return Err(OneCardError::InvalidState("game is not in progress".into()));
        }
        let actor = state
            .current_player()
            .filter(|p| p.is_ai)
            .ok_or_else(|| OneCardError::InvalidState("current seat is not an AI".into()))?;
        let difficulty = actor.difficulty.unwrap_or(state.settings.difficulty);

        if difficulty != Difficulty::Medium {
            return rule_based_turn(state, game_id, TurnSource::RuleBased, None);
        }

        let attempt = match &self.policy {
            Some(policy) => self.policy_turn(policy.as_ref(), state, game_id).await,
            None => Err(OneCardError::InferenceUnavailable("no policy configured".into())),
        };
        match attempt {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let reason = format!("{}: {err}", err.kind());
                warn!(
                    game_id = game_id.unwrap_or("-"),
                    player_id = %actor.id,
                    reason = %reason,
                    "Policy move failed, falling back to rule-based play"
                );
                rule_based_turn(state, game_id, TurnSource::Fallback, Some(reason))
            }
        }
    }

    async fn policy_turn(
        &self,
        policy: &dyn MovePolicy,
        state: &GameState,
        game_id: Option<&str>,
    ) -> Result<TurnOutcome> {
        let action = policy.choose_action(state).await?;
        ensure_own_legal_move(state, &action)?;

        let mut turn = Turn::new(state, game_id);
        let drew = turn.play_move(action)?;
        if drew && !turn.state.is_finished() {
            let follow_up = play_after_draw(policy, &turn.state).await;
            match follow_up {
                Ok(Some(action)) => {
                    turn.play_move(action)?;
                }
                Ok(None) => {}
                Err(err) => warn!(
                    game_id = game_id.unwrap_or("-"),
                    error = %err,
                    "Second policy move after draw failed"
                ),
            }
        }
        turn.finish(TurnSource::Policy, None)
    }
}

impl std::fmt::Debug for AiTurnController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiTurnController")
            .field("has_policy", &self.policy.is_some())
            .finish()
    }
}

/// Reject policy moves the rules would not allow for the acting seat.
fn ensure_own_legal_move(state: &GameState, action: &Action) -> Result<()> {
    match action {
        Action::DrawCard { .. } => Ok(()),
        Action::PlayCard {
            player_index,
            card_index,
        } => {
            if *player_index != state.current_player_index {
                return Err(OneCardError::IllegalAction(format!(
                    "policy played for seat {player_index} on seat {}'s turn",
                    state.current_player_index
                )));
            }
            let card = state
                .players
                .get(*player_index)
                .and_then(|p| p.hand.get(*card_index))
                .ok_or_else(|| OneCardError::IllegalAction(format!("no card at index {card_index}")))?;
            match state.top_card() {
                Some(top) if !is_valid_play(card, top, state.damage) => Err(OneCardError::IllegalAction(
                    format!("policy chose unplayable card {card}"),
                )),
                _ => Ok(()),
            }
        }
        other => Err(OneCardError::IllegalAction(format!(
            "policy chose {} instead of a play or draw",
            other.kind()
        ))),
    }
}

/// Ask the policy again after a draw. Only a legal play is taken.
async fn play_after_draw(policy: &dyn MovePolicy, state: &GameState) -> Result<Option<Action>> {
    let action = policy.choose_action(state).await?;
    if !matches!(action, Action::PlayCard { .. }) {
        return Ok(None);
    }
    ensure_own_legal_move(state, &action)?;
    Ok(Some(action))
}

/// Play the first legal card, or draw and then play the first card that
/// became legal.
fn rule_based_turn(
    state: &GameState,
    game_id: Option<&str>,
    source: TurnSource,
    reason: Option<String>,
) -> Result<TurnOutcome> {
    let mut turn = Turn::new(state, game_id);
    let drew = turn.play_move(choose_rule_based_action(state)?)?;
    if drew && !turn.state.is_finished() {
        if let action @ Action::PlayCard { .. } = choose_rule_based_action(&turn.state)? {
            turn.play_move(action)?;
        }
    }
    turn.finish(source, reason)
}

/// A turn being played out on a private copy of the state.
struct Turn<'a> {
    state: GameState,
    actions: TurnActions,
    game_id: Option<&'a str>,
}

impl<'a> Turn<'a> {
    fn new(state: &GameState, game_id: Option<&'a str>) -> Self {
        Self {
            state: state.clone(),
            actions: TurnActions::new(),
            game_id,
        }
    }

    /// Apply a play or draw, plus the effect of a special card unless the
    /// play won the game. Returns whether the move was a draw.
    fn play_move(&mut self, action: Action) -> Result<bool> {
        let effect_card = match &action {
            Action::PlayCard {
                player_index,
                card_index,
            } => self
                .state
                .players
                .get(*player_index)
                .and_then(|p| p.hand.get(*card_index))
                .copied()
                .filter(has_special_effect),
            _ => None,
        };
        let drew = matches!(action, Action::DrawCard { .. });

        self.apply(action)?;
        if let Some(card) = effect_card {
            if !self.state.is_finished() {
                self.apply(Action::effect(card))?;
            }
        }
        Ok(drew)
    }

    /// Pass the turn unless the game is over.
    fn finish(mut self, source: TurnSource, reason: Option<String>) -> Result<TurnOutcome> {
        if !self.state.is_finished() {
            self.apply(Action::NextTurn)?;
        }
        let done = self.state.is_finished();
        Ok(TurnOutcome {
            state: self.state,
            actions: self.actions,
            source,
            reason,
            done,
        })
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        if let Some(actor) = self.state.current_player().filter(|p| p.is_ai) {
            info!(
                event = "ai-action",
                game_id = self.game_id.unwrap_or("-"),
                player_id = %actor.id,
                player_name = %actor.name,
                action_type = action.kind(),
                action = %action,
                "[AI]"
            );
        }
        self.state = transition(&self.state, &action)?;
        self.actions.push(action);
        Ok(())
    }
}
