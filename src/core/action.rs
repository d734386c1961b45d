//! Engine actions and their wire form.
//!
//! ## Action
//!
//! A sum type over the six things that can happen to a game. Each variant
//! carries only its own payload, so an action can never hold a field that
//! means nothing for its kind.
//!
//! ## ActionPayload
//!
//! The loose shape clients send: `{type, playerIndex?, cardIndex?, amount?,
//! effectCard?, winnerIndex?}`. [`ActionPayload::into_action`] validates it
//! and returns `None` for an unrecognized `type`, which the engine treats
//! as a no-op.

use serde::{Deserialize, Serialize};

use super::card::{Card, CardId, Rank, Suit};
use crate::error::{OneCardError, Result};

/// A game action.
///
/// Serializes with an internal `type` tag:
///
/// ```
/// use onecard_engine::core::Action;
///
/// let action = Action::PlayCard { player_index: 0, card_index: 2 };
/// let json = serde_json::to_string(&action).unwrap();
/// assert_eq!(json, r#"{"type":"PLAY_CARD","playerIndex":0,"cardIndex":2}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    /// Deal a fresh game from the settings and flip the opening card.
    StartGame,
    /// Move a card from a hand onto the discard pile.
    PlayCard { player_index: usize, card_index: usize },
    /// The current player draws up to `amount` cards.
    DrawCard { amount: u32 },
    /// Pass the turn in the current direction.
    NextTurn,
    /// Apply the side effects of a played card.
    ApplySpecialEffect { effect_card: Option<Card> },
    /// Finish the game with a chosen winner.
    EndGame { winner_index: usize },
}

impl Action {
    /// Wire name of this action's kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Action::StartGame => "START_GAME",
            Action::PlayCard { .. } => "PLAY_CARD",
            Action::DrawCard { .. } => "DRAW_CARD",
            Action::NextTurn => "NEXT_TURN",
            Action::ApplySpecialEffect { .. } => "APPLY_SPECIAL_EFFECT",
            Action::EndGame { .. } => "END_GAME",
        }
    }

    /// Draw `amount` cards.
    #[must_use]
    pub fn draw(amount: u32) -> Self {
        Action::DrawCard { amount }
    }

    /// Play a card from a seat's hand.
    #[must_use]
    pub fn play(player_index: usize, card_index: usize) -> Self {
        Action::PlayCard {
            player_index,
            card_index,
        }
    }

    /// Apply a card's side effects.
    #[must_use]
    pub fn effect(card: Card) -> Self {
        Action::ApplySpecialEffect {
            effect_card: Some(card),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::PlayCard {
                player_index,
                card_index,
            } => write!(f, "PLAY_CARD({player_index}, {card_index})"),
            Action::DrawCard { amount } => write!(f, "DRAW_CARD({amount})"),
            Action::ApplySpecialEffect {
                effect_card: Some(card),
            } => write!(f, "APPLY_SPECIAL_EFFECT({card})"),
            Action::EndGame { winner_index } => write!(f, "END_GAME({winner_index})"),
            other => f.write_str(other.kind()),
        }
    }
}

/// Rank as clients send it: a number or a numeric string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseRank {
    Number(i64),
    Text(String),
}

impl LooseRank {
    fn normalize(&self) -> Option<Rank> {
        let value = match self {
            LooseRank::Number(n) => *n,
            LooseRank::Text(s) => s.trim().parse().ok()?,
        };
        u8::try_from(value).ok().and_then(Rank::new)
    }
}

/// Effect card as clients send it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectCardPayload {
    pub id: CardId,
    #[serde(default)]
    pub is_joker: bool,
    #[serde(default)]
    pub rank: Option<LooseRank>,
    #[serde(default)]
    pub suit: Option<Suit>,
}

impl EffectCardPayload {
    fn into_card(self) -> Result<Card> {
        if self.is_joker {
            return Ok(Card::joker(self.id));
        }
        let rank = self
            .rank
            .as_ref()
            .and_then(LooseRank::normalize)
            .ok_or_else(|| OneCardError::IllegalAction("effectCard has no valid rank".into()))?;
        let suit = self
            .suit
            .ok_or_else(|| OneCardError::IllegalAction("effectCard has no suit".into()))?;
        Ok(Card::suited(self.id, suit, rank))
    }
}

/// Loose wire form of an action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_card: Option<EffectCardPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_index: Option<i64>,
}

impl ActionPayload {
    /// Payload with only a `type`.
    #[must_use]
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Validate into an [`Action`].
    ///
    /// Returns `Ok(None)` for an unrecognized `type`.
    pub fn into_action(self) -> Result<Option<Action>> {
        let action = match self.kind.as_str() {
            "START_GAME" => Action::StartGame,
            "PLAY_CARD" => Action::PlayCard {
                player_index: required_index("playerIndex", self.player_index)?,
                card_index: required_index("cardIndex", self.card_index)?,
            },
            "DRAW_CARD" => {
                let amount = self.amount.unwrap_or(1);
                let amount = u32::try_from(amount)
                    .ok()
                    .filter(|a| *a >= 1)
                    .ok_or_else(|| OneCardError::IllegalAction(format!("amount {amount} must be >= 1")))?;
                Action::DrawCard { amount }
            }
            "NEXT_TURN" => Action::NextTurn,
            "APPLY_SPECIAL_EFFECT" => {
                let card = self
                    .effect_card
                    .ok_or_else(|| OneCardError::IllegalAction("effectCard is required".into()))?
                    .into_card()?;
                Action::effect(card)
            }
            "END_GAME" => Action::EndGame {
                winner_index: required_index("winnerIndex", self.winner_index)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(action))
    }
}

fn required_index(field: &str, value: Option<i64>) -> Result<usize> {
    let value = value.ok_or_else(|| OneCardError::IllegalAction(format!("{field} is required")))?;
    usize::try_from(value)
        .map_err(|_| OneCardError::IllegalAction(format!("{field} {value} must be non-negative")))
}
