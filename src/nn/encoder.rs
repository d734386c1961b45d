//! Observation encoding for policy input.
//!
//! Transforms a game state into a fixed-length feature vector seen from
//! seat 0. Callers that want another seat's view rotate the table first
//! (see `nn::rotation`).
//!
//! ## Layout
//!
//! | features                 | width           |
//! |--------------------------|-----------------|
//! | hand rank histogram      | 13              |
//! | hand suit histogram      | 4               |
//! | jokers in hand           | 1               |
//! | top card rank (one-hot)  | 13              |
//! | top card suit (one-hot)  | 4               |
//! | top card is joker        | 1               |
//! | pending damage           | 1               |
//! | direction is clockwise   | 1               |
//! | current seat (one-hot)   | player count    |
//! | remaining deck           | 1               |
//! | other seats' hand sizes  | player count - 1|
//!
//! Hand counts and damage normalize by `max(1, maxHandSize)`. Deck size
//! normalizes by the deck left after the opening deal and flip.

use serde::{Deserialize, Serialize};

use crate::core::{CardFace, Direction, GameSettings, GameState, Rank, Suit};
use crate::error::{OneCardError, Result};
use crate::nn::traits::EncodedState;

/// Encodes game state into tensors for policy input.
pub trait StateEncoder: Send + Sync {
    /// Encode the state from seat 0's perspective.
    fn encode(&self, state: &GameState) -> Result<EncodedState>;

    /// Get the shape of encoded states.
    fn output_shape(&self) -> Vec<usize>;

    /// Get the total number of possible actions.
    fn action_space_size(&self) -> usize;

    /// Get the number of players this encoder supports.
    fn player_count(&self) -> usize;
}

/// Dimensions of the observation for one settings combination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationSpec {
    pub max_hand_size: usize,
    pub player_count: usize,
    /// Deck size right after the opening deal and flip (at least 1).
    pub initial_deck_size: usize,
    pub vector_size: usize,
}

impl ObservationSpec {
    /// Derive the spec from settings alone.
    #[must_use]
    pub fn from_settings(settings: &GameSettings) -> Self {
        let player_count = settings.number_of_players;
        let initial_deck_size = settings
            .deck_size()
            .saturating_sub(player_count * settings.init_hand_size + 1)
            .max(1);
        let ranks = Rank::COUNT;
        let suits = Suit::ALL.len();
        let vector_size = ranks
            + suits
            + 1
            + ranks
            + suits
            + 1
            + 1
            + 1
            + player_count
            + 1
            + player_count.saturating_sub(1);

        Self {
            max_hand_size: settings.max_hand_size,
            player_count,
            initial_deck_size,
            vector_size,
        }
    }

    /// Length of the action mask for these settings.
    #[must_use]
    pub fn action_space_size(&self) -> usize {
        self.max_hand_size + 1
    }
}

/// Encode `state` into a feature vector laid out per `spec`.
///
/// Fails with `ShapeMismatch` when the state's seat count does not fit the
/// spec's layout.
pub fn encode_observation(state: &GameState, spec: &ObservationSpec) -> Result<Vec<f32>> {
    let max_hand = spec.max_hand_size.max(1) as f32;
    let mut features = Vec::with_capacity(spec.vector_size);

    // Hand histograms
    let mut ranks = [0.0f32; Rank::COUNT];
    let mut suits = [0.0f32; 4];
    let mut jokers = 0.0f32;
    if let Some(seat) = state.players.front() {
        for card in &seat.hand {
            match card.face {
                CardFace::Joker => jokers += 1.0,
                CardFace::Suited { suit, rank } => {
                    ranks[rank.index()] += 1.0;
                    suits[suit.index()] += 1.0;
                }
            }
        }
    }
    features.extend(ranks.iter().map(|v| v / max_hand));
    features.extend(suits.iter().map(|v| v / max_hand));
    features.push(jokers / max_hand);

    // Top of discard pile
    let mut top_rank = [0.0f32; Rank::COUNT];
    let mut top_suit = [0.0f32; 4];
    let mut top_joker = 0.0f32;
    match state.top_card().map(|c| c.face) {
        Some(CardFace::Suited { suit, rank }) => {
            top_rank[rank.index()] = 1.0;
            top_suit[suit.index()] = 1.0;
        }
        Some(CardFace::Joker) => top_joker = 1.0,
        None => {}
    }
    features.extend_from_slice(&top_rank);
    features.extend_from_slice(&top_suit);
    features.push(top_joker);

    let damage = (state.damage as f32).min(spec.max_hand_size as f32);
    features.push(damage / max_hand);
    features.push(if state.direction == Direction::Clockwise { 1.0 } else { 0.0 });

    let mut current = vec![0.0f32; spec.player_count];
    if let Some(slot) = current.get_mut(state.current_player_index) {
        *slot = 1.0;
    }
    features.extend(current);

    let deck = state.deck.len() as f32 / spec.initial_deck_size.max(1) as f32;
    features.push(deck.min(1.0));

    features.extend(
        state
            .players
            .iter()
            .skip(1)
            .map(|p| (p.hand_len() as f32 / max_hand).min(1.0)),
    );

    if features.len() != spec.vector_size {
        return Err(OneCardError::ShapeMismatch {
            expected: spec.vector_size,
            actual: features.len(),
        });
    }
    Ok(features)
}

/// [`StateEncoder`] for One Card.
#[derive(Clone, Debug)]
pub struct OneCardEncoder {
    spec: ObservationSpec,
}

impl OneCardEncoder {
    /// Create an encoder for the given settings.
    pub fn new(settings: &GameSettings) -> Self {
        Self {
            spec: ObservationSpec::from_settings(settings),
        }
    }

    /// Create an encoder from an existing spec.
    pub fn from_spec(spec: ObservationSpec) -> Self {
        Self { spec }
    }

    #[must_use]
    pub fn spec(&self) -> &ObservationSpec {
        &self.spec
    }
}

impl StateEncoder for OneCardEncoder {
    fn encode(&self, state: &GameState) -> Result<EncodedState> {
        encode_observation(state, &self.spec).map(EncodedState::batch_of_one)
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![1, self.spec.vector_size]
    }

    fn action_space_size(&self) -> usize {
        self.spec.action_space_size()
    }

    fn player_count(&self) -> usize {
        self.spec.player_count
    }
}
