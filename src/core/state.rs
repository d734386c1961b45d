//! Game state: the aggregate root of a One Card game.
//!
//! ## Layout
//!
//! - Players in turn order, each owning an ordered hand
//! - Draw pile (`deck`): draws take the front card
//! - Discard pile: index 0 is the active (top) card
//! - Turn direction, accumulated damage, status, winner
//! - Settings snapshot and the game's private RNG
//!
//! Every collection is an `im` persistent vector, so cloning a state is
//! O(1) and a transition only copies the paths it changes. The RNG is never
//! serialized: clients see the table, not the future shuffles.

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::card::Card;
use super::config::GameSettings;
use super::deck::{create_deck, deal_cards, refill_deck, shuffle};
use super::player::{create_players, Player};
use super::rng::GameRng;
use crate::error::{OneCardError, Result};

/// Turn direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Clockwise,
    Counterclockwise,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::Counterclockwise,
            Direction::Counterclockwise => Direction::Clockwise,
        }
    }

    /// Seat offset of one step: +1 clockwise, -1 counterclockwise.
    #[must_use]
    pub fn step(self) -> isize {
        match self {
            Direction::Clockwise => 1,
            Direction::Counterclockwise => -1,
        }
    }
}

/// Lifecycle of a game: `Waiting` → `Playing` → `Finished`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

/// Seat reached by moving `step` seats from `from` around a table of `count`.
#[must_use]
pub fn offset_seat(from: usize, step: isize, count: usize) -> usize {
    debug_assert!(count > 0);
    let count = count as isize;
    ((from as isize + step) % count + count) as usize % count as usize
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub players: Vector<Player>,
    pub current_player_index: usize,
    pub deck: Vector<Card>,
    pub discard_pile: Vector<Card>,
    pub direction: Direction,
    pub damage: u32,
    pub game_status: GameStatus,
    pub settings: GameSettings,
    pub winner: Option<Player>,

    #[serde(skip, default = "GameRng::from_entropy")]
    rng: GameRng,
}

impl GameState {
    /// Deal a waiting game from `settings` with a fresh RNG.
    ///
    /// Fails with `InvalidSettings` if the settings are out of range.
    pub fn new(settings: GameSettings) -> Result<Self> {
        Self::with_rng(settings, GameRng::from_entropy())
    }

    /// Deal a waiting game with a fixed seed (reproducible shuffles).
    pub fn with_seed(settings: GameSettings, seed: u64) -> Result<Self> {
        Self::with_rng(settings, GameRng::new(seed))
    }

    /// Deal a waiting game using `rng` for the shuffle.
    ///
    /// Hands are dealt, the discard pile is empty, seat 0 is current.
    pub fn with_rng(settings: GameSettings, mut rng: GameRng) -> Result<Self> {
        settings.validate()?;

        let deck = shuffle(&create_deck(settings.include_jokers), &mut rng);
        let (players, deck) = deal_cards(&create_players(&settings), &deck, settings.init_hand_size);

        Ok(Self {
            players,
            current_player_index: 0,
            deck,
            discard_pile: Vector::new(),
            direction: Direction::Clockwise,
            damage: 0,
            game_status: GameStatus::Waiting,
            settings,
            winner: None,
            rng,
        })
    }

    /// The game's RNG.
    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    /// Rebuild the draw pile from the discard pile, keeping the top discard.
    pub(crate) fn reshuffle_discard(&mut self) {
        let (deck, discard_pile) = refill_deck(&self.deck, &self.discard_pile, &mut self.rng);
        self.deck = deck;
        self.discard_pile = discard_pile;
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// Active card on the discard pile.
    #[must_use]
    pub fn top_card(&self) -> Option<&Card> {
        self.discard_pile.front()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.game_status == GameStatus::Finished
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.game_status == GameStatus::Playing
    }

    /// Whether the current seat is an AI seat.
    #[must_use]
    pub fn is_ai_turn(&self) -> bool {
        self.current_player().is_some_and(|p| p.is_ai)
    }

    /// Index of the player after the current one in turn direction.
    #[must_use]
    pub fn next_player_index(&self) -> usize {
        offset_seat(
            self.current_player_index,
            self.direction.step(),
            self.player_count(),
        )
    }

    /// Index of the player before the current one in turn direction.
    #[must_use]
    pub fn prev_player_index(&self) -> usize {
        offset_seat(
            self.current_player_index,
            -self.direction.step(),
            self.player_count(),
        )
    }

    /// Cards across deck, discard pile and all hands.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.discard_pile.len()
            + self.players.iter().map(Player::hand_len).sum::<usize>()
    }

    /// Check the structural invariants.
    ///
    /// - Every card of the constructed deck is in exactly one place
    /// - `current_player_index` addresses a seat
    /// - The discard pile is non-empty once the game has started
    /// - A winner is recorded iff the game is finished
    pub fn verify_integrity(&self) -> Result<()> {
        let expected = self.settings.deck_size();
        if self.card_count() != expected {
            return Err(OneCardError::InvalidState(format!(
                "{} cards in play, expected {expected}",
                self.card_count()
            )));
        }

        let mut seen = FxHashSet::default();
        let all_cards = self
            .deck
            .iter()
            .chain(self.discard_pile.iter())
            .chain(self.players.iter().flat_map(|p| p.hand.iter()));
        for card in all_cards {
            if !seen.insert(card.id) {
                return Err(OneCardError::InvalidState(format!("{} appears twice", card.id)));
            }
        }

        if self.current_player_index >= self.player_count() {
            return Err(OneCardError::InvalidState(format!(
                "current player index {} out of {} seats",
                self.current_player_index,
                self.player_count()
            )));
        }
        if self.game_status != GameStatus::Waiting && self.discard_pile.is_empty() {
            return Err(OneCardError::InvalidState("discard pile empty after start".into()));
        }
        if self.is_finished() != self.winner.is_some() {
            return Err(OneCardError::InvalidState("winner set without finish or vice versa".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_waiting_and_dealt() {
        let state = GameState::with_seed(GameSettings::default(), 1).unwrap();

        assert_eq!(state.game_status, GameStatus::Waiting);
        assert!(state.discard_pile.is_empty());
        assert_eq!(state.deck.len(), 42);
        assert!(state.players.iter().all(|p| p.hand_len() == 5));
        assert_eq!(state.current_player_index, 0);
        assert!(state.verify_integrity().is_ok());
    }

    #[test]
    fn test_new_rejects_bad_settings() {
        let result = GameState::new(GameSettings::default().with_players(9));
        assert!(matches!(result, Err(OneCardError::InvalidSettings(_))));
    }

    #[test]
    fn test_seeded_states_match() {
        let a = GameState::with_seed(GameSettings::default(), 5).unwrap();
        let b = GameState::with_seed(GameSettings::default(), 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_offset_seat_wraps() {
        assert_eq!(offset_seat(0, -1, 4), 3);
        assert_eq!(offset_seat(3, 1, 4), 0);
        assert_eq!(offset_seat(1, -2, 4), 3);
        assert_eq!(offset_seat(2, 0, 4), 2);
    }

    #[test]
    fn test_next_prev_follow_direction() {
        let mut state = GameState::with_seed(GameSettings::default().with_players(4), 1).unwrap();
        state.current_player_index = 0;

        assert_eq!(state.next_player_index(), 1);
        assert_eq!(state.prev_player_index(), 3);

        state.direction = Direction::Counterclockwise;
        assert_eq!(state.next_player_index(), 3);
        assert_eq!(state.prev_player_index(), 1);
    }

    #[test]
    fn test_integrity_detects_lost_card() {
        let mut state = GameState::with_seed(GameSettings::default(), 1).unwrap();
        state.deck.pop_front();
        assert!(matches!(state.verify_integrity(), Err(OneCardError::InvalidState(_))));
    }

    #[test]
    fn test_serialized_state_hides_rng() {
        let state = GameState::with_seed(GameSettings::default(), 1).unwrap();
        let json = serde_json::to_value(&state).unwrap();

        assert!(json.get("rng").is_none());
        assert_eq!(json["gameStatus"], "waiting");
        assert_eq!(json["direction"], "clockwise");
        assert_eq!(json["currentPlayerIndex"], 0);
        assert_eq!(json["discardPile"], serde_json::json!([]));
    }
}
