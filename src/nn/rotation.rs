//! Seat rotation at the policy boundary.
//!
//! The encoder and mask builder always look from seat 0. To ask the policy
//! about another seat, rotate the table so the acting seat sits at index 0
//! and the rest follow in turn order; then map the chosen action's seat
//! back with [`SeatRotation::unrotate_action`].

use im::Vector;

use crate::core::{offset_seat, Action, Direction, GameState};

/// A reversible reordering of seats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeatRotation {
    origin: usize,
    step: isize,
    player_count: usize,
}

impl SeatRotation {
    /// Rotation that puts `origin` first, walking seats in `direction`.
    #[must_use]
    pub fn new(origin: usize, direction: Direction, player_count: usize) -> Self {
        Self {
            origin,
            step: direction.step(),
            player_count,
        }
    }

    /// Rotation centred on the current player of `state`.
    #[must_use]
    pub fn for_current(state: &GameState) -> Self {
        Self::new(state.current_player_index, state.direction, state.player_count())
    }

    /// Original seat of rotated seat `rotated`.
    #[must_use]
    pub fn unrotate_seat(&self, rotated: usize) -> usize {
        offset_seat(self.origin, self.step * rotated as isize, self.player_count)
    }

    /// Rotated position of original seat `seat`.
    #[must_use]
    pub fn rotate_seat(&self, seat: usize) -> usize {
        let forward = offset_seat(seat, -(self.origin as isize), self.player_count);
        if self.step >= 0 {
            forward
        } else {
            offset_seat(0, -(forward as isize), self.player_count)
        }
    }

    /// View of `state` with the acting seat at index 0.
    #[must_use]
    pub fn rotate(&self, state: &GameState) -> GameState {
        let players: Vector<_> = (0..self.player_count)
            .filter_map(|i| state.players.get(self.unrotate_seat(i)).cloned())
            .collect();

        let mut rotated = state.clone();
        rotated.players = players;
        rotated.current_player_index = 0;
        rotated
    }

    /// Map an action chosen in the rotated view back to real seats.
    #[must_use]
    pub fn unrotate_action(&self, action: Action) -> Action {
        match action {
            Action::PlayCard {
                player_index,
                card_index,
            } => Action::PlayCard {
                player_index: self.unrotate_seat(player_index),
                card_index,
            },
            Action::EndGame { winner_index } => Action::EndGame {
                winner_index: self.unrotate_seat(winner_index),
            },
            other => other,
        }
    }
}
