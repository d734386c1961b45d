//! Seats and the roster.
//!
//! Seat 0 is always the human player (`isSelf`); every other seat is an AI
//! opponent. Hands are persistent vectors so a transition that touches one
//! hand shares the rest of the roster with the previous state.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::card::Card;
use super::config::{Difficulty, GameSettings};

/// One seat at the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identity, `player-<seat>`.
    pub id: String,
    /// Display name: `me` for the human, `cpu-<seat>` for AI seats.
    pub name: String,
    /// Cards in hand. Order matters: plays address cards by index.
    pub hand: Vector<Card>,
    pub is_self: bool,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl Player {
    /// The human seat.
    #[must_use]
    pub fn human(seat: usize) -> Self {
        Self {
            id: format!("player-{seat}"),
            name: "me".to_string(),
            hand: Vector::new(),
            is_self: true,
            is_ai: false,
            difficulty: None,
        }
    }

    /// An AI seat.
    #[must_use]
    pub fn ai(seat: usize, difficulty: Difficulty) -> Self {
        Self {
            id: format!("player-{seat}"),
            name: format!("cpu-{seat}"),
            hand: Vector::new(),
            is_self: false,
            is_ai: true,
            difficulty: Some(difficulty),
        }
    }

    /// Replace the hand.
    #[must_use]
    pub fn with_hand(mut self, hand: Vector<Card>) -> Self {
        self.hand = hand;
        self
    }

    #[must_use]
    pub fn hand_len(&self) -> usize {
        self.hand.len()
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Build the roster for `settings`: a human at seat 0, AI everywhere else.
#[must_use]
pub fn create_players(settings: &GameSettings) -> Vector<Player> {
    (0..settings.number_of_players)
        .map(|seat| {
            if seat == 0 {
                Player::human(seat)
            } else {
                Player::ai(seat, settings.difficulty)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster() {
        let settings = GameSettings::default().with_players(4).with_difficulty(Difficulty::Hard);
        let players = create_players(&settings);

        assert_eq!(players.len(), 4);
        assert!(players[0].is_self);
        assert!(!players[0].is_ai);
        assert_eq!(players[0].name, "me");
        assert_eq!(players.iter().filter(|p| p.is_self).count(), 1);

        for (seat, player) in players.iter().enumerate().skip(1) {
            assert!(player.is_ai);
            assert_eq!(player.id, format!("player-{seat}"));
            assert_eq!(player.name, format!("cpu-{seat}"));
            assert_eq!(player.difficulty, Some(Difficulty::Hard));
        }
    }

    #[test]
    fn test_wire_flags() {
        let json = serde_json::to_value(Player::ai(1, Difficulty::Medium)).unwrap();
        assert_eq!(json["isAI"], true);
        assert_eq!(json["isSelf"], false);
        assert_eq!(json["difficulty"], "medium");
    }
}
