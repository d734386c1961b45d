//! Game settings: defaults, validation, merging and the settings fingerprint.
//!
//! ## GameSettings
//!
//! An immutable snapshot carried by every `GameState`. Settings are built
//! either from [`GameSettings::default`] plus `with_*` builders, or by
//! merging a client-supplied [`SettingsPatch`] over the defaults.
//!
//! ## Fingerprint
//!
//! Policy models are trained per player count and joker setting. The
//! fingerprint `p<n>_joker<on|off>` keys the model cache and names the
//! model artifacts on disk.

use serde::{Deserialize, Serialize};

use crate::error::{OneCardError, Result};

/// Allowed number of seats.
pub const PLAYER_RANGE: std::ops::RangeInclusive<usize> = 2..=6;
/// Allowed initial hand size.
pub const INIT_HAND_RANGE: std::ops::RangeInclusive<usize> = 1..=15;
/// Allowed hand size cap.
pub const MAX_HAND_RANGE: std::ops::RangeInclusive<usize> = 1..=20;

/// Cards in a deck without jokers.
pub const BASE_DECK_SIZE: usize = 52;
/// Jokers added when `include_jokers` is set.
pub const JOKER_COUNT: usize = 2;

/// AI strength. `Medium` routes to the learned policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// Game mode. `Multi` is accepted but plays exactly like `Single`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Single,
    Multi,
}

/// Settings for one game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub mode: Mode,
    pub number_of_players: usize,
    pub include_jokers: bool,
    pub init_hand_size: usize,
    pub max_hand_size: usize,
    pub difficulty: Difficulty,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Single,
            number_of_players: 2,
            include_jokers: false,
            init_hand_size: 5,
            max_hand_size: 15,
            difficulty: Difficulty::Easy,
        }
    }
}

impl GameSettings {
    /// Set the number of seats.
    #[must_use]
    pub fn with_players(mut self, number_of_players: usize) -> Self {
        self.number_of_players = number_of_players;
        self
    }

    /// Add or remove the two jokers.
    #[must_use]
    pub fn with_jokers(mut self, include_jokers: bool) -> Self {
        self.include_jokers = include_jokers;
        self
    }

    /// Set the number of cards dealt to each seat.
    #[must_use]
    pub fn with_init_hand_size(mut self, init_hand_size: usize) -> Self {
        self.init_hand_size = init_hand_size;
        self
    }

    /// Set the hand size cap.
    #[must_use]
    pub fn with_max_hand_size(mut self, max_hand_size: usize) -> Self {
        self.max_hand_size = max_hand_size;
        self
    }

    /// Set the AI difficulty.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the game mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Total cards in a freshly built deck.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        BASE_DECK_SIZE + if self.include_jokers { JOKER_COUNT } else { 0 }
    }

    /// Size of the discrete action space: one slot per hand position plus draw.
    #[must_use]
    pub fn action_space_size(&self) -> usize {
        self.max_hand_size + 1
    }

    /// Settings fingerprint, e.g. `p2_jokeroff`.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!(
            "p{}_joker{}",
            self.number_of_players,
            if self.include_jokers { "on" } else { "off" }
        )
    }

    /// Check ranges and that a deal leaves at least one card to flip.
    pub fn validate(&self) -> Result<()> {
        if !PLAYER_RANGE.contains(&self.number_of_players) {
            return Err(OneCardError::InvalidSettings(format!(
                "numberOfPlayers {} outside {:?}",
                self.number_of_players, PLAYER_RANGE
            )));
        }
        if !INIT_HAND_RANGE.contains(&self.init_hand_size) {
            return Err(OneCardError::InvalidSettings(format!(
                "initHandSize {} outside {:?}",
                self.init_hand_size, INIT_HAND_RANGE
            )));
        }
        if !MAX_HAND_RANGE.contains(&self.max_hand_size) {
            return Err(OneCardError::InvalidSettings(format!(
                "maxHandSize {} outside {:?}",
                self.max_hand_size, MAX_HAND_RANGE
            )));
        }
        let dealt = self.number_of_players * self.init_hand_size;
        if dealt >= self.deck_size() {
            return Err(OneCardError::InvalidSettings(format!(
                "dealing {dealt} cards leaves nothing to flip from a {}-card deck",
                self.deck_size()
            )));
        }
        Ok(())
    }
}

/// Partial settings supplied by a client; absent fields keep the defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub number_of_players: Option<usize>,
    #[serde(default)]
    pub include_jokers: Option<bool>,
    #[serde(default)]
    pub init_hand_size: Option<usize>,
    #[serde(default)]
    pub max_hand_size: Option<usize>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl SettingsPatch {
    /// Overlay this patch on `base`.
    #[must_use]
    pub fn merge_over(&self, base: &GameSettings) -> GameSettings {
        GameSettings {
            mode: self.mode.unwrap_or(base.mode),
            number_of_players: self.number_of_players.unwrap_or(base.number_of_players),
            include_jokers: self.include_jokers.unwrap_or(base.include_jokers),
            init_hand_size: self.init_hand_size.unwrap_or(base.init_hand_size),
            max_hand_size: self.max_hand_size.unwrap_or(base.max_hand_size),
            difficulty: self.difficulty.unwrap_or(base.difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GameSettings::default();
        assert_eq!(settings.mode, Mode::Single);
        assert_eq!(settings.number_of_players, 2);
        assert!(!settings.include_jokers);
        assert_eq!(settings.init_hand_size, 5);
        assert_eq!(settings.max_hand_size, 15);
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(GameSettings::default().fingerprint(), "p2_jokeroff");
        let settings = GameSettings::default().with_players(4).with_jokers(true);
        assert_eq!(settings.fingerprint(), "p4_jokeron");
    }

    #[test]
    fn test_validate_ranges() {
        assert!(GameSettings::default().with_players(1).validate().is_err());
        assert!(GameSettings::default().with_players(7).validate().is_err());
        assert!(GameSettings::default().with_init_hand_size(0).validate().is_err());
        assert!(GameSettings::default().with_max_hand_size(21).validate().is_err());
        assert!(GameSettings::default().with_players(6).with_init_hand_size(8).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_flip() {
        // 4 x 13 = 52 leaves nothing for the opening card
        let settings = GameSettings::default().with_players(4).with_init_hand_size(13);
        assert!(matches!(settings.validate(), Err(OneCardError::InvalidSettings(_))));
        assert!(settings.with_jokers(true).validate().is_ok());
    }

    #[test]
    fn test_patch_merge() {
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"numberOfPlayers": 3, "difficulty": "medium"}"#).unwrap();
        let merged = patch.merge_over(&GameSettings::default());
        assert_eq!(merged.number_of_players, 3);
        assert_eq!(merged.difficulty, Difficulty::Medium);
        assert_eq!(merged.init_hand_size, 5);
        assert_eq!(merged.max_hand_size, 15);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(GameSettings::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mode": "single",
                "numberOfPlayers": 2,
                "includeJokers": false,
                "initHandSize": 5,
                "maxHandSize": 15,
                "difficulty": "easy"
            })
        );
    }
}
