//! Core game types: cards, decks, players, settings, actions, state, RNG.
//!
//! Everything here is plain data plus small pure helpers. Game rules live in
//! `rules`; this module only knows how a table is laid out.

pub mod card;
pub mod rng;
pub mod deck;
pub mod config;
pub mod player;
pub mod action;
pub mod state;

pub use card::{Card, CardFace, CardId, Rank, Suit};
pub use rng::{GameRng, RngCheckpoint};
pub use config::{Difficulty, GameSettings, Mode, SettingsPatch};
pub use player::{create_players, Player};
pub use action::{Action, ActionPayload, EffectCardPayload, LooseRank};
pub use state::{offset_seat, Direction, GameState, GameStatus};
