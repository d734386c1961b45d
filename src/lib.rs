//! # onecard-engine
//!
//! Rules, AI turn control and policy inference for One Card, a shedding
//! card game in the Crazy Eights family.
//!
//! ## Design Principles
//!
//! 1. **Pure Transitions**: The rules engine maps `(state, action)` to a new
//!    state and never mutates its input. The only randomness is the state's
//!    own seeded RNG, so a seed plus an action log replays a game.
//!
//! 2. **N-Player First**: Every seat computation goes through the player
//!    count and the current direction. Nothing assumes two players.
//!
//! 3. **Inference Is Optional**: A missing or broken model never blocks a
//!    game. Medium seats fall back to rule-based play.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs`, so every
//!   transition returns a fresh state cheaply.
//!
//! - **Fixed Observation Layout**: The encoder writes a flat vector whose
//!   length depends only on the settings; models are exported per settings
//!   fingerprint and checked against it.
//!
//! ## Modules
//!
//! - `core`: cards, decks, settings, players, actions, state, RNG
//! - `rules`: play legality and the transition function
//! - `nn`: observation encoding, action masking, seat rotation
//! - `inference`: model metadata, loading, caching, prediction
//! - `ai`: rule-based play and the AI turn controller
//! - `session`: stored games and serialized per-game actions
//! - `error`, `telemetry`: error type and tracing setup

pub mod error;
pub mod telemetry;
pub mod core;
pub mod rules;
pub mod nn;
pub mod inference;
pub mod ai;
pub mod session;

// Re-export commonly used types
pub use crate::error::{OneCardError, Result};

pub use crate::core::{
    Card, CardFace, CardId, Rank, Suit,
    GameRng, RngCheckpoint,
    Difficulty, GameSettings, Mode, SettingsPatch,
    Player,
    Action, ActionPayload,
    Direction, GameState, GameStatus,
};

pub use crate::rules::{is_valid_play, step, transition, transition_payload, StepResult};

pub use crate::nn::{
    EncodedState, PolicyNetwork, StateEncoder,
    ObservationSpec, OneCardEncoder, SeatRotation,
    apply_action_mask, build_action_mask, map_action_index_to_action, select_action,
};

pub use crate::inference::{
    FileModelLoader, LoadedModel, ModelCache, ModelLoader, ModelMetadata, MovePolicy,
    PolicyService, SessionFactory,
};

pub use crate::ai::{choose_rule_based_action, AiTurnController, TurnOutcome, TurnSource};

pub use crate::session::{
    GameService, GameSummary, MemorySessionStore, ServiceConfig, SessionRecord, SessionStore,
};
