//! Game sessions.
//!
//! - `config`: service configuration from the environment
//! - `store`: the session storage seam and its in-memory implementation
//! - `service`: per-session serialized actions and AI turns

pub mod config;
pub mod store;
pub mod service;

pub use config::{ServiceConfig, DEFAULT_MODEL_DIR};
pub use store::{MemorySessionStore, SessionRecord, SessionStore};
pub use service::{ActionOutcome, GameService, GameSummary};
