//! Policy inference adapter.
//!
//! - `metadata`: the JSON sidecar describing an exported model
//! - `loader`: resolving and opening model artifacts
//! - `cache`: single-flight, per-fingerprint model cache
//! - `policy`: one prediction end to end, plus the `MovePolicy` seam used by
//!   the AI controller

pub mod metadata;
pub mod loader;
pub mod cache;
pub mod policy;

pub use metadata::ModelMetadata;
pub use loader::{FileModelLoader, LoadedModel, ModelLoader, SessionFactory};
pub use cache::ModelCache;
pub use policy::{ModelHealth, MovePolicy, PolicyService, Prediction};
