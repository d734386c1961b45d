//! Bridge between game state and a learned policy.
//!
//! ## Overview
//!
//! - **Traits**: `PolicyNetwork` (opaque scorer), `StateEncoder`
//! - **Encoding**: `ObservationSpec`, `encode_observation`, `OneCardEncoder`
//! - **Masking**: `build_action_mask`, `apply_action_mask`, `select_action`,
//!   `map_action_index_to_action`
//! - **Rotation**: `SeatRotation` puts the acting seat at index 0
//!
//! ## Usage
//!
//! ```rust,ignore
//! use onecard_engine::nn::*;
//!
//! let rotation = SeatRotation::for_current(&state);
//! let view = rotation.rotate(&state);
//! let encoded = OneCardEncoder::new(&view.settings).encode(&view)?;
//! let mask = build_action_mask(&view, view.settings.max_hand_size);
//! let scores = apply_action_mask(&network.predict(&encoded)?, &mask)?;
//! let index = select_action(&scores)?;
//! let action = rotation.unrotate_action(map_action_index_to_action(index, &view, mask.len() - 1)?);
//! ```

pub mod traits;
pub mod encoder;
pub mod mask;
pub mod rotation;

pub use traits::{EncodedState, PolicyNetwork, UniformPolicy};
pub use encoder::{encode_observation, ObservationSpec, OneCardEncoder, StateEncoder};
pub use mask::{
    apply_action_mask, build_action_mask, map_action_index_to_action, select_action,
    MASKED_SCORE, NO_ACTION_THRESHOLD,
};
pub use rotation::SeatRotation;
