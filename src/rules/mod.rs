//! One Card rules.
//!
//! - `legality`: which card may be played, blocking, effect values
//! - `engine`: the pure transition function over `(state, action)`

pub mod legality;
pub mod engine;

pub use legality::{
    attack_value, can_block, change_direction, find_playable_card, has_special_effect,
    is_valid_play,
};
pub use engine::{
    apply_actions, legal_actions, play_with_effect, step, transition, transition_payload,
    StepResult,
};
