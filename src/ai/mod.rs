//! Computer opponents.
//!
//! - `rule_based`: first-legal-card move choice
//! - `controller`: runs a whole AI turn, consulting a policy for medium
//!   seats and falling back to rule-based play when it fails

pub mod rule_based;
pub mod controller;

pub use rule_based::choose_rule_based_action;
pub use controller::{AiTurnController, TurnActions, TurnOutcome, TurnSource};
