//! Error taxonomy for the engine, the policy bridge and the session layer.
//!
//! The rules engine and the inference bridge fail fast with one of these
//! variants. Only the AI turn controller recovers (by falling back to
//! rule-based play); everything else propagates to the caller.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the engine and its collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OneCardError {
    /// Operation is not permitted in the current game state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Action failed a legality or index check before any mutation.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// Score vector and action mask lengths disagree.
    #[error("dimension mismatch: {scores} scores for a mask of {mask}")]
    DimensionMismatch { scores: usize, mask: usize },

    /// Observation length disagrees with the expected input shape.
    #[error("shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Action index is past the draw index.
    #[error("action index {index} out of range (max {max})")]
    OutOfRange { index: usize, max: usize },

    /// Action index addresses a card the hand does not hold.
    #[error("action index {index} exceeds hand of {hand_len} cards")]
    HandExceeded { index: usize, hand_len: usize },

    /// Every action in the mask is illegal.
    #[error("no valid action available")]
    NoValidAction,

    /// Model artifacts could not be loaded or inference failed.
    #[error("inference unavailable: {0}")]
    InferenceUnavailable(String),

    /// Loaded model was trained for different settings.
    #[error("model settings mismatch on `{field}`")]
    IncompatibleModel { field: &'static str },

    /// Settings outside the accepted ranges.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// No session with the given id exists.
    #[error("game {0} not found")]
    SessionNotFound(Uuid),
}

impl OneCardError {
    /// Short machine-readable name of the variant, used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "InvalidState",
            Self::IllegalAction(_) => "IllegalAction",
            Self::DimensionMismatch { .. } => "DimensionMismatch",
            Self::ShapeMismatch { .. } => "ShapeMismatch",
            Self::OutOfRange { .. } => "OutOfRange",
            Self::HandExceeded { .. } => "HandExceeded",
            Self::NoValidAction => "NoValidAction",
            Self::InferenceUnavailable(_) => "InferenceUnavailable",
            Self::IncompatibleModel { .. } => "IncompatibleModel",
            Self::InvalidSettings(_) => "InvalidSettings",
            Self::SessionNotFound(_) => "SessionNotFound",
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OneCardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = OneCardError::DimensionMismatch { scores: 3, mask: 16 };
        assert_eq!(err.to_string(), "dimension mismatch: 3 scores for a mask of 16");

        let err = OneCardError::IncompatibleModel { field: "maxHandSize" };
        assert_eq!(err.to_string(), "model settings mismatch on `maxHandSize`");
    }

    #[test]
    fn test_kind() {
        assert_eq!(OneCardError::NoValidAction.kind(), "NoValidAction");
        assert_eq!(
            OneCardError::InferenceUnavailable("boom".into()).kind(),
            "InferenceUnavailable"
        );
    }
}
