//! Model metadata sidecar.
//!
//! Every exported policy ships with a JSON file next to the model:
//!
//! ```json
//! {
//!   "observation_dim": 42,
//!   "action_dim": 16,
//!   "settings": { "mode": "single", "numberOfPlayers": 2, ... },
//!   "opset_version": 17
//! }
//! ```
//!
//! The declared dimensions must agree with what the encoder and mask builder
//! compute for the declared settings, and the declared settings must match
//! the game asking for a prediction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::GameSettings;
use crate::error::{OneCardError, Result};
use crate::nn::ObservationSpec;

/// Parsed metadata of one exported model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub observation_dim: usize,
    pub action_dim: usize,
    pub settings: GameSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opset_version: Option<u32>,
}

impl ModelMetadata {
    /// Parse metadata from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| OneCardError::InferenceUnavailable(format!("malformed model metadata: {e}")))
    }

    /// Read and parse a metadata file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            OneCardError::InferenceUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Observation spec implied by the declared settings.
    #[must_use]
    pub fn observation_spec(&self) -> ObservationSpec {
        ObservationSpec::from_settings(&self.settings)
    }

    /// Check the declared dimensions against the computed ones.
    pub fn validate_dims(&self, spec: &ObservationSpec) -> Result<()> {
        if self.observation_dim != spec.vector_size {
            return Err(OneCardError::ShapeMismatch {
                expected: spec.vector_size,
                actual: self.observation_dim,
            });
        }
        if self.action_dim != spec.action_space_size() {
            return Err(OneCardError::ShapeMismatch {
                expected: spec.action_space_size(),
                actual: self.action_dim,
            });
        }
        Ok(())
    }

    /// Check that the model was trained for the requesting game's settings.
    pub fn assert_compatible(&self, request: &GameSettings) -> Result<()> {
        let model = &self.settings;
        let checks: [(&'static str, bool); 6] = [
            ("numberOfPlayers", model.number_of_players == request.number_of_players),
            ("includeJokers", model.include_jokers == request.include_jokers),
            ("maxHandSize", model.max_hand_size == request.max_hand_size),
            ("initHandSize", model.init_hand_size == request.init_hand_size),
            ("mode", model.mode == request.mode),
            ("difficulty", model.difficulty == request.difficulty),
        ];
        match checks.into_iter().find(|(_, same)| !same) {
            Some((field, _)) => Err(OneCardError::IncompatibleModel { field }),
            None => Ok(()),
        }
    }
}
