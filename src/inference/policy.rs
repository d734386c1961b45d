//! Policy-guided move selection.
//!
//! One prediction runs the whole bridge:
//!
//! 1. Load (or reuse) the model for the game's fingerprint
//! 2. Check the model was trained for these settings
//! 3. Rotate the table so the acting seat is seat 0
//! 4. Encode and mask, checking both against the model's dimensions
//! 5. Score on the blocking pool
//! 6. Mask, pick the best legal slot, map it to an action
//! 7. Map the action's seat back to the real table

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cache::ModelCache;
use super::loader::ModelLoader;
use crate::core::{Action, GameSettings, GameState};
use crate::error::{OneCardError, Result};
use crate::nn::{
    apply_action_mask, build_action_mask, map_action_index_to_action, select_action,
    OneCardEncoder, SeatRotation, StateEncoder,
};

/// Source of moves for policy-driven seats.
#[async_trait]
pub trait MovePolicy: Send + Sync {
    /// Choose the current player's move. Any error means "no opinion".
    async fn choose_action(&self, state: &GameState) -> Result<Action>;
}

/// Result of one prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Selected slot in the rotated view.
    pub action_index: usize,
    /// Raw scores from the network.
    pub scores: Vec<f32>,
    /// Action mapped back to real seats.
    pub action: Action,
}

/// Summary of the model serving a settings combination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHealth {
    pub fingerprint: String,
    pub observation_dim: usize,
    pub action_dim: usize,
    pub settings: GameSettings,
}

/// Runs predictions against cached models.
#[derive(Debug)]
pub struct PolicyService {
    cache: ModelCache,
}

impl PolicyService {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            cache: ModelCache::new(loader),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Predict the current player's move.
    pub async fn predict_action(&self, state: &GameState) -> Result<Prediction> {
        let model = self.cache.get_or_load(&state.settings).await?;
        model.metadata.assert_compatible(&state.settings)?;

        let rotation = SeatRotation::for_current(state);
        let view = rotation.rotate(state);

        let encoder = OneCardEncoder::from_spec(model.spec.clone());
        let encoded = encoder.encode(&view)?;
        if encoded.shape != [1, model.metadata.observation_dim] {
            return Err(OneCardError::ShapeMismatch {
                expected: model.metadata.observation_dim,
                actual: encoded.len(),
            });
        }

        let max_hand_size = model.spec.max_hand_size;
        let mask = build_action_mask(&view, max_hand_size);
        if encoder.action_space_size() != model.metadata.action_dim {
            return Err(OneCardError::DimensionMismatch {
                scores: model.metadata.action_dim,
                mask: mask.len(),
            });
        }

        let network = Arc::clone(&model.network);
        let scores = tokio::task::spawn_blocking(move || network.predict(&encoded))
            .await
            .map_err(|e| OneCardError::InferenceUnavailable(format!("inference task failed: {e}")))??;

        let masked = apply_action_mask(&scores, &mask)?;
        let action_index = select_action(&masked)?;
        let action = rotation.unrotate_action(map_action_index_to_action(
            action_index,
            &view,
            max_hand_size,
        )?);

        debug!(
            action_index,
            action = %action,
            seat = state.current_player_index,
            "Policy selected action"
        );
        Ok(Prediction {
            action_index,
            scores,
            action,
        })
    }

    /// Load the model for `settings` and describe it.
    pub async fn check_health(&self, settings: &GameSettings) -> Result<ModelHealth> {
        let model = self.cache.get_or_load(settings).await?;
        Ok(ModelHealth {
            fingerprint: settings.fingerprint(),
            observation_dim: model.metadata.observation_dim,
            action_dim: model.metadata.action_dim,
            settings: model.metadata.settings.clone(),
        })
    }
}

#[async_trait]
impl MovePolicy for PolicyService {
    async fn choose_action(&self, state: &GameState) -> Result<Action> {
        self.predict_action(state).await.map(|p| p.action)
    }
}
