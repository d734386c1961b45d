//! Policy network interface.
//!
//! The engine treats inference as an opaque capability: a fixed-size
//! feature vector goes in, a fixed-size score vector comes out, and the call
//! may fail. Runtimes (ONNX sessions, remote services, test stubs) implement
//! [`PolicyNetwork`].

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Observation tensor handed to a [`PolicyNetwork`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    /// Row-major values.
    pub tensor: Vec<f32>,
    /// `[1, features]` for a single observation.
    pub shape: Vec<usize>,
}

impl EncodedState {
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(tensor.len(), shape.iter().product::<usize>(), "shape does not cover tensor");
        Self { tensor, shape }
    }

    /// Wrap one feature vector as a batch of one.
    pub fn batch_of_one(features: Vec<f32>) -> Self {
        let len = features.len();
        Self::new(features, vec![1, len])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    /// The features without the batch dimension.
    #[must_use]
    pub fn features(&self) -> &[f32] {
        &self.tensor
    }
}

/// Policy network: scores every slot of the discrete action space.
///
/// Implementations may block (a forward pass, a file read); callers run them
/// on the blocking thread pool.
pub trait PolicyNetwork: Send + Sync {
    /// Score each action for the given observation.
    ///
    /// The output length should equal the action space size the network was
    /// trained for. Higher is better; the scores need not be normalized.
    fn predict(&self, encoded: &EncodedState) -> Result<Vec<f32>>;
}

/// Scores every slot equally, so masked selection picks the first legal
/// slot. Stands in for a real model in tests and smoke runs.
#[derive(Clone, Debug, Default)]
pub struct UniformPolicy {
    action_space_size: usize,
}

impl UniformPolicy {
    pub fn new(action_space_size: usize) -> Self {
        Self { action_space_size }
    }
}

impl PolicyNetwork for UniformPolicy {
    fn predict(&self, _encoded: &EncodedState) -> Result<Vec<f32>> {
        if self.action_space_size == 0 {
            return Ok(vec![]);
        }
        let prob = 1.0 / self.action_space_size as f32;
        Ok(vec![prob; self.action_space_size])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_of_one() {
        let state = EncodedState::batch_of_one(vec![0.5; 7]);
        assert_eq!(state.shape, vec![1, 7]);
        assert_eq!(state.len(), 7);
        assert_eq!(state.features()[6], 0.5);
    }

    #[test]
    fn test_uniform_policy() {
        let policy = UniformPolicy::new(4);
        let scores = policy.predict(&EncodedState::batch_of_one(vec![0.0; 10])).unwrap();

        assert_eq!(scores.len(), 4);
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 0.001);
        assert!(UniformPolicy::new(0).predict(&EncodedState::batch_of_one(vec![])).unwrap().is_empty());
    }
}
