//! Service configuration.
//!
//! ## Environment
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `ONNX_MODEL_DIR` | `assets/onnx` | Directory holding policy models |
//! | `ONECARD_SEED` | unset | Fixed seed for new games |

use std::env;
use std::path::{Path, PathBuf};

use crate::core::GameSettings;
use crate::error::{OneCardError, Result};

/// Default model directory, relative to the working directory.
pub const DEFAULT_MODEL_DIR: &str = "assets/onnx";

/// Configuration for the game service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub model_dir: PathBuf,
    pub default_settings: GameSettings,
    /// Seed for every new game's RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            default_settings: GameSettings::default(),
            seed: None,
        }
    }
}

impl ServiceConfig {
    /// Read `ONNX_MODEL_DIR` and `ONECARD_SEED`.
    ///
    /// Fails with `InvalidSettings` if the seed is not an unsigned integer.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = env::var("ONNX_MODEL_DIR") {
            if !dir.trim().is_empty() {
                config.model_dir = PathBuf::from(dir);
            }
        }
        if let Ok(raw) = env::var("ONECARD_SEED") {
            let seed = raw.trim().parse::<u64>().map_err(|e| {
                OneCardError::InvalidSettings(format!("ONECARD_SEED must be an unsigned integer: {e}"))
            })?;
            config.seed = Some(seed);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_model_dir(mut self, model_dir: impl AsRef<Path>) -> Self {
        self.model_dir = model_dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn with_default_settings(mut self, settings: GameSettings) -> Self {
        self.default_settings = settings;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
