//! Process-lifetime model cache with single-flight loading.
//!
//! One slot per settings fingerprint. The first caller for a key runs the
//! load on the blocking pool; concurrent callers for the same key wait on
//! that load instead of starting their own. A failed load leaves the slot
//! empty, so the next caller retries.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::loader::{LoadedModel, ModelLoader};
use crate::core::GameSettings;
use crate::error::{OneCardError, Result};

type Slot = Arc<OnceCell<Arc<LoadedModel>>>;

/// Cache of loaded models keyed by settings fingerprint.
pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    slots: DashMap<String, Slot>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            slots: DashMap::new(),
        }
    }

    /// Return the cached model for `settings`, loading it on first use.
    pub async fn get_or_load(&self, settings: &GameSettings) -> Result<Arc<LoadedModel>> {
        let key = settings.fingerprint();
        let slot: Slot = Arc::clone(self.slots.entry(key.clone()).or_default().value());

        // Fast path: already loaded
        if let Some(model) = slot.get() {
            debug!(model_cache = "reuse", key = %key, "Reusing loaded policy model");
            return Ok(Arc::clone(model));
        }

        let loader = Arc::clone(&self.loader);
        let owned = settings.clone();
        let model = slot
            .get_or_try_init(|| async move {
                info!(model_cache = "load", key = %owned.fingerprint(), "Loading policy model");
                tokio::task::spawn_blocking(move || loader.load(&owned))
                    .await
                    .map_err(|e| OneCardError::InferenceUnavailable(format!("model load task failed: {e}")))?
                    .map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(model))
    }

    /// Fingerprints with a loaded model.
    #[must_use]
    pub fn loaded_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .slots
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("loaded", &self.loaded_keys())
            .finish_non_exhaustive()
    }
}
