//! Loading policy models from disk.
//!
//! Artifacts live in one directory, named by settings fingerprint:
//!
//! - `ppo-onecard_<fingerprint>.onnx`: the model itself
//! - `ppo-onecard_<fingerprint>.onnx.json`: its [`ModelMetadata`]
//!
//! The crate does not link a numeric runtime. A [`SessionFactory`] turns a
//! model file into a [`PolicyNetwork`]; the loader handles naming, metadata
//! and dimension checks around it. Sessions receive the observation as a
//! `[1, observation_dim]` tensor and return the action scores as their
//! first output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use super::metadata::ModelMetadata;
use crate::core::GameSettings;
use crate::error::{OneCardError, Result};
use crate::nn::{ObservationSpec, PolicyNetwork};

/// A model ready for inference, with the metadata it was validated against.
#[derive(Clone)]
pub struct LoadedModel {
    pub network: Arc<dyn PolicyNetwork>,
    pub metadata: ModelMetadata,
    pub spec: ObservationSpec,
}

impl LoadedModel {
    /// Bundle a network with its metadata after checking the dimensions.
    pub fn new(network: Arc<dyn PolicyNetwork>, metadata: ModelMetadata) -> Result<Self> {
        let spec = metadata.observation_spec();
        metadata.validate_dims(&spec)?;
        Ok(Self {
            network,
            metadata,
            spec,
        })
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("metadata", &self.metadata)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Loads the model for a settings combination. May block.
pub trait ModelLoader: Send + Sync {
    fn load(&self, settings: &GameSettings) -> Result<LoadedModel>;
}

/// Opens a model file as a policy network. May block.
pub trait SessionFactory: Send + Sync {
    fn open(&self, model_path: &Path, metadata: &ModelMetadata) -> Result<Arc<dyn PolicyNetwork>>;
}

/// [`ModelLoader`] over a directory of exported models.
pub struct FileModelLoader {
    model_dir: PathBuf,
    sessions: Arc<dyn SessionFactory>,
}

impl FileModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>, sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            model_dir: model_dir.into(),
            sessions,
        }
    }

    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Path of the model file for `settings`.
    #[must_use]
    pub fn model_path(&self, settings: &GameSettings) -> PathBuf {
        self.model_dir
            .join(format!("ppo-onecard_{}.onnx", settings.fingerprint()))
    }

    /// Path of the metadata sidecar for `settings`.
    #[must_use]
    pub fn metadata_path(&self, settings: &GameSettings) -> PathBuf {
        self.model_dir
            .join(format!("ppo-onecard_{}.onnx.json", settings.fingerprint()))
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self, settings: &GameSettings) -> Result<LoadedModel> {
        let metadata = ModelMetadata::read(&self.metadata_path(settings))?;
        let spec = metadata.observation_spec();
        metadata.validate_dims(&spec)?;

        let model_path = self.model_path(settings);
        if !model_path.is_file() {
            return Err(OneCardError::InferenceUnavailable(format!(
                "model file missing: {}",
                model_path.display()
            )));
        }
        let network = self.sessions.open(&model_path, &metadata)?;

        info!(
            model = %model_path.display(),
            fingerprint = %settings.fingerprint(),
            observation_dim = metadata.observation_dim,
            action_dim = metadata.action_dim,
            "Loaded policy model"
        );
        Ok(LoadedModel {
            network,
            metadata,
            spec,
        })
    }
}

impl fmt::Debug for FileModelLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileModelLoader")
            .field("model_dir", &self.model_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Difficulty;
    use crate::nn::UniformPolicy;

    struct UniformSessions;

    impl SessionFactory for UniformSessions {
        fn open(&self, _path: &Path, metadata: &ModelMetadata) -> Result<Arc<dyn PolicyNetwork>> {
            Ok(Arc::new(UniformPolicy::new(metadata.action_dim)))
        }
    }

    fn write_model(dir: &Path, settings: &GameSettings, observation_dim: usize) {
        let metadata = serde_json::json!({
            "observation_dim": observation_dim,
            "action_dim": settings.max_hand_size + 1,
            "settings": settings,
        });
        let name = format!("ppo-onecard_{}.onnx", settings.fingerprint());
        std::fs::write(dir.join(&name), b"weights").unwrap();
        std::fs::write(dir.join(format!("{name}.json")), metadata.to_string()).unwrap();
    }

    #[test]
    fn test_paths_use_fingerprint() {
        let loader = FileModelLoader::new("/models", Arc::new(UniformSessions));
        let settings = GameSettings::default().with_players(3).with_jokers(true);
        assert_eq!(loader.model_path(&settings), PathBuf::from("/models/ppo-onecard_p3_jokeron.onnx"));
        assert_eq!(
            loader.metadata_path(&settings),
            PathBuf::from("/models/ppo-onecard_p3_jokeron.onnx.json")
        );
    }

    #[test]
    fn test_load_valid_model() {
        let dir = tempfile::tempdir().unwrap();
        let settings = GameSettings::default().with_difficulty(Difficulty::Medium);
        write_model(dir.path(), &settings, 42);

        let loader = FileModelLoader::new(dir.path(), Arc::new(UniformSessions));
        let model = loader.load(&settings).unwrap();

        assert_eq!(model.metadata.settings, settings);
        assert_eq!(model.spec.vector_size, 42);
    }

    #[test]
    fn test_load_rejects_bad_dims() {
        let dir = tempfile::tempdir().unwrap();
        let settings = GameSettings::default();
        write_model(dir.path(), &settings, 40);

        let loader = FileModelLoader::new(dir.path(), Arc::new(UniformSessions));
        assert!(matches!(loader.load(&settings), Err(OneCardError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_load_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileModelLoader::new(dir.path(), Arc::new(UniformSessions));
        let result = loader.load(&GameSettings::default());
        assert!(matches!(result, Err(OneCardError::InferenceUnavailable(_))));
    }
}
