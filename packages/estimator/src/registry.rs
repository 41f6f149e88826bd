//! Loads one model per pollutant from a directory and serves them as a
//! [`PollutantEstimator`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use air_quality_pollutant_models::{Pollutant, PollutantReading};

use crate::features::FeatureVector;
use crate::model::{LinearModel, PollutantModel};
use crate::PollutantEstimator;

/// File name holding the model for `pollutant`, e.g. `pm25_model.json`.
#[must_use]
pub fn model_file_name(pollutant: Pollutant) -> String {
    format!("{pollutant}_model.json")
}

/// The set of pollutant models that loaded successfully.
#[derive(Default)]
pub struct ModelRegistry {
    models: BTreeMap<Pollutant, Box<dyn PollutantModel>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("loaded", &self.loaded())
            .finish()
    }
}

impl ModelRegistry {
    /// Loads every `<pollutant>_model.json` found in `dir`.
    ///
    /// Missing files are skipped with a warning and malformed files with an
    /// error log. A directory with no usable models yields an empty,
    /// not-ready registry rather than an error.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let mut models: BTreeMap<Pollutant, Box<dyn PollutantModel>> = BTreeMap::new();

        for &pollutant in Pollutant::all() {
            let path: PathBuf = dir.join(model_file_name(pollutant));

            if !path.is_file() {
                log::warn!("No model for {pollutant} at {}", path.display());
                continue;
            }

            match LinearModel::from_path(&path) {
                Ok(model) => {
                    log::debug!("Loaded {pollutant} model from {}", path.display());
                    models.insert(pollutant, Box::new(model));
                }
                Err(e) => {
                    log::error!("Skipping {pollutant} model: {e}");
                }
            }
        }

        log::info!(
            "Loaded {}/{} pollutant models from {}",
            models.len(),
            Pollutant::all().len(),
            dir.display()
        );

        Self { models }
    }

    /// Builds a registry from already-constructed models.
    #[must_use]
    pub fn from_models(models: BTreeMap<Pollutant, Box<dyn PollutantModel>>) -> Self {
        Self { models }
    }

    /// Pollutants with a loaded model, in pollutant order.
    #[must_use]
    pub fn loaded(&self) -> Vec<Pollutant> {
        self.models.keys().copied().collect()
    }
}

impl PollutantEstimator for ModelRegistry {
    fn is_ready(&self) -> bool {
        !self.models.is_empty()
    }

    fn pollutants(&self) -> Vec<Pollutant> {
        self.loaded()
    }

    fn estimate(&self, features: &FeatureVector) -> PollutantReading {
        self.models
            .iter()
            .map(|(&pollutant, model)| {
                let concentration = model.predict(features).unwrap_or_else(|e| {
                    log::warn!("{pollutant} prediction failed, using 0: {e}");
                    0.0
                });
                (pollutant, concentration)
            })
            .collect()
    }
}
