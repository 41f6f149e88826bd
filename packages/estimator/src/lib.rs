#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pollutant concentration estimation.
//!
//! An estimator turns a [`FeatureVector`] (location plus weather
//! covariates) into a [`PollutantReading`]. The bundled implementation,
//! [`ModelRegistry`], loads one linear model per pollutant from JSON files.

pub mod covariates;
pub mod features;
pub mod model;
pub mod registry;

use std::path::PathBuf;

use air_quality_pollutant_models::{Pollutant, PollutantReading};
use thiserror::Error;

pub use covariates::{
    CovariateOverrides, CovariateSource, Covariates, FixedCovariates, SeededCovariates,
};
pub use features::{Feature, FeatureVector};
pub use model::{LinearModel, PollutantModel};
pub use registry::ModelRegistry;

/// Errors from loading or running pollutant models.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// A model file could not be read.
    #[error("Failed to read model file {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A model file is not a valid model.
    #[error("Invalid model file {}: {source}", .path.display())]
    Json {
        /// Path that failed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A model could not produce a prediction.
    #[error("Model error: {message}")]
    Model {
        /// What went wrong.
        message: String,
    },

    /// No models are loaded.
    #[error("Estimator is not ready: no pollutant models loaded")]
    Unavailable,
}

/// Produces pollutant concentrations for a feature vector.
///
/// `estimate` never fails: implementations substitute `0.0` for any
/// pollutant whose model errors, and only report pollutants they have a
/// model for. Callers check [`Self::is_ready`] before estimating.
pub trait PollutantEstimator: Send + Sync {
    /// Whether at least one pollutant can be estimated.
    fn is_ready(&self) -> bool;

    /// Pollutants this estimator reports, in pollutant order.
    fn pollutants(&self) -> Vec<Pollutant>;

    /// Estimates concentrations at `features`.
    fn estimate(&self, features: &FeatureVector) -> PollutantReading;

    /// Fails with [`EstimatorError::Unavailable`] unless [`Self::is_ready`].
    ///
    /// # Errors
    ///
    /// Returns [`EstimatorError::Unavailable`] when no pollutant can be
    /// estimated.
    fn ensure_ready(&self) -> Result<(), EstimatorError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(EstimatorError::Unavailable)
        }
    }
}
