//! Single-pollutant regression models.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::EstimatorError;
use crate::features::{Feature, FeatureVector};

/// A trained model producing one pollutant's concentration.
pub trait PollutantModel: Send + Sync {
    /// Predicts a concentration. The result may be negative; callers clamp.
    ///
    /// # Errors
    ///
    /// Returns [`EstimatorError::Model`] if the model cannot produce a
    /// finite prediction for `features`.
    fn predict(&self, features: &FeatureVector) -> Result<f64, EstimatorError>;
}

/// Linear regression: `intercept + Σ coefficient · feature`.
///
/// Stored as JSON:
///
/// ```json
/// { "intercept": 8.0, "coefficients": { "temperature": 0.2, "humidity": 0.05 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Constant term.
    pub intercept: f64,
    /// Weight per feature; absent features have weight zero.
    #[serde(default)]
    pub coefficients: BTreeMap<Feature, f64>,
}

impl LinearModel {
    /// Creates a model.
    #[must_use]
    pub const fn new(intercept: f64, coefficients: BTreeMap<Feature, f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Reads a model from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`EstimatorError::Io`] if the file cannot be read or
    /// [`EstimatorError::Json`] if it is not a valid model (including
    /// unknown feature names).
    pub fn from_path(path: &Path) -> Result<Self, EstimatorError> {
        let text = std::fs::read_to_string(path).map_err(|source| EstimatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| EstimatorError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl PollutantModel for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, EstimatorError> {
        let prediction = self
            .coefficients
            .iter()
            .fold(self.intercept, |acc, (feature, weight)| {
                weight.mul_add(features.value(*feature), acc)
            });

        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(EstimatorError::Model {
                message: format!("non-finite prediction {prediction}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use air_quality_geography_models::Coordinate;

    use super::*;
    use crate::covariates::Covariates;

    fn features() -> FeatureVector {
        FeatureVector::new(Coordinate::new(10.0, 20.0), Covariates::default())
    }

    #[test]
    fn predicts_weighted_sum() {
        let model = LinearModel::new(
            1.0,
            BTreeMap::from([(Feature::Latitude, 2.0), (Feature::Temperature, 0.5)]),
        );
        let prediction = model.predict(&features()).unwrap();
        assert!((prediction - 31.0).abs() < 1e-12);
    }

    #[test]
    fn intercept_only() {
        let model = LinearModel::new(4.2, BTreeMap::new());
        assert!((model.predict(&features()).unwrap() - 4.2).abs() < 1e-12);
    }

    #[test]
    fn non_finite_prediction_is_an_error() {
        let model = LinearModel::new(0.0, BTreeMap::from([(Feature::Latitude, 1.0)]));
        let bad = FeatureVector::new(Coordinate::new(f64::NAN, 0.0), Covariates::default());
        assert!(matches!(
            model.predict(&bad),
            Err(EstimatorError::Model { .. })
        ));
    }

    #[test]
    fn parses_json_with_feature_names() {
        let model: LinearModel = serde_json::from_str(
            r#"{"intercept": 3.0, "coefficients": {"lat": 0.1, "wind_speed": -0.4}}"#,
        )
        .unwrap();
        assert_eq!(model.coefficients.get(&Feature::Latitude), Some(&0.1));
        assert_eq!(model.coefficients.get(&Feature::WindSpeed), Some(&-0.4));
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let result: Result<LinearModel, _> =
            serde_json::from_str(r#"{"intercept": 3.0, "coefficients": {"month": 1.0}}"#);
        assert!(result.is_err());
    }
}
