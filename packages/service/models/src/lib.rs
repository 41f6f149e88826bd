#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the air quality grid service.
//!
//! These are serialized as camelCase JSON by the CLI and are kept separate
//! from the engine's internal types so the contract can evolve on its own.

use air_quality_estimator::CovariateOverrides;
use air_quality_geography_models::{BoundingBox, Coordinate};
use air_quality_pollutant_models::{AqiResult, Pollutant, PollutantReading};
use serde::{Deserialize, Serialize};

/// Point forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    /// Location to forecast.
    pub coordinate: Coordinate,
    /// Weather at the location; missing fields use defaults.
    #[serde(default)]
    pub covariates: CovariateOverrides,
}

/// Point forecast result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    /// Estimated concentrations.
    pub pollutants: PollutantReading,
    /// AQI derived from `pollutants`.
    pub aqi: AqiResult,
}

/// Center/radius grid request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRequest {
    /// Grid center.
    pub center: Coordinate,
    /// Half-width of the sampled span in km.
    pub radius_km: f64,
    /// Points per axis.
    pub resolution: usize,
}

/// One evaluated sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePoint {
    /// Where the sample was taken.
    pub coordinate: Coordinate,
    /// Estimated concentrations.
    pub pollutants: PollutantReading,
    /// AQI derived from `pollutants`.
    pub aqi: AqiResult,
}

/// Viewport prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsPredictionRequest {
    /// Visible map area.
    pub bounds: BoundingBox,
    /// Map zoom level; selects the sampling density.
    pub zoom_level: u8,
    /// Weather overrides applied to every sample.
    #[serde(default)]
    pub covariates: CovariateOverrides,
}

/// Viewport prediction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsPredictionResponse {
    /// Samples in generation order.
    pub points: Vec<SamplePoint>,
    /// Arithmetic mean of the points' AQI values.
    pub average_aqi: f64,
}

/// Service readiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Whether any pollutant model is loaded.
    pub ready: bool,
    /// Pollutants with a loaded model.
    pub models_loaded: Vec<Pollutant>,
}
