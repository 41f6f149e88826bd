//! Model input features.

use air_quality_geography_models::Coordinate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::covariates::Covariates;

/// A named model input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    /// Latitude in degrees.
    #[serde(rename = "lat")]
    #[strum(serialize = "lat")]
    Latitude,
    /// Longitude in degrees.
    #[serde(rename = "lon")]
    #[strum(serialize = "lon")]
    Longitude,
    /// Air temperature in °C.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// Wind speed in m/s.
    WindSpeed,
    /// Surface pressure in hPa.
    Pressure,
}

/// One row of model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// Where the estimate is for.
    pub coordinate: Coordinate,
    /// Weather at that point.
    pub covariates: Covariates,
}

impl FeatureVector {
    /// Creates a feature vector.
    #[must_use]
    pub const fn new(coordinate: Coordinate, covariates: Covariates) -> Self {
        Self {
            coordinate,
            covariates,
        }
    }

    /// Value of a single feature.
    #[must_use]
    pub const fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Latitude => self.coordinate.latitude,
            Feature::Longitude => self.coordinate.longitude,
            Feature::Temperature => self.covariates.temperature,
            Feature::Humidity => self.covariates.humidity,
            Feature::WindSpeed => self.covariates.wind_speed,
            Feature::Pressure => self.covariates.pressure,
        }
    }
}
