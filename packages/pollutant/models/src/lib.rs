#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pollutant identifiers, concentration readings, and AQI categories.
//!
//! These types are shared by the AQI converter, the estimator, and the grid
//! service. Everything here is a plain value type: readings and results are
//! built per request and never persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A pollutant with its own breakpoint table and concentration unit.
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
pub enum Pollutant {
    /// Carbon monoxide (ppm)
    #[serde(rename = "co")]
    #[strum(serialize = "co")]
    Co,
    /// Nitrogen dioxide (ppb)
    #[serde(rename = "no2")]
    #[strum(serialize = "no2")]
    No2,
    /// Ozone (ppb)
    #[serde(rename = "o3")]
    #[strum(serialize = "o3")]
    O3,
    /// Coarse particulate matter (µg/m³)
    #[serde(rename = "pm10")]
    #[strum(serialize = "pm10")]
    Pm10,
    /// Fine particulate matter (µg/m³)
    #[serde(rename = "pm25")]
    #[strum(serialize = "pm25")]
    Pm25,
    /// Sulfur dioxide (ppb)
    #[serde(rename = "so2")]
    #[strum(serialize = "so2")]
    So2,
}

impl Pollutant {
    /// Returns the concentration unit the breakpoint table is expressed in.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Co => "ppm",
            Self::No2 | Self::O3 | Self::So2 => "ppb",
            Self::Pm10 | Self::Pm25 => "µg/m³",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Co,
            Self::No2,
            Self::O3,
            Self::Pm10,
            Self::Pm25,
            Self::So2,
        ]
    }
}

/// Concentrations for some subset of [`Pollutant`]s.
///
/// Concentrations are clamped to be non-negative on the way in (`NaN` is
/// treated as zero), so every value read back out is `>= 0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Pollutant, f64>",
    into = "BTreeMap<Pollutant, f64>"
)]
pub struct PollutantReading {
    values: BTreeMap<Pollutant, f64>,
}

impl PollutantReading {
    /// Creates an empty reading.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Sets the concentration for `pollutant`, clamping it to `>= 0.0`.
    pub fn insert(&mut self, pollutant: Pollutant, concentration: f64) {
        self.values.insert(pollutant, clamp_concentration(concentration));
    }

    /// Builder-style variant of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, pollutant: Pollutant, concentration: f64) -> Self {
        self.insert(pollutant, concentration);
        self
    }

    /// Returns the concentration for `pollutant`, if present.
    #[must_use]
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.values.get(&pollutant).copied()
    }

    /// Iterates over `(pollutant, concentration)` pairs in pollutant order.
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        self.values.iter().map(|(p, c)| (*p, *c))
    }

    /// Number of pollutants present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no pollutant is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Per-pollutant arithmetic mean over `readings`.
    ///
    /// Each pollutant is averaged over the readings that contain it, so a
    /// pollutant missing from some readings is not dragged towards zero.
    #[must_use]
    pub fn mean_of(readings: &[Self]) -> Self {
        let mut sums: BTreeMap<Pollutant, (f64, u32)> = BTreeMap::new();

        for reading in readings {
            for (pollutant, concentration) in reading.iter() {
                let entry = sums.entry(pollutant).or_insert((0.0, 0));
                entry.0 += concentration;
                entry.1 += 1;
            }
        }

        sums.into_iter()
            .map(|(pollutant, (sum, count))| (pollutant, sum / f64::from(count)))
            .collect()
    }
}

fn clamp_concentration(concentration: f64) -> f64 {
    if concentration.is_nan() {
        0.0
    } else {
        concentration.max(0.0)
    }
}

impl FromIterator<(Pollutant, f64)> for PollutantReading {
    fn from_iter<I: IntoIterator<Item = (Pollutant, f64)>>(iter: I) -> Self {
        let mut reading = Self::new();
        for (pollutant, concentration) in iter {
            reading.insert(pollutant, concentration);
        }
        reading
    }
}

impl From<BTreeMap<Pollutant, f64>> for PollutantReading {
    fn from(values: BTreeMap<Pollutant, f64>) -> Self {
        values.into_iter().collect()
    }
}

impl From<PollutantReading> for BTreeMap<Pollutant, f64> {
    fn from(reading: PollutantReading) -> Self {
        reading.values
    }
}

/// AQI health category.
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
pub enum AqiCategory {
    /// AQI 0-50
    #[strum(serialize = "Good")]
    Good,
    /// AQI 51-100
    #[strum(serialize = "Moderate")]
    Moderate,
    /// AQI 101-150
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    #[strum(serialize = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    /// AQI 151-200
    #[strum(serialize = "Unhealthy")]
    Unhealthy,
    /// AQI 201-300
    #[serde(rename = "Very Unhealthy")]
    #[strum(serialize = "Very Unhealthy")]
    VeryUnhealthy,
    /// AQI 301 and above
    #[strum(serialize = "Hazardous")]
    Hazardous,
}

/// Inclusive upper AQI bound of every category except the open top band.
const CATEGORY_BANDS: [(u16, AqiCategory); 5] = [
    (50, AqiCategory::Good),
    (100, AqiCategory::Moderate),
    (150, AqiCategory::UnhealthyForSensitiveGroups),
    (200, AqiCategory::Unhealthy),
    (300, AqiCategory::VeryUnhealthy),
];

impl AqiCategory {
    /// Maps an overall AQI value to its category.
    #[must_use]
    pub fn from_aqi(aqi: u16) -> Self {
        CATEGORY_BANDS
            .iter()
            .find(|(upper, _)| aqi <= *upper)
            .map_or(Self::Hazardous, |(_, category)| *category)
    }

    /// Inclusive AQI range of this category. `None` as the upper bound
    /// means the band is unbounded.
    #[must_use]
    pub const fn range(self) -> (u16, Option<u16>) {
        match self {
            Self::Good => (0, Some(50)),
            Self::Moderate => (51, Some(100)),
            Self::UnhealthyForSensitiveGroups => (101, Some(150)),
            Self::Unhealthy => (151, Some(200)),
            Self::VeryUnhealthy => (201, Some(300)),
            Self::Hazardous => (301, None),
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Good,
            Self::Moderate,
            Self::UnhealthyForSensitiveGroups,
            Self::Unhealthy,
            Self::VeryUnhealthy,
            Self::Hazardous,
        ]
    }
}

/// An overall AQI value with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiResult {
    /// Overall AQI (0-500).
    pub value: u16,
    /// Category derived from `value`.
    pub category: AqiCategory,
    /// Pollutant whose sub-index set `value`. `None` for an empty reading.
    pub dominant: Option<Pollutant>,
}

impl AqiResult {
    /// Builds a result, deriving the category from `value`.
    #[must_use]
    pub fn new(value: u16, dominant: Option<Pollutant>) -> Self {
        Self {
            value,
            category: AqiCategory::from_aqi(value),
            dominant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_band_edges() {
        assert_eq!(AqiCategory::from_aqi(0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(100), AqiCategory::Moderate);
        assert_eq!(
            AqiCategory::from_aqi(101),
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(
            AqiCategory::from_aqi(150),
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(AqiCategory::from_aqi(151), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(200), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(201), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(300), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(301), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::from_aqi(999), AqiCategory::Hazardous);
    }

    #[test]
    fn category_ranges_agree_with_from_aqi() {
        for category in AqiCategory::all() {
            let (low, high) = category.range();
            assert_eq!(AqiCategory::from_aqi(low), *category);
            if let Some(high) = high {
                assert_eq!(AqiCategory::from_aqi(high), *category);
            }
        }
    }

    #[test]
    fn reading_clamps_negative_and_nan() {
        let reading = PollutantReading::new()
            .with(Pollutant::Pm25, -3.0)
            .with(Pollutant::O3, f64::NAN)
            .with(Pollutant::Co, 1.5);

        assert_eq!(reading.get(Pollutant::Pm25), Some(0.0));
        assert_eq!(reading.get(Pollutant::O3), Some(0.0));
        assert_eq!(reading.get(Pollutant::Co), Some(1.5));
        assert_eq!(reading.get(Pollutant::So2), None);
        assert_eq!(reading.len(), 3);
    }

    #[test]
    fn reading_deserialize_clamps() {
        let reading: PollutantReading =
            serde_json::from_str(r#"{"pm25": -1.0, "no2": 20.0}"#).unwrap();
        assert_eq!(reading.get(Pollutant::Pm25), Some(0.0));
        assert_eq!(reading.get(Pollutant::No2), Some(20.0));
    }

    #[test]
    fn reading_serializes_as_snake_case_map() {
        let reading = PollutantReading::new().with(Pollutant::Pm25, 12.0);
        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(json, r#"{"pm25":12.0}"#);
    }

    #[test]
    fn pollutant_names_roundtrip_through_strum() {
        for pollutant in Pollutant::all() {
            let parsed: Pollutant = pollutant.to_string().parse().unwrap();
            assert_eq!(parsed, *pollutant);
        }
        assert_eq!(Pollutant::Pm25.as_ref(), "pm25");
    }

    #[test]
    fn mean_of_averages_per_pollutant() {
        let readings = [
            PollutantReading::new()
                .with(Pollutant::Pm25, 10.0)
                .with(Pollutant::O3, 40.0),
            PollutantReading::new().with(Pollutant::Pm25, 20.0),
        ];

        let mean = PollutantReading::mean_of(&readings);

        assert_eq!(mean.get(Pollutant::Pm25), Some(15.0));
        assert_eq!(mean.get(Pollutant::O3), Some(40.0));
    }

    #[test]
    fn mean_of_nothing_is_empty() {
        assert!(PollutantReading::mean_of(&[]).is_empty());
    }

    #[test]
    fn category_serializes_as_its_label() {
        for category in AqiCategory::all() {
            let json = serde_json::to_string(category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
            let parsed: AqiCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, *category);
        }

        let json = serde_json::to_string(&AqiResult::new(120, Some(Pollutant::O3))).unwrap();
        assert_eq!(
            json,
            r#"{"value":120,"category":"Unhealthy for Sensitive Groups","dominant":"o3"}"#
        );
    }

    #[test]
    fn result_derives_category() {
        let result = AqiResult::new(100, Some(Pollutant::Pm25));
        assert_eq!(result.category, AqiCategory::Moderate);
        assert_eq!(
            AqiCategory::UnhealthyForSensitiveGroups.to_string(),
            "Unhealthy for Sensitive Groups"
        );
    }
}
