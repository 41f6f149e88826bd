//! Weather covariates fed to the pollutant models alongside location.

use air_quality_geography_models::Coordinate;
use serde::{Deserialize, Serialize};

/// Temperature used when none is supplied (°C).
pub const DEFAULT_TEMPERATURE: f64 = 20.0;
/// Relative humidity used when none is supplied (%).
pub const DEFAULT_HUMIDITY: f64 = 50.0;
/// Wind speed used when none is supplied (m/s).
pub const DEFAULT_WIND_SPEED: f64 = 5.0;
/// Surface pressure used when none is supplied (hPa).
pub const DEFAULT_PRESSURE: f64 = 1013.25;

/// A complete set of weather covariates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Covariates {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Surface pressure in hPa.
    pub pressure: f64,
}

impl Default for Covariates {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            humidity: DEFAULT_HUMIDITY,
            wind_speed: DEFAULT_WIND_SPEED,
            pressure: DEFAULT_PRESSURE,
        }
    }
}

/// Caller-supplied covariates where any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CovariateOverrides {
    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// Wind speed in m/s.
    pub wind_speed: Option<f64>,
    /// Surface pressure in hPa.
    pub pressure: Option<f64>,
}

impl CovariateOverrides {
    /// Fills missing fields from `base`.
    #[must_use]
    pub fn resolve_onto(self, base: Covariates) -> Covariates {
        Covariates {
            temperature: self.temperature.unwrap_or(base.temperature),
            humidity: self.humidity.unwrap_or(base.humidity),
            wind_speed: self.wind_speed.unwrap_or(base.wind_speed),
            pressure: self.pressure.unwrap_or(base.pressure),
        }
    }

    /// Fills missing fields from the documented defaults.
    #[must_use]
    pub fn resolve(self) -> Covariates {
        self.resolve_onto(Covariates::default())
    }
}

/// Supplies covariates for generated sample points.
///
/// `index` is the point's position in generation order. Implementations
/// must return the same covariates for the same `(coordinate, index)` so
/// grid results are reproducible regardless of evaluation order.
pub trait CovariateSource: Send + Sync {
    /// Covariates for the `index`-th generated point at `coordinate`.
    fn covariates_at(&self, coordinate: Coordinate, index: usize) -> Covariates;
}

/// Returns the same covariates for every point.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCovariates(pub Covariates);

impl CovariateSource for FixedCovariates {
    fn covariates_at(&self, _coordinate: Coordinate, _index: usize) -> Covariates {
        self.0
    }
}

/// Deterministic pseudo-random covariates for demo heatmaps.
///
/// Each point draws from its own `SplitMix64` stream derived from
/// `(seed, index)`, uniformly within: temperature 15–25 °C, humidity
/// 40–60 %, wind speed 2–10 m/s, pressure 1010–1020 hPa.
#[derive(Debug, Clone, Copy)]
pub struct SeededCovariates {
    seed: u64,
}

impl SeededCovariates {
    /// Creates a source for `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl CovariateSource for SeededCovariates {
    fn covariates_at(&self, _coordinate: Coordinate, index: usize) -> Covariates {
        let mut stream = SplitMix64::new(mix(self.seed ^ index as u64));
        Covariates {
            temperature: stream.uniform_range(15.0, 25.0),
            humidity: stream.uniform_range(40.0, 60.0),
            wind_speed: stream.uniform_range(2.0, 10.0),
            pressure: stream.uniform_range(1010.0, 1020.0),
        }
    }
}

struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    const fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        mix(self.state)
    }

    /// Uniform in `[low, high)` from the upper 53 bits.
    #[allow(clippy::cast_precision_loss)]
    fn uniform_range(&mut self, low: f64, high: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64);
        (high - low).mul_add(unit, low)
    }
}

const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
