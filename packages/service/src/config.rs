//! Runtime settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Default directory holding `<pollutant>_model.json` files.
pub const DEFAULT_MODELS_DIR: &str = "models";
/// Default per-point estimate timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;
/// Default number of point estimates in flight.
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Default smoothing ring size for viewport predictions.
pub const DEFAULT_RING_SAMPLES: usize = 8;

/// Service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Where pollutant models are loaded from.
    pub models_dir: PathBuf,
    /// How long to wait for a single point's estimate. The estimate itself
    /// is not cancelled when this elapses.
    pub estimator_timeout: Duration,
    /// Point estimates running at once. Zero is treated as one.
    pub concurrency: usize,
    /// Ring points averaged per viewport sample; zero disables smoothing.
    pub ring_samples: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            estimator_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            concurrency: DEFAULT_CONCURRENCY,
            ring_samples: DEFAULT_RING_SAMPLES,
        }
    }
}

impl ServiceConfig {
    /// Reads `AIR_QUALITY_MODELS_DIR`, `ESTIMATOR_TIMEOUT_MS`,
    /// `ESTIMATOR_CONCURRENCY` and `RING_SAMPLES`, falling back to defaults
    /// for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let models_dir = lookup("AIR_QUALITY_MODELS_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR), PathBuf::from);
        let timeout_ms: u64 = lookup("ESTIMATOR_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let concurrency: usize = lookup("ESTIMATOR_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONCURRENCY);
        let ring_samples: usize = lookup("RING_SAMPLES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RING_SAMPLES);

        Self {
            models_dir,
            estimator_timeout: Duration::from_millis(timeout_ms),
            concurrency,
            ring_samples,
        }
    }
}
