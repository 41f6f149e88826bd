#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Air quality sampling service.
//!
//! Ties the pieces together: generate sample coordinates, estimate
//! concentrations at each one on the blocking pool, convert them to AQI,
//! and assemble the results in generation order.

pub mod config;
pub mod density;

use std::sync::Arc;
use std::time::Duration;

use air_quality_aqi::{AqiConverter, AqiError};
use air_quality_estimator::{
    CovariateSource, FeatureVector, ModelRegistry, PollutantEstimator,
};
use air_quality_geography_models::Coordinate;
use air_quality_pollutant_models::PollutantReading;
use air_quality_service_models::{
    BoundsPredictionRequest, BoundsPredictionResponse, ForecastRequest, ForecastResponse,
    GridRequest, HealthResponse, SamplePoint,
};
use air_quality_spatial::SpatialError;
use futures::StreamExt;
use thiserror::Error;

pub use config::ServiceConfig;
pub use density::DensityTier;

/// Errors that fail a whole request.
///
/// Failures at a single point never surface here; that point's
/// concentrations fall back to zero instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No pollutant models are loaded.
    #[error("Estimator unavailable: no pollutant models loaded")]
    EstimatorUnavailable,

    /// The sampling request was rejected.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// The breakpoint tables failed to load.
    #[error(transparent)]
    Aqi(#[from] AqiError),
}

/// Samples an area, estimates pollutants at each sample, and scores them.
pub struct AirQualityGridService {
    converter: Arc<AqiConverter>,
    estimator: Arc<dyn PollutantEstimator>,
    covariates: Arc<dyn CovariateSource>,
    config: ServiceConfig,
}

impl std::fmt::Debug for AirQualityGridService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirQualityGridService")
            .field("ready", &self.estimator.is_ready())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AirQualityGridService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        converter: Arc<AqiConverter>,
        estimator: Arc<dyn PollutantEstimator>,
        covariates: Arc<dyn CovariateSource>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            converter,
            estimator,
            covariates,
            config,
        }
    }

    /// Builds a service with the standard breakpoint tables and the models
    /// found in `config.models_dir`.
    ///
    /// A directory without models still yields a service; it reports
    /// not-ready and refuses requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Aqi`] if the embedded breakpoint tables are
    /// invalid.
    pub fn from_config(
        config: ServiceConfig,
        covariates: Arc<dyn CovariateSource>,
    ) -> Result<Self, ServiceError> {
        let converter = AqiConverter::standard()?;
        let registry = ModelRegistry::load(&config.models_dir);

        Ok(Self::new(
            Arc::new(converter),
            Arc::new(registry),
            covariates,
            config,
        ))
    }

    /// Settings the service was built with.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The shared AQI converter.
    #[must_use]
    pub fn converter(&self) -> &AqiConverter {
        &self.converter
    }

    /// Reports whether the estimator can serve requests.
    #[must_use]
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            ready: self.estimator.is_ready(),
            models_loaded: self.estimator.pollutants(),
        }
    }

    /// Estimates pollutants and AQI at a single coordinate.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::EstimatorUnavailable`] if no models are loaded.
    /// * [`ServiceError::Spatial`] if the coordinate is out of range.
    pub async fn forecast(
        &self,
        request: ForecastRequest,
    ) -> Result<ForecastResponse, ServiceError> {
        self.ensure_ready()?;
        air_quality_spatial::validate_coordinate(request.coordinate)?;

        let features = FeatureVector::new(request.coordinate, request.covariates.resolve());
        let pollutants = self
            .estimate_all(vec![vec![features]])
            .await
            .pop()
            .unwrap_or_default();
        let aqi = self.converter.convert(&pollutants);

        Ok(ForecastResponse { pollutants, aqi })
    }

    /// Evaluates a `resolution × resolution` grid around a center.
    ///
    /// Covariates for each point come from the injected
    /// [`CovariateSource`].
    ///
    /// # Errors
    ///
    /// * [`ServiceError::EstimatorUnavailable`] if no models are loaded.
    /// * [`ServiceError::Spatial`] for an invalid center or radius, or a
    ///   center at a pole.
    pub async fn generate_grid(
        &self,
        request: GridRequest,
    ) -> Result<Vec<SamplePoint>, ServiceError> {
        self.ensure_ready()?;

        let points = air_quality_spatial::generate_grid(
            request.center,
            request.radius_km,
            request.resolution,
        )?;

        let jobs = points
            .iter()
            .enumerate()
            .map(|(index, &point)| {
                vec![FeatureVector::new(
                    point,
                    self.covariates.covariates_at(point, index),
                )]
            })
            .collect();

        let readings = self.estimate_all(jobs).await;
        Ok(self.assemble(points, readings))
    }

    /// Evaluates a viewport at the density its zoom level calls for.
    ///
    /// Each mesh point's reading is the per-pollutant mean over
    /// `ring_samples` points on a circle of the tier's radius around it
    /// (or the point itself when `ring_samples` is zero). Request
    /// covariates override the injected source field by field.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::EstimatorUnavailable`] if no models are loaded.
    /// * [`ServiceError::Spatial`] for inverted or non-finite bounds.
    pub async fn generate_from_bounds(
        &self,
        request: BoundsPredictionRequest,
    ) -> Result<BoundsPredictionResponse, ServiceError> {
        self.ensure_ready()?;

        let tier = DensityTier::for_zoom(request.zoom_level);
        let points =
            air_quality_spatial::generate_from_bounds(&request.bounds, tier.point_count())?;

        log::debug!(
            "Bounds prediction at zoom {}: {tier} tier, {} points, {} ring samples at {} km",
            request.zoom_level,
            points.len(),
            self.config.ring_samples,
            tier.radius_km()
        );

        let mut jobs = Vec::with_capacity(points.len());
        for (index, &point) in points.iter().enumerate() {
            let covariates = request
                .covariates
                .resolve_onto(self.covariates.covariates_at(point, index));
            let samples = self.smoothing_samples(point, tier.radius_km())?;
            jobs.push(
                samples
                    .into_iter()
                    .map(|sample| FeatureVector::new(sample, covariates))
                    .collect::<Vec<_>>(),
            );
        }

        let readings = self.estimate_all(jobs).await;
        let points = self.assemble(points, readings);
        let average_aqi = average_aqi(&points);

        Ok(BoundsPredictionResponse {
            points,
            average_aqi,
        })
    }

    fn ensure_ready(&self) -> Result<(), ServiceError> {
        self.estimator.ensure_ready().map_err(|e| {
            log::warn!("Rejecting request: {e}");
            ServiceError::EstimatorUnavailable
        })
    }

    fn smoothing_samples(
        &self,
        point: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Coordinate>, SpatialError> {
        if self.config.ring_samples == 0 {
            return Ok(vec![point]);
        }
        air_quality_spatial::generate_ring(point, radius_km, self.config.ring_samples)
    }

    /// Runs one job per point, each averaging the estimates of its feature
    /// vectors. Output order matches `jobs`.
    async fn estimate_all(&self, jobs: Vec<Vec<FeatureVector>>) -> Vec<PollutantReading> {
        let timeout = self.config.estimator_timeout;

        futures::stream::iter(jobs.into_iter().enumerate())
            .map(|(index, samples)| {
                let estimator = Arc::clone(&self.estimator);
                async move { estimate_point(estimator, samples, timeout, index).await }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    fn assemble(
        &self,
        points: Vec<Coordinate>,
        readings: Vec<PollutantReading>,
    ) -> Vec<SamplePoint> {
        points
            .into_iter()
            .zip(readings)
            .map(|(coordinate, pollutants)| {
                let aqi = self.converter.convert(&pollutants);
                SamplePoint {
                    coordinate,
                    pollutants,
                    aqi,
                }
            })
            .collect()
    }
}

/// Averages the estimates for one point's samples on the blocking pool.
///
/// A timeout only stops waiting: the blocking task runs to completion in
/// the background and its result is dropped. A persistently slow estimator
/// therefore keeps blocking-pool threads busy beyond `concurrency`, bounded
/// by tokio's blocking-thread limit.
async fn estimate_point(
    estimator: Arc<dyn PollutantEstimator>,
    samples: Vec<FeatureVector>,
    timeout: Duration,
    index: usize,
) -> PollutantReading {
    let pollutants = estimator.pollutants();

    let task = tokio::task::spawn_blocking(move || {
        let readings: Vec<PollutantReading> =
            samples.iter().map(|s| estimator.estimate(s)).collect();
        PollutantReading::mean_of(&readings)
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(reading)) => reading,
        Ok(Err(e)) => {
            log::warn!("Estimate for point {index} failed, using zeros: {e}");
            pollutants.into_iter().map(|p| (p, 0.0)).collect()
        }
        Err(_) => {
            log::warn!(
                "Estimate for point {index} timed out after {}ms, using zeros",
                timeout.as_millis()
            );
            pollutants.into_iter().map(|p| (p, 0.0)).collect()
        }
    }
}

/// Arithmetic mean of the points' AQI values; zero for no points.
#[allow(clippy::cast_precision_loss)]
fn average_aqi(points: &[SamplePoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let total: f64 = points.iter().map(|p| f64::from(p.aqi.value)).sum();
    total / points.len() as f64
}
