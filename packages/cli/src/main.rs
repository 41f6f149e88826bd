#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for air quality forecasts and sampling grids.
//!
//! Every subcommand prints a JSON document to stdout. Logging goes to
//! stderr and is controlled by `RUST_LOG`.

use std::path::PathBuf;
use std::sync::Arc;

use air_quality_aqi::{BreakpointRow, OverflowRule};
use air_quality_estimator::{
    CovariateOverrides, CovariateSource, FixedCovariates, SeededCovariates,
};
use air_quality_geography_models::{BoundingBox, Coordinate};
use air_quality_pollutant_models::Pollutant;
use air_quality_service::{AirQualityGridService, ServiceConfig};
use air_quality_service_models::{BoundsPredictionRequest, ForecastRequest, GridRequest};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

/// Estimate air quality at a point or across an area.
#[derive(Parser)]
#[command(name = "air_quality")]
#[command(about = "Estimate air quality at a point or across an area")]
struct Cli {
    /// Directory of `<pollutant>_model.json` files (overrides
    /// `AIR_QUALITY_MODELS_DIR`).
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Draw per-point weather covariates from a seeded generator instead of
    /// using fixed defaults.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Forecast pollutants and AQI at one coordinate.
    Forecast {
        /// Latitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[command(flatten)]
        weather: WeatherArgs,
    },

    /// Evaluate a square grid around a center.
    Grid {
        /// Center latitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Center longitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Half-width of the grid in km.
        #[arg(long, default_value_t = 5.0)]
        radius_km: f64,

        /// Points per axis.
        #[arg(long, default_value_t = 3)]
        resolution: usize,
    },

    /// Evaluate a map viewport at the density for its zoom level.
    Bounds {
        /// Western longitude.
        #[arg(long, allow_hyphen_values = true)]
        west: f64,

        /// Southern latitude.
        #[arg(long, allow_hyphen_values = true)]
        south: f64,

        /// Eastern longitude.
        #[arg(long, allow_hyphen_values = true)]
        east: f64,

        /// Northern latitude.
        #[arg(long, allow_hyphen_values = true)]
        north: f64,

        /// Map zoom level.
        #[arg(long, default_value_t = 10)]
        zoom: u8,

        #[command(flatten)]
        weather: WeatherArgs,
    },

    /// Print the breakpoint tables.
    Breakpoints {
        /// Only print this pollutant's table (e.g. "pm25").
        #[arg(long, value_parser = parse_pollutant)]
        pollutant: Option<Pollutant>,
    },

    /// Report which pollutant models are loaded.
    Health,
}

/// Optional weather overrides.
#[derive(Args)]
struct WeatherArgs {
    /// Air temperature in °C.
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,

    /// Relative humidity in percent.
    #[arg(long)]
    humidity: Option<f64>,

    /// Wind speed in m/s.
    #[arg(long)]
    wind_speed: Option<f64>,

    /// Surface pressure in hPa.
    #[arg(long)]
    pressure: Option<f64>,
}

impl From<WeatherArgs> for CovariateOverrides {
    fn from(args: WeatherArgs) -> Self {
        Self {
            temperature: args.temperature,
            humidity: args.humidity,
            wind_speed: args.wind_speed,
            pressure: args.pressure,
        }
    }
}

/// Printable view of one breakpoint table.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableView<'a> {
    pollutant: Pollutant,
    unit: &'static str,
    rows: &'a [BreakpointRow],
    overflow: OverflowRule,
}

fn parse_pollutant(value: &str) -> Result<Pollutant, String> {
    value.parse().map_err(|_| {
        let known: Vec<String> = Pollutant::all().iter().map(ToString::to_string).collect();
        format!("unknown pollutant '{value}' (expected one of {})", known.join(", "))
    })
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = ServiceConfig::from_env();
    if let Some(dir) = cli.models_dir {
        config.models_dir = dir;
    }

    let covariates: Arc<dyn CovariateSource> = match cli.seed {
        Some(seed) => {
            log::info!("Using seeded covariates (seed {seed})");
            Arc::new(SeededCovariates::new(seed))
        }
        None => Arc::new(FixedCovariates::default()),
    };

    let service = AirQualityGridService::from_config(config, covariates)?;

    match cli.command {
        Commands::Forecast { lat, lon, weather } => {
            let response = service
                .forecast(ForecastRequest {
                    coordinate: Coordinate::new(lat, lon),
                    covariates: weather.into(),
                })
                .await?;
            print_json(&response)?;
        }
        Commands::Grid {
            lat,
            lon,
            radius_km,
            resolution,
        } => {
            let points = service
                .generate_grid(GridRequest {
                    center: Coordinate::new(lat, lon),
                    radius_km,
                    resolution,
                })
                .await?;
            print_json(&points)?;
        }
        Commands::Bounds {
            west,
            south,
            east,
            north,
            zoom,
            weather,
        } => {
            let response = service
                .generate_from_bounds(BoundsPredictionRequest {
                    bounds: BoundingBox::new(west, south, east, north),
                    zoom_level: zoom,
                    covariates: weather.into(),
                })
                .await?;
            log::info!(
                "{} points, average AQI {:.1}",
                response.points.len(),
                response.average_aqi
            );
            print_json(&response)?;
        }
        Commands::Breakpoints { pollutant } => {
            let tables: Vec<TableView<'_>> = service
                .converter()
                .tables()
                .filter(|t| pollutant.is_none_or(|p| p == t.pollutant()))
                .map(|t| TableView {
                    pollutant: t.pollutant(),
                    unit: t.pollutant().unit(),
                    rows: t.rows(),
                    overflow: t.overflow(),
                })
                .collect();
            print_json(&tables)?;
        }
        Commands::Health => {
            print_json(&service.health())?;
        }
    }

    Ok(())
}
