#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pollutant concentration to AQI conversion.
//!
//! Every pollutant is converted through the same routine: pick the
//! breakpoint row bounding the concentration, interpolate linearly between
//! its AQI endpoints, and take the maximum sub-index over all pollutants.
//! Rounding happens once, on that maximum.

pub mod breakpoints;
pub mod scale;

use std::collections::BTreeMap;

use air_quality_pollutant_models::{AqiResult, Pollutant, PollutantReading};
use thiserror::Error;

pub use breakpoints::{BreakpointRow, BreakpointTable, OverflowRule};
pub use scale::{LinearScale, linear_scale};

/// Highest AQI value ever reported.
pub const MAX_AQI: u16 = 500;

/// Errors raised while building breakpoint tables or scales.
///
/// All of these are configuration errors: they are expected at startup,
/// never while converting a reading.
#[derive(Debug, Error)]
pub enum AqiError {
    /// A scale's source range has zero width.
    #[error("Degenerate range: [{from_min}, {from_max}] has no width")]
    DegenerateRange {
        /// Lower end of the source range.
        from_min: f64,
        /// Upper end of the source range.
        from_max: f64,
    },

    /// A row's bounds are inverted or the overflow rule is not finite.
    #[error("Invalid breakpoint row {index} for {pollutant}")]
    InvalidRow {
        /// Pollutant the row belongs to.
        pollutant: Pollutant,
        /// Zero-based row index (the row count for the overflow rule).
        index: usize,
    },

    /// A row starts below the previous row's upper bound.
    #[error("Breakpoint row {index} for {pollutant} overlaps the previous row")]
    OverlappingRows {
        /// Pollutant the rows belong to.
        pollutant: Pollutant,
        /// Zero-based index of the offending row.
        index: usize,
    },

    /// A table has no rows.
    #[error("Breakpoint table for {pollutant} is empty")]
    EmptyTable {
        /// Pollutant with the empty table.
        pollutant: Pollutant,
    },

    /// No table was supplied for a pollutant.
    #[error("No breakpoint table for {pollutant}")]
    MissingTable {
        /// Pollutant without a table.
        pollutant: Pollutant,
    },

    /// A breakpoint TOML document could not be parsed.
    #[error("Failed to parse breakpoint table '{name}': {source}")]
    Parse {
        /// Embedded file name.
        name: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Converts [`PollutantReading`]s into [`AqiResult`]s.
///
/// Holds one validated [`BreakpointTable`] per pollutant. Built once at
/// startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AqiConverter {
    tables: BTreeMap<Pollutant, BreakpointTable>,
}

impl AqiConverter {
    /// Builds a converter from the embedded breakpoint tables.
    ///
    /// # Errors
    ///
    /// Returns an [`AqiError`] if any embedded table fails to parse or
    /// validate.
    pub fn standard() -> Result<Self, AqiError> {
        let converter = Self::from_tables(breakpoints::embedded_tables()?)?;
        log::debug!("Loaded {} breakpoint tables", converter.tables.len());
        Ok(converter)
    }

    /// Builds a converter from caller-supplied tables.
    ///
    /// A later table for the same pollutant replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`AqiError::MissingTable`] unless every [`Pollutant`] has a
    /// table.
    pub fn from_tables(tables: Vec<BreakpointTable>) -> Result<Self, AqiError> {
        let tables: BTreeMap<Pollutant, BreakpointTable> =
            tables.into_iter().map(|t| (t.pollutant(), t)).collect();

        if let Some(pollutant) = Pollutant::all()
            .iter()
            .find(|p| !tables.contains_key(p))
        {
            return Err(AqiError::MissingTable {
                pollutant: *pollutant,
            });
        }

        Ok(Self { tables })
    }

    /// The breakpoint table for `pollutant`.
    #[must_use]
    pub fn table(&self, pollutant: Pollutant) -> Option<&BreakpointTable> {
        self.tables.get(&pollutant)
    }

    /// Iterates over all tables in pollutant order.
    pub fn tables(&self) -> impl Iterator<Item = &BreakpointTable> {
        self.tables.values()
    }

    /// Unrounded sub-index for a single pollutant concentration.
    #[must_use]
    pub fn sub_index(&self, pollutant: Pollutant, concentration: f64) -> f64 {
        self.tables
            .get(&pollutant)
            .map_or(0.0, |table| table.sub_index(concentration))
    }

    /// Converts a reading to an overall AQI and category.
    ///
    /// The overall AQI is the floor of the highest sub-index, clamped to
    /// `0..=500`. An empty reading yields AQI 0 ("Good") with no dominant
    /// pollutant.
    #[must_use]
    pub fn convert(&self, reading: &PollutantReading) -> AqiResult {
        let mut highest: Option<(Pollutant, f64)> = None;

        for (pollutant, concentration) in reading.iter() {
            let sub = self.sub_index(pollutant, concentration);
            if highest.is_none_or(|(_, best)| sub > best) {
                highest = Some((pollutant, sub));
            }
        }

        highest.map_or_else(
            || AqiResult::new(0, None),
            |(pollutant, sub)| AqiResult::new(floor_aqi(sub), Some(pollutant)),
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_aqi(sub_index: f64) -> u16 {
    sub_index.floor().clamp(0.0, f64::from(MAX_AQI)) as u16
}

#[cfg(test)]
mod tests {
    use air_quality_pollutant_models::AqiCategory;

    use super::*;

    fn converter() -> AqiConverter {
        AqiConverter::standard().unwrap()
    }

    fn pm25(concentration: f64) -> AqiResult {
        converter().convert(&PollutantReading::new().with(Pollutant::Pm25, concentration))
    }

    #[test]
    fn empty_reading_is_good() {
        let result = converter().convert(&PollutantReading::new());
        assert_eq!(result.value, 0);
        assert_eq!(result.category, AqiCategory::Good);
        assert_eq!(result.dominant, None);
    }

    #[test]
    fn pm25_band_edges() {
        assert_eq!(pm25(0.0).value, 0);
        assert_eq!(pm25(12.0).value, 50);
        assert_eq!(pm25(12.1).value, 51);
        assert_eq!(pm25(35.4).value, 100);
        assert_eq!(pm25(35.4).category, AqiCategory::Moderate);
        assert_eq!(pm25(35.5).value, 101);
        assert_eq!(pm25(55.4).value, 150);
        assert_eq!(pm25(55.5).value, 151);
        assert_eq!(pm25(150.4).value, 200);
        assert_eq!(pm25(250.4).value, 300);
        assert_eq!(pm25(250.5).value, 301);
        assert_eq!(pm25(500.0).value, 500);
    }

    #[test]
    fn pm25_overflow_does_not_crash() {
        let result = pm25(500.1);
        assert_eq!(result.value, 500);
        assert_eq!(result.category, AqiCategory::Hazardous);
        assert_eq!(pm25(5_000.0).value, MAX_AQI);
    }

    #[test]
    fn ozone_overflow_is_hazardous() {
        let result = converter().convert(&PollutantReading::new().with(Pollutant::O3, 250.0));
        assert_eq!(result.value, 301);
        assert_eq!(result.category, AqiCategory::Hazardous);
    }

    #[test]
    fn maximum_wins_and_names_dominant() {
        let reading = PollutantReading::new()
            .with(Pollutant::Pm25, 12.0) // 50
            .with(Pollutant::O3, 70.0) // 100
            .with(Pollutant::Co, 1.0); // ~11
        let result = converter().convert(&reading);
        assert_eq!(result.value, 100);
        assert_eq!(result.dominant, Some(Pollutant::O3));
    }

    #[test]
    fn rounds_after_taking_max() {
        // 35.45 is in the PM2.5 gap above 35.4, so row 3 interpolates to
        // just under 101; flooring gives 100.
        let result = pm25(35.45);
        assert_eq!(result.value, 100);
    }

    #[test]
    fn monotonic_within_every_band() {
        let converter = converter();
        for table in converter.tables() {
            for row in table.rows() {
                let mut previous = f64::NEG_INFINITY;
                for step in 0..=100 {
                    let concentration = (row.conc_low
                        + (row.conc_high - row.conc_low) * f64::from(step) / 100.0)
                        .min(row.conc_high);
                    let sub = converter.sub_index(table.pollutant(), concentration);
                    assert!(
                        sub >= previous,
                        "{} not monotonic at {concentration}: {sub} < {previous}",
                        table.pollutant()
                    );
                    previous = sub;
                }
            }
        }
    }

    #[test]
    fn missing_table_rejected() {
        let tables: Vec<BreakpointTable> = breakpoints::embedded_tables()
            .unwrap()
            .into_iter()
            .filter(|t| t.pollutant() != Pollutant::No2)
            .collect();
        let err = AqiConverter::from_tables(tables).unwrap_err();
        assert!(matches!(
            err,
            AqiError::MissingTable {
                pollutant: Pollutant::No2
            }
        ));
    }
}
