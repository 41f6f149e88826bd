//! Declarative per-pollutant breakpoint tables.
//!
//! Each pollutant's table lives in a TOML file under `breakpoints/`. The
//! files are embedded at compile time and validated when loaded through
//! [`embedded_tables`], so a malformed row surfaces as an [`AqiError`] at
//! startup instead of as a `NaN` AQI at request time.

use air_quality_pollutant_models::Pollutant;
use serde::{Deserialize, Serialize};

use crate::AqiError;
use crate::scale::LinearScale;

/// One concentration band of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointRow {
    /// Lowest concentration of the band.
    pub conc_low: f64,
    /// Highest concentration of the band (inclusive).
    pub conc_high: f64,
    /// AQI at `conc_low`.
    pub aqi_low: f64,
    /// AQI at `conc_high`.
    pub aqi_high: f64,
}

impl BreakpointRow {
    /// Creates a row.
    #[must_use]
    pub const fn new(conc_low: f64, conc_high: f64, aqi_low: f64, aqi_high: f64) -> Self {
        Self {
            conc_low,
            conc_high,
            aqi_low,
            aqi_high,
        }
    }

    fn scale(&self) -> Result<LinearScale, AqiError> {
        LinearScale::new(
            (self.conc_low, self.conc_high),
            (self.aqi_low, self.aqi_high),
        )
    }
}

/// What to do with a concentration above the last row's upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverflowRule {
    /// Continue the last row's line, capped at `ceiling`.
    Extrapolate {
        /// Highest sub-index the extrapolation may produce.
        ceiling: f64,
    },
    /// Assign a fixed sub-index.
    Fixed {
        /// Sub-index assigned to every overflowing concentration.
        aqi: f64,
    },
}

/// A validated breakpoint table for one pollutant.
#[derive(Debug, Clone)]
pub struct BreakpointTable {
    pollutant: Pollutant,
    rows: Vec<BreakpointRow>,
    scales: Vec<LinearScale>,
    overflow: OverflowRule,
}

impl BreakpointTable {
    /// Builds a table, validating its rows.
    ///
    /// # Errors
    ///
    /// * [`AqiError::EmptyTable`] if `rows` is empty.
    /// * [`AqiError::DegenerateRange`] if a row has zero concentration width.
    /// * [`AqiError::InvalidRow`] if a row's upper bound is below its lower
    ///   bound or the overflow ceiling is not finite.
    /// * [`AqiError::OverlappingRows`] if a row starts before the previous
    ///   row ends.
    pub fn new(
        pollutant: Pollutant,
        rows: Vec<BreakpointRow>,
        overflow: OverflowRule,
    ) -> Result<Self, AqiError> {
        if rows.is_empty() {
            return Err(AqiError::EmptyTable { pollutant });
        }

        let mut scales = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.conc_high < row.conc_low {
                return Err(AqiError::InvalidRow { pollutant, index });
            }
            scales.push(row.scale()?);

            if index > 0 && row.conc_low < rows[index - 1].conc_high {
                return Err(AqiError::OverlappingRows { pollutant, index });
            }
        }

        let overflow_ok = match overflow {
            OverflowRule::Extrapolate { ceiling } => ceiling.is_finite(),
            OverflowRule::Fixed { aqi } => aqi.is_finite(),
        };
        if !overflow_ok {
            return Err(AqiError::InvalidRow {
                pollutant,
                index: rows.len(),
            });
        }

        Ok(Self {
            pollutant,
            rows,
            scales,
            overflow,
        })
    }

    /// The pollutant this table converts.
    #[must_use]
    pub const fn pollutant(&self) -> Pollutant {
        self.pollutant
    }

    /// Rows in ascending concentration order.
    #[must_use]
    pub fn rows(&self) -> &[BreakpointRow] {
        &self.rows
    }

    /// The overflow rule applied above the last row.
    #[must_use]
    pub const fn overflow(&self) -> OverflowRule {
        self.overflow
    }

    /// Unrounded sub-index for a non-negative concentration.
    ///
    /// The first row whose inclusive upper bound is at least `concentration`
    /// is used. Above every row the table's [`OverflowRule`] applies.
    #[must_use]
    pub fn sub_index(&self, concentration: f64) -> f64 {
        debug_assert!(
            concentration >= 0.0,
            "negative {} concentration {concentration}",
            self.pollutant
        );

        if let Some((_, scale)) = self
            .rows
            .iter()
            .zip(&self.scales)
            .find(|(row, _)| concentration <= row.conc_high)
        {
            return scale.apply(concentration);
        }

        match self.overflow {
            OverflowRule::Extrapolate { ceiling } => self
                .scales
                .last()
                .map_or(ceiling, |top| top.apply(concentration).min(ceiling)),
            OverflowRule::Fixed { aqi } => aqi,
        }
    }
}

/// On-disk shape of a breakpoint TOML file.
#[derive(Debug, Deserialize)]
struct TableFile {
    pollutant: Pollutant,
    overflow: OverflowRule,
    rows: Vec<BreakpointRow>,
}

// ── Compile-time embedded TOML files ────────────────────────────────

const TABLE_TOMLS: &[(&str, &str)] = &[
    ("co", include_str!("../breakpoints/co.toml")),
    ("no2", include_str!("../breakpoints/no2.toml")),
    ("o3", include_str!("../breakpoints/o3.toml")),
    ("pm10", include_str!("../breakpoints/pm10.toml")),
    ("pm25", include_str!("../breakpoints/pm25.toml")),
    ("so2", include_str!("../breakpoints/so2.toml")),
];

/// Parses a single breakpoint table from TOML.
///
/// # Errors
///
/// Returns [`AqiError::Parse`] if the document is malformed, or any
/// validation error from [`BreakpointTable::new`].
pub fn parse_table(name: &str, toml_str: &str) -> Result<BreakpointTable, AqiError> {
    let file: TableFile = toml::de::from_str(toml_str).map_err(|source| AqiError::Parse {
        name: name.to_string(),
        source,
    })?;
    BreakpointTable::new(file.pollutant, file.rows, file.overflow)
}

/// Parses and validates every embedded breakpoint table.
///
/// # Errors
///
/// Returns the first parse or validation error encountered.
pub fn embedded_tables() -> Result<Vec<BreakpointTable>, AqiError> {
    TABLE_TOMLS
        .iter()
        .map(|(name, toml_str)| parse_table(name, toml_str))
        .collect()
}
