#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic coordinate and bounding box types.
//!
//! All coordinates are WGS84 degrees. Conversions into `geo` types follow
//! the `geo` convention of `x = longitude`, `y = latitude`.

use geo::{Contains, Coord, Point, Rect};
use serde::{Deserialize, Serialize};

/// A point on the globe in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate. Ranges are not checked; see [`Self::is_valid`].
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(c: Coordinate) -> Self {
        Self::new(c.longitude, c.latitude)
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether the box lies within WGS84 ranges with `north > south` and
    /// `east > west`.
    ///
    /// Boxes crossing the antimeridian (`east < west`) are not valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.south)
            && (-90.0..=90.0).contains(&self.north)
            && (-180.0..=180.0).contains(&self.west)
            && (-180.0..=180.0).contains(&self.east)
            && self.north > self.south
            && self.east > self.west
    }

    /// Latitude span in degrees.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span in degrees.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            self.south + self.height() / 2.0,
            self.west + self.width() / 2.0,
        )
    }

    /// Whether `coordinate` lies strictly inside the box (not on an edge).
    #[must_use]
    pub fn contains_strictly(&self, coordinate: Coordinate) -> bool {
        Rect::from(*self).contains(&Point::from(coordinate))
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(b: BoundingBox) -> Self {
        Self::new(
            Coord {
                x: b.west,
                y: b.south,
            },
            Coord {
                x: b.east,
                y: b.north,
            },
        )
    }
}
