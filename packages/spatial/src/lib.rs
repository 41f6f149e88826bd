#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sample-point generation for spatial air quality estimates.
//!
//! Three modes, all pure functions of their inputs:
//!
//! * [`generate_ring`]: evenly spaced points on a circle around a center.
//! * [`generate_grid`]: a `resolution × resolution` mesh inside the square
//!   spanned by a center and radius.
//! * [`generate_from_bounds`]: a `k × k` mesh inside an explicit bounding box.
//!
//! Both mesh modes place points at interior fractions `(i + 1) / (k + 1)` of
//! each axis, so no point ever lies on the box edge, and both emit points in
//! latitude-major order: rows run south to north and each row runs west to
//! east. Point `(row, col)` is at index `row * k + col`.

use std::f64::consts::TAU;

use air_quality_geography_models::{BoundingBox, Coordinate};
use thiserror::Error;

/// Kilometers per degree of latitude used for ring sampling.
pub const RING_KM_PER_DEGREE: f64 = 111.32;

/// Kilometers per degree of latitude used for grid sampling.
pub const GRID_KM_PER_DEGREE: f64 = 111.0;

/// `cos(latitude)` below this is treated as a pole.
const POLE_EPSILON: f64 = 1e-12;

/// Errors that reject a sampling request.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Longitude degrees have no width at the given latitude.
    #[error("Cannot project around latitude {latitude}: longitude degrees collapse at the pole")]
    SingularProjection {
        /// Latitude of the requested center.
        latitude: f64,
    },

    /// The bounding box is empty, inverted, or not finite.
    #[error("Invalid bounds: north={north}, south={south}, east={east}, west={west}")]
    InvalidBounds {
        /// Northern boundary.
        north: f64,
        /// Southern boundary.
        south: f64,
        /// Eastern boundary.
        east: f64,
        /// Western boundary.
        west: f64,
    },

    /// The radius is negative or not finite.
    #[error("Invalid radius: {radius_km} km")]
    InvalidRadius {
        /// Requested radius in kilometers.
        radius_km: f64,
    },

    /// The center is outside WGS84 ranges.
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate {
        /// Requested latitude.
        latitude: f64,
        /// Requested longitude.
        longitude: f64,
    },
}

/// Generates `count` points on a circle of `radius_km` around `center`.
///
/// Point `i` sits at angle `2π·i/count`, counter-clockwise from due east.
/// Kilometers convert to degrees at [`RING_KM_PER_DEGREE`] per degree of
/// latitude and `RING_KM_PER_DEGREE · cos(latitude)` per degree of
/// longitude. Points that would step past a pole fold back over it, and
/// longitudes wrap into `[-180, 180)`, so every point is a valid
/// [`Coordinate`].
///
/// # Errors
///
/// * [`SpatialError::InvalidCoordinate`] / [`SpatialError::InvalidRadius`]
///   for out-of-range input.
/// * [`SpatialError::SingularProjection`] if `center` is at a pole.
pub fn generate_ring(
    center: Coordinate,
    radius_km: f64,
    count: usize,
) -> Result<Vec<Coordinate>, SpatialError> {
    validate_coordinate(center)?;
    validate_radius(radius_km)?;

    let lat_degrees = radius_km / RING_KM_PER_DEGREE;
    let lon_degrees = radius_km / km_per_longitude_degree(center.latitude, RING_KM_PER_DEGREE)?;

    #[allow(clippy::cast_precision_loss)]
    let points = (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64;
            wrap_to_globe(
                lat_degrees.mul_add(angle.sin(), center.latitude),
                lon_degrees.mul_add(angle.cos(), center.longitude),
            )
        })
        .collect();

    Ok(points)
}

/// Generates a `resolution × resolution` mesh inside the square spanned by
/// `center ± radius_km`.
///
/// The square covers `center.latitude ± radius_km / 111` and
/// `center.longitude ± radius_km / (111 · cos(latitude))`. A resolution of
/// one yields exactly `center`.
///
/// # Errors
///
/// Same as [`generate_ring`].
pub fn generate_grid(
    center: Coordinate,
    radius_km: f64,
    resolution: usize,
) -> Result<Vec<Coordinate>, SpatialError> {
    validate_coordinate(center)?;
    validate_radius(radius_km)?;

    let lat_half = radius_km / GRID_KM_PER_DEGREE;
    let lon_half = radius_km / km_per_longitude_degree(center.latitude, GRID_KM_PER_DEGREE)?;

    let span = BoundingBox::new(
        center.longitude - lon_half,
        center.latitude - lat_half,
        center.longitude + lon_half,
        center.latitude + lat_half,
    );

    log::debug!(
        "Grid around ({}, {}): {resolution}x{resolution} over {:.5}° x {:.5}°",
        center.latitude,
        center.longitude,
        span.height(),
        span.width()
    );

    Ok(interior_mesh(&span, resolution)
        .into_iter()
        .map(|p| wrap_to_globe(p.latitude, p.longitude))
        .collect())
}

/// Generates a `k × k` mesh strictly inside `bounds`, where
/// `k = floor(sqrt(count))`.
///
/// # Errors
///
/// Returns [`SpatialError::InvalidBounds`] unless the box lies within WGS84
/// ranges with `north > south` and `east > west`.
pub fn generate_from_bounds(
    bounds: &BoundingBox,
    count: usize,
) -> Result<Vec<Coordinate>, SpatialError> {
    if !bounds.is_valid() {
        return Err(SpatialError::InvalidBounds {
            north: bounds.north,
            south: bounds.south,
            east: bounds.east,
            west: bounds.west,
        });
    }

    Ok(interior_mesh(bounds, grid_side(count)))
}

/// Side length of the largest square mesh with at most `count` points.
#[must_use]
pub const fn grid_side(count: usize) -> usize {
    count.isqrt()
}

/// `k × k` points at fractions `(i + 1) / (k + 1)` along each axis,
/// latitude-major.
#[allow(clippy::cast_precision_loss)]
fn interior_mesh(bounds: &BoundingBox, k: usize) -> Vec<Coordinate> {
    let divisions = (k + 1) as f64;
    let lat_step = bounds.height() / divisions;
    let lon_step = bounds.width() / divisions;

    let mut points = Vec::with_capacity(k * k);
    for i in 0..k {
        let latitude = lat_step.mul_add((i + 1) as f64, bounds.south);
        for j in 0..k {
            let longitude = lon_step.mul_add((j + 1) as f64, bounds.west);
            points.push(Coordinate::new(latitude, longitude));
        }
    }
    points
}

/// Brings a raw offset position back onto the globe.
///
/// Latitudes past a pole fold back over it onto the opposite meridian, and
/// longitudes wrap into `[-180, 180)`.
fn wrap_to_globe(latitude: f64, longitude: f64) -> Coordinate {
    let shifted = (latitude + 90.0).rem_euclid(360.0);
    let (latitude, longitude) = if shifted > 180.0 {
        (270.0 - shifted, longitude + 180.0)
    } else {
        (shifted - 90.0, longitude)
    };

    Coordinate::new(latitude, (longitude + 180.0).rem_euclid(360.0) - 180.0)
}

fn km_per_longitude_degree(latitude: f64, km_per_degree: f64) -> Result<f64, SpatialError> {
    let cos = latitude.to_radians().cos();
    if cos.abs() < POLE_EPSILON {
        return Err(SpatialError::SingularProjection { latitude });
    }
    Ok(km_per_degree * cos)
}

/// Checks that `coordinate` is finite and inside WGS84 ranges.
///
/// # Errors
///
/// Returns [`SpatialError::InvalidCoordinate`] otherwise.
pub fn validate_coordinate(coordinate: Coordinate) -> Result<(), SpatialError> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(SpatialError::InvalidCoordinate {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        })
    }
}

fn validate_radius(radius_km: f64) -> Result<(), SpatialError> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(())
    } else {
        Err(SpatialError::InvalidRadius { radius_km })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn ring_hits_cardinal_directions() {
        let points = generate_ring(Coordinate::new(0.0, 0.0), 111.32, 4).unwrap();
        assert_eq!(points.len(), 4);

        // east, north, west, south
        let expected = [(0.0, 1.0), (1.0, 0.0), (0.0, -1.0), (-1.0, 0.0)];
        for (point, (lat, lon)) in points.iter().zip(expected) {
            assert!(
                close(point.latitude, lat) && close(point.longitude, lon),
                "{point:?} != ({lat}, {lon})"
            );
        }
    }

    #[test]
    fn ring_longitude_widens_with_latitude() {
        let points = generate_ring(Coordinate::new(60.0, 10.0), 111.32, 4).unwrap();
        // cos(60°) = 0.5, so one degree of latitude-equivalent distance is
        // two degrees of longitude.
        assert!((points[0].longitude - 12.0).abs() < 1e-6);
        assert!((points[1].latitude - 61.0).abs() < 1e-6);
    }

    #[test]
    fn ring_with_no_points_is_empty() {
        assert!(
            generate_ring(Coordinate::new(10.0, 10.0), 5.0, 0)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn ring_at_pole_is_rejected() {
        for latitude in [90.0, -90.0] {
            let err = generate_ring(Coordinate::new(latitude, 0.0), 5.0, 8).unwrap_err();
            assert!(matches!(err, SpatialError::SingularProjection { .. }));
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            generate_ring(Coordinate::new(0.0, 0.0), -1.0, 8),
            Err(SpatialError::InvalidRadius { .. })
        ));
        assert!(matches!(
            generate_grid(Coordinate::new(95.0, 0.0), 1.0, 3),
            Err(SpatialError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            generate_grid(Coordinate::new(0.0, 0.0), f64::NAN, 3),
            Err(SpatialError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn grid_has_resolution_squared_points_latitude_major() {
        let center = Coordinate::new(38.9, -77.0);
        let points = generate_grid(center, 2.0, 4).unwrap();
        assert_eq!(points.len(), 16);

        for row in points.chunks(4) {
            assert!(row.iter().all(|p| close(p.latitude, row[0].latitude)));
            for pair in row.windows(2) {
                assert!(pair[1].longitude > pair[0].longitude);
            }
        }
        for rows in points.chunks(4).collect::<Vec<_>>().windows(2) {
            assert!(rows[1][0].latitude > rows[0][0].latitude);
        }
    }

    #[test]
    fn grid_resolution_one_is_center() {
        let center = Coordinate::new(51.5, -0.12);
        let points = generate_grid(center, 10.0, 1).unwrap();
        assert_eq!(points.len(), 1);
        assert!(close(points[0].latitude, center.latitude));
        assert!(close(points[0].longitude, center.longitude));
    }

    #[test]
    fn grid_stays_strictly_inside_span() {
        let center = Coordinate::new(45.0, 7.0);
        let radius_km = 5.0;
        let lat_half = radius_km / GRID_KM_PER_DEGREE;
        let lon_half = radius_km / (GRID_KM_PER_DEGREE * 45.0_f64.to_radians().cos());
        let span = BoundingBox::new(
            center.longitude - lon_half,
            center.latitude - lat_half,
            center.longitude + lon_half,
            center.latitude + lat_half,
        );

        let points = generate_grid(center, radius_km, 7).unwrap();
        assert_eq!(points.len(), 49);
        for point in points {
            assert!(span.contains_strictly(point), "{point:?} on or outside edge");
        }
    }

    #[test]
    fn grid_at_pole_is_rejected() {
        assert!(matches!(
            generate_grid(Coordinate::new(-90.0, 0.0), 1.0, 3),
            Err(SpatialError::SingularProjection { .. })
        ));
    }

    #[test]
    fn bounds_grid_uses_floor_sqrt() {
        let bounds = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(generate_from_bounds(&bounds, 9).unwrap().len(), 9);
        assert_eq!(generate_from_bounds(&bounds, 10).unwrap().len(), 9);
        assert_eq!(generate_from_bounds(&bounds, 25).unwrap().len(), 25);
        assert_eq!(generate_from_bounds(&bounds, 1).unwrap().len(), 1);
        assert!(generate_from_bounds(&bounds, 0).unwrap().is_empty());
    }

    #[test]
    fn bounds_grid_places_interior_fractions() {
        let bounds = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        let points = generate_from_bounds(&bounds, 9).unwrap();

        let expected: Vec<(f64, f64)> = [1.0, 2.0, 3.0]
            .iter()
            .flat_map(|lat| [1.0, 2.0, 3.0].map(|lon| (*lat, lon)))
            .collect();

        for (point, (lat, lon)) in points.iter().zip(expected) {
            assert!(close(point.latitude, lat) && close(point.longitude, lon));
        }
    }

    #[test]
    fn bounds_grid_never_touches_edges() {
        let bounds = BoundingBox::new(-77.12, 38.79, -76.91, 38.99);
        for count in [1, 9, 25, 100] {
            for point in generate_from_bounds(&bounds, count).unwrap() {
                assert!(bounds.south < point.latitude && point.latitude < bounds.north);
                assert!(bounds.west < point.longitude && point.longitude < bounds.east);
            }
        }
    }

    #[test]
    fn ring_near_pole_folds_back_onto_globe() {
        let points = generate_ring(Coordinate::new(89.95, 0.0), 10.0, 8).unwrap();
        assert_eq!(points.len(), 8);
        for point in &points {
            assert!(point.is_valid(), "{point:?} is off the globe");
        }

        // Due north crosses the pole and lands on the opposite meridian.
        let north = points[2];
        assert!((north.latitude - (180.0 - (89.95 + 10.0 / RING_KM_PER_DEGREE))).abs() < 1e-9);
        assert!((north.longitude.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn ring_near_south_pole_folds_back_onto_globe() {
        for point in generate_ring(Coordinate::new(-89.95, 120.0), 10.0, 8).unwrap() {
            assert!(point.is_valid(), "{point:?} is off the globe");
        }
    }

    #[test]
    fn ring_wraps_across_antimeridian() {
        let points = generate_ring(Coordinate::new(0.0, 179.5), 111.32, 4).unwrap();
        assert!(close(points[0].longitude, -179.5));
        assert!(points.iter().all(Coordinate::is_valid));
    }

    #[test]
    fn grid_near_pole_stays_on_globe() {
        for point in generate_grid(Coordinate::new(89.99, 10.0), 5.0, 5).unwrap() {
            assert!(point.is_valid(), "{point:?} is off the globe");
        }
    }

    #[test]
    fn out_of_range_bounds_rejected() {
        let bounds = BoundingBox::new(-400.0, -200.0, 400.0, 200.0);
        assert!(matches!(
            generate_from_bounds(&bounds, 9),
            Err(SpatialError::InvalidBounds { .. })
        ));

        let bounds = BoundingBox::new(-10.0, 80.0, 10.0, 90.5);
        assert!(matches!(
            generate_from_bounds(&bounds, 1),
            Err(SpatialError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let bounds = BoundingBox::new(1.0, 0.0, 0.0, 1.0);
        assert!(matches!(
            generate_from_bounds(&bounds, 9),
            Err(SpatialError::InvalidBounds { .. })
        ));
    }
}
