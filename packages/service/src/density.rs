//! Zoom-dependent sampling density.

use strum_macros::{AsRefStr, Display};

/// How densely a viewport is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DensityTier {
    /// Zoomed out (zoom < 10): one point, 10 km smoothing radius.
    Coarse,
    /// Zoom 10–12: 3×3 points, 5 km radius.
    Medium,
    /// Zoom ≥ 13: 5×5 points, 2 km radius.
    Fine,
}

impl DensityTier {
    /// Tier for a map zoom level.
    #[must_use]
    pub const fn for_zoom(zoom: u8) -> Self {
        if zoom < 10 {
            Self::Coarse
        } else if zoom < 13 {
            Self::Medium
        } else {
            Self::Fine
        }
    }

    /// Number of mesh points laid over the viewport.
    #[must_use]
    pub const fn point_count(self) -> usize {
        match self {
            Self::Coarse => 1,
            Self::Medium => 9,
            Self::Fine => 25,
        }
    }

    /// Smoothing ring radius around each mesh point, in km.
    #[must_use]
    pub const fn radius_km(self) -> f64 {
        match self {
            Self::Coarse => 10.0,
            Self::Medium => 5.0,
            Self::Fine => 2.0,
        }
    }
}
