//! Linear interpolation between two ranges.

use crate::AqiError;

/// A validated affine map from `[from_min, from_max]` onto `[to_min, to_max]`.
///
/// Construction rejects a zero-width (or non-finite) source range, so
/// [`LinearScale::apply`] can never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    from_min: f64,
    from_max: f64,
    to_min: f64,
    to_max: f64,
}

impl LinearScale {
    /// Creates a scale mapping `from` onto `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AqiError::DegenerateRange`] if `from.0 == from.1` or the
    /// source range is not finite.
    #[allow(clippy::float_cmp)]
    pub fn new(from: (f64, f64), to: (f64, f64)) -> Result<Self, AqiError> {
        let (from_min, from_max) = from;
        let span = from_max - from_min;

        if from_max == from_min || !span.is_finite() {
            return Err(AqiError::DegenerateRange { from_min, from_max });
        }

        Ok(Self {
            from_min,
            from_max,
            to_min: to.0,
            to_max: to.1,
        })
    }

    /// Maps `value` through the scale. Values outside the source range are
    /// extrapolated along the same line.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        ((value - self.from_min) / (self.from_max - self.from_min)) * (self.to_max - self.to_min)
            + self.to_min
    }
}

/// One-shot form of [`LinearScale`]:
/// `((value - from_min) / (from_max - from_min)) * (to_max - to_min) + to_min`.
///
/// # Errors
///
/// Returns [`AqiError::DegenerateRange`] if `from_min == from_max`.
pub fn linear_scale(
    value: f64,
    from_min: f64,
    from_max: f64,
    to_min: f64,
    to_max: f64,
) -> Result<f64, AqiError> {
    Ok(LinearScale::new((from_min, from_max), (to_min, to_max))?.apply(value))
}
