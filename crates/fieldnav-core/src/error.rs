use nalgebra::Point2;

/// Precondition violations on numeric inputs.
///
/// Degenerate-but-finite geometry is never reported through this type; it is
/// a regular outcome of the algorithms (e.g. "no blob found").
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{what} must be finite (got {value})")]
    NonFinite { what: &'static str, value: f64 },

    #[error("invalid viewport (width={width}, height={height}); both must be finite and > 0")]
    InvalidViewport { width: f64, height: f64 },
}

/// Reject NaN and infinities with a labelled error.
#[inline]
pub fn ensure_finite(what: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NonFinite { what, value })
    }
}

/// Reject a point with any non-finite coordinate.
pub fn ensure_finite_point(what: &'static str, p: Point2<f64>) -> Result<(), InputError> {
    ensure_finite(what, p.x)?;
    ensure_finite(what, p.y)?;
    Ok(())
}
