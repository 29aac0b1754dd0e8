/// Malformed numeric input handed to a score sub-function.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputValidationError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must be >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl InputValidationError {
    /// Reject NaN and infinities.
    pub fn check_finite(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { name, value })
        }
    }

    /// Reject non-finite and negative values.
    pub fn check_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        let value = Self::check_finite(name, value)?;
        if value < 0.0 {
            return Err(Self::Negative { name, value });
        }
        Ok(value)
    }

    /// Reject values outside `[min, max]`.
    pub fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, Self> {
        let value = Self::check_finite(name, value)?;
        if value < min || value > max {
            return Err(Self::OutOfRange {
                name,
                value,
                min,
                max,
            });
        }
        Ok(value)
    }
}
