use thiserror::Error;

/// Failures a chart request can surface to its caller.
///
/// A partial text parse is not represented here; it is reported through
/// [`crate::normalize::ParseReport`] and never stops a chart from being built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Invalid {field}: {value:?}. Expected {expected}")]
    InvalidInputFormat {
        field: String,
        value: String,
        expected: String,
    },
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },
    #[error("Position calculation unavailable: {message}")]
    CalculationUnavailable { message: String },
    #[error("Chart invariant violated: {message}")]
    InvalidInvariant { message: String },
}

impl ChartError {
    pub fn invalid_input(field: &str, value: &str, expected: &str) -> Self {
        ChartError::InvalidInputFormat {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Whether the end user can fix this by correcting what they typed.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ChartError::InvalidInputFormat { .. } | ChartError::LocationNotFound { .. }
        )
    }
}
