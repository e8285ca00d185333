//! Error types for demeter-balance.

/// Error type for the bucket simulation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BalanceError {
    /// Returned when the daily table has no rows.
    #[error("station table is empty; nothing to simulate")]
    EmptyInput,

    /// Returned when a required column is absent.
    #[error("required column '{column}' not found in daily table")]
    MissingColumn {
        /// Name (or alternatives) of the missing column.
        column: String,
    },

    /// Returned when the field capacity is not a positive depth.
    #[error("field capacity must be > 0 mm, got {got}")]
    NonPositiveCapacity {
        /// Supplied capacity, mm.
        got: f64,
    },

    /// Returned when the irrigation series length differs from the table.
    #[error("irrigation series has {got} values but the table has {expected} days")]
    LengthMismatch {
        /// Number of days in the daily table.
        expected: usize,
        /// Length of the irrigation series.
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_column() {
        let err = BalanceError::MissingColumn {
            column: "et0_corrected|et0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "required column 'et0_corrected|et0' not found in daily table"
        );
    }

    #[test]
    fn display_non_positive_capacity() {
        let err = BalanceError::NonPositiveCapacity { got: 0.0 };
        assert_eq!(err.to_string(), "field capacity must be > 0 mm, got 0");
    }
}
