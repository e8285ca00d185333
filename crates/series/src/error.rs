//! Error types for demeter-series.

/// Error type for all fallible operations on series tables.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeriesError {
    /// Returned when a column's length does not match the table index.
    #[error("column '{column}' has {got} values but the index has {expected}")]
    LengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Length of the table index.
        expected: usize,
        /// Length of the supplied column.
        got: usize,
    },

    /// Returned when an index is not sorted (or contains duplicate dates).
    #[error("index is not strictly increasing at position {position}")]
    UnsortedIndex {
        /// First offending position.
        position: usize,
    },

    /// Returned when inserting a column whose name is already taken.
    #[error("column '{column}' already exists")]
    DuplicateColumn {
        /// Name of the duplicate column.
        column: String,
    },

    /// Returned when merging tables whose indices differ.
    #[error("table indices do not match: {reason}")]
    IndexMismatch {
        /// Description of the mismatch.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_length_mismatch() {
        let err = SeriesError::LengthMismatch {
            column: "precipitation".to_string(),
            expected: 10,
            got: 7,
        };
        assert_eq!(
            err.to_string(),
            "column 'precipitation' has 7 values but the index has 10"
        );
    }

    #[test]
    fn display_unsorted_index() {
        let err = SeriesError::UnsortedIndex { position: 3 };
        assert_eq!(err.to_string(), "index is not strictly increasing at position 3");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<SeriesError>();
    }
}
