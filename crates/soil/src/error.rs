//! Error types for demeter-soil.

/// Error type for field-capacity estimation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SoilError {
    /// Returned when the soil type is absent from the lookup table.
    #[error("unknown soil type '{soil_type}'")]
    UnknownSoilType {
        /// Normalized soil-type key that failed to resolve.
        soil_type: String,
    },

    /// Returned when an input violates its domain.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the violated constraint.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_soil_type() {
        let err = SoilError::UnknownSoilType {
            soil_type: "moon dust".to_string(),
        };
        assert_eq!(err.to_string(), "unknown soil type 'moon dust'");
    }

    #[test]
    fn display_invalid_input() {
        let err = SoilError::InvalidInput {
            reason: "root_depth_cm must be > 0, got -5".to_string(),
        };
        assert!(err.to_string().contains("root_depth_cm must be > 0"));
    }
}
