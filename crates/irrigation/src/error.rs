//! Error types for demeter-irrigation.

/// Error type for irrigation series construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IrrigationError {
    /// Returned when date and amount lists differ in length.
    #[error("dates and amounts must have the same length: got {dates} dates and {amounts} amounts")]
    LengthMismatch {
        /// Number of dates supplied.
        dates: usize,
        /// Number of amounts supplied.
        amounts: usize,
    },

    /// Returned when events from more than one field are mixed.
    #[error("events belong to multiple fields: {field_ids:?}")]
    MixedFields {
        /// Distinct field ids found in the event list.
        field_ids: Vec<i64>,
    },

    /// Returned when building a series from an empty event list.
    #[error("no irrigation events supplied")]
    NoEvents,
}
