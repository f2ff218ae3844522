//! Error types for the contact-forecast library.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while training, forecasting or backtesting a channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Dates are not strictly increasing, or otherwise malformed.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Two observations share the same (channel, date).
    #[error("duplicate observation for channel '{channel}' on {date}")]
    DuplicateObservation { channel: String, date: NaiveDate },

    /// A month key that is not `YYYY-MM`.
    #[error("invalid month key '{0}', expected YYYY-MM")]
    InvalidMonthKey(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// The dataset has no rows for the channel.
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    /// No trained model is stored for the channel.
    #[error("model not trained for channel '{0}'")]
    ChannelNotTrained(String),

    /// Every configuration, including the trend-only fallback, failed to fit.
    #[error("training failed for channel '{channel}': {reason}")]
    TrainingFailed { channel: String, reason: String },
}
