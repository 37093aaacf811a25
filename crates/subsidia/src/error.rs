//! Errors that abort a whole run.

use subsidia_edgar::EdgarError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal run errors.
///
/// Everything that goes wrong inside a single year is recorded in that year's status instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration or identity resolution failed
    #[error(transparent)]
    Edgar(#[from] EdgarError),

    /// The first year is after the last
    #[error("Invalid year range: {start} > {end}")]
    InvalidYearRange {
        /// First requested year
        start: i32,
        /// Last requested year
        end: i32,
    },
}
