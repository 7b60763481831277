//! Error types for fuelcore

use thiserror::Error;

/// Errors that can occur during fueling computations.
///
/// Sparse data (no nutrition, no workouts) is never an error; the engine
/// degrades to baseline-only output. These variants cover caller bugs
/// (malformed intervals, bad zone names) and collaborator failures.
#[derive(Debug, Error)]
pub enum FuelError {
    #[error("Invalid fueling window: {detail}")]
    InvalidWindow { detail: String },

    #[error("Invalid macro targets: {detail}")]
    InvalidTargets { detail: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    EmptyDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
