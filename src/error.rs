// error.rs
// Error type shared by the loader and the aggregation engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnergyError {
    /// A required column is absent from the file header, or has no value in any record.
    #[error("required column `{0}` is missing")]
    MissingColumn(String),

    /// Filtering left no rows for the requested years.
    #[error("no records left for years {min}..={max}")]
    EmptyResult { min: i32, max: i32 },

    #[error("invalid year range {min}..={max}")]
    InvalidYearRange { min: i32, max: i32 },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnergyError>;
