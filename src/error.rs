//! Error types for the fallible edges (config loading, storage)
//!
//! The simulation itself never fails: every shot resolves to an outcome.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level table is empty")]
    NoLevels,
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("range radius must shrink every level (level {level} doesn't)")]
    RangeNotNarrowing { level: u8 },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("stored top score is not an integer: {0:?}")]
    Corrupt(String),
    #[error("storage write failed")]
    WriteFailed,
}
