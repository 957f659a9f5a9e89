//! Error types for Stocksense

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A statistics primitive was given an empty series.
    #[error("Empty input: at least one value is required")]
    EmptyInput,

    /// A statistics primitive was given too few points.
    #[error("Insufficient data: needed {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A record failed snapshot-boundary validation.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A refresh was rejected because another one is in flight.
    #[error("Engine busy: a refresh is already in progress")]
    EngineBusy,

    /// The snapshot source failed to produce a record snapshot.
    #[error("Snapshot source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, Error>;
