//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A recall grade outside the 0-4 scale.
    #[error("grade must be between 0 and 4, got {0}")]
    InvalidGrade(u8),

    #[error("deck {0} not found")]
    DeckNotFound(i64),

    #[error("flashcard {0} not found")]
    CardNotFound(i64),

    #[error("{field} exceeds the maximum length of {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    /// The selected card set was empty, so the study session never started.
    #[error("there are no flashcards to study")]
    EmptySession,

    /// A grade arrived before the answer was revealed.
    #[error("the answer must be revealed before grading")]
    NotRevealed,

    /// A stored date string that does not parse as `YYYY-MM-DD` (or the
    /// timestamp variant with a time component).
    #[error("invalid date {0:?} in database")]
    InvalidDate(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
