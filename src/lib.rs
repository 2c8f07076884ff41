pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{Error, Result};
pub use models::{CardStore, Deck, Flashcard, Grade, SessionState, StudyScope, StudySession};
