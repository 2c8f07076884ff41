//! Deck is a named set of flashcards. Cards reference their deck by id, so
//! the deck itself only carries metadata.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::flashcard::check_length;

pub const MAX_TITLE_LENGTH: usize = 250;
const SHORT_TITLE_LENGTH: usize = 20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Unique identifier, assigned by storage on creation.
    pub id: i64,
    pub title: String,
    /// When the deck was last studied; `None` until its first session.
    pub last_study_time: Option<NaiveDateTime>,
}

impl Deck {
    pub fn new(id: i64, title: impl Into<String>) -> Result<Self> {
        let title = title.into();
        check_length("title", &title, MAX_TITLE_LENGTH)?;
        Ok(Self {
            id,
            title,
            last_study_time: None,
        })
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        check_length("title", &title, MAX_TITLE_LENGTH)?;
        self.title = title;
        Ok(())
    }

    /// Title shortened for compact display: at most 20 characters, with an
    /// ellipsis when something was cut off.
    pub fn truncated_title(&self) -> String {
        let mut truncated: String = self.title.chars().take(SHORT_TITLE_LENGTH).collect();
        if self.title.chars().count() > SHORT_TITLE_LENGTH {
            truncated.push_str("...");
        }
        truncated
    }

    /// Marks the deck as studied. Called once per session, at session start.
    pub fn record_study(&mut self, now: NaiveDateTime) {
        self.last_study_time = Some(now);
    }

    /// Last study time as `%m/%d/%Y`, or an empty string when the deck has
    /// never been studied.
    pub fn last_study_display(&self) -> String {
        match self.last_study_time {
            Some(time) => time.format("%m/%d/%Y").to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_short_title_is_kept_as_is() {
        let deck = Deck::new(1, "Polish").unwrap();
        assert_eq!(deck.truncated_title(), "Polish");
    }

    #[test]
    fn test_long_title_is_truncated_with_ellipsis() {
        let deck = Deck::new(1, "A very long deck title indeed").unwrap();
        assert_eq!(deck.truncated_title(), "A very long deck tit...");
    }

    #[test]
    fn test_title_length_is_bounded() {
        let result = Deck::new(1, "x".repeat(MAX_TITLE_LENGTH + 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_study_sets_last_study_time() {
        let mut deck = Deck::new(1, "Polish").unwrap();
        assert_eq!(deck.last_study_display(), "");

        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        deck.record_study(now);

        assert_eq!(deck.last_study_time, Some(now));
        assert_eq!(deck.last_study_display(), "06/01/2024");
    }
}
