//! Flashcard is a question/answer pair together with its spaced-repetition
//! scheduling state. Only text is used in questions and answers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAX_QUESTION_LENGTH: usize = 500;
pub const MAX_ANSWER_LENGTH: usize = 500;

/// Lowest easiness factor a card can reach once it has been graded.
pub const MIN_EASINESS: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Unique identifier, assigned by storage on creation.
    pub id: i64,
    /// Owning deck, referenced by id rather than by pointer.
    pub deck_id: i64,
    pub question: String,
    pub answer: String,
    /// Timestamp of the most recent grading; `None` for never-studied cards.
    pub last_study_date: Option<NaiveDateTime>,
    /// Calendar date on or after which the card is eligible for review.
    pub due_date: NaiveDate,
    /// Days to wait before the card becomes due after the next grading.
    pub interval_days: i64,
    /// Memory-strength factor; 0.0 until the first grading.
    pub easiness: f64,
    /// Consecutive successful gradings since the last failure.
    pub repetitions: u32,
}

impl Flashcard {
    /// Creates a card with default scheduling state. The due date equals the
    /// creation date, so a new card is immediately eligible for study.
    pub fn new(
        id: i64,
        deck_id: i64,
        question: impl Into<String>,
        answer: impl Into<String>,
        created_on: NaiveDate,
    ) -> Result<Self> {
        let question = question.into();
        let answer = answer.into();
        check_length("question", &question, MAX_QUESTION_LENGTH)?;
        check_length("answer", &answer, MAX_ANSWER_LENGTH)?;
        Ok(Self {
            id,
            deck_id,
            question,
            answer,
            last_study_date: None,
            due_date: created_on,
            interval_days: 0,
            easiness: 0.0,
            repetitions: 0,
        })
    }

    /// Replaces the question and answer text. Scheduling state is not touched.
    pub fn set_content(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<()> {
        let question = question.into();
        let answer = answer.into();
        check_length("question", &question, MAX_QUESTION_LENGTH)?;
        check_length("answer", &answer, MAX_ANSWER_LENGTH)?;
        self.question = question;
        self.answer = answer;
        Ok(())
    }

    /// The due date in the on-disk `YYYY-MM-DD` form.
    pub fn due_date_string(&self) -> String {
        self.due_date.format("%Y-%m-%d").to_string()
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date <= today
    }
}

pub(crate) fn check_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::FieldTooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_card_is_immediately_due() {
        let today = date(2024, 6, 1);
        let card = Flashcard::new(1, 1, "hello", "cześć", today).unwrap();

        assert_eq!(card.due_date, today);
        assert!(card.is_due(today));
        assert_eq!(card.interval_days, 0);
        assert_eq!(card.easiness, 0.0);
        assert_eq!(card.repetitions, 0);
        assert!(card.last_study_date.is_none());
    }

    #[test]
    fn test_due_date_string_is_zero_padded() {
        let card = Flashcard::new(1, 1, "q", "a", date(2024, 3, 7)).unwrap();

        let formatted = card.due_date_string();
        assert_eq!(formatted, "2024-03-07");
        assert_eq!(formatted.len(), 10);
    }

    #[test]
    fn test_question_length_is_bounded() {
        let long = "x".repeat(MAX_QUESTION_LENGTH + 1);
        let result = Flashcard::new(1, 1, long, "a", date(2024, 1, 1));

        assert!(matches!(
            result,
            Err(Error::FieldTooLong {
                field: "question",
                ..
            })
        ));
    }

    #[test]
    fn test_set_content_leaves_scheduling_alone() {
        let mut card = Flashcard::new(1, 1, "q", "a", date(2024, 1, 1)).unwrap();
        card.interval_days = 6;
        card.easiness = 2.5;
        card.repetitions = 2;

        card.set_content("new question", "new answer").unwrap();

        assert_eq!(card.question, "new question");
        assert_eq!(card.answer, "new answer");
        assert_eq!(card.interval_days, 6);
        assert_eq!(card.easiness, 2.5);
        assert_eq!(card.repetitions, 2);
    }
}
