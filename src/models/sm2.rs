//! SM-2 (SuperMemo 2) spaced repetition scheduling.
//!
//! The algorithm computes review intervals from recall quality:
//! - Each card carries an easiness factor (EF) adjusted after every grading
//! - Grades 0-1 reset the card (interval 1 day, repetition count to zero)
//! - Grades 2-4 grow the interval progressively (1 day → 6 days → EF multiplier)
//! - EF never drops below 1.3
//!
//! The interval tier is chosen from the repetition count *before* this
//! grading, and the interval product uses the easiness factor from *before*
//! this grading. Both orderings determine how quickly a forgotten card
//! reappears and must not be reordered.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{Error, Result};
use crate::models::flashcard::{Flashcard, MIN_EASINESS};

/// Recall quality reported by the user after seeing the answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grade {
    VeryHard = 0,
    Hard = 1,
    Normal = 2,
    Easy = 3,
    SuperEasy = 4,
}

impl Grade {
    /// Converts a numeric score into a grade. This is the validation
    /// boundary: anything outside 0-4 is rejected here, and the scheduler
    /// itself only ever sees a valid grade.
    pub fn from_score(score: u8) -> Result<Self> {
        match score {
            0 => Ok(Grade::VeryHard),
            1 => Ok(Grade::Hard),
            2 => Ok(Grade::Normal),
            3 => Ok(Grade::Easy),
            4 => Ok(Grade::SuperEasy),
            other => Err(Error::InvalidGrade(other)),
        }
    }

    pub fn score(self) -> u8 {
        self as u8
    }

    /// Grades below Normal count as failed recall.
    pub fn is_failure(self) -> bool {
        self.score() < 2
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::VeryHard => "Very Hard",
            Grade::Hard => "Hard",
            Grade::Normal => "Normal",
            Grade::Easy => "Easy",
            Grade::SuperEasy => "Super Easy",
        }
    }
}

/// Applies one grading to a card and returns the updated card.
///
/// The update runs in a fixed order: interval tier from the pre-update
/// repetition count, repetition increment, easiness adjustment on the
/// pre-update easiness, failure override, 1.3 floor, and finally the
/// due-date stamp (`now` + interval, time of day discarded).
pub fn grade_card(card: &Flashcard, grade: Grade, now: NaiveDateTime) -> Flashcard {
    let mut next = card.clone();

    next.interval_days = match card.repetitions {
        0 => 1,
        1 => 6,
        _ => (card.interval_days as f64 * card.easiness).round() as i64,
    };
    next.repetitions = card.repetitions + 1;

    let q = f64::from(grade.score());
    next.easiness = card.easiness + (0.1 - (4.0 - q) * (0.08 + (4.0 - q) * 0.02));

    if grade.is_failure() {
        // Failed recall wins over the tier computed above.
        next.repetitions = 0;
        next.interval_days = 1;
    }
    if next.easiness < MIN_EASINESS {
        next.easiness = MIN_EASINESS;
    }

    next.last_study_date = Some(now);
    next.due_date = now.date() + TimeDelta::days(next.interval_days);
    next
}
