//! Study-session state machine.
//!
//! A session is one shuffled pass over a selected card set. Each card is
//! shown question-first, revealed on request, then graded; grading feeds the
//! SM-2 update through the card arena and advances to the next card. A
//! finished session is terminal: a new pass means a new session, with a new
//! shuffle and a freshly computed due set.

use chrono::NaiveDateTime;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::models::card_store::CardStore;
use crate::models::deck::Deck;
use crate::models::flashcard::Flashcard;
use crate::models::sm2::Grade;

/// Which cards a session covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudyScope {
    /// Only cards whose due date has arrived.
    DueOnly,
    /// Every card in the deck, due or not.
    AllCards,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// The current card shows its question; the answer is hidden.
    AwaitingReveal,
    /// The answer is visible and a grade may be given.
    AwaitingGrade,
    /// Every card in the sequence has been graded.
    Complete,
}

pub struct StudySession {
    queue: Vec<i64>,
    cursor: usize,
    revealed: bool,
}

impl StudySession {
    /// Starts a session over the deck's cards.
    ///
    /// Selects the card set per `scope`, shuffles it uniformly, and stamps
    /// the deck's last-study time (once, here, not per card). An empty
    /// selection refuses to start with [`Error::EmptySession`]; the caller
    /// decides whether to fall back to studying all cards.
    pub fn begin(
        deck: &mut Deck,
        store: &CardStore,
        scope: StudyScope,
        now: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let mut queue = match scope {
            StudyScope::DueOnly => store.due_ids(now.date()),
            StudyScope::AllCards => store.ids().to_vec(),
        };
        if queue.is_empty() {
            return Err(Error::EmptySession);
        }
        queue.shuffle(rng);
        deck.record_study(now);
        Ok(Self {
            queue,
            cursor: 0,
            revealed: false,
        })
    }

    pub fn state(&self) -> SessionState {
        if self.cursor >= self.queue.len() {
            SessionState::Complete
        } else if self.revealed {
            SessionState::AwaitingGrade
        } else {
            SessionState::AwaitingReveal
        }
    }

    /// Id of the card currently shown, or `None` once the session is over.
    pub fn current_id(&self) -> Option<i64> {
        self.queue.get(self.cursor).copied()
    }

    /// Zero-based position of the current card in the sequence.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.state() == SessionState::Complete
    }

    /// Makes the answer visible. Only meaningful while awaiting reveal; in
    /// any other state this is a no-op.
    pub fn reveal(&mut self) {
        if self.state() == SessionState::AwaitingReveal {
            self.revealed = true;
        }
    }

    /// Grades the current card and advances the cursor.
    ///
    /// The update goes through the arena so the card's scheduling state
    /// changes in one place. Returns the updated card so the caller can
    /// persist it before the next card comes up.
    pub fn grade(
        &mut self,
        store: &mut CardStore,
        grade: Grade,
        now: NaiveDateTime,
    ) -> Result<Flashcard> {
        if self.state() != SessionState::AwaitingGrade {
            return Err(Error::NotRevealed);
        }
        let id = self.queue[self.cursor];
        let updated = store.grade(id, grade, now)?.clone();
        self.cursor += 1;
        self.revealed = false;
        Ok(updated)
    }
}
