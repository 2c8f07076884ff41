//! In-memory arena for one deck's flashcards.
//!
//! Cards live in the arena keyed by id; decks and sessions refer to cards by
//! id only. Scheduling state changes go through [`CardStore::grade`] and
//! content changes through [`CardStore::set_content`], so no other call site
//! mutates card fields directly.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::models::flashcard::Flashcard;
use crate::models::sm2::{self, Grade};

#[derive(Clone, Debug, Default)]
pub struct CardStore {
    cards: BTreeMap<i64, Flashcard>,
    /// Insertion order, used for stable listings and full-deck sessions.
    order: Vec<i64>,
}

impl CardStore {
    pub fn from_cards(cards: Vec<Flashcard>) -> Self {
        let mut store = Self::default();
        for card in cards {
            store.insert(card);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Flashcard> {
        self.cards.get(&id)
    }

    /// Card ids in insertion order.
    pub fn ids(&self) -> &[i64] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flashcard> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }

    pub fn insert(&mut self, card: Flashcard) {
        if !self.cards.contains_key(&card.id) {
            self.order.push(card.id);
        }
        self.cards.insert(card.id, card);
    }

    pub fn remove(&mut self, id: i64) -> Option<Flashcard> {
        let removed = self.cards.remove(&id);
        if removed.is_some() {
            self.order.retain(|&other| other != id);
        }
        removed
    }

    /// Ids of every card with `due_date <= today`.
    pub fn due_ids(&self, today: NaiveDate) -> Vec<i64> {
        self.iter()
            .filter(|card| card.is_due(today))
            .map(|card| card.id)
            .collect()
    }

    /// Fresh copies of every due card. The returned list is owned by the
    /// caller, not a view into the arena, and carries no ordering guarantee.
    pub fn due_cards(&self, today: NaiveDate) -> Vec<Flashcard> {
        self.iter()
            .filter(|card| card.is_due(today))
            .cloned()
            .collect()
    }

    /// Applies one SM-2 grading to a card. The only scheduling-state
    /// mutation path in the crate.
    pub fn grade(&mut self, id: i64, grade: Grade, now: NaiveDateTime) -> Result<&Flashcard> {
        let card = self.cards.get_mut(&id).ok_or(Error::CardNotFound(id))?;
        let updated = sm2::grade_card(card, grade, now);
        *card = updated;
        Ok(card)
    }

    /// Replaces a card's question and answer, leaving scheduling state alone.
    pub fn set_content(
        &mut self,
        id: i64,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<&Flashcard> {
        let card = self.cards.get_mut(&id).ok_or(Error::CardNotFound(id))?;
        card.set_content(question, answer)?;
        Ok(card)
    }
}
