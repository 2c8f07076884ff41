//! JSON backup of a deck, scheduling state included.
//!
//! Unlike the CSV interchange format, a backup round-trips losslessly: due
//! dates, intervals, easiness factors and repetition counts all survive a
//! backup/restore cycle. Restoring creates a new deck; storage assigns fresh
//! ids.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::database::db;
use crate::error::Result;
use crate::models::{Deck, Flashcard};

#[derive(Serialize, Deserialize)]
pub struct DeckBackup {
    pub deck: Deck,
    pub flashcards: Vec<Flashcard>,
}

/// Writes a deck and its cards to a pretty-printed JSON file.
pub fn export_backup_to_path(deck: &Deck, cards: &[Flashcard], path: &Path) -> Result<()> {
    let backup = DeckBackup {
        deck: deck.clone(),
        flashcards: cards.to_vec(),
    };
    let json = serde_json::to_string_pretty(&backup)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Reads a backup file without touching storage.
pub fn read_backup(path: &Path) -> Result<DeckBackup> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Recreates the backed-up deck in storage, scheduling state and all.
pub fn restore_backup(conn: &Connection, path: &Path) -> Result<Deck> {
    let backup = read_backup(path)?;

    let mut deck = db::create_deck(conn, &backup.deck.title)?;
    deck.last_study_time = backup.deck.last_study_time;
    db::update_deck(conn, &deck)?;

    for card in &backup.flashcards {
        let created = db::create_card(conn, deck.id, &card.question, &card.answer, card.due_date)?;
        let restored = Flashcard {
            id: created.id,
            deck_id: deck.id,
            ..card.clone()
        };
        db::save_card(conn, &restored)?;
    }
    log::info!(
        "restored deck '{}' with {} flashcards",
        deck.title,
        backup.flashcards.len()
    );
    Ok(deck)
}
