//! Flat key/value CSV interchange for decks.
//!
//! The format is two columns with no header row. A `decktitle` row names the
//! deck, `program` and `fileversion` are reserved metadata rows, and every
//! other row is one `question,answer` card. Imported cards start with default
//! scheduling state, so they are immediately due. Scheduling state is not
//! part of this format; use the JSON backup for lossless round trips.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::database::db;
use crate::error::Result;
use crate::models::{Deck, Flashcard};

const DECK_TITLE_KEY: &str = "decktitle";
const RESERVED_KEYS: &[&str] = &["program", "fileversion"];

/// Raw parse result: the deck title row (if any) and the card rows.
pub struct ParsedDeck {
    pub title: Option<String>,
    pub rows: Vec<(String, String)>,
}

/// Reads the key/value rows. Duplicate questions collapse in place — the
/// last value wins, the first position is kept. Malformed rows are logged
/// and skipped rather than failing the whole import.
pub fn parse_deck<R: Read>(input: R) -> Result<ParsedDeck> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut title = None;
    let mut rows: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in reader.records() {
        let record = record?;
        let (Some(key), Some(value)) = (record.get(0), record.get(1)) else {
            log::warn!("skipping malformed row: {:?}", record);
            continue;
        };
        if key == DECK_TITLE_KEY {
            title = Some(value.to_string());
        } else if RESERVED_KEYS.contains(&key) {
            // Reserved metadata, nothing to do with it yet.
        } else if let Some(&at) = positions.get(key) {
            rows[at].1 = value.to_string();
        } else {
            positions.insert(key.to_string(), rows.len());
            rows.push((key.to_string(), value.to_string()));
        }
    }

    Ok(ParsedDeck { title, rows })
}

/// Imports a CSV file as a new deck. A blank or missing `decktitle` row
/// falls back to a title stamped with the import time.
pub fn import_deck_from_path(
    conn: &Connection,
    path: &Path,
    now: NaiveDateTime,
) -> Result<Deck> {
    let file = File::open(path)?;
    let parsed = parse_deck(file)?;

    let title = match parsed.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => format!("Imported deck ({})", now.format(db::DATETIME_FORMAT)),
    };

    let deck = db::create_deck(conn, &title)?;
    for (question, answer) in &parsed.rows {
        db::create_card(conn, deck.id, question, answer, now.date())?;
    }
    log::info!(
        "imported deck '{}' with {} flashcards",
        deck.title,
        parsed.rows.len()
    );
    Ok(deck)
}

pub fn export_deck_to_path(deck: &Deck, cards: &[Flashcard], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_deck(deck, cards, file)
}

fn write_deck<W: Write>(deck: &Deck, cards: &[Flashcard], output: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer.write_record([DECK_TITLE_KEY, deck.title.as_str()])?;
    for card in cards {
        writer.write_record([card.question.as_str(), card.answer.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
