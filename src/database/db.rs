//! SQLite storage for decks and flashcards.
//!
//! Two tables mirror the data model one to one: `deck` and `flashcard`,
//! with the scheduling fields as additional flashcard columns. Dates cross
//! this boundary as strings — `%Y-%m-%d` for due dates (zero-padded, so
//! lexicographic order equals calendar order) and `%Y-%m-%d %H:%M:%S` for
//! timestamps — and are parsed back into real date types on load.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Error, Result};
use crate::models::{Deck, Flashcard};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Opens (or creates) the database file and makes sure the tables exist.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    log::debug!("opened database at {:?}", path);
    Ok(conn)
}

/// In-memory database with the same schema. Used by tests and callers that
/// want a scratch store.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS deck (
            deck_id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            last_study_time TEXT
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS flashcard (
            flashcard_id INTEGER PRIMARY KEY,
            deck_id INTEGER NOT NULL,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            last_study_date TEXT,
            due_date TEXT NOT NULL,
            interval_days INTEGER NOT NULL,
            easiness REAL NOT NULL,
            repetitions INTEGER NOT NULL,
            FOREIGN KEY (deck_id) REFERENCES deck (deck_id)
        )",
        (),
    )?;

    Ok(())
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_string()))
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .map_err(|_| Error::InvalidDate(text.to_string()))
}

fn datetime_to_string(time: Option<NaiveDateTime>) -> Option<String> {
    time.map(|t| t.format(DATETIME_FORMAT).to_string())
}

/// Creates a new deck row and returns the deck with its assigned id.
pub fn create_deck(conn: &Connection, title: &str) -> Result<Deck> {
    let deck = Deck::new(0, title)?;
    conn.execute(
        "INSERT INTO deck (title, last_study_time) VALUES (?1, ?2)",
        params![deck.title, Option::<String>::None],
    )?;
    Ok(Deck {
        id: conn.last_insert_rowid(),
        ..deck
    })
}

/// Loads every deck, in rowid order.
pub fn load_decks(conn: &Connection) -> Result<Vec<Deck>> {
    let mut stmt = conn.prepare("SELECT deck_id, title, last_study_time FROM deck")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut decks = Vec::with_capacity(rows.len());
    for (id, title, last_study) in rows {
        decks.push(Deck {
            id,
            title,
            last_study_time: last_study.as_deref().map(parse_datetime).transpose()?,
        });
    }
    Ok(decks)
}

pub fn load_deck(conn: &Connection, deck_id: i64) -> Result<Deck> {
    let row = conn
        .query_row(
            "SELECT deck_id, title, last_study_time FROM deck WHERE deck_id = ?1",
            params![deck_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    let (id, title, last_study) = row.ok_or(Error::DeckNotFound(deck_id))?;
    Ok(Deck {
        id,
        title,
        last_study_time: last_study.as_deref().map(parse_datetime).transpose()?,
    })
}

/// Writes a deck's title and last-study time back. Both always travel
/// together, as in the original row layout.
pub fn update_deck(conn: &Connection, deck: &Deck) -> Result<()> {
    let changed = conn.execute(
        "UPDATE deck SET title = ?1, last_study_time = ?2 WHERE deck_id = ?3",
        params![
            deck.title,
            datetime_to_string(deck.last_study_time),
            deck.id
        ],
    )?;
    if changed == 0 {
        return Err(Error::DeckNotFound(deck.id));
    }
    Ok(())
}

/// Deletes a deck and all of its flashcards in one transaction.
pub fn delete_deck(conn: &Connection, deck_id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM flashcard WHERE deck_id = ?1",
        params![deck_id],
    )?;
    let changed = tx.execute("DELETE FROM deck WHERE deck_id = ?1", params![deck_id])?;
    if changed == 0 {
        return Err(Error::DeckNotFound(deck_id));
    }
    tx.commit()?;
    Ok(())
}

fn deck_exists(conn: &Connection, deck_id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM deck WHERE deck_id = ?1",
            params![deck_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Inserts a flashcard with default scheduling state (due on `today`) and
/// returns it with its assigned id.
pub fn create_card(
    conn: &Connection,
    deck_id: i64,
    question: &str,
    answer: &str,
    today: NaiveDate,
) -> Result<Flashcard> {
    if !deck_exists(conn, deck_id)? {
        return Err(Error::DeckNotFound(deck_id));
    }
    let card = Flashcard::new(0, deck_id, question, answer, today)?;
    conn.execute(
        "INSERT INTO flashcard (deck_id, question, answer, last_study_date, due_date,
                                interval_days, easiness, repetitions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            card.deck_id,
            card.question,
            card.answer,
            Option::<String>::None,
            card.due_date_string(),
            card.interval_days,
            card.easiness,
            card.repetitions,
        ],
    )?;
    Ok(Flashcard {
        id: conn.last_insert_rowid(),
        ..card
    })
}

type CardRow = (
    i64,
    i64,
    String,
    String,
    Option<String>,
    String,
    i64,
    f64,
    i64,
);

fn card_columns(row: &rusqlite::Row) -> rusqlite::Result<CardRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn card_from_row(row: CardRow) -> Result<Flashcard> {
    let (id, deck_id, question, answer, last_study, due, interval_days, easiness, repetitions) =
        row;
    Ok(Flashcard {
        id,
        deck_id,
        question,
        answer,
        last_study_date: last_study.as_deref().map(parse_datetime).transpose()?,
        due_date: parse_date(&due)?,
        interval_days,
        easiness,
        repetitions: repetitions.max(0) as u32,
    })
}

const CARD_COLUMNS: &str = "flashcard_id, deck_id, question, answer, last_study_date, due_date,
                            interval_days, easiness, repetitions";

pub fn load_card(conn: &Connection, card_id: i64) -> Result<Flashcard> {
    let row = conn
        .query_row(
            &format!("SELECT {CARD_COLUMNS} FROM flashcard WHERE flashcard_id = ?1"),
            params![card_id],
            card_columns,
        )
        .optional()?;
    card_from_row(row.ok_or(Error::CardNotFound(card_id))?)
}

/// All flashcards of a deck, in rowid order.
pub fn load_cards(conn: &Connection, deck_id: i64) -> Result<Vec<Flashcard>> {
    if !deck_exists(conn, deck_id)? {
        return Err(Error::DeckNotFound(deck_id));
    }
    let mut stmt =
        conn.prepare(&format!("SELECT {CARD_COLUMNS} FROM flashcard WHERE deck_id = ?1"))?;
    let rows = stmt
        .query_map(params![deck_id], card_columns)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(card_from_row).collect()
}

/// Full overwrite of a card's content and scheduling fields. One UPDATE, so
/// a grading either lands completely or not at all.
pub fn save_card(conn: &Connection, card: &Flashcard) -> Result<()> {
    let changed = conn.execute(
        "UPDATE flashcard
         SET question = ?1, answer = ?2, last_study_date = ?3, due_date = ?4,
             interval_days = ?5, easiness = ?6, repetitions = ?7
         WHERE flashcard_id = ?8",
        params![
            card.question,
            card.answer,
            datetime_to_string(card.last_study_date),
            card.due_date_string(),
            card.interval_days,
            card.easiness,
            card.repetitions,
            card.id,
        ],
    )?;
    if changed == 0 {
        return Err(Error::CardNotFound(card.id));
    }
    Ok(())
}

pub fn delete_card(conn: &Connection, card_id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM flashcard WHERE flashcard_id = ?1",
        params![card_id],
    )?;
    if changed == 0 {
        return Err(Error::CardNotFound(card_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use crate::models::sm2::grade_card;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_and_load_deck() {
        let conn = open_in_memory().unwrap();

        let deck = create_deck(&conn, "Polish Vocabulary").unwrap();
        assert!(deck.id > 0);

        let loaded = load_deck(&conn, deck.id).unwrap();
        assert_eq!(loaded, deck);
        assert!(loaded.last_study_time.is_none());
    }

    #[test]
    fn test_missing_deck_is_reported() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(load_deck(&conn, 42), Err(Error::DeckNotFound(42))));
        assert!(matches!(
            load_cards(&conn, 42),
            Err(Error::DeckNotFound(42))
        ));
    }

    #[test]
    fn test_new_card_has_default_scheduling_state() {
        let conn = open_in_memory().unwrap();
        let deck = create_deck(&conn, "Test").unwrap();
        let today = date(2024, 6, 1);

        let card = create_card(&conn, deck.id, "cześć", "hello", today).unwrap();
        let loaded = load_card(&conn, card.id).unwrap();

        assert_eq!(loaded, card);
        assert_eq!(loaded.due_date, today);
        assert_eq!(loaded.interval_days, 0);
        assert_eq!(loaded.easiness, 0.0);
        assert_eq!(loaded.repetitions, 0);
    }

    #[test]
    fn test_card_for_a_missing_deck_is_rejected() {
        let conn = open_in_memory().unwrap();
        let result = create_card(&conn, 9, "q", "a", date(2024, 6, 1));
        assert!(matches!(result, Err(Error::DeckNotFound(9))));
    }

    #[test]
    fn test_grading_round_trips_through_storage() {
        let conn = open_in_memory().unwrap();
        let deck = create_deck(&conn, "Test").unwrap();
        let today = date(2024, 6, 1);
        let card = create_card(&conn, deck.id, "q", "a", today).unwrap();

        let now = today.and_hms_opt(9, 30, 0).unwrap();
        let graded = grade_card(&card, Grade::Easy, now);
        save_card(&conn, &graded).unwrap();

        let loaded = load_card(&conn, card.id).unwrap();
        assert_eq!(loaded, graded);
        assert_eq!(loaded.last_study_date, Some(now));
        assert_eq!(loaded.due_date_string(), "2024-06-02");
    }

    #[test]
    fn test_update_deck_persists_study_time() {
        let conn = open_in_memory().unwrap();
        let mut deck = create_deck(&conn, "Test").unwrap();

        let now = date(2024, 6, 1).and_hms_opt(21, 5, 3).unwrap();
        deck.record_study(now);
        update_deck(&conn, &deck).unwrap();

        let loaded = load_deck(&conn, deck.id).unwrap();
        assert_eq!(loaded.last_study_time, Some(now));
    }

    #[test]
    fn test_deleting_a_deck_cascades_to_its_cards() {
        let conn = open_in_memory().unwrap();
        let deck = create_deck(&conn, "Test").unwrap();
        let other = create_deck(&conn, "Other").unwrap();
        let today = date(2024, 6, 1);
        let card = create_card(&conn, deck.id, "q", "a", today).unwrap();
        let kept = create_card(&conn, other.id, "q2", "a2", today).unwrap();

        delete_deck(&conn, deck.id).unwrap();

        assert!(matches!(
            load_card(&conn, card.id),
            Err(Error::CardNotFound(_))
        ));
        // The other deck's cards are untouched.
        assert!(load_card(&conn, kept.id).is_ok());
    }

    #[test]
    fn test_saving_a_deleted_card_fails() {
        let conn = open_in_memory().unwrap();
        let deck = create_deck(&conn, "Test").unwrap();
        let card = create_card(&conn, deck.id, "q", "a", date(2024, 6, 1)).unwrap();

        delete_card(&conn, card.id).unwrap();

        assert!(matches!(
            save_card(&conn, &card),
            Err(Error::CardNotFound(_))
        ));
        assert!(matches!(
            delete_card(&conn, card.id),
            Err(Error::CardNotFound(_))
        ));
    }

    #[test]
    fn test_due_dates_are_stored_as_padded_strings() {
        let conn = open_in_memory().unwrap();
        let deck = create_deck(&conn, "Test").unwrap();
        create_card(&conn, deck.id, "q", "a", date(2024, 3, 7)).unwrap();

        let stored: String = conn
            .query_row("SELECT due_date FROM flashcard", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "2024-03-07");
    }
}
