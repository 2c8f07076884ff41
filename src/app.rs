//! Command handlers for the flashcards CLI.
//!
//! The interactive study loop is written against `BufRead`/`Write` so tests
//! can drive it with in-memory cursors instead of a terminal.

use std::io::{BufRead, Write, stdin, stdout};
use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;

use flashcards_app::database::db;
use flashcards_app::export::{csv, json};
use flashcards_app::models::{CardStore, Grade, StudyScope, StudySession};
use flashcards_app::Error;

pub fn list_decks(conn: &Connection) -> Result<()> {
    let decks = db::load_decks(conn)?;
    if decks.is_empty() {
        println!("No decks yet. Create one with `flashcards new-deck <title>`.");
        return Ok(());
    }
    let today = Local::now().date_naive();
    for deck in decks {
        let store = CardStore::from_cards(db::load_cards(conn, deck.id)?);
        let due = store.due_ids(today).len();
        let display = deck.last_study_display();
        let studied = if display.is_empty() {
            "never studied".to_string()
        } else {
            format!("last studied {display}")
        };
        println!(
            "{:>4}  {:<23}  {} cards, {} due, {}",
            deck.id,
            deck.truncated_title(),
            store.len(),
            due,
            studied
        );
    }
    Ok(())
}

pub fn new_deck(conn: &Connection, title: &str) -> Result<()> {
    let deck = db::create_deck(conn, title)?;
    println!("Deck '{}' created with id {}.", deck.title, deck.id);
    Ok(())
}

pub fn rename_deck(conn: &Connection, deck_id: i64, title: &str) -> Result<()> {
    let mut deck = db::load_deck(conn, deck_id)?;
    deck.set_title(title)?;
    db::update_deck(conn, &deck)?;
    println!("Deck {} renamed to '{}'.", deck.id, deck.title);
    Ok(())
}

pub fn delete_deck(conn: &Connection, deck_id: i64) -> Result<()> {
    db::delete_deck(conn, deck_id)?;
    println!("Deck {deck_id} and its flashcards deleted.");
    Ok(())
}

pub fn list_cards(conn: &Connection, deck_id: i64) -> Result<()> {
    let deck = db::load_deck(conn, deck_id)?;
    let cards = db::load_cards(conn, deck_id)?;
    println!("{} ({} cards)", deck.title, cards.len());
    for card in cards {
        println!(
            "{:>4}  {} -> {}  [due {}, interval {}d, easiness {:.2}, repetitions {}]",
            card.id,
            card.question,
            card.answer,
            card.due_date_string(),
            card.interval_days,
            card.easiness,
            card.repetitions
        );
    }
    Ok(())
}

pub fn add_card(conn: &Connection, deck_id: i64, question: &str, answer: &str) -> Result<()> {
    let today = Local::now().date_naive();
    let card = db::create_card(conn, deck_id, question, answer, today)?;
    println!("Flashcard {} added, due today.", card.id);
    Ok(())
}

pub fn edit_card(conn: &Connection, card_id: i64, question: &str, answer: &str) -> Result<()> {
    let mut card = db::load_card(conn, card_id)?;
    card.set_content(question, answer)?;
    db::save_card(conn, &card)?;
    println!("Flashcard {} updated.", card.id);
    Ok(())
}

pub fn delete_card(conn: &Connection, card_id: i64) -> Result<()> {
    db::delete_card(conn, card_id)?;
    println!("Flashcard {card_id} deleted.");
    Ok(())
}

pub fn study(conn: &Connection, deck_id: i64, all: bool) -> Result<()> {
    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();
    let mut rng = rand::rng();
    let now = Local::now().naive_local();
    run_study(conn, deck_id, all, now, &mut stdin, &mut stdout, &mut rng)
}

fn run_study<R, W>(
    conn: &Connection,
    deck_id: i64,
    include_all: bool,
    now: NaiveDateTime,
    stdin: &mut R,
    stdout: &mut W,
    rng: &mut impl rand::Rng,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut deck = db::load_deck(conn, deck_id)?;
    let mut store = CardStore::from_cards(db::load_cards(conn, deck_id)?);
    if store.is_empty() {
        writeln!(
            stdout,
            "This deck is empty. Add some flashcards to it first."
        )?;
        return Ok(());
    }

    let scope = if include_all {
        StudyScope::AllCards
    } else {
        StudyScope::DueOnly
    };
    let mut session = match StudySession::begin(&mut deck, &store, scope, now, rng) {
        Ok(session) => session,
        Err(Error::EmptySession) if scope == StudyScope::DueOnly => {
            write!(
                stdout,
                "There is no due flashcard. Would you like to go over all of them? [y/N] "
            )?;
            stdout.flush()?;
            if !read_line(stdin)?.trim().eq_ignore_ascii_case("y") {
                return Ok(());
            }
            StudySession::begin(&mut deck, &store, StudyScope::AllCards, now, rng)?
        }
        Err(err) => return Err(err.into()),
    };

    // The deck's last-study stamp is part of session start, not of grading.
    db::update_deck(conn, &deck)?;

    let total = session.len();
    while let Some(card_id) = session.current_id() {
        let (question, answer) = {
            let card = store.get(card_id).ok_or(Error::CardNotFound(card_id))?;
            (card.question.clone(), card.answer.clone())
        };

        writeln!(
            stdout,
            "\nDeck: {} | Flashcard {} out of {}",
            deck.truncated_title(),
            session.position() + 1,
            total
        )?;
        writeln!(stdout, "Q: {question}")?;
        write!(stdout, "[Enter] to show the answer ")?;
        stdout.flush()?;
        read_line(stdin)?;
        session.reveal();
        writeln!(stdout, "A: {answer}")?;

        let grade = loop {
            write!(stdout, "Grade [0-4] (0 = very hard, 4 = super easy): ")?;
            stdout.flush()?;
            match read_line(stdin)?.trim().parse::<u8>().ok().map(Grade::from_score) {
                Some(Ok(grade)) => break grade,
                _ => writeln!(stdout, "Please enter a number between 0 and 4.")?,
            }
        };

        let updated = session.grade(&mut store, grade, now)?;
        db::save_card(conn, &updated)?;
    }

    writeln!(stdout, "\nAll done! Congrats!")?;
    Ok(())
}

pub fn import_deck(conn: &Connection, file: &Path) -> Result<()> {
    let now = Local::now().naive_local();
    let deck = csv::import_deck_from_path(conn, file, now)?;
    let count = db::load_cards(conn, deck.id)?.len();
    println!(
        "Imported deck '{}' (id {}) with {} flashcards.",
        deck.title, deck.id, count
    );
    Ok(())
}

pub fn export_deck(conn: &Connection, deck_id: i64, file: &Path) -> Result<()> {
    let deck = db::load_deck(conn, deck_id)?;
    let cards = db::load_cards(conn, deck_id)?;
    csv::export_deck_to_path(&deck, &cards, file)?;
    println!(
        "Exported deck '{}' with {} flashcards to {:?}.",
        deck.title,
        cards.len(),
        file
    );
    Ok(())
}

pub fn backup_deck(conn: &Connection, deck_id: i64, file: &Path) -> Result<()> {
    let deck = db::load_deck(conn, deck_id)?;
    let cards = db::load_cards(conn, deck_id)?;
    json::export_backup_to_path(&deck, &cards, file)?;
    println!("Backed up deck '{}' to {:?}.", deck.title, file);
    Ok(())
}

pub fn restore_deck(conn: &Connection, file: &Path) -> Result<()> {
    let deck = json::restore_backup(conn, file)?;
    println!("Restored deck '{}' with id {}.", deck.title, deck.id);
    Ok(())
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn seeded_deck(conn: &Connection, due: NaiveDate) -> i64 {
        let deck = db::create_deck(conn, "Polish").unwrap();
        db::create_card(conn, deck.id, "cześć", "hello", due).unwrap();
        db::create_card(conn, deck.id, "dziękuję", "thank you", due).unwrap();
        deck.id
    }

    #[test]
    fn test_study_grades_every_due_card_and_persists() {
        let conn = db::open_in_memory().unwrap();
        let now = noon(2024, 6, 1);
        let deck_id = seeded_deck(&conn, now.date());

        // Two cards: Enter to reveal, then a grade, twice.
        let mut input = Cursor::new(b"\n4\n\n2\n".to_vec());
        let mut output = Cursor::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(3);

        run_study(&conn, deck_id, false, now, &mut input, &mut output, &mut rng).unwrap();

        let text = String::from_utf8(output.into_inner()).unwrap();
        assert!(text.contains("Flashcard 1 out of 2"));
        assert!(text.contains("Flashcard 2 out of 2"));
        assert!(text.contains("All done! Congrats!"));

        for card in db::load_cards(&conn, deck_id).unwrap() {
            assert_eq!(card.repetitions, 1);
            assert_eq!(card.interval_days, 1);
            assert_eq!(card.due_date_string(), "2024-06-02");
            assert_eq!(card.last_study_date, Some(now));
        }
        let deck = db::load_deck(&conn, deck_id).unwrap();
        assert_eq!(deck.last_study_time, Some(now));
    }

    #[test]
    fn test_invalid_grade_input_is_asked_again() {
        let conn = db::open_in_memory().unwrap();
        let now = noon(2024, 6, 1);
        let deck = db::create_deck(&conn, "One").unwrap();
        db::create_card(&conn, deck.id, "q", "a", now.date()).unwrap();

        // Reveal, then "7" and "x" are rejected before "3" is accepted.
        let mut input = Cursor::new(b"\n7\nx\n3\n".to_vec());
        let mut output = Cursor::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(1);

        run_study(&conn, deck.id, false, now, &mut input, &mut output, &mut rng).unwrap();

        let text = String::from_utf8(output.into_inner()).unwrap();
        assert_eq!(
            text.matches("Please enter a number between 0 and 4.").count(),
            2
        );

        let cards = db::load_cards(&conn, deck.id).unwrap();
        assert_eq!(cards[0].repetitions, 1);
    }

    #[test]
    fn test_no_due_cards_offers_the_full_deck() {
        let conn = db::open_in_memory().unwrap();
        // Cards due tomorrow; studying today finds nothing due.
        let deck_id = seeded_deck(&conn, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        let now = noon(2024, 6, 1);

        let mut input = Cursor::new(b"y\n\n4\n\n4\n".to_vec());
        let mut output = Cursor::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(5);

        run_study(&conn, deck_id, false, now, &mut input, &mut output, &mut rng).unwrap();

        let text = String::from_utf8(output.into_inner()).unwrap();
        assert!(text.contains("There is no due flashcard."));
        assert!(text.contains("All done! Congrats!"));
    }

    #[test]
    fn test_declining_the_fallback_ends_quietly() {
        let conn = db::open_in_memory().unwrap();
        let deck_id = seeded_deck(&conn, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        let now = noon(2024, 6, 1);

        let mut input = Cursor::new(b"n\n".to_vec());
        let mut output = Cursor::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(5);

        run_study(&conn, deck_id, false, now, &mut input, &mut output, &mut rng).unwrap();

        let text = String::from_utf8(output.into_inner()).unwrap();
        assert!(!text.contains("All done!"));

        // Nothing was graded.
        for card in db::load_cards(&conn, deck_id).unwrap() {
            assert_eq!(card.repetitions, 0);
            assert!(card.last_study_date.is_none());
        }
    }

    #[test]
    fn test_studying_an_empty_deck_explains_itself() {
        let conn = db::open_in_memory().unwrap();
        let deck = db::create_deck(&conn, "Empty").unwrap();

        let mut input = Cursor::new(Vec::new());
        let mut output = Cursor::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(1);

        run_study(
            &conn,
            deck.id,
            false,
            noon(2024, 6, 1),
            &mut input,
            &mut output,
            &mut rng,
        )
        .unwrap();

        let text = String::from_utf8(output.into_inner()).unwrap();
        assert!(text.contains("This deck is empty."));
    }
}
