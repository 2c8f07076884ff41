mod app;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flashcards_app::database::db;
use std::path::PathBuf;

/// Spaced-repetition flashcard trainer.
#[derive(Parser)]
#[command(name = "flashcards", version)]
struct Cli {
    /// Path to the flashcard database
    #[arg(long, default_value = "Flashcards.db")]
    database: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all decks
    Decks,
    /// Create a new deck
    NewDeck { title: String },
    /// Rename a deck
    RenameDeck { deck_id: i64, title: String },
    /// Delete a deck and all of its flashcards
    DeleteDeck { deck_id: i64 },
    /// List the flashcards of a deck
    Cards { deck_id: i64 },
    /// Add a flashcard to a deck
    AddCard {
        deck_id: i64,
        question: String,
        answer: String,
    },
    /// Change a flashcard's question and answer
    EditCard {
        card_id: i64,
        question: String,
        answer: String,
    },
    /// Delete a flashcard
    DeleteCard { card_id: i64 },
    /// Study a deck (due flashcards only, unless --all)
    Study {
        deck_id: i64,
        /// Include flashcards that are not due yet
        #[arg(long)]
        all: bool,
    },
    /// Import a deck from a key/value CSV file
    Import { file: PathBuf },
    /// Export a deck to a key/value CSV file
    Export { deck_id: i64, file: PathBuf },
    /// Write a JSON backup of a deck, scheduling state included
    Backup { deck_id: i64, file: PathBuf },
    /// Recreate a deck from a JSON backup
    Restore { file: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let conn = db::open(&cli.database)?;

    match cli.command {
        Command::Decks => app::list_decks(&conn),
        Command::NewDeck { title } => app::new_deck(&conn, &title),
        Command::RenameDeck { deck_id, title } => app::rename_deck(&conn, deck_id, &title),
        Command::DeleteDeck { deck_id } => app::delete_deck(&conn, deck_id),
        Command::Cards { deck_id } => app::list_cards(&conn, deck_id),
        Command::AddCard {
            deck_id,
            question,
            answer,
        } => app::add_card(&conn, deck_id, &question, &answer),
        Command::EditCard {
            card_id,
            question,
            answer,
        } => app::edit_card(&conn, card_id, &question, &answer),
        Command::DeleteCard { card_id } => app::delete_card(&conn, card_id),
        Command::Study { deck_id, all } => app::study(&conn, deck_id, all),
        Command::Import { file } => app::import_deck(&conn, &file),
        Command::Export { deck_id, file } => app::export_deck(&conn, deck_id, &file),
        Command::Backup { deck_id, file } => app::backup_deck(&conn, deck_id, &file),
        Command::Restore { file } => app::restore_deck(&conn, &file),
    }
}
