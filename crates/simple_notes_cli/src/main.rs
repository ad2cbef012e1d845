//! Terminal front end for Simple Notes.
//!
//! # Responsibility
//! - Validate form input before it reaches the store.
//! - Render the derived view and the store's status messages.
//! - Provide the delete confirmation the store requires.

mod confirm;
mod form;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use confirm::PromptConfirm;
use log::info;
use simple_notes_core::{
    core_version, default_log_level, init_logging, DeleteOutcome, KeyValueStorage, NoteDraft,
    NoteId, NoteRepository, NoteStore, SqliteStorage,
};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simple-notes")]
#[command(about = "Local-only notes, stored in a single SQLite file")]
struct Cli {
    /// Notes database file
    #[arg(long, env = "SIMPLE_NOTES_DB", default_value = "simple_notes.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "SIMPLE_NOTES_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "SIMPLE_NOTES_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes, most recently updated first
    List,

    /// Add a new note
    Add {
        /// Note title (required, surrounding whitespace is trimmed)
        #[arg(short, long)]
        title: String,

        /// Note body
        #[arg(short, long, default_value = "")]
        body: String,
    },

    /// Edit an existing note; omitted fields keep their current value
    Edit {
        /// Note ID
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        body: Option<String>,
    },

    /// Delete a note after confirmation
    Delete {
        /// Note ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the core version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("initializing logging")?;
        info!("event=cli_start module=cli status=ok level={level}");
    }

    if let Commands::Version = cli.command {
        println!("simple_notes_core version={}", core_version());
        return Ok(());
    }

    let storage = SqliteStorage::open(&cli.db)
        .with_context(|| format!("opening notes database `{}`", cli.db.display()))?;
    let mut store = NoteStore::open(NoteRepository::new(storage));

    match cli.command {
        Commands::List => handle_list(&store),
        Commands::Add { title, body } => handle_add(&mut store, title, body),
        Commands::Edit { id, title, body } => handle_edit(&mut store, NoteId::new(id), title, body),
        Commands::Delete { id, yes } => handle_delete(&mut store, NoteId::new(id), yes),
        Commands::Version => Ok(()),
    }
}

fn handle_list<S: KeyValueStorage>(store: &NoteStore<S>) -> Result<()> {
    let view = store.derived_view();
    print!(
        "{}",
        render::render_list(&view, store.editing_id(), render::format_timestamp)
    );
    Ok(())
}

fn handle_add<S: KeyValueStorage>(store: &mut NoteStore<S>, title: String, body: String) -> Result<()> {
    let request = NoteDraft::new(title, body).validate()?;
    store.save(request)?;
    print_status(store);
    Ok(())
}

fn handle_edit<S: KeyValueStorage>(
    store: &mut NoteStore<S>,
    id: NoteId,
    title: Option<String>,
    body: Option<String>,
) -> Result<()> {
    form::submit_edit(store, &id, title, body)?;
    print_status(store);
    Ok(())
}

fn handle_delete<S: KeyValueStorage>(store: &mut NoteStore<S>, id: NoteId, yes: bool) -> Result<()> {
    let outcome = if yes {
        DeleteOutcome::Deleted(store.delete(&id)?)
    } else {
        let stdin = io::stdin();
        let mut confirm = PromptConfirm::new(stdin.lock(), io::stderr());
        store.confirm_and_delete(&id, &mut confirm)?
    };

    match outcome {
        DeleteOutcome::Declined => {
            info!("event=note_delete module=cli status=declined");
            println!("Delete canceled.");
        }
        DeleteOutcome::Deleted(_) => print_status(store),
    }
    Ok(())
}

fn print_status<S: KeyValueStorage>(store: &NoteStore<S>) {
    if let Some(message) = store.status_message() {
        println!("{message}");
    }
}
