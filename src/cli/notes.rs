//! Note commands.
//!
//! - `voice-notes notes list` - List notes, optionally by folder and query
//! - `voice-notes notes read <path>` - Print one note

use anyhow::Result;
use clap::Subcommand;

use crate::config;
use crate::core::NoteBook;
use crate::domain::Folder;

use super::build_vault;

/// Note subcommands
#[derive(Subcommand, Debug)]
pub enum NotesCommands {
    /// List notes in the vault
    List {
        /// Folder to list (Ideas, Work, Personal, "Voice Notes")
        #[arg(short, long)]
        folder: Option<String>,

        /// Case-insensitive substring filter on file names
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print a note
    Read {
        /// Vault path, e.g. "Work/2026-03-01-Standup.md"
        path: String,
    },
}

/// Execute a note command
pub async fn execute(command: NotesCommands) -> Result<()> {
    match command {
        NotesCommands::List { folder, search } => execute_list(folder, search).await,
        NotesCommands::Read { path } => execute_read(&path).await,
    }
}

fn notebook() -> Result<NoteBook> {
    let cfg = config::config()?;
    Ok(NoteBook::new(build_vault(cfg)?, cfg.timezone.offset))
}

async fn execute_list(folder: Option<String>, search: Option<String>) -> Result<()> {
    let folder = folder
        .map(|name| Folder::parse(&name).ok_or_else(|| anyhow::anyhow!("Unknown folder: {}", name)))
        .transpose()?;

    let paths = notebook()?.list(folder, search.as_deref()).await?;
    if paths.is_empty() {
        println!("No notes found.");
        return Ok(());
    }

    for path in &paths {
        println!("{}", path);
    }
    eprintln!("\n{} note(s)", paths.len());

    Ok(())
}

async fn execute_read(path: &str) -> Result<()> {
    let content = notebook()?.read(path).await?;
    println!("{}", content);
    Ok(())
}
