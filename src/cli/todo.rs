//! TODO list commands.
//!
//! - `voice-notes todo add <task>` - Add a task to TODO.md
//! - `voice-notes todo list` - Show tasks grouped by section

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use crate::config;
use crate::core::TodoMutator;
use crate::domain::Priority;

use super::build_vault;

/// TODO subcommands
#[derive(Subcommand, Debug)]
pub enum TodoCommands {
    /// Add a task
    Add {
        /// Task text
        task: String,

        /// Priority: high, medium or low
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Show tasks grouped by section
    List,
}

/// Execute a TODO command
pub async fn execute(command: TodoCommands) -> Result<()> {
    match command {
        TodoCommands::Add { task, priority, due } => execute_add(&task, &priority, due.as_deref()).await,
        TodoCommands::List => execute_list().await,
    }
}

fn mutator() -> Result<TodoMutator> {
    Ok(TodoMutator::new(build_vault(config::config()?)?))
}

async fn execute_add(task: &str, priority: &str, due: Option<&str>) -> Result<()> {
    if task.trim().is_empty() {
        anyhow::bail!("Task text is empty");
    }

    let priority = Priority::parse(priority)
        .ok_or_else(|| anyhow::anyhow!("Invalid priority '{}': expected high, medium or low", priority))?;

    if let Some(due) = due {
        NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .with_context(|| format!("Invalid due date '{}': expected YYYY-MM-DD", due))?;
    }

    let line = mutator()?.add_task(task, priority, due).await?;
    println!("Added ({} priority): {}", priority, line);

    Ok(())
}

async fn execute_list() -> Result<()> {
    let sections = mutator()?.sections().await?;

    for section in &sections {
        println!("{} ({})", section.kind.header(), section.tasks.len());
        for task in &section.tasks {
            println!("  {}", task);
        }
    }

    Ok(())
}
