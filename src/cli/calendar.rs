//! Calendar commands.

use anyhow::Result;
use clap::Subcommand;

use crate::config;
use crate::core::DEFAULT_MAX_RESULTS;

use super::build_calendar;

/// Calendar subcommands
#[derive(Subcommand, Debug)]
pub enum CalendarCommands {
    /// Show upcoming events
    Upcoming {
        /// Maximum number of events
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
        limit: usize,
    },
}

/// Execute a calendar command
pub async fn execute(command: CalendarCommands) -> Result<()> {
    match command {
        CalendarCommands::Upcoming { limit } => execute_upcoming(limit).await,
    }
}

async fn execute_upcoming(limit: usize) -> Result<()> {
    let cfg = config::config()?;
    let gateway = build_calendar(cfg)
        .ok_or_else(|| anyhow::anyhow!("Calendar is not configured (set GOOGLE_CALENDAR_TOKEN)"))?;

    let events = gateway.list_upcoming(limit.max(1)).await?;
    if events.is_empty() {
        println!("No upcoming events in {}.", gateway.calendar_id());
        return Ok(());
    }

    for event in &events {
        println!(
            "{}  {}  {}",
            event.start.format("%d.%m.%Y %H:%M"),
            event.title,
            event.id
        );
    }

    Ok(())
}
