//! Command-line interface for voice-notes.
//!
//! Provides commands for processing transcripts, inspecting the run
//! history, and working with notes, the TODO list and the calendar
//! directly.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{
    GitHubVault, GoogleCalendarClient, MemoryCalendar, MemoryVault, OpenAiEngine, ReasoningEngine,
};
use crate::config::{self, ResolvedConfig};
use crate::core::{catalog, ActionKind, ActionRegistry, CalendarGateway, DateResolver, Orchestrator, RunLog, VaultStore};
use crate::domain::{event_end, ProcessResponse, RunRecord};

pub mod calendar;
pub mod notes;
pub mod todo;

/// voice-notes - turn voice transcripts into calendar events, tasks and notes
#[derive(Parser, Debug)]
#[command(name = "voice-notes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a transcript: pick actions, execute them, summarize
    Process {
        /// Transcript text (reads --input or stdin if not provided)
        text: Option<String>,

        /// Read the transcript from a file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,

        /// Run against an in-memory vault and calendar; nothing is written remotely
        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve a date phrase the way calendar actions do
    ResolveDate {
        /// Phrase such as "завтра в 15:00" or "2026-03-01 10:00"
        phrase: String,

        /// Event duration in minutes (prints the end time too)
        #[arg(long)]
        duration: Option<i64>,
    },

    /// List the actions offered to the reasoning engine
    Catalog {
        /// Print the full JSON schemas
        #[arg(long)]
        json: bool,
    },

    /// Show recently processed transcripts
    History {
        /// Maximum number of runs to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Show resolved configuration (debug)
    Config,

    /// Report which services are configured
    Health,

    /// Work with notes in the vault
    Notes {
        #[command(subcommand)]
        command: notes::NotesCommands,
    },

    /// Work with the TODO list
    Todo {
        #[command(subcommand)]
        command: todo::TodoCommands,
    },

    /// Work with the calendar
    Calendar {
        #[command(subcommand)]
        command: calendar::CalendarCommands,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Process {
                text,
                input,
                json,
                dry_run,
            } => process(text, input, json, dry_run).await,
            Commands::ResolveDate { phrase, duration } => resolve_date(&phrase, duration),
            Commands::Catalog { json } => show_catalog(json),
            Commands::History { limit } => show_history(limit).await,
            Commands::Config => show_config(),
            Commands::Health => show_health(),
            Commands::Notes { command } => notes::execute(command).await,
            Commands::Todo { command } => todo::execute(command).await,
            Commands::Calendar { command } => calendar::execute(command).await,
        }
    }
}

/// Vault store backed by the configured GitHub repository
pub(crate) fn build_vault(cfg: &ResolvedConfig) -> Result<VaultStore> {
    let github = GitHubVault::from_settings(&cfg.vault)?;
    info!(repository = %github.repository(), branch = %cfg.vault.branch, "Using GitHub vault");
    Ok(VaultStore::new(Arc::new(github)))
}

/// Calendar gateway, or `None` when no calendar token is configured
pub(crate) fn build_calendar(cfg: &ResolvedConfig) -> Option<CalendarGateway> {
    let Some(settings) = cfg.calendar.as_ref() else {
        warn!("GOOGLE_CALENDAR_TOKEN not set, calendar actions are disabled");
        return None;
    };

    let client = GoogleCalendarClient::from_settings(settings, cfg.timezone.offset);
    Some(CalendarGateway::new(
        Arc::new(client),
        settings.calendar_id.clone(),
        cfg.timezone.name.clone(),
        cfg.timezone.offset,
    ))
}

fn build_engine(cfg: &ResolvedConfig) -> Result<Arc<dyn ReasoningEngine>> {
    let engine = OpenAiEngine::from_settings(&cfg.openai)?;
    info!(model = %engine.model(), "Using OpenAI engine");
    Ok(Arc::new(engine))
}

/// Read the transcript from the argument, a file, or piped stdin
fn read_transcript(text: Option<String>, input_file: Option<PathBuf>) -> Result<String> {
    let transcript = if let Some(text) = text {
        text
    } else if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No transcript provided. Pass it as an argument, use --input <file> or pipe to stdin");
    };

    let transcript = transcript.trim().to_string();
    if transcript.is_empty() {
        anyhow::bail!("Transcript is empty");
    }
    Ok(transcript)
}

/// Process one transcript end to end
async fn process(text: Option<String>, input_file: Option<PathBuf>, json: bool, dry_run: bool) -> Result<()> {
    let transcript = read_transcript(text, input_file)?;
    let cfg = config::config()?;
    let engine = build_engine(cfg)?;
    let dates = DateResolver::new(cfg.timezone.offset);

    // Dry runs write to memory only
    let memory_vault = Arc::new(MemoryVault::new());
    let memory_calendar = Arc::new(MemoryCalendar::new());
    let registry = if dry_run {
        let gateway = CalendarGateway::new(
            memory_calendar.clone(),
            "dry-run",
            cfg.timezone.name.clone(),
            cfg.timezone.offset,
        );
        ActionRegistry::from_parts(VaultStore::new(memory_vault.clone()), Some(gateway), dates)
    } else {
        ActionRegistry::from_parts(build_vault(cfg)?, build_calendar(cfg), dates)
    };

    let orchestrator = Orchestrator::new(engine, registry, cfg.timezone.name.clone());
    let result = orchestrator.process(&transcript).await;

    let (response, record) = match &result {
        Ok(report) => (
            ProcessResponse::success(&transcript, report),
            RunRecord::completed(&transcript, report),
        ),
        Err(e) => (
            ProcessResponse::failure(&transcript, e),
            RunRecord::failed(&transcript, e),
        ),
    };

    if !dry_run {
        let log = RunLog::open_default()?;
        if let Err(e) = log.append(&record).await {
            warn!(error = %e, "Failed to record run");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    if dry_run {
        print_dry_run(&memory_vault, &memory_calendar);
    }

    match result {
        Ok(report) => {
            eprintln!("\n[Run {} completed: {} action(s)]", report.run_id, report.outcomes.len());
            Ok(())
        }
        Err(_) => std::process::exit(1),
    }
}

fn print_response(response: &ProcessResponse) {
    if !response.success {
        eprintln!(
            "{}: {}",
            response.error.as_deref().unwrap_or("Processing failed"),
            response.details.as_deref().unwrap_or("")
        );
        return;
    }

    if response.actions.is_empty() {
        println!("No actions taken.");
    } else {
        println!("Actions:");
        for (i, outcome) in response.actions.iter().enumerate() {
            println!(
                "  {}. {} {}",
                i + 1,
                outcome.name,
                serde_json::Value::Object(outcome.arguments.clone())
            );
            for line in outcome.result.lines() {
                println!("     {}", line);
            }
        }
    }

    if let Some(summary) = &response.agent_summary {
        println!();
        println!("{}", summary);
    }
}

fn print_dry_run(vault: &MemoryVault, calendar: &MemoryCalendar) {
    println!();
    println!("Dry run: nothing was written remotely");
    println!("══════════════════════════════════════════════════════════════");

    for commit in vault.commits() {
        println!("commit: {} ({})", commit.message, commit.path);
    }
    for path in vault.paths() {
        println!();
        println!("── {} ──", path);
        println!("{}", vault.content(&path).unwrap_or_default());
    }
    for event in calendar.created() {
        println!();
        println!(
            "event: {} {} → {} ({})",
            event.title,
            event.start.to_rfc3339(),
            event.end.to_rfc3339(),
            event.timezone
        );
    }
}

/// Resolve a date phrase in the configured timezone
fn resolve_date(phrase: &str, duration: Option<i64>) -> Result<()> {
    let cfg = config::config()?;
    let resolver = DateResolver::new(cfg.timezone.offset);

    let start = resolver.resolve(phrase);
    println!("Start: {}", start.to_rfc3339());
    if let Some(minutes) = duration {
        let end = event_end(start, Some(minutes), None)?;
        println!("End:   {}", end.to_rfc3339());
    }

    Ok(())
}

fn show_catalog(json: bool) -> Result<()> {
    let specs = catalog();

    if json {
        let schemas: Vec<serde_json::Value> = specs
            .iter()
            .map(|spec| {
                serde_json::json!({
                    "name": spec.name,
                    "description": spec.description,
                    "parameters": spec.parameters,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    for spec in &specs {
        let calendar = ActionKind::from_name(&spec.name).is_some_and(ActionKind::is_calendar);
        println!(
            "{:<22} {}{}",
            spec.name,
            spec.description,
            if calendar { " [calendar]" } else { "" }
        );
    }

    Ok(())
}

/// Show recent runs from the run log
async fn show_history(limit: usize) -> Result<()> {
    let log = RunLog::open_default()?;
    let records = log.recent(limit).await?;

    if records.is_empty() {
        println!("No runs recorded in {}", log.path().display());
        return Ok(());
    }

    for record in &records {
        let status = if record.is_success() { "ok" } else { "failed" };
        println!(
            "{}  {}  {:<6}  {} action(s)",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.id,
            status,
            record.outcomes.len()
        );
        println!("    transcript: {}", preview(&record.transcript, 80));
        if let Some(summary) = &record.summary {
            println!("    summary:    {}", preview(summary, 80));
        }
        if let Some(error) = &record.error {
            println!("    error:      {}", preview(error, 80));
        }
    }

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        format!("{}…", flat.chars().take(max_chars).collect::<String>())
    }
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("voice-notes configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:     {}", cfg.home.display());
    println!("  Run log:  {}", cfg.home.join("runs.jsonl").display());
    println!();
    println!("OpenAI:");
    println!("  Model:    {}", cfg.openai.model);
    println!("  Base URL: {}", cfg.openai.base_url);
    println!("  API key:  {}", set_or_missing(cfg.openai.api_key.is_some()));
    println!();
    println!("Vault:");
    println!(
        "  Repo:     {}",
        cfg.vault.repository().unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  Branch:   {}", cfg.vault.branch);
    println!("  Token:    {}", set_or_missing(cfg.vault.token.is_some()));
    println!();
    println!("Calendar:");
    match &cfg.calendar {
        Some(calendar) => {
            println!("  Calendar: {}", calendar.calendar_id);
            println!("  Token:    set");
        }
        None => println!("  (disabled - GOOGLE_CALENDAR_TOKEN not set)"),
    }
    println!();
    println!("Timezone: {} (UTC{})", cfg.timezone.name, cfg.timezone.offset);

    Ok(())
}

fn set_or_missing(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "missing"
    }
}

/// Which collaborators are configured
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub services: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_repository: Option<String>,
    pub vault_branch: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub openai: bool,
    pub github: bool,
    pub google_calendar: bool,
}

impl HealthReport {
    pub fn from_config(cfg: &ResolvedConfig) -> Self {
        let services = ServiceStatus {
            openai: cfg.openai.api_key.is_some(),
            github: cfg.vault.is_configured(),
            google_calendar: cfg.calendar.is_some(),
        };

        // Calendar is optional
        let status = if services.openai && services.github {
            "healthy"
        } else {
            "degraded"
        };

        Self {
            status,
            services,
            vault_repository: cfg.vault.repository(),
            vault_branch: cfg.vault.branch.clone(),
            timezone: cfg.timezone.name.clone(),
        }
    }
}

fn show_health() -> Result<()> {
    let report = HealthReport::from_config(config::config()?);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
