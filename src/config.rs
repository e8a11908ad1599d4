//! Configuration for voice-notes.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VOICE_NOTES_HOME, OPENAI_MODEL, GITHUB_REPO_OWNER, ...)
//! 2. Config file (.voice-notes/config.yaml)
//! 3. Defaults (~/.voice-notes, gpt-4o-mini, branch main, Europe/Moscow)
//!
//! Secrets (OPENAI_API_KEY, GITHUB_TOKEN, GOOGLE_CALENDAR_TOKEN) are only
//! read from the environment.
//!
//! Config file discovery:
//! - Searches current directory and parents for .voice-notes/config.yaml
//! - `paths.home` is relative to the .voice-notes directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;

use crate::adapters::github::GITHUB_API;
use crate::adapters::google_calendar::GOOGLE_CALENDAR_API;
use crate::adapters::openai::OPENAI_API;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".voice-notes";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f64 = 0.3;
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_CALENDAR_ID: &str = "primary";
const DEFAULT_TIMEZONE: &str = "Europe/Moscow";
const DEFAULT_UTC_OFFSET: &str = "+03:00";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub timezone: TimezoneConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .voice-notes/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultConfig {
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub branch: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarConfig {
    pub calendar_id: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimezoneConfig {
    /// IANA name sent with calendar events
    pub name: Option<String>,
    /// Fixed offset used for all local dates, e.g. "+03:00"
    pub utc_offset: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the state directory
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub openai: OpenAiSettings,
    pub vault: VaultSettings,
    /// Present only when a calendar token is set
    pub calendar: Option<CalendarSettings>,
    pub timezone: TimezoneSettings,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct VaultSettings {
    pub token: Option<String>,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub branch: String,
    pub api_base: String,
}

impl VaultSettings {
    /// Whether enough is set to talk to GitHub
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.repo_owner.is_some() && self.repo_name.is_some()
    }

    /// `owner/repo` label, if both are set
    pub fn repository(&self) -> Option<String> {
        match (&self.repo_owner, &self.repo_name) {
            (Some(owner), Some(name)) => Some(format!("{}/{}", owner, name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalendarSettings {
    pub token: String,
    pub calendar_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct TimezoneSettings {
    pub name: String,
    pub offset: FixedOffset,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Parse a UTC offset such as "+03:00", "-0530" or "+3"
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    let invalid = || anyhow::anyhow!("Invalid UTC offset '{}', expected e.g. +03:00", value);

    let (sign, rest) = match value.chars().next() {
        Some('+') => (1, &value[1..]),
        Some('-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>()?, 0)
    } else {
        let split = digits.len() - 2;
        (digits[..split].parse::<i32>()?, digits[split..].parse::<i32>()?)
    };
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Build the resolved configuration from an optional file and an env lookup
fn resolve<E>(config_path: Option<&Path>, file: ConfigFile, default_home: PathBuf, env: E) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    // Resolve home path
    let home = if let Some(env_home) = env("VOICE_NOTES_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(home_path), Some(config_path)) = (&file.paths.home, config_path) {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        resolve_path(config_dir, home_path)
    } else {
        default_home
    };

    let openai = OpenAiSettings {
        api_key: env("OPENAI_API_KEY"),
        model: env("OPENAI_MODEL")
            .or(file.openai.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        base_url: env("OPENAI_BASE_URL")
            .or(file.openai.base_url)
            .unwrap_or_else(|| OPENAI_API.to_string()),
        temperature: file.openai.temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };

    let vault = VaultSettings {
        token: env("GITHUB_TOKEN"),
        repo_owner: env("GITHUB_REPO_OWNER").or(file.vault.repo_owner),
        repo_name: env("GITHUB_REPO_NAME").or(file.vault.repo_name),
        branch: env("GITHUB_BRANCH")
            .or(file.vault.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        api_base: file.vault.api_base.unwrap_or_else(|| GITHUB_API.to_string()),
    };

    let calendar = env("GOOGLE_CALENDAR_TOKEN").map(|token| CalendarSettings {
        token,
        calendar_id: env("GOOGLE_CALENDAR_ID")
            .or(file.calendar.calendar_id.clone())
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
        api_base: file
            .calendar
            .api_base
            .clone()
            .unwrap_or_else(|| GOOGLE_CALENDAR_API.to_string()),
    });

    let offset_text = env("VOICE_NOTES_UTC_OFFSET")
        .or(file.timezone.utc_offset)
        .unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string());
    let timezone = TimezoneSettings {
        name: env("VOICE_NOTES_TIMEZONE")
            .or(file.timezone.name)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        offset: parse_utc_offset(&offset_text)?,
    };

    Ok(ResolvedConfig {
        home,
        config_file: config_path.map(Path::to_path_buf),
        openai,
        vault,
        calendar,
        timezone,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    // Check for config file
    let config_file = find_config_file();
    let file = match config_file {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    resolve(config_file.as_deref(), file, default_home, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (bypasses the cache)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the state directory
pub fn home_dir() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = resolve(None, ConfigFile::default(), PathBuf::from("/home/u/.voice-notes"), env_from(&[])).unwrap();

        assert_eq!(config.home, PathBuf::from("/home/u/.voice-notes"));
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.base_url, OPENAI_API);
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.vault.branch, "main");
        assert!(!config.vault.is_configured());
        assert!(config.calendar.is_none());
        assert_eq!(config.timezone.name, "Europe/Moscow");
        assert_eq!(config.timezone.offset, FixedOffset::east_opt(3 * 3600).unwrap());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(".voice-notes");
        std::fs::create_dir_all(&config_dir).unwrap();

        let config_path = config_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./state
openai:
  model: gpt-4o
vault:
  repo_owner: alice
  repo_name: obsidian
  branch: notes
timezone:
  name: Asia/Yekaterinburg
  utc_offset: "+05:00"
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.vault.repo_owner.as_deref(), Some("alice"));

        let config = resolve(
            Some(&config_path),
            parsed,
            PathBuf::from("/unused"),
            env_from(&[("GITHUB_TOKEN", "ghp_x")]),
        )
        .unwrap();

        assert_eq!(config.home, config_dir.join("state"));
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.vault.branch, "notes");
        assert_eq!(config.vault.repository().as_deref(), Some("alice/obsidian"));
        assert!(config.vault.is_configured());
        assert_eq!(config.timezone.offset, FixedOffset::east_opt(5 * 3600).unwrap());
        assert_eq!(config.config_file.as_deref(), Some(config_path.as_path()));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            openai: OpenAiConfig {
                model: Some("gpt-4o".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let config = resolve(
            None,
            file,
            PathBuf::from("/unused"),
            env_from(&[
                ("OPENAI_MODEL", "gpt-4.1-mini"),
                ("VOICE_NOTES_HOME", "/srv/voice"),
                ("GOOGLE_CALENDAR_TOKEN", "ya29.x"),
                ("GOOGLE_CALENDAR_ID", "team@example.com"),
                ("OPENAI_BASE_URL", ""),
            ]),
        )
        .unwrap();

        assert_eq!(config.openai.model, "gpt-4.1-mini");
        assert_eq!(config.openai.base_url, OPENAI_API);
        assert_eq!(config.home, PathBuf::from("/srv/voice"));
        let calendar = config.calendar.unwrap();
        assert_eq!(calendar.calendar_id, "team@example.com");
        assert_eq!(calendar.api_base, GOOGLE_CALENDAR_API);
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+03:00").unwrap(), FixedOffset::east_opt(3 * 3600).unwrap());
        assert_eq!(parse_utc_offset("-0530").unwrap(), FixedOffset::west_opt(5 * 3600 + 1800).unwrap());
        assert_eq!(parse_utc_offset("+3").unwrap(), FixedOffset::east_opt(3 * 3600).unwrap());
        assert!(parse_utc_offset("03:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(parse_utc_offset("+ab").is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
