//! Configuration for prismlog
//!
//! [`LogOptions`] is what a [`Logger`](crate::Logger) is built from. [`ConfigFile`]
//! is the TOML document the binary reads from `~/.prismlog/config.toml`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorTable};
use crate::error::LogError;
use crate::severity::Severity;

/// Default date layout, e.g. `07-Mar-2026`
pub const DEFAULT_DATE_FORMAT: &str = "%d-%b-%Y";

/// Default rotation schedule when no policy is configured
pub const DEFAULT_SCHEDULE: &str = "@midnight";

/// Timezone used for timestamps, file names and schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    #[default]
    Local,
    Utc,
    Named(Tz),
}

impl Zone {
    /// Parse a timezone name; empty and `Local` mean the system zone
    pub fn parse(name: &str) -> Result<Zone, LogError> {
        match name.trim() {
            "" | "Local" | "local" => Ok(Zone::Local),
            "UTC" | "utc" => Ok(Zone::Utc),
            other => other
                .parse::<Tz>()
                .map(Zone::Named)
                .map_err(|_| LogError::InvalidTimezone(other.to_string())),
        }
    }

    /// Like [`Zone::parse`], falling back to the system zone on bad input
    pub fn resolve(name: &str) -> Zone {
        Zone::parse(name).unwrap_or_else(|e| {
            tracing::warn!("{}, using local time", e);
            Zone::Local
        })
    }

    /// Express a UTC instant in this zone
    pub fn convert(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => instant.with_timezone(&Local).fixed_offset(),
            Zone::Utc => instant.fixed_offset(),
            Zone::Named(tz) => instant.with_timezone(tz).fixed_offset(),
        }
    }
}

/// Check a `strftime` layout, falling back to [`DEFAULT_DATE_FORMAT`]
pub fn resolve_date_format(format: &str) -> String {
    if format.is_empty() {
        return DEFAULT_DATE_FORMAT.to_string();
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        tracing::warn!("Invalid date format '{}', using default", format);
        return DEFAULT_DATE_FORMAT.to_string();
    }
    format.to_string()
}

/// When to rotate and how many files to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Trigger expression, cron syntax or an `@` descriptor
    pub schedule: String,
    /// Maximum entries kept in the log directory; 0 keeps everything
    pub max_files: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            schedule: DEFAULT_SCHEDULE.to_string(),
            max_files: 0,
        }
    }
}

/// File-backed logging settings
#[derive(Debug, Clone)]
pub struct FileOptions {
    pub logs_dir: PathBuf,
    /// Base name; files are `<logs_dir>/<file_name>-<date>.log`
    pub file_name: String,
    /// Layout of the date part of file names
    pub date_format: String,
    /// Zone used for file names and the rotation schedule
    pub timezone: String,
    pub rotation: Option<RotationPolicy>,
}

impl FileOptions {
    pub fn new(logs_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            file_name: file_name.into(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            timezone: String::new(),
            rotation: None,
        }
    }
}

/// Options a logger is constructed from
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Allow colored output on terminal destinations
    pub color: bool,
    /// Suppress all output
    pub quiet: bool,
    /// Emit Debug and Trace lines
    pub debug: bool,
    /// Prefix lines with date and time
    pub timestamp: bool,
    pub timezone: Zone,
    pub date_format: String,
    pub colors: ColorTable,
    pub file: Option<FileOptions>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            color: true,
            quiet: false,
            debug: false,
            timestamp: false,
            timezone: Zone::Local,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            colors: ColorTable::default(),
            file: None,
        }
    }
}

/// Color names as written in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorConfig {
    pub fatal: Option<String>,
    pub error: Option<String>,
    pub warn: Option<String>,
    pub info: Option<String>,
    pub debug: Option<String>,
    pub trace: Option<String>,
    pub timestamp: Option<String>,
    pub location: Option<String>,
}

/// Rotation section of the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotationConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default)]
    pub max_files: usize,
}

/// File section of the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default = "logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default)]
    pub date_format: String,
    #[serde(default)]
    pub timezone: String,
    pub rotation: Option<RotationConfig>,
}

/// On-disk configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default = "default_color")]
    pub color: bool,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub timestamp: bool,
    /// IANA name, `UTC` or empty for local time
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub date_format: String,
    #[serde(default)]
    pub colors: ColorConfig,
    pub file: Option<FileConfig>,
}

fn default_color() -> bool {
    true
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

fn default_file_name() -> String {
    "prismlog".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            color: default_color(),
            quiet: false,
            debug: false,
            timestamp: false,
            timezone: String::new(),
            date_format: String::new(),
            colors: ColorConfig::default(),
            file: None,
        }
    }
}

fn parse_color(name: &str) -> Result<Color> {
    name.parse::<Color>()
        .map_err(anyhow::Error::msg)
        .context("Invalid color in config file")
}

impl ConfigFile {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Convert into logger options
    pub fn into_options(self) -> Result<LogOptions> {
        let mut colors = ColorTable::default();
        let levels = [
            (Severity::Fatal, &self.colors.fatal),
            (Severity::Error, &self.colors.error),
            (Severity::Warn, &self.colors.warn),
            (Severity::Info, &self.colors.info),
            (Severity::Debug, &self.colors.debug),
            (Severity::Trace, &self.colors.trace),
        ];
        for (level, name) in levels {
            if let Some(name) = name {
                colors.set(level, parse_color(name)?.as_fn());
            }
        }
        if let Some(name) = &self.colors.timestamp {
            colors.timestamp = parse_color(name)?;
        }
        if let Some(name) = &self.colors.location {
            colors.location = parse_color(name)?;
        }

        let file = self.file.map(|file| FileOptions {
            logs_dir: file.logs_dir,
            file_name: file.file_name,
            date_format: resolve_date_format(&file.date_format),
            timezone: file.timezone,
            rotation: file.rotation.map(|r| RotationPolicy {
                schedule: r.schedule,
                max_files: r.max_files,
            }),
        });

        Ok(LogOptions {
            color: self.color,
            quiet: self.quiet,
            debug: self.debug,
            timestamp: self.timestamp,
            timezone: Zone::resolve(&self.timezone),
            date_format: resolve_date_format(&self.date_format),
            colors,
            file,
        })
    }
}

/// Get the base configuration directory (~/.prismlog)
/// Falls back to ./.prismlog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".prismlog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".prismlog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the default logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}
