//! Severity levels and their fixed prefixes

use std::fmt;
use std::str::FromStr;

use crate::color::Color;

/// Urgency of a log event, ordered from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Severity {
    /// All severities, most urgent first
    pub const ALL: [Severity; 6] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
        Severity::Trace,
    ];

    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Trace => "TRACE",
        }
    }

    /// Plain-text prefix written in front of every line, always 8 bytes wide
    pub fn prefix(&self) -> &'static [u8] {
        match self {
            Severity::Fatal => b"[FATAL] ",
            Severity::Error => b"[ERROR] ",
            Severity::Warn => b"[WARN]  ",
            Severity::Info => b"[INFO]  ",
            Severity::Debug => b"[DEBUG] ",
            Severity::Trace => b"[TRACE] ",
        }
    }

    /// Color used for prefix and body when no override is configured
    pub fn default_color(&self) -> Color {
        match self {
            Severity::Fatal | Severity::Error => Color::Red,
            Severity::Warn => Color::Orange,
            Severity::Info => Color::Green,
            Severity::Debug => Color::Purple,
            Severity::Trace => Color::Cyan,
        }
    }

    /// Whether lines at this level carry a `function:file:line` tag
    pub fn shows_location(&self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error | Severity::Debug)
    }

    /// Debug and Trace are only emitted when the logger's debug flag is set
    pub fn is_debug_gated(&self) -> bool {
        matches!(self, Severity::Debug | Severity::Trace)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown severity '{}'", s))
    }
}

/// Fixed-size table keyed by severity
#[derive(Clone)]
pub struct PerSeverity<T> {
    slots: [T; 6],
}

impl<T: Default> Default for PerSeverity<T> {
    fn default() -> Self {
        Self {
            slots: Default::default(),
        }
    }
}

impl<T> PerSeverity<T> {
    pub fn get(&self, severity: Severity) -> &T {
        &self.slots[severity.index()]
    }

    pub fn set(&mut self, severity: Severity, value: T) {
        self.slots[severity.index()] = value;
    }
}
