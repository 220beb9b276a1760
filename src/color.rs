//! ANSI color codec
//!
//! Wraps byte payloads in color escape sequences and strips them back out.
//! Each [`Logger`](crate::Logger) owns its own [`ColorTable`], so overriding a
//! level's color never leaks into other loggers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::severity::{PerSeverity, Severity};

/// Sequence that resets all attributes
pub const OFF: &[u8] = b"\x1b[0m";

/// A colorizing function, mapping raw bytes to colored bytes
pub type ColorFn = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// Palette used by the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Orange,
    Blue,
    Purple,
    Cyan,
    Gray,
}

impl Color {
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Green,
        Color::Orange,
        Color::Blue,
        Color::Purple,
        Color::Cyan,
        Color::Gray,
    ];

    /// The "on" escape sequence for this color
    pub fn on(&self) -> &'static [u8] {
        match self {
            Color::Red => b"\x1b[0;31m",
            Color::Green => b"\x1b[0;32m",
            Color::Orange => b"\x1b[0;33m",
            Color::Blue => b"\x1b[0;34m",
            Color::Purple => b"\x1b[0;35m",
            Color::Cyan => b"\x1b[0;36m",
            Color::Gray => b"\x1b[0;37m",
        }
    }

    /// Wrap `data` as on-sequence, payload, off-sequence
    pub fn paint(&self, data: &[u8]) -> Vec<u8> {
        let on = self.on();
        let mut out = Vec::with_capacity(on.len() + data.len() + OFF.len());
        out.extend_from_slice(on);
        out.extend_from_slice(data);
        out.extend_from_slice(OFF);
        out
    }

    /// This color as a shareable [`ColorFn`]
    pub fn as_fn(self) -> ColorFn {
        Arc::new(move |data: &[u8]| self.paint(data))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Orange => "orange",
            Color::Blue => "blue",
            Color::Purple => "purple",
            Color::Cyan => "cyan",
            Color::Gray => "gray",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        // "yellow" renders the same sequence as orange
        let name = if name == "yellow" { "orange".to_string() } else { name };
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| format!("unknown color '{}'", s))
    }
}

/// Wrap `data` in the default color of `level`
pub fn colorize(level: Severity, data: &[u8]) -> Vec<u8> {
    level.default_color().paint(data)
}

/// Remove every known color sequence from `data`
pub fn strip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut rest = data;
    'scan: while !rest.is_empty() {
        if rest[0] == 0x1b {
            for seq in Color::ALL.iter().map(|c| c.on()).chain(std::iter::once(OFF)) {
                if rest.starts_with(seq) {
                    rest = &rest[seq.len()..];
                    continue 'scan;
                }
            }
        }
        out.push(rest[0]);
        rest = &rest[1..];
    }
    out
}

/// Per-logger color assignments
///
/// Level overrides recolor both the prefix and the message body.
#[derive(Clone)]
pub struct ColorTable {
    overrides: PerSeverity<Option<ColorFn>>,
    /// Color around the timestamp
    pub timestamp: Color,
    /// Color around the `function:file:line` tag
    pub location: Color,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            overrides: PerSeverity::default(),
            timestamp: Color::Blue,
            location: Color::Orange,
        }
    }
}

impl fmt::Debug for ColorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overridden: Vec<Severity> = Severity::ALL
            .into_iter()
            .filter(|level| self.overrides.get(*level).is_some())
            .collect();
        f.debug_struct("ColorTable")
            .field("overridden", &overridden)
            .field("timestamp", &self.timestamp)
            .field("location", &self.location)
            .finish()
    }
}

impl ColorTable {
    /// Override the colorizer used for `level`
    pub fn set(&mut self, level: Severity, color: ColorFn) {
        self.overrides.set(level, Some(color));
    }

    /// Builder-style variant of [`ColorTable::set`]
    pub fn with(mut self, level: Severity, color: ColorFn) -> Self {
        self.set(level, color);
        self
    }

    /// Colorize `data` for `level`, honouring any override
    pub fn paint(&self, level: Severity, data: &[u8]) -> Vec<u8> {
        match self.overrides.get(level) {
            Some(color) => color(data),
            None => colorize(level, data),
        }
    }
}
