//! Caller location capture
//!
//! The logger asks a [`CallerLocator`] for the `function:file:line` of the code
//! that issued a log call. The default implementation walks the stack with the
//! `backtrace` crate; tests swap in a fixed location.

use std::path::Path;

/// Where a log call came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfo {
    /// Demangled function path, without the trailing hash
    pub function: String,
    /// Base name of the source file, directory stripped
    pub file: String,
    pub line: u32,
}

impl CallerInfo {
    pub fn new(function: impl Into<String>, file: impl AsRef<Path>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: base_name(file.as_ref()),
            line,
        }
    }

    /// Placeholder used when the stack cannot be resolved
    pub fn unknown() -> Self {
        Self {
            function: "<unknown function>".to_string(),
            file: "<unknown file>".to_string(),
            line: 0,
        }
    }
}

/// Capability for resolving the caller of a log call
pub trait CallerLocator: Send + Sync {
    /// Resolve the caller, skipping `depth` extra frames above the first frame
    /// outside the logger itself
    fn locate(&self, depth: usize) -> Option<CallerInfo>;
}

/// Stack-walking locator backed by the `backtrace` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceLocator;

/// Symbols of the logger's own call path
const LOGGER_PREFIXES: &[&str] = &["prismlog::logger::Logger::", "<prismlog::logger::Logger"];

/// Frames between the logger and its caller that are never reported
const SKIPPED_PREFIXES: &[&str] = &[
    "backtrace::",
    "<backtrace::",
    "prismlog::caller::BacktraceLocator",
    "<prismlog::caller::BacktraceLocator",
    "core::",
    "<core::",
    "std::",
    "<std::",
    "alloc::",
    "<alloc::",
];

fn is_logger(symbol: &str) -> bool {
    LOGGER_PREFIXES.iter().any(|prefix| symbol.starts_with(prefix))
}

fn is_internal(symbol: &str) -> bool {
    is_logger(symbol) || SKIPPED_PREFIXES.iter().any(|prefix| symbol.starts_with(prefix))
}

impl CallerLocator for BacktraceLocator {
    /// Reports the first frame past the logger's own frames; `None` when no
    /// logger frame is on the stack
    fn locate(&self, depth: usize) -> Option<CallerInfo> {
        let mut remaining = depth;
        let mut in_logger = false;
        let mut found = None;

        backtrace::trace(|frame| {
            // Inlined frames resolve to several symbols, innermost first
            backtrace::resolve_frame(frame, |symbol| {
                if found.is_some() {
                    return;
                }
                let Some(name) = symbol.name().map(|n| format!("{:#}", n)) else {
                    return;
                };
                if is_logger(&name) {
                    in_logger = true;
                    return;
                }
                if !in_logger || is_internal(&name) {
                    return;
                }
                if remaining > 0 {
                    remaining -= 1;
                    return;
                }
                found = Some(match (symbol.filename(), symbol.lineno()) {
                    (Some(file), Some(line)) => CallerInfo::new(name, file, line),
                    _ => CallerInfo {
                        function: name,
                        ..CallerInfo::unknown()
                    },
                });
            });
            found.is_none()
        });

        found
    }
}

/// Locator that always reports the same location
#[derive(Debug, Clone)]
pub struct FixedLocator(pub Option<CallerInfo>);

impl CallerLocator for FixedLocator {
    fn locate(&self, _depth: usize) -> Option<CallerInfo> {
        self.0.clone()
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
