//! Event rendering
//!
//! One log call becomes an [`Event`]: an ordered list of typed segments. The
//! same event is emitted twice, once plain and once colored, so the two outputs
//! can only differ by color sequences.

mod buffer;

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Timelike};

use crate::caller::CallerInfo;
use crate::color::{ColorTable, OFF};
use crate::severity::Severity;

pub use buffer::RenderBuffer;

/// One piece of a rendered line
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    /// The severity prefix, e.g. `[INFO]  `
    Prefix,
    /// Date and time, already in the logger's zone
    Timestamp(DateTime<FixedOffset>),
    /// `function:file:line ` tag
    Location(&'a CallerInfo),
    /// Newline-terminated message body
    Body(&'a [u8]),
}

/// Styling inputs shared by both emissions
pub struct Style<'a> {
    pub colors: &'a ColorTable,
    pub date_format: &'a str,
}

/// A log line before it becomes bytes
#[derive(Debug, Clone)]
pub struct Event<'a> {
    severity: Severity,
    segments: Vec<Segment<'a>>,
}

impl<'a> Event<'a> {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            segments: vec![Segment::Prefix],
        }
    }

    pub fn timestamp(mut self, at: DateTime<FixedOffset>) -> Self {
        self.segments.push(Segment::Timestamp(at));
        self
    }

    pub fn location(mut self, caller: &'a CallerInfo) -> Self {
        self.segments.push(Segment::Location(caller));
        self
    }

    pub fn body(mut self, body: &'a [u8]) -> Self {
        self.segments.push(Segment::Body(body));
        self
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Append the uncolored rendering to `out`
    pub fn emit_plain(&self, style: &Style<'_>, out: &mut RenderBuffer) {
        self.emit(style, out, false);
    }

    /// Append the colored rendering to `out`
    pub fn emit_colored(&self, style: &Style<'_>, out: &mut RenderBuffer) {
        self.emit(style, out, true);
    }

    fn emit(&self, style: &Style<'_>, out: &mut RenderBuffer, colored: bool) {
        for segment in &self.segments {
            match segment {
                Segment::Prefix => {
                    let prefix = self.severity.prefix();
                    if colored {
                        out.append(&style.colors.paint(self.severity, prefix));
                    } else {
                        out.append(prefix);
                    }
                }
                Segment::Timestamp(at) => {
                    if colored {
                        out.append(style.colors.timestamp.on());
                    }
                    write_timestamp(out, at, style.date_format);
                    if colored {
                        out.append(OFF);
                    }
                }
                Segment::Location(caller) => {
                    if colored {
                        out.append(style.colors.location.on());
                    }
                    out.append(caller.function.as_bytes());
                    out.append_byte(b':');
                    out.append(caller.file.as_bytes());
                    out.append_byte(b':');
                    out.append_int(i64::from(caller.line), 0);
                    out.append_byte(b' ');
                    if colored {
                        out.append(OFF);
                    }
                }
                Segment::Body(body) => {
                    if colored {
                        out.append(&style.colors.paint(self.severity, body));
                    } else {
                        out.append(body);
                    }
                }
            }
        }
    }
}

/// `<date> HH:MM:SS `, clock fields written one by one
fn write_timestamp(out: &mut RenderBuffer, at: &DateTime<FixedOffset>, date_format: &str) {
    let mut date = String::new();
    // Layouts are validated when options are resolved
    let _ = write!(date, "{}", at.format(date_format));
    out.append(date.as_bytes());
    out.append_byte(b' ');
    out.append_int(i64::from(at.hour()), 2);
    out.append_byte(b':');
    out.append_int(i64::from(at.minute()), 2);
    out.append_byte(b':');
    out.append_int(i64::from(at.second()), 2);
    out.append_byte(b' ');
}
