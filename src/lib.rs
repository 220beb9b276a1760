//! Prismlog - leveled console and file logger
//!
//! Renders each log call as a plain line and a colored line, writes the colored
//! one to terminals and the plain one everywhere else, and can rotate a dated
//! log file on a schedule while bounding how many old files are kept.

pub mod caller;
pub mod color;
pub mod config;
pub mod error;
pub mod files;
pub mod logger;
pub mod render;
pub mod rotation;
pub mod severity;
pub mod writer;

pub use caller::{BacktraceLocator, CallerInfo, CallerLocator, FixedLocator};
pub use color::{Color, ColorFn, ColorTable};
pub use config::{FileOptions, LogOptions, RotationPolicy, Zone};
pub use error::{LogError, Result};
pub use logger::{Clock, Logger};
pub use rotation::{CronTrigger, FileLogger, IntervalTrigger, RotationHandle, Trigger};
pub use severity::Severity;
pub use writer::{Destination, MemorySink, MultiWriter};

/// Log a formatted fatal message and exit with status 1
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

/// Log a formatted error message
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a formatted warning message
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// Log a formatted informational message
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a formatted debug message if debug output is enabled
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log a formatted trace message if debug output is enabled
#[macro_export]
macro_rules! tracef {
    ($logger:expr, $($arg:tt)+) => {
        $logger.tracef(format_args!($($arg)+))
    };
}
