//! The logger
//!
//! Every log call renders into the logger's two reusable buffers and flushes
//! them to all destinations while holding the logger's write lock, so lines
//! from concurrent callers never interleave.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::caller::{BacktraceLocator, CallerInfo, CallerLocator};
use crate::color::{ColorFn, ColorTable};
use crate::config::{resolve_date_format, LogOptions, Zone};
use crate::error::{LogError, Result};
use crate::files::LogFileNaming;
use crate::render::{Event, RenderBuffer, Style};
use crate::severity::Severity;
use crate::writer::{Destination, MultiWriter};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

const BUFFER_CAPACITY: usize = 256;

/// The file currently receiving output
struct ActiveFile {
    slot: usize,
    path: PathBuf,
}

/// Everything guarded by the logger lock
struct State {
    color: bool,
    debug: bool,
    quiet: bool,
    timestamp: bool,
    zone: Zone,
    date_format: String,
    colors: ColorTable,
    out: MultiWriter,
    plain: RenderBuffer,
    colored: RenderBuffer,
    naming: Option<LogFileNaming>,
    file: Option<ActiveFile>,
}

/// Leveled text logger writing to a fixed set of destinations
pub struct Logger {
    state: RwLock<State>,
    locator: Arc<dyn CallerLocator>,
    clock: Clock,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("debug", &self.is_debug())
            .field("quiet", &self.is_quiet())
            .field("log_file", &self.log_file_path())
            .finish()
    }
}

/// Append a newline unless the message already ends with one
fn normalize(message: &str) -> Cow<'_, str> {
    if message.ends_with('\n') {
        Cow::Borrowed(message)
    } else {
        Cow::Owned(format!("{}\n", message))
    }
}

impl Logger {
    /// Create a logger writing to `destinations`
    ///
    /// Color is used only when enabled in `options` and at least one
    /// destination is a terminal. File settings in `options` are ignored here;
    /// see [`FileLogger`](crate::FileLogger).
    pub fn new(destinations: Vec<Box<dyn Destination>>, options: LogOptions) -> Self {
        let out = MultiWriter::new(destinations);
        let color = options.color && out.any_terminal();
        Self {
            state: RwLock::new(State {
                color,
                debug: options.debug,
                quiet: options.quiet,
                timestamp: options.timestamp,
                zone: options.timezone,
                date_format: resolve_date_format(&options.date_format),
                colors: options.colors,
                out,
                plain: RenderBuffer::with_capacity(BUFFER_CAPACITY),
                colored: RenderBuffer::with_capacity(BUFFER_CAPACITY),
                naming: None,
                file: None,
            }),
            locator: Arc::new(BacktraceLocator),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the caller-location capability
    pub fn with_locator(mut self, locator: Arc<dyn CallerLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Replace the clock used for timestamps and file names
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| LogError::LockPoisoned)
    }

    /// Check the state of debugging output
    pub fn is_debug(&self) -> bool {
        self.state.read().map(|s| s.debug).unwrap_or(false)
    }

    /// Check for quiet state
    pub fn is_quiet(&self) -> bool {
        self.state.read().map(|s| s.quiet).unwrap_or(false)
    }

    pub fn set_debug(&self, debug: bool) -> Result<()> {
        self.write_state()?.debug = debug;
        Ok(())
    }

    pub fn set_quiet(&self, quiet: bool) -> Result<()> {
        self.write_state()?.quiet = quiet;
        Ok(())
    }

    /// Override the color of one severity for this logger only
    pub fn set_color(&self, severity: Severity, color: ColorFn) -> Result<()> {
        self.write_state()?.colors.set(severity, color);
        Ok(())
    }

    /// Path of the file currently receiving output, if file-backed
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.state
            .read()
            .ok()
            .and_then(|s| s.file.as_ref().map(|f| f.path.clone()))
    }

    /// Render one event and write it to every destination
    ///
    /// `depth` skips extra stack frames when resolving the caller, for
    /// wrappers around the logger. No debug gating and no process exit happen
    /// here.
    pub fn output(&self, severity: Severity, depth: usize, message: &str) -> Result<()> {
        let message = normalize(message);
        if self.is_quiet() {
            return Ok(());
        }

        let now = (self.clock)();
        // Resolved outside the lock; only rendering and flushing are serialized
        let caller = if severity.shows_location() {
            Some(self.locator.locate(depth).unwrap_or_else(CallerInfo::unknown))
        } else {
            None
        };

        let mut guard = self.write_state()?;
        let state = &mut *guard;
        state.plain.reset();
        state.colored.reset();

        let mut event = Event::new(severity);
        if state.timestamp {
            event = event.timestamp(state.zone.convert(now));
        }
        if let Some(caller) = &caller {
            event = event.location(caller);
        }
        let event = event.body(message.as_bytes());

        let style = Style {
            colors: &state.colors,
            date_format: &state.date_format,
        };
        event.emit_plain(&style, &mut state.plain);
        if state.color {
            event.emit_colored(&style, &mut state.colored);
            state.out.write(state.colored.bytes(), state.plain.bytes())?;
        } else {
            state.out.write_same(state.plain.bytes())?;
        }
        Ok(())
    }

    /// Log `message` at `severity`, dropping Debug and Trace unless debug is on
    pub fn log(&self, severity: Severity, message: &str) -> Result<()> {
        if severity.is_debug_gated() && !self.is_debug() {
            return Ok(());
        }
        self.output(severity, 0, message)
    }

    /// Print fatal message to output and quit the application with status 1
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        let _ = self.log(Severity::Fatal, &format!("{}\n", message));
        std::process::exit(1)
    }

    /// Print formatted fatal message to output and quit the application with status 1
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        let _ = self.log(Severity::Fatal, &args.to_string());
        std::process::exit(1)
    }

    /// Print error message to output
    pub fn error(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Error, &format!("{}\n", message))
    }

    /// Print formatted error message to output
    pub fn errorf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Severity::Error, &args.to_string())
    }

    /// Print warning message to output
    pub fn warn(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Warn, &format!("{}\n", message))
    }

    /// Print formatted warning message to output
    pub fn warnf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Severity::Warn, &args.to_string())
    }

    /// Print informational message to output
    pub fn info(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Info, &format!("{}\n", message))
    }

    /// Print formatted informational message to output
    pub fn infof(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Severity::Info, &args.to_string())
    }

    /// Print debug message to output if debug output enabled
    pub fn debug(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Debug, &format!("{}\n", message))
    }

    /// Print formatted debug message to output if debug output enabled
    pub fn debugf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Severity::Debug, &args.to_string())
    }

    /// Print trace message to output if debug output enabled
    pub fn trace(&self, message: impl fmt::Display) -> Result<()> {
        self.log(Severity::Trace, &format!("{}\n", message))
    }

    /// Print formatted trace message to output if debug output enabled
    pub fn tracef(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Severity::Trace, &args.to_string())
    }

    /// Make the logger file-backed and open the first dated file
    ///
    /// The naming is kept even when the open fails, so the next rotation
    /// retries it.
    pub(crate) fn attach_file(&self, naming: LogFileNaming) -> Result<PathBuf> {
        self.write_state()?.naming = Some(naming.clone());
        self.open_dated(&naming, (self.clock)())
    }

    /// Switch output to the file dated now
    pub fn rotate(&self) -> Result<Option<PathBuf>> {
        self.rotate_at((self.clock)())
    }

    /// Switch output to the file dated `now`
    ///
    /// Returns `None` when the logger is not file-backed. If the new file
    /// cannot be opened the current one, if any, stays active.
    pub fn rotate_at(&self, now: DateTime<Utc>) -> Result<Option<PathBuf>> {
        let naming = match self.state.read() {
            Ok(state) => match &state.naming {
                Some(naming) => naming.clone(),
                None => return Ok(None),
            },
            Err(_) => return Err(LogError::LockPoisoned),
        };
        self.open_dated(&naming, now).map(Some)
    }

    /// Open the file dated `now` and make it the active file
    fn open_dated(&self, naming: &LogFileNaming, now: DateTime<Utc>) -> Result<PathBuf> {
        let (path, file) = naming.open(now)?;

        let previous = {
            let mut guard = self.write_state()?;
            let state = &mut *guard;
            match state.file.as_mut() {
                Some(active) => {
                    active.path = path.clone();
                    state.out.replace(active.slot, Box::new(file))
                }
                None => {
                    let slot = state.out.push(Box::new(file));
                    state.file = Some(ActiveFile {
                        slot,
                        path: path.clone(),
                    });
                    None
                }
            }
        };

        // Every write to the old handle finished under the lock
        if let Some(mut old) = previous {
            let _ = old.flush();
        }
        tracing::debug!("Logging to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::FixedLocator;
    use crate::color::{strip, Color};
    use crate::writer::testing::FailingSink;
    use crate::writer::MemorySink;
    use chrono::TimeZone;
    use std::thread;
    use tempfile::TempDir;

    fn fixed_clock() -> Clock {
        Arc::new(|| Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 3).unwrap())
    }

    fn test_logger(sinks: &[&MemorySink], options: LogOptions) -> Logger {
        let destinations: Vec<Box<dyn Destination>> = sinks
            .iter()
            .map(|s| Box::new((*s).clone()) as Box<dyn Destination>)
            .collect();
        Logger::new(destinations, options)
            .with_locator(Arc::new(FixedLocator(Some(CallerInfo::new(
                "app::run",
                "src/app.rs",
                7,
            )))))
            .with_clock(fixed_clock())
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a"), "a\n");
        assert_eq!(normalize("a\n"), "a\n");
        assert_eq!(normalize(""), "\n");
    }

    #[test]
    fn test_info_line() {
        let sink = MemorySink::new();
        let logger = test_logger(&[&sink], LogOptions::default());

        logger.info("hello").unwrap();
        logger.infof(format_args!("{} + {} = {}", 1, 2, 3)).unwrap();

        assert_eq!(sink.contents_lossy(), "[INFO]  hello\n[INFO]  1 + 2 = 3\n");
    }

    #[test]
    fn test_single_trailing_newline() {
        let sink = MemorySink::new();
        let logger = test_logger(&[&sink], LogOptions::default());

        logger.warnf(format_args!("already terminated\n")).unwrap();
        logger.warn("println style").unwrap();

        assert_eq!(
            sink.contents_lossy(),
            "[WARN]  already terminated\n[WARN]  println style\n"
        );
    }

    #[test]
    fn test_error_carries_location_and_timestamp() {
        let sink = MemorySink::new();
        let options = LogOptions {
            timestamp: true,
            timezone: Zone::Utc,
            ..LogOptions::default()
        };
        let logger = test_logger(&[&sink], options);

        logger.error("disk full").unwrap();

        assert_eq!(
            sink.contents_lossy(),
            "[ERROR] 07-Mar-2026 09:05:03 app::run:app.rs:7 disk full\n"
        );
    }

    #[test]
    fn test_unresolved_caller_uses_placeholders() {
        let sink = MemorySink::new();
        let logger = test_logger(&[&sink], LogOptions::default())
            .with_locator(Arc::new(FixedLocator(None)));

        logger.error("lost").unwrap();

        assert_eq!(
            sink.contents_lossy(),
            "[ERROR] <unknown function>:<unknown file>:0 lost\n"
        );
    }

    #[test]
    fn test_terminal_and_file_destinations() {
        let tty = MemorySink::terminal();
        let file = MemorySink::new();
        let options = LogOptions {
            timestamp: true,
            timezone: Zone::Utc,
            ..LogOptions::default()
        };
        let logger = test_logger(&[&tty, &file], options);

        logger.info("ready").unwrap();

        let colored = tty.contents();
        assert_ne!(colored, file.contents());
        assert!(colored.starts_with(Color::Green.on()));
        assert_eq!(strip(&colored), file.contents());
        assert_eq!(file.contents_lossy(), "[INFO]  07-Mar-2026 09:05:03 ready\n");
    }

    #[test]
    fn test_color_disabled_writes_plain_everywhere() {
        let tty = MemorySink::terminal();
        let options = LogOptions {
            color: false,
            ..LogOptions::default()
        };
        let logger = test_logger(&[&tty], options);

        logger.info("plain").unwrap();

        assert_eq!(tty.contents_lossy(), "[INFO]  plain\n");
    }

    #[test]
    fn test_no_terminal_means_no_color() {
        let file = MemorySink::new();
        let logger = test_logger(&[&file], LogOptions::default());

        logger.error("x").unwrap();

        assert!(!file.contents().contains(&0x1b));
    }

    #[test]
    fn test_per_logger_color_override() {
        let first = MemorySink::terminal();
        let second = MemorySink::terminal();
        let recolored = test_logger(&[&first], LogOptions::default());
        let untouched = test_logger(&[&second], LogOptions::default());

        recolored.set_color(Severity::Info, Color::Gray.as_fn()).unwrap();
        recolored.info("a").unwrap();
        untouched.info("a").unwrap();

        let mut expected = Color::Gray.paint(b"[INFO]  ");
        expected.extend(Color::Gray.paint(b"a\n"));
        assert_eq!(first.contents(), expected);

        let mut expected = Color::Green.paint(b"[INFO]  ");
        expected.extend(Color::Green.paint(b"a\n"));
        assert_eq!(second.contents(), expected);
    }

    #[test]
    fn test_quiet_suppresses_everything() {
        let sink = MemorySink::terminal();
        let options = LogOptions {
            quiet: true,
            debug: true,
            ..LogOptions::default()
        };
        let logger = test_logger(&[&sink], options);

        for level in Severity::ALL {
            logger.output(level, 0, "nothing").unwrap();
            if level != Severity::Fatal {
                logger.log(level, "nothing").unwrap();
            }
        }

        assert!(sink.contents().is_empty());
        assert!(logger.is_quiet());
    }

    #[test]
    fn test_debug_gate() {
        let sink = MemorySink::new();
        let logger = test_logger(&[&sink], LogOptions::default());

        logger.debug("hidden").unwrap();
        logger.tracef(format_args!("hidden")).unwrap();
        assert!(sink.contents().is_empty());

        logger.set_debug(true).unwrap();
        logger.debug("shown").unwrap();
        logger.tracef(format_args!("shown")).unwrap();

        assert_eq!(
            sink.contents_lossy(),
            "[DEBUG] app::run:app.rs:7 shown\n[TRACE] shown\n"
        );
    }

    #[test]
    fn test_write_error_is_returned() {
        let sink = MemorySink::new();
        let logger = Logger::new(
            vec![Box::new(sink.clone()), Box::new(FailingSink)],
            LogOptions::default(),
        );

        let err = logger.info("partial").unwrap_err();

        assert!(matches!(err, LogError::Write(_)));
        assert_eq!(sink.contents_lossy(), "[INFO]  partial\n");
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let sink = MemorySink::new();
        let logger = Arc::new(test_logger(&[&sink], LogOptions::default()));
        let lines_per_thread = 200;

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    let body = format!("thread-{}-", t).repeat(20);
                    for i in 0..lines_per_thread {
                        logger.infof(format_args!("{}{}", body, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let output = sink.contents_lossy();
        let mut per_thread = [0usize; 8];
        for line in output.lines() {
            let body = line.strip_prefix("[INFO]  ").unwrap();
            let t: usize = body["thread-".len()..="thread-".len()].parse().unwrap();
            let expected = format!("thread-{}-", t).repeat(20);
            let index = body
                .strip_prefix(expected.as_str())
                .unwrap_or_else(|| panic!("torn line: {}", line));
            assert!(index.parse::<usize>().is_ok(), "torn line: {}", line);
            per_thread[t] += 1;
        }
        assert!(per_thread.iter().all(|&n| n == lines_per_thread));
    }

    #[test]
    fn test_rotation_splits_lines_between_files() {
        let temp_dir = TempDir::new().unwrap();
        let naming = LogFileNaming::new(temp_dir.path(), "app", "%Y-%m-%d", Zone::Utc);
        let logger = Logger::new(Vec::new(), LogOptions::default()).with_clock(fixed_clock());

        let first = logger.attach_file(naming).unwrap();
        logger.info("before midnight").unwrap();
        let second = logger
            .rotate_at(Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap())
            .unwrap()
            .unwrap();
        logger.info("after midnight").unwrap();

        assert_ne!(first, second);
        assert_eq!(logger.log_file_path(), Some(second.clone()));
        assert_eq!(
            std::fs::read_to_string(&first).unwrap(),
            "[INFO]  before midnight\n"
        );
        assert_eq!(
            std::fs::read_to_string(&second).unwrap(),
            "[INFO]  after midnight\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_rotation_failure_keeps_current_file() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs");
        std::fs::create_dir(&logs).unwrap();
        let naming = LogFileNaming::new(&logs, "app", "%Y-%m-%d", Zone::Utc);
        let logger = Logger::new(Vec::new(), LogOptions::default()).with_clock(fixed_clock());
        let first = logger.attach_file(naming).unwrap();

        // Make the directory unusable for the next file
        std::fs::remove_file(&first).unwrap();
        std::fs::remove_dir(&logs).unwrap();
        let result = logger.rotate_at(Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap());

        assert!(matches!(result, Err(LogError::OpenLogFile { .. })));
        assert_eq!(logger.log_file_path(), Some(first));
        // Writes to the unlinked handle still succeed
        logger.info("still writing").unwrap();
    }

    #[test]
    fn test_failed_first_open_is_retried_on_rotation() {
        let temp_dir = TempDir::new().unwrap();
        // The year becomes a directory that does not exist yet
        let naming = LogFileNaming::new(temp_dir.path(), "app", "%Y/%m", Zone::Utc);
        let sink = MemorySink::new();
        let logger = test_logger(&[&sink], LogOptions::default());

        let err = logger.attach_file(naming).unwrap_err();
        assert!(matches!(err, LogError::OpenLogFile { .. }));
        assert_eq!(logger.log_file_path(), None);
        logger.info("console only").unwrap();

        std::fs::create_dir(temp_dir.path().join("app-2026")).unwrap();
        let path = logger
            .rotate_at(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap())
            .unwrap()
            .unwrap();
        logger.info("now in a file").unwrap();

        assert_eq!(path, temp_dir.path().join("app-2026").join("04.log"));
        assert_eq!(logger.log_file_path(), Some(path.clone()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[INFO]  now in a file\n"
        );
        assert_eq!(
            sink.contents_lossy(),
            "[INFO]  console only\n[INFO]  now in a file\n"
        );
    }

    #[test]
    fn test_rotate_without_file() {
        let logger = Logger::new(Vec::new(), LogOptions::default());
        assert_eq!(logger.rotate().unwrap(), None);
        assert_eq!(logger.log_file_path(), None);
    }
}
