//! Fan-out writer
//!
//! Sends one rendered event to every destination, choosing colored bytes for
//! terminals and plain bytes for everything else.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

/// A sink the logger can write to
pub trait Destination: Write + Send + Sync {
    /// Whether this sink is an interactive terminal
    fn is_terminal(&self) -> bool;
}

impl Destination for io::Stderr {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Destination for io::Stdout {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Destination for File {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

/// In-memory destination, cheap to clone and inspect
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
    terminal: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that reports itself as a terminal
    pub fn terminal() -> Self {
        Self {
            buf: Arc::default(),
            terminal: true,
        }
    }

    /// Everything written so far
    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Destination for MemorySink {
    fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// Ordered set of destinations
#[derive(Default)]
pub struct MultiWriter {
    targets: Vec<Box<dyn Destination>>,
}

impl MultiWriter {
    pub fn new(targets: Vec<Box<dyn Destination>>) -> Self {
        Self { targets }
    }

    /// Add a destination, returning its slot
    pub fn push(&mut self, target: Box<dyn Destination>) -> usize {
        self.targets.push(target);
        self.targets.len() - 1
    }

    /// Swap the destination in `slot`, handing back the old one
    pub fn replace(
        &mut self,
        slot: usize,
        target: Box<dyn Destination>,
    ) -> Option<Box<dyn Destination>> {
        self.targets
            .get_mut(slot)
            .map(|current| std::mem::replace(current, target))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether any destination is a terminal
    pub fn any_terminal(&self) -> bool {
        self.targets.iter().any(|t| t.is_terminal())
    }

    /// Write `colored` to terminals and `plain` to the rest
    ///
    /// Stops at the first failing destination; earlier destinations keep what
    /// they received. Returns the number of destinations written.
    pub fn write(&mut self, colored: &[u8], plain: &[u8]) -> io::Result<usize> {
        for target in self.targets.iter_mut() {
            let bytes = if target.is_terminal() { colored } else { plain };
            target.write_all(bytes)?;
            target.flush()?;
        }
        Ok(self.targets.len())
    }

    /// Write the same bytes to every destination
    pub fn write_same(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.write(bytes, bytes)
    }
}
