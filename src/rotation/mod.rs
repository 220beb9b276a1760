//! Scheduled log rotation
//!
//! A file-backed logger writes to `<logs_dir>/<file_name>-<date>.log`. On every
//! trigger firing the file is swapped for a freshly dated one and the log
//! directory is swept down to the configured number of entries.

mod scheduler;
mod trigger;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::LogOptions;
use crate::error::Result;
use crate::files::{dir_exists, LogFileNaming};
use crate::logger::Logger;
use crate::writer::Destination;

pub use scheduler::{RotationHandle, RotationScheduler};
pub use trigger::{CronTrigger, IntervalTrigger, Trigger};

/// A logger plus its rotation task, if one is running
#[derive(Debug)]
pub struct FileLogger {
    pub logger: Arc<Logger>,
    pub scheduler: Option<RotationHandle>,
}

impl FileLogger {
    /// Build a logger that also writes to a dated file and rotates it
    ///
    /// Must be called from within a tokio runtime when file options are set.
    /// Problems with the log directory, the first file or the schedule are
    /// reported through `tracing` and leave a working console logger.
    pub fn start(
        destinations: Vec<Box<dyn Destination>>,
        options: LogOptions,
        cancel: CancellationToken,
    ) -> Result<FileLogger> {
        let Some(file_options) = options.file.clone() else {
            return Ok(Self::console(destinations, options));
        };

        if !dir_exists(&file_options.logs_dir) {
            tracing::warn!(
                "Log directory {} does not exist, logging to console only",
                file_options.logs_dir.display()
            );
            return Ok(Self::console(destinations, options));
        }

        let naming = LogFileNaming::from_options(&file_options);
        let zone = naming.zone();
        let logger = Logger::new(destinations, options);
        match logger.attach_file(naming) {
            Ok(path) => tracing::info!("Logging to: {}", path.display()),
            Err(e) => tracing::error!("{}", e),
        }
        let logger = Arc::new(logger);

        let policy = file_options.rotation.unwrap_or_default();
        let trigger = match CronTrigger::parse(&policy.schedule, zone) {
            Ok(trigger) => trigger,
            Err(e) => {
                tracing::error!("Failed to add logger rotation job. Reason: {}", e);
                return Ok(FileLogger {
                    logger,
                    scheduler: None,
                });
            }
        };

        let handle = RotationScheduler::new(
            Arc::clone(&logger),
            Arc::new(trigger),
            file_options.logs_dir,
            policy.max_files,
        )
        .spawn(cancel)?;

        Ok(FileLogger {
            logger,
            scheduler: Some(handle),
        })
    }

    fn console(destinations: Vec<Box<dyn Destination>>, options: LogOptions) -> FileLogger {
        FileLogger {
            logger: Arc::new(Logger::new(destinations, options)),
            scheduler: None,
        }
    }

    /// Stop rotation and wait for the task to exit
    ///
    /// The active file stays open for further logging.
    pub async fn shutdown(self) -> Arc<Logger> {
        if let Some(handle) = self.scheduler {
            handle.stop();
            handle.join().await;
        }
        self.logger
    }
}
