//! Background rotation task
//!
//! Sleeps until the trigger's next firing, then swaps the logger's file and
//! sweeps the log directory. Runs until the cancellation token fires.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{LogError, Result};
use crate::files::sweep;
use crate::logger::Logger;

use super::trigger::Trigger;

/// Handle to control the running rotation task
pub struct RotationHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RotationHandle {
    /// Ask the task to stop; an in-flight rotation still completes
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Wait for the task to exit
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Rotation task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl std::fmt::Debug for RotationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Periodic file swap plus retention sweep
pub struct RotationScheduler {
    logger: Arc<Logger>,
    trigger: Arc<dyn Trigger>,
    logs_dir: PathBuf,
    max_files: usize,
}

impl RotationScheduler {
    /// # Arguments
    /// * `logs_dir` - Directory swept after each swap
    /// * `max_files` - Entries to keep in `logs_dir`; 0 keeps everything
    pub fn new(
        logger: Arc<Logger>,
        trigger: Arc<dyn Trigger>,
        logs_dir: impl Into<PathBuf>,
        max_files: usize,
    ) -> Self {
        Self {
            logger,
            trigger,
            logs_dir: logs_dir.into(),
            max_files,
        }
    }

    /// Start the task on the current tokio runtime
    pub fn spawn(self, cancel: CancellationToken) -> Result<RotationHandle> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LogError::NoRuntime)?;
        let task = runtime.spawn(self.run(cancel.clone()));
        Ok(RotationHandle { cancel, task })
    }

    async fn run(self, cancel: CancellationToken) {
        let mut after = Utc::now();
        loop {
            let Some(next) = self.trigger.next_after(after) else {
                info!("Rotation schedule has no further firings");
                return;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or_default();

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Stopping logger rotation");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            self.fire().await;
            after = next.max(Utc::now());
        }
    }

    /// Swap then sweep, off the async workers
    async fn fire(&self) {
        let logger = Arc::clone(&self.logger);
        let logs_dir = self.logs_dir.clone();
        let max_files = self.max_files;

        let result = tokio::task::spawn_blocking(move || {
            match logger.rotate() {
                Ok(Some(path)) => debug!("Rotated log file to {}", path.display()),
                Ok(None) => {}
                Err(e) => error!("Failed to rotate log file: {}", e),
            }

            match sweep(&logs_dir, max_files) {
                Ok(removed) => {
                    for entry in removed {
                        info!("Removing old log file [ {} ]", entry.path.display());
                    }
                }
                Err(e) => error!("{}", e),
            }
        })
        .await;

        if let Err(e) = result {
            error!("Rotation job failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogOptions, Zone};
    use crate::files::LogFileNaming;
    use crate::rotation::IntervalTrigger;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn file_logger(dir: &std::path::Path) -> Arc<Logger> {
        // Sub-second names so each firing gets its own file
        let naming = LogFileNaming::new(dir, "app", "%Y%m%d-%H%M%S%.f", Zone::Utc);
        let logger = Logger::new(Vec::new(), LogOptions::default());
        logger.attach_file(naming).unwrap();
        Arc::new(logger)
    }

    #[test]
    fn test_spawn_without_runtime() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = RotationScheduler::new(
            file_logger(temp_dir.path()),
            Arc::new(IntervalTrigger(Duration::from_secs(1))),
            temp_dir.path(),
            0,
        );
        assert!(matches!(
            scheduler.spawn(CancellationToken::new()),
            Err(LogError::NoRuntime)
        ));
    }

    #[tokio::test]
    async fn test_cancel_stops_task_promptly() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = RotationScheduler::new(
            file_logger(temp_dir.path()),
            Arc::new(IntervalTrigger(Duration::from_secs(3600))),
            temp_dir.path(),
            0,
        );
        let handle = scheduler.spawn(CancellationToken::new()).unwrap();

        handle.stop();
        tokio::time::timeout(Duration::from_secs(5), handle.join())
            .await
            .expect("rotation task did not stop");
    }

    #[tokio::test]
    async fn test_exhausted_trigger_ends_task() {
        let temp_dir = TempDir::new().unwrap();
        let trigger = |_after: chrono::DateTime<Utc>| -> Option<chrono::DateTime<Utc>> { None };
        let handle = RotationScheduler::new(
            file_logger(temp_dir.path()),
            Arc::new(trigger),
            temp_dir.path(),
            0,
        )
        .spawn(CancellationToken::new())
        .unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle.join())
            .await
            .expect("rotation task did not finish");
    }

    #[tokio::test]
    async fn test_firings_rotate_and_sweep() {
        let temp_dir = TempDir::new().unwrap();
        let logger = file_logger(temp_dir.path());
        let first = logger.log_file_path().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        let trigger = move |after: chrono::DateTime<Utc>| -> Option<chrono::DateTime<Utc>> {
            // Three quick firings, then stop
            (counter.fetch_add(1, Ordering::SeqCst) < 3)
                .then(|| after + chrono::Duration::milliseconds(50))
        };
        let handle =
            RotationScheduler::new(Arc::clone(&logger), Arc::new(trigger), temp_dir.path(), 2)
                .spawn(CancellationToken::new())
                .unwrap();

        tokio::time::timeout(Duration::from_secs(10), handle.join())
            .await
            .expect("rotation task did not finish");

        let current = logger.log_file_path().unwrap();
        assert_ne!(current, first);
        assert!(current.exists());
        let remaining = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert!(remaining <= 2, "{} files left", remaining);

        logger.info("after rotation").unwrap();
        assert_eq!(
            std::fs::read_to_string(&current).unwrap(),
            "[INFO]  after rotation\n"
        );
    }
}
