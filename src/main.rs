use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use prismlog::config::ConfigFile;
use prismlog::{Destination, FileLogger, Severity};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics from the logger itself go to stderr through tracing
    let filter = EnvFilter::try_from_env("PRISMLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let level = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Severity>().map_err(anyhow::Error::msg)?,
        None => Severity::Info,
    };

    let options = ConfigFile::load()?.into_options()?;
    let cancel = CancellationToken::new();
    let destinations: Vec<Box<dyn Destination>> = vec![Box::new(std::io::stderr())];
    let file_logger = FileLogger::start(destinations, options, cancel.clone())
        .context("Failed to start logger")?;

    // A plain thread, so a blocked stdin read never holds up shutdown
    let logger = Arc::clone(&file_logger.logger);
    let (done_tx, done_rx) = oneshot::channel::<Result<()>>();
    std::thread::spawn(move || {
        let forward = || -> Result<()> {
            for line in std::io::stdin().lock().lines() {
                let line = line.context("Failed to read stdin")?;
                if level == Severity::Fatal {
                    logger.fatal(line);
                }
                logger.log(level, &line)?;
            }
            Ok(())
        };
        let _ = done_tx.send(forward());
    });

    let result = tokio::select! {
        done = done_rx => done.context("Forwarding thread exited unexpectedly")?,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    cancel.cancel();
    file_logger.shutdown().await;
    result
}
