use std::path::Path;

use anyhow::Context;

/// App code at debug, HTTP client internals only when something is wrong.
pub const DEFAULT_FILTER: &str = "debug,hyper_util=warn,reqwest=warn,hyper=warn";

/// `RUST_LOG` when set, otherwise [`DEFAULT_FILTER`].
pub fn filter_directives() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string())
}

/// Send all tracing output to `log_path` (appending, no ANSI colours).
pub fn init(log_path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter_directives().as_str())
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::info!("logging to {}", log_path.display());
    Ok(())
}
