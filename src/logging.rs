use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "SOCH_LOG";

/// Where log output goes
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// Append to a file; the TUI owns the terminal
    File(PathBuf),
    /// Write to stderr, for one-shot commands
    Stderr,
}

impl LogTarget {
    fn default_directives(&self) -> &'static str {
        match self {
            LogTarget::File(_) => "soch=info",
            LogTarget::Stderr => "soch=warn",
        }
    }
}

fn filter_for(target: &LogTarget) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| target.default_directives().into())
}

/// Install the global tracing subscriber
pub fn init(target: LogTarget) -> Result<()> {
    let filter = filter_for(&target);

    match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
                .context("Failed to install log subscriber")?;
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to install log subscriber")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quieter_default_for_one_shot_commands() {
        assert_eq!(LogTarget::Stderr.default_directives(), "soch=warn");
        assert_eq!(
            LogTarget::File(PathBuf::from("x.log")).default_directives(),
            "soch=info"
        );
    }
}
