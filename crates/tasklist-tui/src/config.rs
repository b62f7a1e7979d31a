use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tasklist_service::DEFAULT_ENDPOINT;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tasklist", about = "Terminal task list")]
pub struct Config {
    /// SQLite database file
    #[arg(long, env = "TASKLIST_DB")]
    pub db_path: Option<PathBuf>,

    /// Todos endpoint used for the first-run import
    #[arg(long, env = "TASKLIST_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Log file. The terminal belongs to the UI, so logs never go to stderr.
    #[arg(long, env = "TASKLIST_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| data_dir().join("tasklist.db"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("tasklist.log"))
    }
}

/// Per-user data directory (`$XDG_DATA_HOME/tasklist`, else
/// `~/.local/share/tasklist`). Holds the database and the log.
pub fn data_dir() -> PathBuf {
    let base = match std::env::var_os("XDG_DATA_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".local/share"),
            None => PathBuf::from("."),
        },
    };
    base.join("tasklist")
}

/// Route `tracing` output to the log file, filtered by `RUST_LOG` (default `info`).
pub fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_dummyjson() {
        let config = Config::try_parse_from(["tasklist"]).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn default_db_and_log_share_data_dir() {
        let config = Config::try_parse_from(["tasklist"]).unwrap();
        let dir = data_dir();
        assert!(dir.ends_with("tasklist"));
        if config.db_path.is_none() {
            assert_eq!(config.db_path(), dir.join("tasklist.db"));
        }
        if config.log_file.is_none() {
            assert_eq!(config.log_path(), dir.join("tasklist.log"));
        }
    }

    #[test]
    fn flags_override_paths() {
        let config = Config::try_parse_from([
            "tasklist",
            "--db-path",
            "/tmp/t.db",
            "--endpoint",
            "http://127.0.0.1:9/todos",
            "--log-file",
            "/tmp/t.log",
        ])
        .unwrap();
        assert_eq!(config.db_path(), PathBuf::from("/tmp/t.db"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/t.log"));
        assert_eq!(config.endpoint, "http://127.0.0.1:9/todos");
    }
}
