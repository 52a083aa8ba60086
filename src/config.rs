use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::game::Coordinate;

/// Fallback namespace for per-user local storage keys.
pub const LOCAL_USER: &str = "local";

const DEFAULT_FILTER: &str = "space_empire=info";

/// Terminal client for the space empire game server
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the game API
    #[arg(long, env = "EMPIRE_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Session token, sent as the `access_token` cookie
    #[arg(long, env = "EMPIRE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// User id used to namespace locally stored values
    #[arg(long, env = "EMPIRE_USER_ID")]
    pub user_id: Option<String>,

    /// Directory for local storage and logs
    #[arg(long, default_value = ".space-empire")]
    pub data_dir: PathBuf,

    /// Log file for interactive mode [default: <data-dir>/client.log]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub x: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub y: i64,

    /// Resource projection tick in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Seconds advanced per time warp
    #[arg(long, default_value_t = 3600)]
    pub warp_seconds: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Print the system at the start coordinate and exit
    #[arg(long)]
    pub dump: bool,
}

impl Config {
    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(LOCAL_USER)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("client.log"))
    }
}

/// Installs the global subscriber. Dump mode logs to stderr; the interactive
/// client logs to a file so the alternate screen stays clean.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if config.dump {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
        return Ok(());
    }

    let path = config.log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
