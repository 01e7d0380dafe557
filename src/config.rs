use std::{env, net::SocketAddr, path::Path, time::Duration};

use anyhow::{Context, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the UI listens.
    pub addr: SocketAddr,
    /// Base URL of the todo backend, without a trailing slash.
    pub api_base_url: String,
    /// Per-request timeout for backend calls.
    pub api_timeout: Duration,
    /// How long an untouched page session is kept before it is dropped.
    pub session_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_env_file(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let addr = lookup("TODO_CONSOLE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .with_context(|| format!("TODO_CONSOLE_ADDR is not a socket address: {addr}"))?;

        let api_base_url = lookup("TODO_API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let api_timeout = seconds(&lookup, "TODO_API_TIMEOUT_SECS")?.unwrap_or(DEFAULT_API_TIMEOUT);
        let session_idle =
            seconds(&lookup, "TODO_CONSOLE_SESSION_IDLE_SECS")?.unwrap_or(DEFAULT_SESSION_IDLE);

        Ok(Self {
            addr,
            api_base_url,
            api_timeout,
            session_idle,
        })
    }
}

// Loads `path` into the environment. Only a missing file is ignored.
fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).with_context(|| format!("could not load {}", path.display())),
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{key} is not a number: {value}"))?;
    if secs == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(Some(Duration::from_secs(secs)))
}
