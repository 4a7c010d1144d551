//! Server configuration
//!
//! All knobs come from the environment, read once at startup. The Vercel
//! token is server-side configuration and deliberately separate from the
//! per-request GitHub token; its absence is only an error once a deploy
//! is actually requested.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::deploy::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 47910;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory the snapshot/archive endpoints operate on.
    pub snapshot_root: PathBuf,
    /// Deployment-provider token; required only for `/api/deploy`.
    pub vercel_token: Option<String>,
    pub poll_interval: Duration,
    pub poll_attempts: u32,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = env::var("STACKSHIP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let snapshot_root = env::var("STACKSHIP_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let vercel_token = env::var("VERCEL_TOKEN").ok().filter(|t| !t.is_empty());
        if vercel_token.is_none() {
            warn!("VERCEL_TOKEN is not set; deploy requests will be rejected");
        }

        let poll_interval = env::var("STACKSHIP_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let poll_attempts = env::var("STACKSHIP_POLL_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_POLL_ATTEMPTS);

        Self {
            port,
            snapshot_root,
            vercel_token,
            poll_interval,
            poll_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Construct directly; from_env depends on ambient process state.
        let config = ServerConfig {
            port: DEFAULT_PORT,
            snapshot_root: PathBuf::from("."),
            vercel_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
        };
        assert_eq!(config.poll_attempts, 60);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }
}
