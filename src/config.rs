use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_RAISE_INCREMENT: u32 = 20;

/// Table parameters sent when the agent opens a new session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    /// Display name of the table. Left empty, it is derived from the agent name.
    pub name: String,
    pub max_players: u32,
    pub starting_chips: u32,
    pub small_blind: u32,
    pub big_blind: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_players: 4,
            starting_chips: 1000,
            small_blind: 10,
            big_blind: 20,
        }
    }
}

impl TableConfig {
    pub fn named_for(&self, agent_name: &str) -> Self {
        let mut table = self.clone();
        if table.name.trim().is_empty() {
            table.name = format!("{agent_name}'s table");
        }
        table
    }
}

/// Waits between polling cycles.
#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Pacing {
    /// Wait after a poll that found nothing to do.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "poll_ms")]
    pub poll: Duration,
    /// Wait after a failed poll.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "backoff_ms")]
    pub backoff: Duration,
    /// Wait after submitting an action, whatever its outcome.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "after_action_ms")]
    pub after_action: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            poll: Duration::from_secs(2),
            backoff: Duration::from_secs(5),
            after_action: Duration::from_secs(1),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub server_url: String,
    /// Upper bound on every HTTP call.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Duration,
    pub pacing: Pacing,
    pub table: TableConfig,
    pub seed: Option<u64>,
    pub raise_increment: u32,
    /// Ask the server to start the session right after joining.
    pub auto_start: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            pacing: Pacing::default(),
            table: TableConfig::default(),
            seed: None,
            raise_increment: DEFAULT_RAISE_INCREMENT,
            auto_start: false,
        }
    }
}

impl AgentConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}
