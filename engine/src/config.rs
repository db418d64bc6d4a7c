use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_HEALTH: u32 = 250;

/// Tunables for sessions and the registry. Every field has a default so a
/// partial file is always accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BattleConfig {
    pub max_health: u32,
    /// Pause between turns when a battle is run by the async runner.
    pub turn_delay_ms: u64,
    /// Safety cap; a battle still undecided after this many turns ends with no winner.
    pub max_turns: u32,
    /// Registry size at which stale sessions get swept before a create.
    pub registry_capacity: usize,
    pub stale_after_secs: u64,
    /// Consecutive display failures tolerated before the session is force-ended.
    pub max_collaborator_failures: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_health: DEFAULT_MAX_HEALTH,
            turn_delay_ms: 1500,
            max_turns: 300,
            registry_capacity: 100,
            stale_after_secs: 300,
            max_collaborator_failures: 3,
        }
    }
}

impl BattleConfig {
    pub fn turn_delay(&self) -> Duration {
        Duration::from_millis(self.turn_delay_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Parse YAML (a superset of JSON, so JSON configs are accepted too).
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse battle config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read battle config: {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid battle config: {}", path.display()))
    }
}
