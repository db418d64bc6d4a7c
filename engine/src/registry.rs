//! At most one battle per scope (channel, room, ...), keyed by an external
//! identifier.
//!
//! The registry owns only bookkeeping: start time, lifecycle status and the
//! abort signal of each session. The combatants themselves belong to the
//! [`Battle`] handed back by `create`, which its runner drives without
//! touching the registry between turns.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::battle::{Battle, EndReason};
use crate::catalog::Catalog;
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::error::{BattleError, Result};
use crate::Dice;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SessionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Created → InProgress → one of Completed, Aborted, Expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    InProgress,
    Completed,
    Aborted,
    Expired,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Expired)
    }
}

/// Shared between a slot and its battle; the first reason set wins.
pub type AbortSignal = Arc<OnceLock<EndReason>>;

#[derive(Debug)]
struct SessionSlot {
    id: u64,
    started_at: Instant,
    status: SessionStatus,
    signal: AbortSignal,
}

pub struct SessionRegistry {
    catalog: Arc<Catalog>,
    config: BattleConfig,
    sessions: Mutex<HashMap<SessionKey, SessionSlot>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new(catalog: Arc<Catalog>, config: BattleConfig) -> Self {
        Self {
            catalog,
            config,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionKey, SessionSlot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, key: impl Into<SessionKey>, a: Combatant, b: Combatant) -> Result<Battle> {
        self.create_with_dice(key, a, b, Dice::from_entropy())
    }

    pub fn create_seeded(&self, key: impl Into<SessionKey>, a: Combatant, b: Combatant, seed: u64) -> Result<Battle> {
        self.create_with_dice(key, a, b, Dice::from_seed(seed))
    }

    /// Claim `key` for a new battle. The check and the insert happen under
    /// one lock, so two callers can never both see the key as free.
    pub fn create_with_dice(&self, key: impl Into<SessionKey>, a: Combatant, b: Combatant, dice: Dice) -> Result<Battle> {
        let key = key.into();
        let mut sessions = self.sessions();
        if sessions.contains_key(&key) {
            return Err(BattleError::AlreadyInProgress { key });
        }
        if sessions.len() >= self.config.registry_capacity {
            sweep_stale(&mut sessions, self.config.stale_after(), Instant::now());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let battle = Battle::new(key.clone(), [a, b], Arc::clone(&self.catalog), self.config.clone(), dice)
            .with_session_id(id);
        sessions.insert(
            key.clone(),
            SessionSlot {
                id,
                started_at: battle.started_at(),
                status: SessionStatus::Created,
                signal: battle.signal(),
            },
        );
        info!(%key, id, arena = ?battle.arena_name(), "battle session created");
        Ok(battle)
    }

    /// Record that the battle's first turn is under way.
    pub fn begin(&self, battle: &Battle) {
        if let Some(slot) = self.sessions().get_mut(battle.key()) {
            if slot.id == battle.session_id() && slot.status == SessionStatus::Created {
                slot.status = SessionStatus::InProgress;
            }
        }
    }

    /// Forget `key`. Any battle still running under it stops at the start of
    /// its next turn. Ending an absent key is a no-op.
    pub fn end(&self, key: &SessionKey) -> Option<SessionStatus> {
        let slot = self.sessions().remove(key)?;
        let _ = slot.signal.set(EndReason::Aborted);
        info!(%key, id = slot.id, "battle session ended");
        Some(slot.status)
    }

    /// Operator stop. The battle ends between turns with no winner.
    pub fn abort(&self, key: &SessionKey) -> Result<()> {
        let slot = self
            .sessions()
            .remove(key)
            .ok_or_else(|| BattleError::NoSuchSession { key: key.clone() })?;
        let _ = slot.signal.set(EndReason::Aborted);
        info!(%key, id = slot.id, "battle session aborted by operator");
        Ok(())
    }

    /// Release the slot held by `battle`, unless the key has since been
    /// claimed by a different session.
    pub fn finish(&self, battle: &Battle) {
        let mut sessions = self.sessions();
        if sessions.get(battle.key()).is_some_and(|slot| slot.id == battle.session_id()) {
            sessions.remove(battle.key());
            info!(key = %battle.key(), status = ?battle.status(), "battle session finished");
        }
    }

    pub fn is_active(&self, key: &SessionKey) -> bool {
        self.sessions().contains_key(key)
    }

    pub fn status(&self, key: &SessionKey) -> Option<SessionStatus> {
        self.sessions().get(key).map(|slot| slot.status)
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force-end every session older than the configured staleness bound.
    /// Returns how many were removed.
    pub fn sweep(&self) -> usize {
        sweep_stale(&mut self.sessions(), self.config.stale_after(), Instant::now())
    }
}

fn sweep_stale(
    sessions: &mut HashMap<SessionKey, SessionSlot>,
    stale_after: std::time::Duration,
    now: Instant,
) -> usize {
    let before = sessions.len();
    sessions.retain(|key, slot| {
        let fresh = now.saturating_duration_since(slot.started_at) < stale_after;
        if !fresh {
            let _ = slot.signal.set(EndReason::Expired);
            warn!(%key, id = slot.id, "expiring stale battle session");
        }
        fresh
    });
    before - sessions.len()
}
