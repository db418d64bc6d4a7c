//! Async driver for a registered battle.
//!
//! Turns run strictly one after another; the only suspension points are the
//! pacing sleep and the collaborator calls between turns. A failing
//! collaborator never rolls back a turn that already happened.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::battle::{Battle, BattleOutcome, EndReason, FighterSummary, TurnReport};
use crate::registry::{SessionKey, SessionRegistry};

/// Receives each turn as it resolves, e.g. to render it into a chat message.
#[async_trait]
pub trait BattleObserver: Send + Sync {
    async fn on_turn(&self, key: &SessionKey, report: &TurnReport) -> anyhow::Result<()>;

    async fn on_finish(&self, _outcome: &BattleOutcome) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Persists the result of a battle that produced a winner.
#[async_trait]
pub trait RewardSink: Send + Sync {
    async fn record(
        &self,
        winner: &FighterSummary,
        loser: &FighterSummary,
        outcome: &BattleOutcome,
    ) -> anyhow::Result<()>;
}

/// Writes turns to the `tracing` log and nowhere else.
pub struct LogObserver;

#[async_trait]
impl BattleObserver for LogObserver {
    async fn on_turn(&self, key: &SessionKey, report: &TurnReport) -> anyhow::Result<()> {
        for line in &report.messages {
            info!(%key, turn = report.turn, "{}", line);
        }
        Ok(())
    }
}

/// Drops results on the floor.
pub struct NoRewards;

#[async_trait]
impl RewardSink for NoRewards {
    async fn record(&self, _: &FighterSummary, _: &FighterSummary, _: &BattleOutcome) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Drive `battle` to the end: one turn, report it, pause, repeat. The
/// registry slot is released when the battle is over, however it ended.
pub async fn run_battle(
    mut battle: Battle,
    registry: &SessionRegistry,
    observer: &dyn BattleObserver,
    rewards: &dyn RewardSink,
) -> BattleOutcome {
    registry.begin(&battle);
    let delay = battle.config().turn_delay();
    let max_failures = battle.config().max_collaborator_failures.max(1);
    let mut failures = 0u32;

    while let Some(report) = battle.step() {
        match observer.on_turn(battle.key(), &report).await {
            Ok(()) => failures = 0,
            Err(err) => {
                failures += 1;
                warn!(key = %battle.key(), turn = report.turn, failures, error = %err, "turn report not delivered");
                if failures >= max_failures {
                    battle.request_abort(EndReason::CollaboratorUnavailable);
                }
            }
        }
        if !battle.is_over() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    let outcome = battle.conclude();
    registry.finish(&battle);

    if let Err(err) = observer.on_finish(&outcome).await {
        warn!(key = %outcome.key, error = %err, "final report not delivered");
    }
    if let (Some(winner), Some(loser)) = (outcome.winner(), outcome.loser()) {
        if let Err(err) = rewards.record(winner, loser, &outcome).await {
            warn!(key = %outcome.key, error = %err, "battle result not persisted; outcome stands");
        }
    }
    outcome
}

/// Run `battle` on its own task.
pub fn spawn_battle(
    battle: Battle,
    registry: Arc<SessionRegistry>,
    observer: Arc<dyn BattleObserver>,
    rewards: Arc<dyn RewardSink>,
) -> JoinHandle<BattleOutcome> {
    tokio::spawn(async move { run_battle(battle, &registry, observer.as_ref(), rewards.as_ref()).await })
}
