//! One battle session and its per-turn pipeline.
//!
//! `Battle::step` resolves exactly one turn: environment, upkeep, move
//! selection, damage, special ability, status multipliers, secondary effect,
//! then the knockout check. Abort requests are only looked at before a turn
//! starts, so combatant state is never left half-updated.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::abilities;
use crate::catalog::{ArenaId, Catalog, EffectTarget, MoveCategory, MoveDescriptor};
use crate::combatant::{Combatant, StatCounters};
use crate::config::BattleConfig;
use crate::damage;
use crate::environment::EnvironmentEngine;
use crate::registry::{AbortSignal, SessionKey, SessionStatus};
use crate::status::{self, StatusKind};
use crate::Dice;

const ACCURACY_PENALTY_PCT: u32 = 25;
const DODGE_PCT: u32 = 35;
const SPEED_BOOST_EVASION_PCT: u32 = 15;
const MAX_MISS_PCT: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Knockout,
    /// Operator stop, or the key was ended out from under the battle.
    Aborted,
    /// Swept by the registry for being too old.
    Expired,
    TurnLimit,
    /// The display collaborator kept failing.
    CollaboratorUnavailable,
}

impl EndReason {
    fn final_status(self) -> SessionStatus {
        match self {
            EndReason::Knockout | EndReason::TurnLimit => SessionStatus::Completed,
            EndReason::Aborted | EndReason::CollaboratorUnavailable => SessionStatus::Aborted,
            EndReason::Expired => SessionStatus::Expired,
        }
    }
}

/// Everything that happened in one turn, for the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    pub attacker: String,
    pub defender: String,
    pub move_name: Option<String>,
    pub damage: u32,
    pub critical: bool,
    pub missed: bool,
    pub action_skipped: bool,
    pub messages: Vec<String>,
    pub attacker_hp: u32,
    pub defender_hp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FighterSummary {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub stats: StatCounters,
}

impl From<&Combatant> for FighterSummary {
    fn from(c: &Combatant) -> Self {
        Self {
            name: c.name.clone(),
            hp: c.hp(),
            max_hp: c.max_hp(),
            stats: c.stats.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleOutcome {
    pub key: SessionKey,
    pub reason: EndReason,
    pub winner: Option<Side>,
    pub turns: u32,
    pub fighters: [FighterSummary; 2],
}

impl BattleOutcome {
    pub fn winner(&self) -> Option<&FighterSummary> {
        self.winner.map(|side| &self.fighters[side.index()])
    }

    pub fn loser(&self) -> Option<&FighterSummary> {
        self.winner.map(|side| &self.fighters[side.other().index()])
    }
}

pub struct Battle {
    key: SessionKey,
    session_id: u64,
    fighters: [Combatant; 2],
    turn: u32,
    active: Side,
    arena: Option<ArenaId>,
    environment: EnvironmentEngine,
    catalog: Arc<Catalog>,
    config: BattleConfig,
    dice: Dice,
    started_at: Instant,
    status: SessionStatus,
    signal: AbortSignal,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    /// Start a battle from two snapshots. Both fighters begin at full health
    /// with nothing active, side A acts first, and the arena is drawn at random.
    pub fn new(
        key: impl Into<SessionKey>,
        mut fighters: [Combatant; 2],
        catalog: Arc<Catalog>,
        config: BattleConfig,
        mut dice: Dice,
    ) -> Self {
        for fighter in fighters.iter_mut() {
            fighter.reset_for_battle();
        }
        let environment = EnvironmentEngine::new(Arc::clone(&catalog));
        let arena = environment.choose(&mut dice);
        Self {
            key: key.into(),
            session_id: 0,
            fighters,
            turn: 0,
            active: Side::A,
            arena,
            environment,
            catalog,
            config,
            dice,
            started_at: Instant::now(),
            status: SessionStatus::Created,
            signal: Arc::new(OnceLock::new()),
            outcome: None,
        }
    }

    /// Fight in a specific arena (or none) instead of the random pick.
    pub fn with_arena(mut self, arena: Option<ArenaId>) -> Self {
        self.arena = arena.filter(|id| self.catalog.arena(*id).is_some());
        self.environment.clear();
        self
    }

    pub(crate) fn with_session_id(mut self, id: u64) -> Self {
        self.session_id = id;
        self
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn fighter(&self, side: Side) -> &Combatant {
        &self.fighters[side.index()]
    }

    pub fn fighter_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.fighters[side.index()]
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn active_side(&self) -> Side {
        self.active
    }

    pub fn arena(&self) -> Option<ArenaId> {
        self.arena
    }

    pub fn arena_name(&self) -> Option<&str> {
        self.arena
            .and_then(|id| self.catalog.arena(id))
            .map(|a| a.name.as_str())
    }

    pub fn environment(&self) -> &EnvironmentEngine {
        &self.environment
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn signal(&self) -> AbortSignal {
        Arc::clone(&self.signal)
    }

    /// Ask the battle to stop before its next turn. The first reason wins.
    pub fn request_abort(&self, reason: EndReason) {
        let _ = self.signal.set(reason);
    }

    /// Resolve one turn. Returns `None` once the battle is over, including
    /// when a pending abort is honoured instead of playing the turn.
    pub fn step(&mut self) -> Option<TurnReport> {
        if self.is_over() {
            return None;
        }
        if let Some(reason) = self.signal.get().copied() {
            self.finish(reason);
            return None;
        }
        if self.turn >= self.config.max_turns {
            self.finish(EndReason::TurnLimit);
            return None;
        }
        self.status = SessionStatus::InProgress;
        Some(self.resolve_turn())
    }

    /// Play until the battle ends, handing each report to `on_turn`.
    pub fn run_to_completion(&mut self, mut on_turn: impl FnMut(&TurnReport)) -> BattleOutcome {
        while let Some(report) = self.step() {
            on_turn(&report);
        }
        self.conclude()
    }

    /// The outcome, ending the battle as aborted if it has not ended yet.
    pub fn conclude(&mut self) -> BattleOutcome {
        if self.outcome.is_none() {
            self.finish(EndReason::Aborted);
        }
        match &self.outcome {
            Some(outcome) => outcome.clone(),
            None => self.summarize(EndReason::Aborted),
        }
    }

    fn resolve_turn(&mut self) -> TurnReport {
        let attacker_side = self.active;
        let (ai, di) = (attacker_side.index(), attacker_side.other().index());
        let turn = self.turn;
        let catalog = Arc::clone(&self.catalog);
        let mut report = TurnReport {
            turn,
            attacker: self.fighters[ai].name.clone(),
            defender: self.fighters[di].name.clone(),
            move_name: None,
            damage: 0,
            critical: false,
            missed: false,
            action_skipped: false,
            messages: Vec::new(),
            attacker_hp: 0,
            defender_hp: 0,
        };
        let messages = &mut report.messages;

        if let Some(arena) = self.arena {
            messages.extend(self.environment.tick(arena, &mut self.fighters, turn, &mut self.dice));
        }
        if self.fighters.iter().any(Combatant::is_down) {
            return self.close_turn(report, true);
        }

        let upkeep = status::process(&mut self.fighters[ai]);
        messages.extend(upkeep.messages);
        if upkeep.damage > 0 {
            self.fighters[ai].take_damage(upkeep.damage, |m| messages.push(m));
        }
        if self.fighters[ai].is_down() {
            return self.close_turn(report, true);
        }

        if upkeep.action_prevented {
            self.fighters[ai].stats.turns_skipped += 1;
            report.action_skipped = true;
            return self.close_turn(report, false);
        }

        self.fighters[ai].tick_cooldowns();
        let picked = self.pick_move(ai);
        self.fighters[ai].stats.moves_used += 1;
        report.move_name = Some(picked.name.clone());
        messages.push(format!("[MOVE][{}] uses {}", report.attacker, picked.name));

        let mv = match self.arena {
            Some(arena) => {
                let (shaped, notes) = self.environment.modify_move(arena, &picked);
                messages.extend(notes);
                shaped
            }
            None => picked.clone(),
        };

        let (attacker, defender) = pair_mut(&mut self.fighters, attacker_side);

        let miss_pct = miss_chance_pct(attacker, defender);
        if miss_pct > 0 && self.dice.chance(miss_pct as f64 / 100.0) {
            damage::start_cooldown(&mv, attacker);
            messages.push(format!("[MISS][{}] {} misses {}", attacker.name, mv.name, defender.name));
            report.missed = true;
            return self.close_turn(report, false);
        }

        let roll = damage::calculate(&mv, attacker, turn, &mut self.dice);
        report.critical = roll.critical;
        messages.extend(roll.annotation.map(|a| format!("[CRIT][{}] {}", attacker.name, a)));

        let arena = self.arena.and_then(|id| catalog.arena(id));
        // Ability base damage comes from the catalog entry, not the arena-shaped copy.
        let ability = abilities::resolve(attacker, defender, &picked, arena, &mut self.dice);
        messages.extend(ability.message.iter().chain(&ability.applied).cloned());

        let (final_damage, notes) =
            status::calculate_damage_with_effects(roll.damage + ability.bonus_damage, attacker, defender);
        messages.extend(notes);

        let dealt = defender.take_damage(final_damage, |m| messages.push(m));
        attacker.stats.damage_dealt += dealt;
        abilities::drain(attacker, &ability, dealt, |m| messages.push(m));
        report.damage = dealt;

        if let Some(effect) = mv.effect.as_ref() {
            if !defender.is_down() && self.dice.chance(effect.chance) {
                let target = match effect.resolved_target() {
                    EffectTarget::Opponent => defender,
                    EffectTarget::User => attacker,
                };
                messages.extend(status::apply(effect.status, target, effect.value, effect.duration));
            }
        }

        let knockout = self.fighters.iter().any(Combatant::is_down);
        self.close_turn(report, knockout)
    }

    /// Fill in health, then either end the battle or hand the turn over.
    fn close_turn(&mut self, mut report: TurnReport, knockout: bool) -> TurnReport {
        let ai = self.active.index();
        report.attacker_hp = self.fighters[ai].hp();
        report.defender_hp = self.fighters[1 - ai].hp();
        debug!(
            key = %self.key,
            turn = report.turn,
            attacker = %report.attacker,
            damage = report.damage,
            skipped = report.action_skipped,
            "turn resolved"
        );

        self.turn += 1;
        if knockout {
            self.finish(EndReason::Knockout);
        } else {
            self.active = self.active.other();
        }
        report
    }

    /// Uniform pick among moves off cooldown; regular moves if none are,
    /// and a bare struggle if the catalog has none of those either.
    fn pick_move(&mut self, ai: usize) -> MoveDescriptor {
        let fighter = &self.fighters[ai];
        let available: Vec<&MoveDescriptor> = self
            .catalog
            .moves
            .iter()
            .filter(|m| fighter.cooldown(&m.name) == 0)
            .collect();
        if let Some(mv) = self.dice.pick(&available) {
            return (*mv).clone();
        }

        let regular: Vec<&MoveDescriptor> = self
            .catalog
            .moves
            .iter()
            .filter(|m| m.category == MoveCategory::Regular)
            .collect();
        match self.dice.pick(&regular) {
            Some(mv) => MoveDescriptor {
                cooldown: None,
                ..(*mv).clone()
            },
            None => MoveDescriptor::struggle(),
        }
    }

    fn finish(&mut self, reason: EndReason) {
        if self.outcome.is_some() {
            return;
        }
        self.status = reason.final_status();
        self.environment.clear();
        let outcome = self.summarize(reason);
        info!(
            key = %self.key,
            ?reason,
            winner = ?outcome.winner().map(|w| w.name.as_str()),
            turns = outcome.turns,
            "battle over"
        );
        self.outcome = Some(outcome);
    }

    fn summarize(&self, reason: EndReason) -> BattleOutcome {
        let winner = match reason {
            EndReason::Knockout => match (self.fighters[0].is_down(), self.fighters[1].is_down()) {
                (false, true) => Some(Side::A),
                (true, false) => Some(Side::B),
                _ => None,
            },
            _ => None,
        };
        BattleOutcome {
            key: self.key.clone(),
            reason,
            winner,
            turns: self.turn,
            fighters: [
                FighterSummary::from(&self.fighters[0]),
                FighterSummary::from(&self.fighters[1]),
            ],
        }
    }
}

fn pair_mut(fighters: &mut [Combatant; 2], attacker: Side) -> (&mut Combatant, &mut Combatant) {
    let (first, second) = fighters.split_at_mut(1);
    match attacker {
        Side::A => (&mut first[0], &mut second[0]),
        Side::B => (&mut second[0], &mut first[0]),
    }
}

fn miss_chance_pct(attacker: &Combatant, defender: &Combatant) -> u32 {
    let mut pct = 0;
    if attacker.status.is_active(StatusKind::AccuracyDown) {
        pct += ACCURACY_PENALTY_PCT;
    }
    if defender.status.is_active(StatusKind::Dodge) {
        pct += DODGE_PCT;
    }
    if defender.status.is_active(StatusKind::SpeedBoost) {
        pct += SPEED_BOOST_EVASION_PCT;
    }
    pct.min(MAX_MISS_PCT)
}
