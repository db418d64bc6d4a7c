//! Synchronous one-call entry points: run a whole duel from a config and get
//! the log back. No registry, no pacing.

use std::{fs, sync::Arc};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::battle::{Battle, BattleOutcome, EndReason, Side};
use crate::{BattleConfig, Catalog, Combatant, Dice, Power};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FighterConfig {
    pub name: String,
    /// Bare power name, e.g. `"vampirism"`.
    #[serde(default)]
    pub power: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelConfig {
    pub fighter_a: FighterConfig,
    pub fighter_b: FighterConfig,
    /// Arena by name; random when absent.
    #[serde(default)]
    pub arena: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub moves_path: Option<String>,
    #[serde(default)]
    pub arenas_path: Option<String>,
    #[serde(default)]
    pub battle: BattleConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelResult {
    /// Winner's name, or `"draw"`.
    pub winner: String,
    pub reason: EndReason,
    pub turns: u32,
    pub a_hp_end: u32,
    pub b_hp_end: u32,
    pub arena: Option<String>,
    pub log: Vec<String>,
    pub outcome: BattleOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelManyStats {
    pub samples: u32,
    pub a_wins: u32,
    pub b_wins: u32,
    pub draws: u32,
    pub avg_turns: f64,
}

pub fn simulate_duel(cfg: DuelConfig) -> Result<DuelResult> {
    let catalog = Arc::new(load_catalog(&cfg)?);
    run_duel(&cfg, catalog, cfg.seed)
}

/// Run `samples` duels with seeds `seed, seed+1, ...` and tally the results.
pub fn simulate_duel_many(cfg: DuelConfig, samples: u32) -> Result<DuelManyStats> {
    let catalog = Arc::new(load_catalog(&cfg)?);
    let mut stats = DuelManyStats {
        samples,
        a_wins: 0,
        b_wins: 0,
        draws: 0,
        avg_turns: 0.0,
    };
    let mut total_turns = 0u64;

    for i in 0..samples {
        let res = run_duel(&cfg, Arc::clone(&catalog), cfg.seed.wrapping_add(i as u64))?;
        total_turns += res.turns as u64;
        match res.outcome.winner {
            Some(Side::A) => stats.a_wins += 1,
            Some(Side::B) => stats.b_wins += 1,
            None => stats.draws += 1,
        }
    }
    if samples > 0 {
        stats.avg_turns = total_turns as f64 / samples as f64;
    }
    Ok(stats)
}

fn run_duel(cfg: &DuelConfig, catalog: Arc<Catalog>, seed: u64) -> Result<DuelResult> {
    let a = build_fighter(&cfg.fighter_a, cfg.battle.max_health)?;
    let b = build_fighter(&cfg.fighter_b, cfg.battle.max_health)?;

    let mut battle = Battle::new(
        format!("duel-{}", seed),
        [a, b],
        Arc::clone(&catalog),
        cfg.battle.clone(),
        Dice::from_seed(seed),
    );
    if let Some(name) = cfg.arena.as_deref() {
        let id = catalog
            .arena_named(name)
            .ok_or_else(|| anyhow!("arena '{}' not found", name))?;
        battle = battle.with_arena(Some(id));
    }

    let mut logs = Vec::new();
    logs.push(format!(
        "[START] {} ({}) vs {} ({}) in {}",
        battle.fighter(Side::A).name,
        power_label(battle.fighter(Side::A)),
        battle.fighter(Side::B).name,
        power_label(battle.fighter(Side::B)),
        battle.arena_name().unwrap_or("an empty field")
    ));

    let outcome = battle.run_to_completion(|report| {
        logs.push(format!("[TURN] {} → {}", report.turn, report.attacker));
        logs.extend(report.messages.iter().cloned());
    });

    let winner = outcome
        .winner()
        .map(|w| w.name.clone())
        .unwrap_or_else(|| "draw".to_string());
    logs.push(format!(
        "[END] winner={} reason={:?} turns={} hp={}/{}",
        winner, outcome.reason, outcome.turns, outcome.fighters[0].hp, outcome.fighters[1].hp
    ));

    Ok(DuelResult {
        winner,
        reason: outcome.reason,
        turns: outcome.turns,
        a_hp_end: outcome.fighters[0].hp,
        b_hp_end: outcome.fighters[1].hp,
        arena: battle.arena_name().map(str::to_owned),
        log: logs,
        outcome,
    })
}

fn build_fighter(cfg: &FighterConfig, max_health: u32) -> Result<Combatant> {
    let mut fighter = Combatant::with_max_health(cfg.name.clone(), max_health);
    if let Some(name) = cfg.power.as_deref() {
        let power = Power::parse(name).ok_or_else(|| anyhow!("power '{}' not found", name))?;
        fighter = fighter.with_power(power);
    }
    Ok(fighter)
}

fn power_label(c: &Combatant) -> String {
    c.power.map(|p| p.to_string()).unwrap_or_else(|| "no power".to_string())
}

fn load_catalog(cfg: &DuelConfig) -> Result<Catalog> {
    let moves = match cfg.moves_path.as_deref() {
        Some(path) => read(path, "moves")?,
        None => crate::content::BUILTIN_MOVES.to_string(),
    };
    let arenas = match cfg.arenas_path.as_deref() {
        Some(path) => read(path, "arenas")?,
        None => crate::content::BUILTIN_ARENAS.to_string(),
    };
    Catalog::from_sources(&moves, &arenas)
}

fn read(path: &str, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {} file: {}", what, path))
}
