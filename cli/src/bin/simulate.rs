use std::{path::PathBuf, sync::Arc};

use anyhow::anyhow;
use brawl_cli::{fighter, init_tracing, load_catalog, load_config};
use brawl_engine::{Battle, Dice, EndReason, Side};
use clap::Parser;

#[derive(Parser)]
#[command(name = "brawl-sim")]
#[command(about = "Monte Carlo sim: many unpaced battles between two loadouts")]
struct Args {
    /// Power for side A (none if omitted)
    #[arg(long)]
    a_power: Option<String>,

    /// Power for side B (none if omitted)
    #[arg(long)]
    b_power: Option<String>,

    /// Arena by name; random per trial if omitted
    #[arg(long)]
    arena: Option<String>,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Safety cap on turns per trial (overrides the config file)
    #[arg(long)]
    max_turns: Option<u32>,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Battle config YAML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optional moves JSON (falls back to the built-in table)
    #[arg(long)]
    moves: Option<PathBuf>,

    /// Optional arenas YAML (falls back to the built-in table)
    #[arg(long)]
    arenas: Option<PathBuf>,
}

#[derive(Default)]
struct Tally {
    wins: [u32; 2],
    draws: u32,
    turn_limits: u32,
    crits: [u64; 2],
    powers: [u64; 2],
    damage: [u64; 2],
    moves: [u64; 2],
    turns_on_ko: Vec<u32>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    let catalog = Arc::new(load_catalog(args.moves.as_deref(), args.arenas.as_deref())?);
    let arena = match args.arena.as_deref() {
        Some(name) => Some(
            catalog
                .arena_named(name)
                .ok_or_else(|| anyhow!("arena '{}' not found", name))?,
        ),
        None => None,
    };
    let a = fighter("A", args.a_power.as_deref(), config.max_health)?;
    let b = fighter("B", args.b_power.as_deref(), config.max_health)?;

    let mut tally = Tally::default();
    for i in 0..args.trials {
        let trial_seed = args.seed.wrapping_add(i as u64);
        let mut battle = Battle::new(
            format!("sim-{}", i),
            [a.clone(), b.clone()],
            Arc::clone(&catalog),
            config.clone(),
            Dice::from_seed(trial_seed),
        );
        if arena.is_some() {
            battle = battle.with_arena(arena);
        }
        let outcome = battle.run_to_completion(|_| {});

        match outcome.winner {
            Some(side) => {
                tally.wins[side.index()] += 1;
                tally.turns_on_ko.push(outcome.turns);
            }
            None => tally.draws += 1,
        }
        if outcome.reason == EndReason::TurnLimit {
            tally.turn_limits += 1;
        }
        for (idx, f) in outcome.fighters.iter().enumerate() {
            tally.crits[idx] += f.stats.critical_hits as u64;
            tally.powers[idx] += f.stats.abilities_triggered as u64;
            tally.damage[idx] += f.stats.damage_dealt as u64;
            tally.moves[idx] += f.stats.moves_used as u64;
        }
    }

    tally.turns_on_ko.sort_unstable();
    let trials_f = args.trials.max(1) as f64;
    let avg_turns = if tally.turns_on_ko.is_empty() {
        0.0
    } else {
        tally.turns_on_ko.iter().map(|&t| t as u64).sum::<u64>() as f64 / tally.turns_on_ko.len() as f64
    };
    let median_turns = if tally.turns_on_ko.is_empty() {
        0
    } else {
        let m = tally.turns_on_ko.len() / 2;
        if tally.turns_on_ko.len() % 2 == 1 {
            tally.turns_on_ko[m]
        } else {
            (tally.turns_on_ko[m - 1] + tally.turns_on_ko[m]) / 2
        }
    };
    let rate = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };

    println!("brawl-sim results");
    println!("-----------------");
    println!("trials:             {}", args.trials);
    println!(
        "arena:              {}",
        arena
            .and_then(|id| catalog.arena(id))
            .map_or("random", |a| a.name.as_str())
    );
    println!("max turns:          {}", config.max_turns);
    println!();
    for side in [Side::A, Side::B] {
        let i = side.index();
        let power = [&args.a_power, &args.b_power][i].as_deref().unwrap_or("none");
        println!("side {:?} ({})", side, power);
        println!("  win rate:         {:.1}%", tally.wins[i] as f64 / trials_f * 100.0);
        println!("  crit rate:        {:.1}%", rate(tally.crits[i], tally.moves[i]) * 100.0);
        println!("  power triggers:   {:.2} per battle", tally.powers[i] as f64 / trials_f);
        println!("  avg dmg dealt:    {:.1}", tally.damage[i] as f64 / trials_f);
    }
    println!();
    println!("draws:              {} ({} at turn limit)", tally.draws, tally.turn_limits);
    println!("avg turns (KOs):    {:.2}", avg_turns);
    println!("median turns (KOs): {}", median_turns);

    Ok(())
}
