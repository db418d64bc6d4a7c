use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use brawl_cli::{fighter, init_tracing, load_catalog, load_config};
use brawl_engine::runner::{run_battle, BattleObserver, NoRewards};
use brawl_engine::{BattleOutcome, Power, SessionKey, SessionRegistry, Side, TurnReport};
use clap::{Parser, Subcommand};

#[derive(Subcommand)]
enum Cmd {
    /// Run one battle at table pace and print it turn by turn
    Duel {
        /// Name of the first fighter (acts first)
        #[arg(long, default_value = "Ryu")]
        a: String,
        /// Power for the first fighter, e.g. pyrokinesis
        #[arg(long)]
        a_power: Option<String>,
        /// Name of the second fighter
        #[arg(long, default_value = "Ken")]
        b: String,
        /// Power for the second fighter
        #[arg(long)]
        b_power: Option<String>,
        /// Arena by name (random if omitted)
        #[arg(long)]
        arena: Option<String>,
        /// RNG seed for determinism (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Pause between turns in milliseconds (overrides the config file)
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Battle config YAML
        #[arg(long)]
        config: Option<PathBuf>,
        /// Moves JSON (falls back to the built-in table)
        #[arg(long)]
        moves: Option<PathBuf>,
        /// Arenas YAML (falls back to the built-in table)
        #[arg(long)]
        arenas: Option<PathBuf>,
        /// Print the final outcome as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Serialize the move and arena tables to JSON (stdout)
    Catalog {
        /// Pretty-print JSON
        #[arg(long, default_value_t = true)]
        pretty: bool,
        #[arg(long)]
        moves: Option<PathBuf>,
        #[arg(long)]
        arenas: Option<PathBuf>,
    },
    /// List every special power with its trigger rate
    Powers,
}

#[derive(Parser)]
#[command(name = "brawl")]
#[command(about = "Turn-based battle CLI harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

/// Prints each turn as it lands.
struct Printer;

#[async_trait]
impl BattleObserver for Printer {
    async fn on_turn(&self, _key: &SessionKey, report: &TurnReport) -> Result<()> {
        println!("[TURN] {} → {}", report.turn, report.attacker);
        for line in &report.messages {
            println!("  {}", line);
        }
        println!(
            "  {} {} HP | {} {} HP",
            report.attacker, report.attacker_hp, report.defender, report.defender_hp
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Duel {
            a,
            a_power,
            b,
            b_power,
            arena,
            seed,
            delay_ms,
            config,
            moves,
            arenas,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(ms) = delay_ms {
                config.turn_delay_ms = ms;
            }
            let catalog = Arc::new(load_catalog(moves.as_deref(), arenas.as_deref())?);
            let arena_id = match arena.as_deref() {
                Some(name) => Some(
                    catalog
                        .arena_named(name)
                        .ok_or_else(|| anyhow!("arena '{}' not found", name))?,
                ),
                None => None,
            };

            let a = fighter(&a, a_power.as_deref(), config.max_health)?;
            let b = fighter(&b, b_power.as_deref(), config.max_health)?;
            let registry = SessionRegistry::new(Arc::clone(&catalog), config);
            let key = SessionKey::from("terminal");
            let mut battle = match seed {
                Some(seed) => registry.create_seeded(key, a, b, seed)?,
                None => registry.create(key, a, b)?,
            };
            if arena_id.is_some() {
                battle = battle.with_arena(arena_id);
            }

            println!(
                "[START] {} vs {} in {}",
                battle.fighter(Side::A).name,
                battle.fighter(Side::B).name,
                battle.arena_name().unwrap_or("an empty field")
            );
            let outcome = run_battle(battle, &registry, &Printer, &NoRewards).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        Cmd::Catalog {
            pretty,
            moves,
            arenas,
        } => {
            let catalog = load_catalog(moves.as_deref(), arenas.as_deref())?;
            let doc = serde_json::json!({ "moves": catalog.moves, "arenas": catalog.arenas });
            if pretty {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("{}", serde_json::to_string(&doc)?);
            }
        }
        Cmd::Powers => {
            for power in Power::all() {
                println!(
                    "{:<16} {:<10} {:>3.0}%",
                    power.name(),
                    power.category().to_string(),
                    power.proc_rate() * 100.0
                );
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &BattleOutcome) {
    let winner = outcome.winner().map(|w| w.name.as_str()).unwrap_or("nobody");
    println!(
        "[END] winner={} reason={:?} turns={}",
        winner, outcome.reason, outcome.turns
    );
    for f in &outcome.fighters {
        println!(
            "  {:<10} hp={}/{} dealt={} taken={} crits={} skipped={} powers={}",
            f.name,
            f.hp,
            f.max_hp,
            f.stats.damage_dealt,
            f.stats.damage_taken,
            f.stats.critical_hits,
            f.stats.turns_skipped,
            f.stats.abilities_triggered
        );
    }
}
