use brawl_engine::api::{simulate_duel, simulate_duel_many, DuelConfig, FighterConfig};
use brawl_engine::BattleConfig;

fn cfg(seed: u64) -> DuelConfig {
    DuelConfig {
        fighter_a: FighterConfig {
            name: "Ryu".to_string(),
            power: Some("electrokinesis".to_string()),
        },
        fighter_b: FighterConfig {
            name: "Ken".to_string(),
            power: Some("chitin armor".to_string()),
        },
        arena: Some("Storm Peak".to_string()),
        seed,
        moves_path: None,
        arenas_path: None,
        battle: BattleConfig::default(),
    }
}

#[test]
fn duel_api_smoke() {
    let res = simulate_duel(cfg(2025)).expect("duel ran");
    assert!(res.turns > 0);
    assert!(matches!(res.winner.as_str(), "Ryu" | "Ken" | "draw"));
    assert_eq!(res.arena.as_deref(), Some("Storm Peak"));
    assert!(res.log.first().is_some_and(|l| l.starts_with("[START]")));
    assert!(res.log.last().is_some_and(|l| l.starts_with("[END]")));
}

#[test]
fn duel_is_deterministic_per_seed() {
    let a = simulate_duel(cfg(7)).expect("duel ran");
    let b = simulate_duel(cfg(7)).expect("duel ran");
    assert_eq!(a.log, b.log);
    assert_eq!(a.outcome, b.outcome);
}

#[test]
fn unknown_names_are_rejected() {
    let mut bad_power = cfg(1);
    bad_power.fighter_b.power = Some("telepathy".to_string());
    assert!(simulate_duel(bad_power).is_err());

    let mut bad_arena = cfg(1);
    bad_arena.arena = Some("Moon Base".to_string());
    assert!(simulate_duel(bad_arena).is_err());

    let mut bad_path = cfg(1);
    bad_path.moves_path = Some("/nonexistent/moves.json".to_string());
    assert!(simulate_duel(bad_path).is_err());
}

#[test]
fn config_deserializes_with_defaults() {
    let cfg: DuelConfig = serde_json::from_str(
        r#"{ "fighter_a": { "name": "Ryu" }, "fighter_b": { "name": "Ken", "power": "berserker" }, "battle": { "max_turns": 40 } }"#,
    )
    .expect("config");
    assert_eq!(cfg.seed, 0);
    assert!(cfg.arena.is_none());
    assert_eq!(cfg.battle.max_turns, 40);
    assert_eq!(cfg.battle.max_health, 250);
}

#[test]
fn many_duels_tally_every_sample() {
    let stats = simulate_duel_many(cfg(100), 20).expect("duels ran");
    assert_eq!(stats.samples, 20);
    assert_eq!(stats.a_wins + stats.b_wins + stats.draws, 20);
    assert!(stats.avg_turns > 0.0);
}
