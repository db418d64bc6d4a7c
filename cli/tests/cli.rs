use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn powers_lists_every_category() {
    Command::cargo_bin("brawl")
        .expect("binary")
        .arg("powers")
        .assert()
        .success()
        .stdout(predicate::str::contains("pyrokinesis"))
        .stdout(predicate::str::contains("mutation"))
        .stdout(predicate::str::contains("obsidian_edge"));
}

#[test]
fn duel_runs_to_an_end() {
    Command::cargo_bin("brawl")
        .expect("binary")
        .args(["duel", "--seed", "7", "--delay-ms", "0", "--a-power", "berserker", "--arena", "Iron Foundry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[START] Ryu vs Ken in Iron Foundry"))
        .stdout(predicate::str::contains("[END] winner="));
}

#[test]
fn duel_rejects_unknown_arena() {
    Command::cargo_bin("brawl")
        .expect("binary")
        .args(["duel", "--delay-ms", "0", "--arena", "Moon Base"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("arena 'Moon Base' not found"));
}

#[test]
fn catalog_dump_reads_bom_prefixed_files() {
    let dir = std::env::temp_dir().join(format!("brawl-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let moves = dir.join("moves.json");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(br#"[{ "name": "Headlock", "category": "heavy" }]"#);
    fs::write(&moves, bytes).expect("write moves");

    Command::cargo_bin("brawl")
        .expect("binary")
        .args(["catalog", "--moves"])
        .arg(&moves)
        .assert()
        .success()
        .stdout(predicate::str::contains("Headlock"))
        .stdout(predicate::str::contains("Volcanic Crater"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn simulator_reports_rates() {
    Command::cargo_bin("brawl-sim")
        .expect("binary")
        .args(["--trials", "20", "--seed", "1", "--a-power", "vampirism"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trials:             20"))
        .stdout(predicate::str::contains("win rate:"));
}
