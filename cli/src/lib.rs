//! Helpers shared by the `brawl` and `brawl-sim` binaries.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use brawl_engine::{content, BattleConfig, Catalog, Combatant, Power};
use encoding_rs::Encoding;

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a text file, honouring a UTF-8/UTF-16 BOM if there is one.
pub fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
    }
}

/// Built-in tables unless a file overrides one of them.
pub fn load_catalog(moves: Option<&Path>, arenas: Option<&Path>) -> Result<Catalog> {
    let moves = match moves {
        Some(path) => read_text_auto(path)?,
        None => content::BUILTIN_MOVES.to_string(),
    };
    let arenas = match arenas {
        Some(path) => read_text_auto(path)?,
        None => content::BUILTIN_ARENAS.to_string(),
    };
    Catalog::from_sources(&moves, &arenas)
}

pub fn load_config(path: Option<&Path>) -> Result<BattleConfig> {
    match path {
        Some(path) => BattleConfig::from_yaml_str(&read_text_auto(path)?)
            .with_context(|| format!("invalid battle config: {}", path.display())),
        None => BattleConfig::from_yaml_str(content::DEFAULT_CONFIG),
    }
}

pub fn fighter(name: &str, power: Option<&str>, max_health: u32) -> Result<Combatant> {
    let mut c = Combatant::with_max_health(name, max_health);
    if let Some(p) = power {
        let power = Power::parse(p).ok_or_else(|| anyhow!("power '{}' not found (try `brawl powers`)", p))?;
        c = c.with_power(power);
    }
    Ok(c)
}
