use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod abilities;
pub mod api;
pub mod battle;
pub mod catalog;
pub mod combatant;
pub mod config;
pub mod content;
pub mod damage;
pub mod environment;
pub mod error;
pub mod life;
pub mod registry;
pub mod runner;
pub mod status;

pub use abilities::{AbilityOutcome, ElementalPower, MaterialPower, MutationPower, Power, PowerCategory};
pub use battle::{Battle, BattleOutcome, EndReason, Side, TurnReport};
pub use catalog::{Arena, ArenaId, Catalog, Element, MoveCategory, MoveDescriptor, MoveEffect};
pub use combatant::{Combatant, StatCounters};
pub use config::BattleConfig;
pub use error::{BattleError, Result};
pub use registry::{SessionKey, SessionRegistry, SessionStatus};
pub use status::{StatusBlock, StatusKind};

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { rolls: Vec<f64>, next: usize },
}

/// Randomness for one battle. Every probabilistic decision in the engine
/// goes through one of these three calls, so a scripted source can force
/// any outcome.
pub struct Dice { source: Source }

impl fmt::Debug for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Seeded(_) => f.write_str("Dice(seeded)"),
            Source::Scripted { rolls, next } => write!(f, "Dice(scripted {}/{})", next, rolls.len()),
        }
    }
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::from_entropy()) }
    }

    /// Replays `rolls` (each in `0.0..1.0`) in order, cycling when exhausted.
    pub fn from_scripted(rolls: Vec<f64>) -> Self {
        let rolls = if rolls.is_empty() { vec![0.5] } else { rolls };
        Self { source: Source::Scripted { rolls, next: 0 } }
    }

    fn unit(&mut self) -> f64 {
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0.0..1.0),
            Source::Scripted { rolls, next } => {
                let roll = rolls[*next % rolls.len()];
                *next += 1;
                roll.clamp(0.0, 0.999_999)
            }
        }
    }

    /// Uniform integer in `lo..=hi`. A reversed range collapses to `lo`.
    pub fn range(&mut self, lo: u32, hi: u32) -> u32 {
        let hi = hi.max(lo);
        if let Source::Seeded(rng) = &mut self.source {
            return rng.gen_range(lo..=hi);
        }
        let span = (hi - lo) as f64 + 1.0;
        (lo + (self.unit() * span) as u32).min(hi)
    }

    /// True with probability `p`. Always consumes one roll.
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.unit() * items.len() as f64) as usize;
        items.get(idx.min(items.len() - 1))
    }
}

/// Scale `value` by `pct` percent, flooring.
pub fn scale_pct(value: u32, pct: u32) -> u32 {
    (value as u64 * pct as u64 / 100) as u32
}
