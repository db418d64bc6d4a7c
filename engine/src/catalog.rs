//! Read-only move and arena tables.
//!
//! Entries are curated content that may be incomplete while it is being
//! written, so every field has a default and an entry that cannot be decoded
//! at all is skipped with a warning instead of failing the whole table.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::abilities::PowerCategory;
use crate::status::StatusKind;

pub const FALLBACK_DAMAGE_RANGE: (u32, u32) = (5, 15);
pub const FALLBACK_CRIT_CHANCE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Ice,
    Lightning,
    Earth,
    Wind,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Ice => "ice",
            Element::Lightning => "lightning",
            Element::Earth => "earth",
            Element::Wind => "wind",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCategory {
    Regular,
    Heavy,
    Elemental,
    Ultimate,
    Support,
    #[default]
    #[serde(other)]
    Other,
}

impl MoveCategory {
    pub fn damage_range(self) -> (u32, u32) {
        match self {
            MoveCategory::Regular => (8, 14),
            MoveCategory::Heavy => (14, 22),
            MoveCategory::Elemental => (12, 20),
            MoveCategory::Ultimate => (24, 36),
            MoveCategory::Support => (2, 6),
            MoveCategory::Other => FALLBACK_DAMAGE_RANGE,
        }
    }

    pub fn crit_chance(self) -> f64 {
        match self {
            MoveCategory::Regular => 0.10,
            MoveCategory::Heavy => 0.15,
            MoveCategory::Elemental => 0.12,
            MoveCategory::Ultimate => 0.20,
            MoveCategory::Support => 0.05,
            MoveCategory::Other => FALLBACK_CRIT_CHANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    User,
    Opponent,
}

fn certain() -> f64 {
    1.0
}

fn one() -> u32 {
    1
}

/// Secondary status a move may inflict (or grant its user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEffect {
    pub status: StatusKind,
    #[serde(default = "certain")]
    pub chance: f64,
    #[serde(default = "one")]
    pub value: u32,
    #[serde(default = "one")]
    pub duration: u32,
    /// Harmful kinds default to the opponent, everything else to the user.
    #[serde(default)]
    pub target: Option<EffectTarget>,
}

impl MoveEffect {
    pub fn resolved_target(&self) -> EffectTarget {
        self.target.unwrap_or(if self.status.is_harmful() {
            EffectTarget::Opponent
        } else {
            EffectTarget::User
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub name: String,
    #[serde(default)]
    pub category: MoveCategory,
    #[serde(default)]
    pub element: Option<Element>,
    /// Inclusive `[min, max]`; absent means the category's range.
    #[serde(default)]
    pub damage: Option<(u32, u32)>,
    #[serde(default)]
    pub crit_chance: Option<f64>,
    #[serde(default)]
    pub cooldown: Option<u32>,
    #[serde(default)]
    pub effect: Option<MoveEffect>,
}

impl MoveDescriptor {
    pub fn new(name: impl Into<String>, category: MoveCategory) -> Self {
        Self {
            name: name.into(),
            category,
            element: None,
            damage: None,
            crit_chance: None,
            cooldown: None,
            effect: None,
        }
    }

    /// Used when the catalog offers nothing usable at all.
    pub fn struggle() -> Self {
        Self::new("Struggle", MoveCategory::Regular)
    }

    pub fn damage_range(&self) -> (u32, u32) {
        let (lo, hi) = self.damage.unwrap_or_else(|| self.category.damage_range());
        (lo.min(hi), lo.max(hi))
    }

    pub fn effective_crit_chance(&self) -> f64 {
        self.crit_chance.unwrap_or_else(|| self.category.crit_chance())
    }

    pub fn cooldown_turns(&self) -> u32 {
        self.cooldown.unwrap_or(0)
    }

    /// Damage the move advertises: the midpoint of its explicit range, if it has one.
    pub fn declared_damage(&self) -> Option<u32> {
        self.damage.map(|(lo, hi)| (lo + hi) / 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArenaId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodicEffect {
    /// Direct damage to both combatants.
    Damage { amount: u32 },
    /// `accuracy_down` on both combatants.
    AccuracyPenalty {
        #[serde(default = "one")]
        duration: u32,
    },
    /// A status on both combatants.
    Status {
        status: StatusKind,
        #[serde(default = "one")]
        value: u32,
        #[serde(default = "one")]
        duration: u32,
    },
    /// Boost matching moves for a few turns through `modify_move`.
    Surge {
        #[serde(default)]
        element: Option<Element>,
        damage_pct: u32,
        #[serde(default = "one")]
        turns: u32,
    },
}

fn default_event_cooldown() -> u32 {
    3
}

fn default_event_chance() -> f64 {
    0.25
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicEvent {
    #[serde(default = "default_event_cooldown")]
    pub cooldown: u32,
    #[serde(default = "default_event_chance")]
    pub chance: f64,
    #[serde(default)]
    pub message: String,
    pub effect: PeriodicEffect,
}

/// An arena rule that reshapes moves. Filters that are absent match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveModifier {
    pub element: Option<Element>,
    pub category: Option<MoveCategory>,
    pub damage_pct: Option<u32>,
    /// Restricts `chance_bonus` to effects of this status.
    pub status: Option<StatusKind>,
    pub chance_bonus: f64,
    pub crit_bonus: f64,
}

impl MoveModifier {
    pub fn matches(&self, mv: &MoveDescriptor) -> bool {
        self.element.is_none_or(|e| mv.element == Some(e))
            && self.category.is_none_or(|c| mv.category == c)
    }
}

fn hundred() -> u32 {
    100
}

/// Multiplier on a triggered special ability. Filters that are absent match everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synergy {
    #[serde(default)]
    pub category: Option<PowerCategory>,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default = "hundred")]
    pub multiplier_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub periodic: Option<PeriodicEvent>,
    #[serde(default)]
    pub modifiers: Vec<MoveModifier>,
    #[serde(default)]
    pub synergy: Vec<Synergy>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub moves: Vec<MoveDescriptor>,
    pub arenas: Vec<Arena>,
}

impl Catalog {
    /// The content shipped with the engine.
    pub fn builtin() -> Result<Self> {
        Self::from_sources(crate::content::BUILTIN_MOVES, crate::content::BUILTIN_ARENAS)
    }

    /// Moves as a JSON array, arenas as a YAML sequence.
    pub fn from_sources(moves_json: &str, arenas_yaml: &str) -> Result<Self> {
        let raw_moves: Vec<serde_json::Value> =
            serde_json::from_str(moves_json).context("move table is not a JSON array")?;
        let raw_arenas: Vec<serde_yaml::Value> =
            serde_yaml::from_str(arenas_yaml).context("arena table is not a YAML sequence")?;

        let moves = decode_entries("move", raw_moves, |v| serde_json::from_value(v).map_err(anyhow::Error::from))
            .into_iter()
            .map(normalize_move)
            .collect();
        let arenas = decode_entries("arena", raw_arenas, |v| serde_yaml::from_value(v).map_err(anyhow::Error::from));

        Ok(Self { moves, arenas })
    }

    pub fn move_named(&self, name: &str) -> Option<&MoveDescriptor> {
        self.moves.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn arena(&self, id: ArenaId) -> Option<&Arena> {
        self.arenas.get(id.0)
    }

    pub fn arena_named(&self, name: &str) -> Option<ArenaId> {
        self.arenas
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
            .map(ArenaId)
    }

    pub fn arena_ids(&self) -> Vec<ArenaId> {
        (0..self.arenas.len()).map(ArenaId).collect()
    }
}

fn decode_entries<V, T>(
    what: &str,
    raw: Vec<V>,
    decode: impl Fn(V) -> Result<T>,
) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match decode(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(what, idx, error = %err, "skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

fn normalize_move(mut mv: MoveDescriptor) -> MoveDescriptor {
    // Regular moves are the fallback pool and must always be usable.
    if mv.category == MoveCategory::Regular && mv.cooldown_turns() > 0 {
        warn!(name = %mv.name, "dropping cooldown from regular move");
        mv.cooldown = None;
    }
    if let Some(effect) = mv.effect.as_mut() {
        effect.chance = effect.chance.clamp(0.0, 1.0);
    }
    mv
}
