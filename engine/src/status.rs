//! Status conditions: stacking damage-over-time, action disablers and
//! duration modifiers, all stored per combatant.
//!
//! Nothing here is shared between combatants; every function takes the
//! combatant it acts on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combatant::Combatant;

pub const BURN_DAMAGE_PER_STACK: u32 = 5;
pub const POISON_DAMAGE_PER_STACK: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Burn,
    Poison,
    Stun,
    Freeze,
    Bind,
    Root,
    Protect,
    ShellDefense,
    DefenseDown,
    DefenseBoost,
    AttackBoost,
    AttackDown,
    ThunderCharge,
    ElementalBoost,
    SpeedBoost,
    Dodge,
    AccuracyDown,
    Immunity,
    /// Anything a catalog names that this engine does not know.
    #[serde(other)]
    Unknown,
}

/// How a kind stores its value and reacts to reapplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusShape {
    Stacking { cap: u32, damage_per_stack: u32 },
    Disabler { cap: u32, accumulates: bool },
    Modifier,
    Ignored,
}

impl StatusKind {
    pub const DISABLERS: [StatusKind; 4] = [Self::Stun, Self::Freeze, Self::Bind, Self::Root];

    pub fn shape(self) -> StatusShape {
        use StatusKind::*;
        match self {
            Burn => StatusShape::Stacking { cap: 3, damage_per_stack: BURN_DAMAGE_PER_STACK },
            Poison => StatusShape::Stacking { cap: 3, damage_per_stack: POISON_DAMAGE_PER_STACK },
            Stun => StatusShape::Disabler { cap: 2, accumulates: false },
            Freeze => StatusShape::Disabler { cap: 2, accumulates: true },
            Bind => StatusShape::Disabler { cap: 3, accumulates: false },
            Root => StatusShape::Disabler { cap: 2, accumulates: false },
            Unknown => StatusShape::Ignored,
            _ => StatusShape::Modifier,
        }
    }

    /// Upper bound on the stored value, if the kind has one.
    pub fn cap(self) -> Option<u32> {
        match self.shape() {
            StatusShape::Stacking { cap, .. } | StatusShape::Disabler { cap, .. } => Some(cap),
            _ => None,
        }
    }

    /// Conditions an opponent would want to inflict. Immunity blocks these.
    pub fn is_harmful(self) -> bool {
        use StatusKind::*;
        matches!(
            self,
            Burn | Poison | Stun | Freeze | Bind | Root | DefenseDown | AttackDown | AccuracyDown
        )
    }

    pub fn name(self) -> &'static str {
        use StatusKind::*;
        match self {
            Burn => "burn",
            Poison => "poison",
            Stun => "stun",
            Freeze => "freeze",
            Bind => "bind",
            Root => "root",
            Protect => "protect",
            ShellDefense => "shell_defense",
            DefenseDown => "defense_down",
            DefenseBoost => "defense_boost",
            AttackBoost => "attack_boost",
            AttackDown => "attack_down",
            ThunderCharge => "thunder_charge",
            ElementalBoost => "elemental_boost",
            SpeedBoost => "speed_boost",
            Dodge => "dodge",
            AccuracyDown => "accuracy_down",
            Immunity => "immunity",
            Unknown => "unknown",
        }
    }

    /// Lenient lookup by name; anything unrecognised is `Unknown`.
    pub fn parse(name: &str) -> StatusKind {
        let key = name.trim().to_lowercase().replace([' ', '-'], "_");
        serde_json::from_value(serde_json::Value::String(key)).unwrap_or(StatusKind::Unknown)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Active conditions on one combatant. A zero value is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBlock {
    entries: IndexMap<StatusKind, u32>,
}

impl StatusBlock {
    pub fn get(&self, kind: StatusKind) -> u32 {
        self.entries.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_active(&self, kind: StatusKind) -> bool {
        self.get(kind) > 0
    }

    fn set(&mut self, kind: StatusKind, value: u32) {
        let value = kind.cap().map_or(value, |cap| value.min(cap));
        if value == 0 || kind == StatusKind::Unknown {
            self.entries.shift_remove(&kind);
        } else {
            self.entries.insert(kind, value);
        }
    }

    /// Decrement by one, dropping the entry at zero. Returns the new value.
    fn tick(&mut self, kind: StatusKind) -> u32 {
        let next = self.get(kind).saturating_sub(1);
        self.set(kind, next);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, u32)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Result of start-of-turn processing for the acting combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upkeep {
    pub messages: Vec<String>,
    /// Damage owed by the combatant; the caller applies it.
    pub damage: u32,
    /// At least one disabler was active on entry.
    pub action_prevented: bool,
}

/// Inflict or grant a condition. Returns a confirmation line, or `None` when
/// the kind is unknown and nothing happened.
pub fn apply(kind: StatusKind, target: &mut Combatant, value: u32, duration: u32) -> Option<String> {
    let name = target.name.clone();
    let status = &mut target.status;

    if kind.is_harmful() && status.is_active(StatusKind::Immunity) {
        return Some(format!("[STATUS][{}] is immune to {}", name, kind));
    }

    match kind.shape() {
        StatusShape::Ignored => None,
        StatusShape::Stacking { .. } => {
            status.set(kind, status.get(kind).saturating_add(value));
            Some(format!("[STATUS][{}] {} x{}", name, kind, status.get(kind)))
        }
        StatusShape::Disabler { accumulates: true, .. } => {
            status.set(kind, status.get(kind).saturating_add(duration));
            Some(format!("[STATUS][{}] {} for {} turn(s)", name, kind, status.get(kind)))
        }
        StatusShape::Disabler { accumulates: false, .. } => {
            if status.is_active(kind) {
                return Some(format!("[STATUS][{}] is already under {}", name, kind));
            }
            status.set(kind, duration);
            Some(format!("[STATUS][{}] {} for {} turn(s)", name, kind, status.get(kind)))
        }
        StatusShape::Modifier => {
            status.set(kind, duration);
            Some(format!("[STATUS][{}] gains {} ({} turn(s))", name, kind, status.get(kind)))
        }
    }
}

/// Start-of-turn resolution, in fixed order: burn, poison, disablers, modifiers.
pub fn process(combatant: &mut Combatant) -> Upkeep {
    let name = combatant.name.clone();
    let status = &mut combatant.status;
    let mut upkeep = Upkeep::default();

    for kind in [StatusKind::Burn, StatusKind::Poison] {
        let stacks = status.get(kind);
        if stacks == 0 {
            continue;
        }
        let StatusShape::Stacking { damage_per_stack, .. } = kind.shape() else {
            continue;
        };
        let dmg = damage_per_stack * stacks;
        upkeep.damage += dmg;
        let left = status.tick(kind);
        upkeep
            .messages
            .push(format!("[{}][{}] takes {} damage ({} stack(s) left)", kind.name().to_uppercase(), name, dmg, left));
    }

    for kind in StatusKind::DISABLERS {
        if status.get(kind) == 0 {
            continue;
        }
        upkeep.action_prevented = true;
        let left = status.tick(kind);
        upkeep
            .messages
            .push(format!("[SKIP][{}] {}: skip turn ({} left)", name, kind, left));
    }

    let modifiers: Vec<StatusKind> = status
        .iter()
        .map(|(kind, _)| kind)
        .filter(|kind| kind.shape() == StatusShape::Modifier)
        .collect();
    for kind in modifiers {
        if status.tick(kind) == 0 {
            upkeep.messages.push(format!("[STATUS][{}] {} wears off", name, kind));
        }
    }

    upkeep
}

// (kind, numerator) pairs over a denominator of 100.
const DEFENDER_MULTIPLIERS: [(StatusKind, u64); 4] = [
    (StatusKind::Protect, 50),
    (StatusKind::ShellDefense, 60),
    (StatusKind::DefenseDown, 130),
    (StatusKind::DefenseBoost, 80),
];

const ATTACKER_MULTIPLIERS: [(StatusKind, u64); 4] = [
    (StatusKind::AttackBoost, 130),
    (StatusKind::ThunderCharge, 125),
    (StatusKind::ElementalBoost, 120),
    (StatusKind::AttackDown, 70),
];

/// Scale `base` by the defender's then the attacker's active modifiers.
/// Exact rational arithmetic, floored once at the end.
pub fn calculate_damage_with_effects(base: u32, attacker: &Combatant, defender: &Combatant) -> (u32, Vec<String>) {
    let mut numerator = base as u128;
    let mut denominator = 1u128;
    let mut messages = Vec::new();

    for (who, table) in [(defender, &DEFENDER_MULTIPLIERS), (attacker, &ATTACKER_MULTIPLIERS)] {
        for &(kind, pct) in table.iter() {
            if who.status.is_active(kind) {
                numerator *= pct as u128;
                denominator *= 100;
                messages.push(format!("[MOD][{}] {} ×{:.2}", who.name, kind, pct as f64 / 100.0));
            }
        }
    }

    let total = (numerator / denominator).min(u32::MAX as u128) as u32;
    (total, messages)
}

pub fn clear_all(combatant: &mut Combatant) {
    combatant.status.clear();
}

pub fn get_duration(combatant: &Combatant, kind: StatusKind) -> u32 {
    combatant.status.get(kind)
}
