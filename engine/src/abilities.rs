//! Special abilities: one equipped power per combatant, from exactly one of
//! three categories. Each category enum owns its effect table; adding a
//! category means adding a variant and a table here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Arena, Element, MoveDescriptor};
use crate::combatant::Combatant;
use crate::status::{self, StatusKind};
use crate::{Dice, scale_pct};

/// Base damage assumed when the move declares none.
pub const DEFAULT_BASE_DAMAGE: u32 = 15;
/// Share of base damage an equipped power always adds when it does not trigger.
pub const FALLBACK_BONUS_PCT: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerCategory {
    Elemental,
    Mutation,
    Material,
}

impl fmt::Display for PowerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PowerCategory::Elemental => "elemental",
            PowerCategory::Mutation => "mutation",
            PowerCategory::Material => "material",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementalPower {
    Pyrokinesis,
    Cryokinesis,
    Electrokinesis,
    Hydrokinesis,
    Geokinesis,
    Aerokinesis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPower {
    Regeneration,
    Vampirism,
    ToxicGlands,
    Berserker,
    ChitinArmor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialPower {
    Ferrokinesis,
    Crystallization,
    SandVeil,
    Elasticity,
    ObsidianEdge,
}

/// An equipped power. Serialized as `{"elemental": "pyrokinesis"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Power {
    Elemental(ElementalPower),
    Mutation(MutationPower),
    Material(MaterialPower),
}

/// A status written by an ability: (kind, value, duration).
type Grant = (StatusKind, u32, u32);

/// One row of a category's private effect table.
#[derive(Debug, Clone, Copy)]
struct AbilityEffect {
    proc_rate: f64,
    /// Bonus as a percentage of base damage.
    multiplier_pct: u32,
    on_foe: Option<Grant>,
    on_self: Option<Grant>,
    /// Share of the bonus returned to the attacker as health.
    drain_pct: u32,
    verb: &'static str,
}

const fn effect(proc_rate: f64, multiplier_pct: u32, verb: &'static str) -> AbilityEffect {
    AbilityEffect {
        proc_rate,
        multiplier_pct,
        on_foe: None,
        on_self: None,
        drain_pct: 0,
        verb,
    }
}

impl ElementalPower {
    pub const ALL: [ElementalPower; 6] = [
        Self::Pyrokinesis,
        Self::Cryokinesis,
        Self::Electrokinesis,
        Self::Hydrokinesis,
        Self::Geokinesis,
        Self::Aerokinesis,
    ];

    pub fn element(self) -> Element {
        match self {
            Self::Pyrokinesis => Element::Fire,
            Self::Cryokinesis => Element::Ice,
            Self::Electrokinesis => Element::Lightning,
            Self::Hydrokinesis => Element::Water,
            Self::Geokinesis => Element::Earth,
            Self::Aerokinesis => Element::Wind,
        }
    }

    fn effect(self) -> AbilityEffect {
        match self {
            Self::Pyrokinesis => AbilityEffect {
                on_foe: Some((StatusKind::Burn, 1, 1)),
                ..effect(0.45, 120, "engulfs the target in flame")
            },
            Self::Cryokinesis => AbilityEffect {
                on_foe: Some((StatusKind::Freeze, 0, 1)),
                ..effect(0.40, 80, "flash-freezes the air")
            },
            Self::Electrokinesis => AbilityEffect {
                on_foe: Some((StatusKind::Stun, 0, 1)),
                ..effect(0.45, 100, "arcs lightning through the target")
            },
            Self::Hydrokinesis => AbilityEffect {
                on_self: Some((StatusKind::ShellDefense, 0, 2)),
                ..effect(0.50, 90, "raises a wall of water")
            },
            Self::Geokinesis => AbilityEffect {
                on_foe: Some((StatusKind::Root, 0, 1)),
                ..effect(0.40, 110, "splits the ground underfoot")
            },
            Self::Aerokinesis => AbilityEffect {
                on_self: Some((StatusKind::Dodge, 0, 2)),
                ..effect(0.55, 70, "rides a sudden gale")
            },
        }
    }
}

impl MutationPower {
    pub const ALL: [MutationPower; 5] = [
        Self::Regeneration,
        Self::Vampirism,
        Self::ToxicGlands,
        Self::Berserker,
        Self::ChitinArmor,
    ];

    fn effect(self) -> AbilityEffect {
        match self {
            Self::Regeneration => AbilityEffect {
                drain_pct: 100,
                ..effect(0.55, 40, "knits its wounds shut")
            },
            Self::Vampirism => AbilityEffect {
                drain_pct: 50,
                ..effect(0.40, 80, "drinks deep")
            },
            Self::ToxicGlands => AbilityEffect {
                on_foe: Some((StatusKind::Poison, 2, 0)),
                ..effect(0.50, 60, "sprays venom")
            },
            Self::Berserker => AbilityEffect {
                on_self: Some((StatusKind::AttackBoost, 0, 2)),
                ..effect(0.35, 200, "flies into a frenzy")
            },
            Self::ChitinArmor => AbilityEffect {
                on_self: Some((StatusKind::Protect, 0, 1)),
                ..effect(0.45, 50, "hardens its carapace")
            },
        }
    }
}

impl MaterialPower {
    pub const ALL: [MaterialPower; 5] = [
        Self::Ferrokinesis,
        Self::Crystallization,
        Self::SandVeil,
        Self::Elasticity,
        Self::ObsidianEdge,
    ];

    fn effect(self) -> AbilityEffect {
        match self {
            Self::Ferrokinesis => AbilityEffect {
                on_foe: Some((StatusKind::Bind, 0, 2)),
                ..effect(0.40, 150, "wraps the target in iron")
            },
            Self::Crystallization => AbilityEffect {
                on_self: Some((StatusKind::ShellDefense, 0, 2)),
                ..effect(0.45, 90, "grows a crystal lattice")
            },
            Self::SandVeil => AbilityEffect {
                on_foe: Some((StatusKind::AccuracyDown, 0, 2)),
                ..effect(0.50, 70, "blinds the target with sand")
            },
            Self::Elasticity => AbilityEffect {
                on_self: Some((StatusKind::Dodge, 0, 1)),
                ..effect(0.45, 60, "snaps back like rubber")
            },
            Self::ObsidianEdge => AbilityEffect {
                on_foe: Some((StatusKind::DefenseDown, 0, 2)),
                ..effect(0.35, 180, "carves with volcanic glass")
            },
        }
    }
}

impl Power {
    pub fn category(self) -> PowerCategory {
        match self {
            Power::Elemental(_) => PowerCategory::Elemental,
            Power::Mutation(_) => PowerCategory::Mutation,
            Power::Material(_) => PowerCategory::Material,
        }
    }

    pub fn element(self) -> Option<Element> {
        match self {
            Power::Elemental(p) => Some(p.element()),
            _ => None,
        }
    }

    fn effect(self) -> AbilityEffect {
        match self {
            Power::Elemental(p) => p.effect(),
            Power::Mutation(p) => p.effect(),
            Power::Material(p) => p.effect(),
        }
    }

    /// Probability the power triggers on a given attack.
    pub fn proc_rate(self) -> f64 {
        self.effect().proc_rate
    }

    pub fn name(self) -> String {
        let json = match self {
            Power::Elemental(p) => serde_json::to_value(p),
            Power::Mutation(p) => serde_json::to_value(p),
            Power::Material(p) => serde_json::to_value(p),
        };
        json.ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default()
    }

    pub fn all() -> Vec<Power> {
        ElementalPower::ALL
            .into_iter()
            .map(Power::Elemental)
            .chain(MutationPower::ALL.into_iter().map(Power::Mutation))
            .chain(MaterialPower::ALL.into_iter().map(Power::Material))
            .collect()
    }

    /// Look a power up by its bare name, e.g. `"vampirism"`.
    pub fn parse(name: &str) -> Option<Power> {
        let key = name.trim().to_lowercase().replace([' ', '-'], "_");
        Self::all().into_iter().find(|p| p.name() == key)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.category())
    }
}

/// What one ability resolution did. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityOutcome {
    pub bonus_damage: u32,
    pub message: Option<String>,
    pub triggered: bool,
    pub applied: Vec<String>,
    /// Share of the damage actually dealt that returns to the attacker.
    pub drain_pct: u32,
}

/// Resolve the attacker's equipped power against this attack.
///
/// Arena synergies multiply the bonus only when the power triggers; a miss
/// on the proc roll still yields a small guaranteed bonus.
pub fn resolve(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    mv: &MoveDescriptor,
    arena: Option<&Arena>,
    dice: &mut Dice,
) -> AbilityOutcome {
    let Some(power) = attacker.power else {
        return AbilityOutcome::default();
    };
    attacker.stats.categories_used.insert(power.category());

    let base = mv.declared_damage().unwrap_or(DEFAULT_BASE_DAMAGE);
    let table = power.effect();

    if !dice.chance(table.proc_rate) {
        let bonus = scale_pct(base, FALLBACK_BONUS_PCT);
        return AbilityOutcome {
            bonus_damage: bonus,
            message: Some(format!(
                "[POWER][{}] {} flickers without surging (+{})",
                attacker.name,
                power.name(),
                bonus
            )),
            triggered: false,
            applied: Vec::new(),
            drain_pct: 0,
        };
    }

    let mut bonus = scale_pct(base, table.multiplier_pct);
    if let Some(arena) = arena {
        for synergy in &arena.synergy {
            let category_ok = synergy.category.is_none_or(|c| c == power.category());
            let element_ok = synergy.element.is_none_or(|e| power.element() == Some(e));
            if category_ok && element_ok {
                bonus = scale_pct(bonus, synergy.multiplier_pct);
            }
        }
    }

    attacker.stats.abilities_triggered += 1;
    let mut applied = Vec::new();
    if let Some((kind, value, duration)) = table.on_foe {
        applied.extend(status::apply(kind, defender, value, duration));
    }
    if let Some((kind, value, duration)) = table.on_self {
        applied.extend(status::apply(kind, attacker, value, duration));
    }

    AbilityOutcome {
        bonus_damage: bonus,
        message: Some(format!(
            "[POWER][{}] {} {} (+{})",
            attacker.name,
            power.name(),
            table.verb,
            bonus
        )),
        triggered: true,
        applied,
        drain_pct: table.drain_pct,
    }
}

/// Heal the attacker by the drain share of the bonus, capped at what the
/// defender actually lost after mitigation. Returns the health restored.
pub fn drain(attacker: &mut Combatant, ability: &AbilityOutcome, dealt: u32, log: impl FnMut(String)) -> u32 {
    if ability.drain_pct == 0 {
        return 0;
    }
    let share = scale_pct(ability.bonus_damage.min(dealt), ability.drain_pct);
    attacker.heal(share, log)
}
