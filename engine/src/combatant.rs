use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::abilities::{Power, PowerCategory};
use crate::config::DEFAULT_MAX_HEALTH;
use crate::life::{self, Health};
use crate::status::StatusBlock;

/// Per-battle tallies handed to the rewards collaborator when the battle ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCounters {
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub critical_hits: u32,
    pub moves_used: u32,
    pub turns_skipped: u32,
    pub abilities_triggered: u32,
    pub categories_used: BTreeSet<PowerCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub health: Health,
    pub power: Option<Power>,
    /// Move name → own turns until usable again.
    pub cooldowns: IndexMap<String, u32>,
    pub status: StatusBlock,
    pub stats: StatCounters,
}

impl Combatant {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_max_health(name, DEFAULT_MAX_HEALTH)
    }

    pub fn with_max_health(name: impl Into<String>, max_health: u32) -> Self {
        Self {
            name: name.into(),
            health: Health::new(max_health),
            power: None,
            cooldowns: IndexMap::new(),
            status: StatusBlock::default(),
            stats: StatCounters::default(),
        }
    }

    pub fn with_power(mut self, power: Power) -> Self {
        self.power = Some(power);
        self
    }

    pub fn hp(&self) -> u32 {
        self.health.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.health.max_hp
    }

    pub fn is_down(&self) -> bool {
        self.health.is_down()
    }

    pub fn power_category(&self) -> Option<PowerCategory> {
        self.power.map(|p| p.category())
    }

    /// Lose health (clamped at 0) and count it as damage taken.
    /// Returns the health actually lost.
    pub fn take_damage(&mut self, dmg: u32, log: impl FnMut(String)) -> u32 {
        let before = self.health.hp;
        life::apply_damage(&self.name, &mut self.health, dmg, log);
        let lost = before - self.health.hp;
        self.stats.damage_taken += lost;
        lost
    }

    pub fn heal(&mut self, amount: u32, log: impl FnMut(String)) -> u32 {
        life::heal(&self.name, &mut self.health, amount, log)
    }

    pub fn cooldown(&self, move_name: &str) -> u32 {
        self.cooldowns.get(move_name).copied().unwrap_or(0)
    }

    /// Count every cooldown down by one turn and forget the ones that reach zero.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    /// Reset to the state a fresh session expects: full health, nothing active.
    pub fn reset_for_battle(&mut self) {
        self.health.hp = self.health.max_hp;
        self.cooldowns.clear();
        self.status.clear();
        self.stats = StatCounters::default();
    }
}
