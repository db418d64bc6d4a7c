//! Battle arenas: a periodic, probabilistic event gated by a countdown, and
//! a pure move-shaping step.
//!
//! The two are separate so the turn loop can apply the environment at two
//! points: `tick` at the top of the turn, `modify_move` once a move is picked.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::{ArenaId, Catalog, Element, MoveDescriptor, PeriodicEffect};
use crate::combatant::Combatant;
use crate::status::{self, StatusKind};
use crate::{Dice, scale_pct};

/// Temporary boost left behind by a periodic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surge {
    pub element: Option<Element>,
    pub damage_pct: u32,
    pub turns_left: u32,
}

impl Surge {
    fn matches(&self, mv: &MoveDescriptor) -> bool {
        self.element.is_none_or(|e| mv.element == Some(e))
    }
}

#[derive(Debug, Clone, Default)]
struct ArenaState {
    countdown: u32,
    surge: Option<Surge>,
}

/// Session-scoped arena state over a shared catalog.
#[derive(Debug, Clone)]
pub struct EnvironmentEngine {
    catalog: Arc<Catalog>,
    states: IndexMap<ArenaId, ArenaState>,
}

impl EnvironmentEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            states: IndexMap::new(),
        }
    }

    /// Uniform pick among all arenas; `None` if the catalog has none.
    pub fn choose(&self, dice: &mut Dice) -> Option<ArenaId> {
        dice.pick(&self.catalog.arena_ids()).copied()
    }

    fn state_mut(&mut self, id: ArenaId) -> Option<&mut ArenaState> {
        let cooldown = self.catalog.arena(id)?.periodic.as_ref().map_or(0, |p| p.cooldown);
        Some(self.states.entry(id).or_insert_with(|| ArenaState {
            countdown: cooldown,
            surge: None,
        }))
    }

    /// Turns left before the arena's event is next rolled.
    pub fn countdown(&self, id: ArenaId) -> Option<u32> {
        match self.states.get(&id) {
            Some(state) => Some(state.countdown),
            None => self.catalog.arena(id)?.periodic.as_ref().map(|p| p.cooldown),
        }
    }

    pub fn active_surge(&self, id: ArenaId) -> Option<&Surge> {
        self.states.get(&id)?.surge.as_ref()
    }

    /// Advance the arena by one turn. While the countdown is positive it only
    /// decrements; at zero it resets and the event fires with the arena's chance.
    pub fn tick(&mut self, id: ArenaId, combatants: &mut [Combatant; 2], turn: u32, dice: &mut Dice) -> Vec<String> {
        let catalog = Arc::clone(&self.catalog);
        let Some(arena) = catalog.arena(id) else {
            return Vec::new();
        };
        let Some(state) = self.state_mut(id) else {
            return Vec::new();
        };

        if let Some(surge) = state.surge.as_mut() {
            surge.turns_left = surge.turns_left.saturating_sub(1);
            if surge.turns_left == 0 {
                state.surge = None;
            }
        }

        let Some(event) = arena.periodic.as_ref() else {
            return Vec::new();
        };
        if state.countdown > 0 {
            state.countdown -= 1;
            return Vec::new();
        }
        state.countdown = event.cooldown;
        if !dice.chance(event.chance) {
            return Vec::new();
        }

        debug!(arena = %arena.name, turn, "arena event fires");
        let mut messages = Vec::new();
        if !event.message.is_empty() {
            messages.push(format!("[ARENA] {}", event.message));
        }

        match &event.effect {
            PeriodicEffect::Damage { amount } => {
                for fighter in combatants.iter_mut() {
                    fighter.take_damage(*amount, |m| messages.push(m));
                }
            }
            PeriodicEffect::AccuracyPenalty { duration } => {
                for fighter in combatants.iter_mut() {
                    messages.extend(status::apply(StatusKind::AccuracyDown, fighter, 1, *duration));
                }
            }
            PeriodicEffect::Status { status: kind, value, duration } => {
                for fighter in combatants.iter_mut() {
                    messages.extend(status::apply(*kind, fighter, *value, *duration));
                }
            }
            PeriodicEffect::Surge { element, damage_pct, turns } => {
                state.surge = Some(Surge {
                    element: *element,
                    damage_pct: *damage_pct,
                    turns_left: *turns,
                });
            }
        }
        messages
    }

    /// Reshape `mv` for this arena. The input is left untouched.
    pub fn modify_move(&self, id: ArenaId, mv: &MoveDescriptor) -> (MoveDescriptor, Vec<String>) {
        let mut shaped = mv.clone();
        let mut messages = Vec::new();
        let Some(arena) = self.catalog.arena(id) else {
            return (shaped, messages);
        };

        for modifier in arena.modifiers.iter().filter(|m| m.matches(mv)) {
            if let Some(pct) = modifier.damage_pct {
                scale_range(&mut shaped, pct);
                messages.push(format!("[ARENA] {} shapes {} (×{:.2})", arena.name, mv.name, pct as f64 / 100.0));
            }
            if modifier.chance_bonus != 0.0 {
                if let Some(effect) = shaped.effect.as_mut() {
                    if modifier.status.is_none_or(|s| s == effect.status) {
                        effect.chance = (effect.chance + modifier.chance_bonus).clamp(0.0, 1.0);
                        messages.push(format!(
                            "[ARENA] {} raises the {} chance of {} to {:.0}%",
                            arena.name,
                            effect.status,
                            mv.name,
                            effect.chance * 100.0
                        ));
                    }
                }
            }
            if modifier.crit_bonus != 0.0 {
                shaped.crit_chance = Some((shaped.effective_crit_chance() + modifier.crit_bonus).clamp(0.0, 1.0));
            }
        }

        if let Some(surge) = self.active_surge(id).filter(|s| s.matches(mv)) {
            scale_range(&mut shaped, surge.damage_pct);
            messages.push(format!("[ARENA] the surge in {} amplifies {}", arena.name, mv.name));
        }

        (shaped, messages)
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

fn scale_range(mv: &mut MoveDescriptor, pct: u32) {
    let (lo, hi) = mv.damage_range();
    mv.damage = Some((scale_pct(lo, pct), scale_pct(hi, pct)));
}
