use serde::{Deserialize, Serialize};

/// A clamped health pool. `hp` never leaves `0..=max_hp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub hp: u32,
    pub max_hp: u32,
}

impl Health {
    pub fn new(max_hp: u32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }
}

/// Apply damage, clamping at 0. Returns true if the creature dropped to 0 this call.
pub fn apply_damage(name: &str, health: &mut Health, dmg: u32, mut log: impl FnMut(String)) -> bool {
    if health.is_down() || dmg == 0 {
        return false;
    }

    let before = health.hp;
    health.hp = health.hp.saturating_sub(dmg);
    log(format!("[HP][{}] {} → {} (−{})", name, before, health.hp, dmg));

    if health.hp == 0 {
        log(format!("[STATE][{}] is knocked out", name));
        return true;
    }
    false
}

/// Healing, capped at max. Returns the amount actually restored.
pub fn heal(name: &str, health: &mut Health, amount: u32, mut log: impl FnMut(String)) -> u32 {
    if amount == 0 || health.is_down() {
        return 0;
    }
    let before = health.hp;
    health.hp = health.hp.saturating_add(amount).min(health.max_hp);
    let restored = health.hp - before;
    if restored > 0 {
        log(format!("[HEAL][{}] +{} HP ({} → {})", name, restored, before, health.hp));
    }
    restored
}
