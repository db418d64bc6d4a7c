use crate::Dice;
use crate::catalog::MoveDescriptor;
use crate::combatant::Combatant;

pub const CRIT_MULTIPLIER_PCT: u64 = 150;
pub const TURN_SCALING_STEP_PCT: u64 = 5;
pub const TURN_SCALING_CAP_PCT: u64 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRoll {
    pub damage: u32,
    pub critical: bool,
    pub annotation: Option<String>,
}

/// `min(1 + 0.05·turn, 2.0)` as a percentage.
pub fn turn_scaling_pct(turn: u32) -> u64 {
    (100 + TURN_SCALING_STEP_PCT * turn as u64).min(TURN_SCALING_CAP_PCT)
}

/// Roll base damage for `mv`, apply crit and turn scaling, and start the
/// move's cooldown. Rolls the range first, then the crit chance.
pub fn calculate(mv: &MoveDescriptor, attacker: &mut Combatant, turn: u32, dice: &mut Dice) -> DamageRoll {
    if attacker.cooldown(&mv.name) > 0 {
        return DamageRoll {
            damage: 0,
            critical: false,
            annotation: Some("on cooldown".to_string()),
        };
    }

    let (lo, hi) = mv.damage_range();
    let rolled = dice.range(lo, hi) as u64;

    let critical = dice.chance(mv.effective_crit_chance());
    let crit_pct = if critical {
        attacker.stats.critical_hits += 1;
        CRIT_MULTIPLIER_PCT
    } else {
        100
    };

    let damage = rolled * crit_pct * turn_scaling_pct(turn) / (100 * 100);
    start_cooldown(mv, attacker);

    DamageRoll {
        damage: damage.min(u32::MAX as u64) as u32,
        critical,
        annotation: critical.then(|| "critical hit!".to_string()),
    }
}

/// Put `mv` on the attacker's cooldown table if it has one.
pub fn start_cooldown(mv: &MoveDescriptor, attacker: &mut Combatant) {
    let turns = mv.cooldown_turns();
    if turns > 0 {
        attacker.cooldowns.insert(mv.name.clone(), turns);
    }
}
