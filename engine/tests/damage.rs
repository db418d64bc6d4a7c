use brawl_engine::damage::{self, turn_scaling_pct};
use brawl_engine::{Combatant, Dice, MoveCategory, MoveDescriptor};
use proptest::prelude::*;

fn fixed(lo: u32, hi: u32, crit: f64) -> MoveDescriptor {
    MoveDescriptor {
        damage: Some((lo, hi)),
        crit_chance: Some(crit),
        ..MoveDescriptor::new("Test Strike", MoveCategory::Regular)
    }
}

#[test]
fn degenerate_range_without_crit_on_turn_zero_is_exact() {
    let mut attacker = Combatant::new("Ryu");
    let mut dice = Dice::from_scripted(vec![0.5]);
    let roll = damage::calculate(&fixed(10, 10, 0.0), &mut attacker, 0, &mut dice);
    assert_eq!(roll.damage, 10);
    assert!(!roll.critical);
    assert!(roll.annotation.is_none());
}

#[test]
fn critical_hit_multiplies_by_one_and_a_half() {
    let mut attacker = Combatant::new("Ryu");
    let mut dice = Dice::from_scripted(vec![0.5]);
    let roll = damage::calculate(&fixed(10, 10, 1.0), &mut attacker, 0, &mut dice);
    assert_eq!(roll.damage, 15);
    assert!(roll.critical);
    assert_eq!(roll.annotation.as_deref(), Some("critical hit!"));
    assert_eq!(attacker.stats.critical_hits, 1);
}

#[test]
fn turn_scaling_grows_then_caps_at_double() {
    assert_eq!(turn_scaling_pct(0), 100);
    assert_eq!(turn_scaling_pct(10), 150);
    assert_eq!(turn_scaling_pct(20), 200);
    assert_eq!(turn_scaling_pct(500), 200);

    let mut attacker = Combatant::new("Ryu");
    let mut dice = Dice::from_scripted(vec![0.5]);
    assert_eq!(damage::calculate(&fixed(10, 10, 0.0), &mut attacker, 10, &mut dice).damage, 15);
    assert_eq!(damage::calculate(&fixed(10, 10, 0.0), &mut attacker, 40, &mut dice).damage, 20);
}

#[test]
fn move_on_cooldown_deals_nothing() {
    let mv = MoveDescriptor {
        cooldown: Some(2),
        ..fixed(10, 10, 0.0)
    };
    let mut attacker = Combatant::new("Ryu");
    let mut dice = Dice::from_scripted(vec![0.5]);

    assert_eq!(damage::calculate(&mv, &mut attacker, 0, &mut dice).damage, 10);
    assert_eq!(attacker.cooldown("Test Strike"), 2);

    let blocked = damage::calculate(&mv, &mut attacker, 1, &mut dice);
    assert_eq!(blocked.damage, 0);
    assert_eq!(blocked.annotation.as_deref(), Some("on cooldown"));

    attacker.tick_cooldowns();
    attacker.tick_cooldowns();
    assert_eq!(attacker.cooldown("Test Strike"), 0);
    assert!(attacker.cooldowns.is_empty());
}

#[test]
fn unknown_category_falls_back_to_default_range() {
    let mv = MoveDescriptor::new("Mystery", MoveCategory::Other);
    assert_eq!(mv.damage_range(), (5, 15));
    assert_eq!(mv.effective_crit_chance(), 0.15);

    let mut attacker = Combatant::new("Ryu");
    let low = damage::calculate(&mv, &mut attacker, 0, &mut Dice::from_scripted(vec![0.0, 0.99]));
    let high = damage::calculate(&mv, &mut attacker, 0, &mut Dice::from_scripted(vec![0.999_999, 0.99]));
    assert_eq!(low.damage, 5);
    assert_eq!(high.damage, 15);
}

proptest! {
    #[test]
    fn seeded_damage_stays_within_scaled_bounds(seed in any::<u64>(), turn in 0u32..100, lo in 1u32..40, span in 0u32..20) {
        let mv = MoveDescriptor {
            damage: Some((lo, lo + span)),
            ..MoveDescriptor::new("Any", MoveCategory::Heavy)
        };
        let mut attacker = Combatant::new("Ryu");
        let roll = damage::calculate(&mv, &mut attacker, turn, &mut Dice::from_seed(seed));
        let scale = turn_scaling_pct(turn) as u32;
        prop_assert!(roll.damage >= lo * scale / 100);
        prop_assert!(roll.damage <= (lo + span) * 150 * scale / 10_000);
    }
}
