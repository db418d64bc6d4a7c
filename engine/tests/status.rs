use brawl_engine::status::{self, StatusKind};
use brawl_engine::Combatant;
use proptest::prelude::*;

#[test]
fn protect_and_shell_defense_multiply_together() {
    let attacker = Combatant::new("Ken");
    let mut defender = Combatant::new("Ryu");
    status::apply(StatusKind::Protect, &mut defender, 0, 2);
    status::apply(StatusKind::ShellDefense, &mut defender, 0, 2);

    let (dmg, notes) = status::calculate_damage_with_effects(100, &attacker, &defender);
    assert_eq!(dmg, 30);
    assert_eq!(notes.len(), 2);
}

#[test]
fn attacker_and_defender_modifiers_are_floored_once() {
    let mut attacker = Combatant::new("Ken");
    let mut defender = Combatant::new("Ryu");
    status::apply(StatusKind::AttackBoost, &mut attacker, 0, 2);
    status::apply(StatusKind::ThunderCharge, &mut attacker, 0, 2);
    assert_eq!(status::calculate_damage_with_effects(100, &attacker, &defender).0, 162);

    status::apply(StatusKind::DefenseDown, &mut defender, 0, 2);
    assert_eq!(status::calculate_damage_with_effects(100, &attacker, &defender).0, 211);
}

#[test]
fn burn_stacks_are_capped_at_three() {
    let mut c = Combatant::new("Ryu");
    for _ in 0..3 {
        status::apply(StatusKind::Burn, &mut c, 2, 1);
    }
    assert_eq!(status::get_duration(&c, StatusKind::Burn), 3);
}

#[test]
fn freeze_accumulates_but_stun_does_not() {
    let mut c = Combatant::new("Ryu");
    status::apply(StatusKind::Freeze, &mut c, 0, 1);
    status::apply(StatusKind::Freeze, &mut c, 0, 1);
    assert_eq!(c.status.get(StatusKind::Freeze), 2);
    status::apply(StatusKind::Freeze, &mut c, 0, 1);
    assert_eq!(c.status.get(StatusKind::Freeze), 2);

    status::apply(StatusKind::Stun, &mut c, 0, 1);
    let msg = status::apply(StatusKind::Stun, &mut c, 0, 2).unwrap_or_default();
    assert_eq!(c.status.get(StatusKind::Stun), 1);
    assert!(msg.contains("already under stun"), "{msg}");
}

#[test]
fn upkeep_reports_damage_without_applying_it() {
    let mut c = Combatant::new("Ryu");
    status::apply(StatusKind::Burn, &mut c, 2, 1);
    status::apply(StatusKind::Poison, &mut c, 1, 1);

    let upkeep = status::process(&mut c);
    assert_eq!(upkeep.damage, 2 * 5 + 8);
    assert!(!upkeep.action_prevented);
    assert!(upkeep.messages[0].starts_with("[BURN]"));
    assert!(upkeep.messages[1].starts_with("[POISON]"));
    assert_eq!(c.hp(), 250);
    assert_eq!(c.status.get(StatusKind::Burn), 1);
    assert!(!c.status.is_active(StatusKind::Poison));
}

#[test]
fn upkeep_messages_in_fixed_order() {
    let mut c = Combatant::new("Ash");
    status::apply(StatusKind::Stun, &mut c, 0, 1);
    status::apply(StatusKind::Burn, &mut c, 1, 1);
    status::apply(StatusKind::Protect, &mut c, 0, 1);

    let upkeep = status::process(&mut c);
    assert!(upkeep.action_prevented);
    insta::assert_snapshot!(
        upkeep.messages.join(" | "),
        @"[BURN][Ash] takes 5 damage (0 stack(s) left) | [SKIP][Ash] stun: skip turn (0 left) | [STATUS][Ash] protect wears off"
    );
    assert!(c.status.is_empty());
}

#[test]
fn unknown_kinds_are_ignored() {
    let mut c = Combatant::new("Ryu");
    assert_eq!(StatusKind::parse("confusion"), StatusKind::Unknown);
    assert_eq!(StatusKind::parse("Shell Defense"), StatusKind::ShellDefense);
    assert!(status::apply(StatusKind::Unknown, &mut c, 3, 3).is_none());
    assert!(c.status.is_empty());
}

#[test]
fn immunity_blocks_harmful_conditions_only() {
    let mut c = Combatant::new("Ryu");
    status::apply(StatusKind::Immunity, &mut c, 0, 3);

    let msg = status::apply(StatusKind::Burn, &mut c, 1, 1).unwrap_or_default();
    assert!(msg.contains("immune"), "{msg}");
    assert!(!c.status.is_active(StatusKind::Burn));

    status::apply(StatusKind::AttackBoost, &mut c, 0, 2);
    assert!(c.status.is_active(StatusKind::AttackBoost));
}

#[test]
fn clear_all_empties_the_block() {
    let mut c = Combatant::new("Ryu");
    status::apply(StatusKind::Poison, &mut c, 2, 1);
    status::apply(StatusKind::Dodge, &mut c, 0, 2);
    status::clear_all(&mut c);
    assert!(c.status.is_empty());
}

const KINDS: [StatusKind; 8] = [
    StatusKind::Burn,
    StatusKind::Poison,
    StatusKind::Stun,
    StatusKind::Freeze,
    StatusKind::Bind,
    StatusKind::Root,
    StatusKind::Protect,
    StatusKind::Dodge,
];

proptest! {
    #[test]
    fn stored_values_never_exceed_caps(ops in prop::collection::vec((0usize..KINDS.len(), 0u32..6, 0u32..6), 0..40)) {
        let mut c = Combatant::new("Ryu");
        for (idx, value, duration) in ops {
            status::apply(KINDS[idx], &mut c, value, duration);
            for (kind, stored) in c.status.iter() {
                prop_assert!(stored > 0);
                if let Some(cap) = kind.cap() {
                    prop_assert!(stored <= cap);
                }
            }
        }
    }

    #[test]
    fn modifiers_are_monotonic_in_base(base in 0u32..10_000, protect in any::<bool>(), boost in any::<bool>()) {
        let mut attacker = Combatant::new("Ken");
        let mut defender = Combatant::new("Ryu");
        if protect {
            status::apply(StatusKind::Protect, &mut defender, 0, 1);
        }
        if boost {
            status::apply(StatusKind::AttackBoost, &mut attacker, 0, 1);
        }
        let lo = status::calculate_damage_with_effects(base, &attacker, &defender).0;
        let hi = status::calculate_damage_with_effects(base + 1, &attacker, &defender).0;
        prop_assert!(lo <= hi);
    }
}
