use brawl_engine::abilities::{self, ElementalPower, MaterialPower, MutationPower};
use brawl_engine::{Catalog, Combatant, Dice, MoveCategory, MoveDescriptor, Power, PowerCategory, StatusKind};

fn strike(dmg: u32) -> MoveDescriptor {
    MoveDescriptor {
        damage: Some((dmg, dmg)),
        ..MoveDescriptor::new("Strike", MoveCategory::Regular)
    }
}

#[test]
fn failed_proc_always_yields_the_fallback_bonus() {
    for power in Power::all() {
        let mut attacker = Combatant::new("Ryu").with_power(power);
        let mut defender = Combatant::new("Ken");
        let mut dice = Dice::from_scripted(vec![0.99]);

        let out = abilities::resolve(&mut attacker, &mut defender, &strike(20), None, &mut dice);
        assert!(!out.triggered, "{power}");
        assert_eq!(out.bonus_damage, 3);
        let message = out.message.unwrap_or_default();
        assert!(message.contains("flickers without surging"), "{message}");
        assert!(out.applied.is_empty());
        assert!(defender.status.is_empty());
        assert_eq!(attacker.stats.abilities_triggered, 0);
    }
}

#[test]
fn fallback_uses_default_base_when_move_declares_none() {
    let mut attacker = Combatant::new("Ryu").with_power(Power::Mutation(MutationPower::Berserker));
    let mut defender = Combatant::new("Ken");
    let mv = MoveDescriptor::new("Jab", MoveCategory::Regular);
    let out = abilities::resolve(&mut attacker, &mut defender, &mv, None, &mut Dice::from_scripted(vec![0.99]));
    assert_eq!(out.bonus_damage, 2);
}

#[test]
fn no_power_means_no_bonus() {
    let mut attacker = Combatant::new("Ryu");
    let mut defender = Combatant::new("Ken");
    let out = abilities::resolve(&mut attacker, &mut defender, &strike(20), None, &mut Dice::from_seed(1));
    assert_eq!(out.bonus_damage, 0);
    assert!(out.message.is_none());
    assert!(attacker.stats.categories_used.is_empty());
}

#[test]
fn triggered_power_applies_synergy_and_status() {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let volcano = catalog.arena(catalog.arena_named("Volcanic Crater").expect("arena")).cloned();
    let mut attacker = Combatant::new("Ryu").with_power(Power::Elemental(ElementalPower::Pyrokinesis));
    let mut defender = Combatant::new("Ken");

    let out = abilities::resolve(
        &mut attacker,
        &mut defender,
        &strike(20),
        volcano.as_ref(),
        &mut Dice::from_scripted(vec![0.0]),
    );
    assert!(out.triggered);
    assert_eq!(out.bonus_damage, 36);
    assert_eq!(defender.status.get(StatusKind::Burn), 1);
    assert_eq!(attacker.stats.abilities_triggered, 1);
    assert!(attacker.stats.categories_used.contains(&PowerCategory::Elemental));

    let mut frost = Combatant::new("Sub").with_power(Power::Elemental(ElementalPower::Cryokinesis));
    let out = abilities::resolve(
        &mut frost,
        &mut defender,
        &strike(20),
        volcano.as_ref(),
        &mut Dice::from_scripted(vec![0.0]),
    );
    assert_eq!(out.bonus_damage, 16);
    assert!(defender.status.is_active(StatusKind::Freeze));
}

#[test]
fn category_synergy_matches_any_power_in_the_category() {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let swamp = catalog.arena(catalog.arena_named("toxic swamp").expect("arena")).cloned();
    let mut attacker = Combatant::new("Ryu").with_power(Power::Mutation(MutationPower::ToxicGlands));
    let mut defender = Combatant::new("Ken");

    let out = abilities::resolve(&mut attacker, &mut defender, &strike(20), swamp.as_ref(), &mut Dice::from_scripted(vec![0.0]));
    assert_eq!(out.bonus_damage, 15);
    assert_eq!(defender.status.get(StatusKind::Poison), 2);
}

#[test]
fn drain_heals_up_to_max() {
    let mut attacker = Combatant::new("Ryu").with_power(Power::Mutation(MutationPower::Regeneration));
    let mut defender = Combatant::new("Ken");
    attacker.take_damage(10, |_| {});

    let out = abilities::resolve(&mut attacker, &mut defender, &strike(20), None, &mut Dice::from_scripted(vec![0.0]));
    assert_eq!(attacker.hp(), 240);
    assert_eq!(out.drain_pct, 100);
    assert_eq!(abilities::drain(&mut attacker, &out, 20, |_| {}), 8);
    assert_eq!(attacker.hp(), 248);
    assert_eq!(abilities::drain(&mut attacker, &out, 20, |_| {}), 2);
    assert_eq!(attacker.hp(), 250);
}

#[test]
fn drain_never_returns_more_than_the_defender_lost() {
    let mut attacker = Combatant::new("Ryu").with_power(Power::Mutation(MutationPower::Regeneration));
    let mut defender = Combatant::new("Ken");
    attacker.take_damage(50, |_| {});

    let out = abilities::resolve(&mut attacker, &mut defender, &strike(40), None, &mut Dice::from_scripted(vec![0.0]));
    assert_eq!(out.bonus_damage, 16);
    assert_eq!(abilities::drain(&mut attacker, &out, 5, |_| {}), 5);
    assert_eq!(attacker.hp(), 205);

    let mut plain = Combatant::new("Sub").with_power(Power::Mutation(MutationPower::Berserker));
    plain.take_damage(50, |_| {});
    let out = abilities::resolve(&mut plain, &mut defender, &strike(40), None, &mut Dice::from_scripted(vec![0.0]));
    assert_eq!(abilities::drain(&mut plain, &out, 30, |_| {}), 0);
    assert_eq!(plain.hp(), 200);
}

#[test]
fn self_buffs_land_on_the_attacker() {
    let mut attacker = Combatant::new("Ryu").with_power(Power::Material(MaterialPower::Crystallization));
    let mut defender = Combatant::new("Ken");
    let out = abilities::resolve(&mut attacker, &mut defender, &strike(20), None, &mut Dice::from_scripted(vec![0.0]));
    assert_eq!(out.bonus_damage, 18);
    assert!(attacker.status.is_active(StatusKind::ShellDefense));
    assert!(defender.status.is_empty());
}

#[test]
fn powers_parse_by_bare_name() {
    assert_eq!(Power::all().len(), 16);
    assert_eq!(Power::parse("Toxic Glands"), Some(Power::Mutation(MutationPower::ToxicGlands)));
    assert_eq!(Power::parse("sand-veil"), Some(Power::Material(MaterialPower::SandVeil)));
    assert_eq!(Power::parse("telepathy"), None);
    assert_eq!(Power::Elemental(ElementalPower::Aerokinesis).to_string(), "aerokinesis (elemental)");
}
