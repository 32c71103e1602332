use std::collections::HashSet;

use gambit::combat::{calculate, compose, AnimationClass, DamageFormula, ScenarioParameters};
use gambit::data::{
    available_items, Character, EquipmentCatalog, Item, LicenseOwnership, ModifierField,
    NoLicenses, OwnershipSnapshot, Roster, Slot,
};
use gambit::optimizer::{optimize, optimize_party, OptimizeOptions};
use gambit::parallel::WorkerPool;

fn fists_and_sword() -> EquipmentCatalog {
    EquipmentCatalog {
        weapons: vec![
            Item::new("Fists").with_number(ModifierField::Attack, 5.0),
            Item::new("Sword")
                .with_license("Swords 1")
                .with_formula(DamageFormula::Sword)
                .with_animation(AnimationClass::Sword)
                .with_number(ModifierField::Attack, 30.0),
        ],
        ..EquipmentCatalog::default()
    }
}

fn example_ownership() -> OwnershipSnapshot {
    serde_yaml::from_str(include_str!("../data/ownership.example.yaml")).expect("example ownership")
}

#[test]
fn unowned_sword_leaves_only_the_licenseless_fists() {
    let catalog = fists_and_sword();
    let tester = Character::new("Tester", 10.0, 0.0, 0.0, 0.0);
    let scenario = ScenarioParameters::default();

    let results = optimize(
        &tester,
        &scenario,
        &catalog,
        &NoLicenses,
        &OptimizeOptions::default(),
    )
    .expect("optimize should succeed");

    assert_eq!(results.len(), 1);
    let only = &results[0];
    assert_eq!(only.loadout.weapon.name, "Fists");
    assert_eq!(only.loadout.equipped().count(), 1);

    let profile = compose(
        &tester.base_profile(&scenario),
        [(Slot::Weapon, &catalog.weapons[0])],
    )
    .expect("fists compose");
    assert_eq!(only.damage, calculate(&profile, &scenario));
}

#[test]
fn owning_the_sword_ranks_it_above_fists() {
    let catalog = fists_and_sword();
    let tester = Character::new("Tester", 10.0, 0.0, 0.0, 0.0);
    let owns_swords = |license: &gambit::data::LicenseRef| license.as_str() == "Swords 1";

    let results = optimize(
        &tester,
        &ScenarioParameters::default(),
        &catalog,
        &owns_swords,
        &OptimizeOptions::default(),
    )
    .expect("optimize should succeed");

    let weapons: Vec<_> = results.iter().map(|r| r.loadout.weapon.name.as_str()).collect();
    assert_eq!(weapons, ["Sword", "Fists"]);
}

#[test]
fn builtin_results_are_sorted_unique_and_owned() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    let roster = Roster::builtin().expect("builtin roster");
    let ownership = example_ownership();
    let scenario = ScenarioParameters::default();

    for key in ["Vaan", "Basch", "Fran", "Penelo"] {
        let character = ownership.resolve(roster.find(key).expect("roster member"));
        let owned = ownership.for_character(&character.name);
        let results = optimize(
            &character,
            &scenario,
            &catalog,
            &owned,
            &OptimizeOptions::default(),
        )
        .expect("optimize should succeed");
        assert!(!results.is_empty(), "{key} should always have the baseline weapon");

        for pair in results.windows(2) {
            assert!(pair[0].damage.dps >= pair[1].damage.dps, "{key}: not sorted");
        }

        let mut seen = HashSet::new();
        for result in &results {
            assert!(seen.insert(result.loadout.names()), "{key}: duplicate {}", result.loadout);
            for (_, item) in result.loadout.equipped() {
                assert!(
                    item.license.as_ref().map_or(true, |license| owned.owns(license)),
                    "{key}: '{}' is not owned",
                    item.name
                );
            }
        }
    }
}

#[test]
fn limited_results_are_a_prefix_of_the_full_ranking() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    let roster = Roster::builtin().expect("builtin roster");
    let ownership = example_ownership();
    let vaan = ownership.resolve(roster.find("Vaan").expect("Vaan"));
    let owned = ownership.for_character("Vaan");
    let scenario = ScenarioParameters::default();

    let full =
        optimize(&vaan, &scenario, &catalog, &owned, &OptimizeOptions::default()).expect("full");
    let top = optimize(
        &vaan,
        &scenario,
        &catalog,
        &owned,
        &OptimizeOptions {
            limit: Some(5),
            ..OptimizeOptions::default()
        },
    )
    .expect("limited");

    assert_eq!(top.len(), 5.min(full.len()));
    for (limited, complete) in top.iter().zip(&full) {
        assert_eq!(limited.loadout.names(), complete.loadout.names());
        assert_eq!(limited.damage, complete.damage);
    }
}

#[test]
fn collapsing_never_changes_the_best_dps() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    let roster = Roster::builtin().expect("builtin roster");
    let ownership = example_ownership();
    let basch = ownership.resolve(roster.find("Basch").expect("Basch"));
    let owned = ownership.for_character("Basch");
    let scenario = ScenarioParameters::default();

    let exhaustive = optimize(
        &basch,
        &scenario,
        &catalog,
        &owned,
        &OptimizeOptions::default(),
    )
    .expect("exhaustive");
    let collapsed = optimize(
        &basch,
        &scenario,
        &catalog,
        &owned,
        &OptimizeOptions {
            collapse_equivalent: true,
            ..OptimizeOptions::default()
        },
    )
    .expect("collapsed");

    assert!(exhaustive.len() > collapsed.len());
    assert_eq!(collapsed[0].damage.dps, exhaustive[0].damage.dps);
}

#[test]
fn default_run_lists_inert_accessories() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    let tester = Character::new("Tester", 40.0, 30.0, 35.0, 30.0);

    let results = optimize(
        &tester,
        &ScenarioParameters::default(),
        &catalog,
        &NoLicenses,
        &OptimizeOptions::default(),
    )
    .expect("optimize should succeed");
    // Unarmed with none or one of the three licenseless, inert accessories.
    assert_eq!(results.len(), 4);
    assert!(results
        .iter()
        .any(|row| row.loadout.accessory.is_some_and(|item| item.name == "Dawn Shard")));
}

#[test]
fn unarmed_rows_always_spend_time_charging() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    let roster = Roster::builtin().expect("builtin roster");
    let basch = roster
        .find("Basch")
        .expect("Basch")
        .clone()
        .with_abilities(gambit::data::LicensedAbilities {
            brawler: true,
            ..Default::default()
        });

    let results = optimize(
        &basch,
        &ScenarioParameters::default(),
        &catalog,
        &gambit::data::AllLicenses,
        &OptimizeOptions {
            collapse_equivalent: true,
            ..OptimizeOptions::default()
        },
    )
    .expect("optimize should succeed");

    let unarmed: Vec<_> = results
        .iter()
        .filter(|row| row.loadout.weapon.name == "Unarmed")
        .collect();
    assert!(!unarmed.is_empty());
    assert!(unarmed.iter().all(|row| row.damage.charge_time > 0.0));
    assert_ne!(results[0].loadout.weapon.name, "Unarmed");
}

#[test]
fn ammo_only_accompanies_matching_weapons() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    let roster = Roster::builtin().expect("builtin roster");
    let ownership = example_ownership();
    let fran = ownership.resolve(roster.find("Fran").expect("Fran"));
    let owned = ownership.for_character("Fran");

    let results = optimize(
        &fran,
        &ScenarioParameters::default(),
        &catalog,
        &owned,
        &OptimizeOptions::default(),
    )
    .expect("optimize should succeed");
    for result in &results {
        if let Some(ammo) = result.loadout.ammo {
            assert_eq!(ammo.fits, result.loadout.weapon.animation(), "{}", result.loadout);
        }
    }
}

#[test]
fn pool_filter_keeps_licenseless_items_only_without_ownership() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    for slot in Slot::ALL {
        for item in available_items(catalog.slot(slot), &NoLicenses) {
            assert!(item.license.is_none(), "{} requires a license", item.name);
        }
    }
}

#[test]
fn party_run_matches_single_character_runs() {
    let catalog = EquipmentCatalog::builtin().expect("builtin catalog");
    let roster = Roster::builtin().expect("builtin roster");
    let ownership = example_ownership();
    let scenario = ScenarioParameters::default();
    let options = OptimizeOptions {
        limit: Some(3),
        ..OptimizeOptions::default()
    };

    let outcomes = optimize_party(
        roster.characters(),
        &scenario,
        &catalog,
        &ownership,
        &options,
        &WorkerPool::with_workers(3),
    )
    .expect("pool should build");
    assert_eq!(outcomes.len(), roster.len());

    for (outcome, member) in outcomes.iter().zip(roster.characters()) {
        let character = ownership.resolve(member);
        let solo = optimize(
            &character,
            &scenario,
            &catalog,
            &ownership.for_character(&character.name),
            &options,
        )
        .expect("solo run");
        let party = outcome.result.as_ref().expect("party run");
        assert_eq!(outcome.index, member.index);
        let party_names: Vec<_> = party.iter().map(|r| r.loadout.names()).collect();
        let solo_names: Vec<_> = solo.iter().map(|r| r.loadout.names()).collect();
        assert_eq!(party_names, solo_names, "{}", member.name);
    }
}
