pub mod export;
pub mod loadout;
pub mod party;
pub mod ranking;

use thiserror::Error;
use tracing::debug;

use crate::combat::compose::{compose, ComposeError};
use crate::combat::engine::calculate;
use crate::combat::scenario::ScenarioParameters;
use crate::data::catalog::EquipmentCatalog;
use crate::data::character::Character;
use crate::data::ownership::LicenseOwnership;
use crate::optimizer::loadout::SlotChoices;
use crate::optimizer::ranking::rank_results;
use crate::parallel::batch_ranges;

pub use loadout::Loadout;
pub use party::{optimize_party, PartyOutcome};
pub use ranking::RankedResult;

/// Number of progress-reporting batches for optimize-with-progress.
const OPTIMIZE_PROGRESS_BATCH_COUNT: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// When Some(n), only the best n results are returned. None returns everything.
    pub limit: Option<usize>,
    /// Treat inert optional items as "none" and identical optional items as one. Off by
    /// default so every legal loadout is returned.
    pub collapse_equivalent: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            limit: None,
            collapse_equivalent: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    #[error("no usable weapon for {character}; the weapon catalog needs a licenseless baseline")]
    EmptyWeaponPool { character: String },
    #[error("{character}: cannot compose '{candidate}': {source}")]
    Compose {
        character: String,
        candidate: String,
        #[source]
        source: ComposeError,
    },
}

/// Every legal loadout for `character`, best DPS first.
pub fn optimize<'a, O>(
    character: &Character,
    scenario: &ScenarioParameters,
    catalog: &'a EquipmentCatalog,
    ownership: &O,
    options: &OptimizeOptions,
) -> Result<Vec<RankedResult<'a>>, OptimizeError>
where
    O: LicenseOwnership + ?Sized,
{
    optimize_with_progress(character, scenario, catalog, ownership, options, |_, _| {})
}

/// Like [optimize] but scores in batches and invokes `on_progress(done, total)`.
pub fn optimize_with_progress<'a, O, F>(
    character: &Character,
    scenario: &ScenarioParameters,
    catalog: &'a EquipmentCatalog,
    ownership: &O,
    options: &OptimizeOptions,
    mut on_progress: F,
) -> Result<Vec<RankedResult<'a>>, OptimizeError>
where
    O: LicenseOwnership + ?Sized,
    F: FnMut(usize, usize),
{
    let choices = SlotChoices::new(catalog, ownership, options.collapse_equivalent);
    if choices.weapons.is_empty() {
        return Err(OptimizeError::EmptyWeaponPool {
            character: character.name.clone(),
        });
    }

    let candidates = choices.enumerate();
    let total = candidates.len();
    debug!(
        character = %character.name,
        weapons = choices.weapons.len(),
        candidates = total,
        collapsed = choices.collapsed,
        "optimizing loadouts"
    );
    on_progress(0, total);

    let base = character.base_profile(scenario);
    let mut results = Vec::with_capacity(total);
    for (start, end) in batch_ranges(total, OPTIMIZE_PROGRESS_BATCH_COUNT) {
        for loadout in &candidates[start..end] {
            let profile =
                compose(&base, loadout.equipped()).map_err(|source| OptimizeError::Compose {
                    character: character.name.clone(),
                    candidate: loadout.to_string(),
                    source,
                })?;
            results.push(RankedResult {
                loadout: *loadout,
                damage: calculate(&profile, scenario),
            });
        }
        on_progress(end, total);
    }

    let mut ranked = rank_results(results);
    if let Some(limit) = options.limit {
        ranked.truncate(limit);
    }
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::profile::{AnimationClass, DamageFormula};
    use crate::data::item::{Item, ModifierField, ModifierValue};
    use crate::data::ownership::{AllLicenses, NoLicenses};

    fn catalog() -> EquipmentCatalog {
        EquipmentCatalog {
            weapons: vec![
                Item::new("Unarmed"),
                Item::new("Broadsword")
                    .with_license("Swords 1")
                    .with_formula(DamageFormula::Sword)
                    .with_animation(AnimationClass::Sword)
                    .with_number(ModifierField::Attack, 30.0)
                    .with_number(ModifierField::ChargeTime, 25.0),
            ],
            accessories: vec![
                Item::new("Hermes Sandals").with_number(ModifierField::Strength, 5.0),
                Item::new("Bangle").with_license("Accessories 2"),
            ],
            ..EquipmentCatalog::default()
        }
    }

    #[test]
    fn progress_reaches_total() {
        let catalog = catalog();
        let vaan = Character::new("Vaan", 45.0, 37.0, 40.0, 33.0);
        let mut calls = Vec::new();
        let results = optimize_with_progress(
            &vaan,
            &ScenarioParameters::default(),
            &catalog,
            &AllLicenses,
            &OptimizeOptions::default(),
            |done, total| calls.push((done, total)),
        )
        .expect("optimize should succeed");
        assert_eq!(calls.first(), Some(&(0, results.len())));
        assert_eq!(calls.last(), Some(&(results.len(), results.len())));
    }

    #[test]
    fn limit_truncates_after_ranking() {
        let catalog = catalog();
        let vaan = Character::new("Vaan", 45.0, 37.0, 40.0, 33.0);
        let scenario = ScenarioParameters::default();
        let all = optimize(
            &vaan,
            &scenario,
            &catalog,
            &AllLicenses,
            &OptimizeOptions::default(),
        )
        .expect("optimize should succeed");
        let top = optimize(
            &vaan,
            &scenario,
            &catalog,
            &AllLicenses,
            &OptimizeOptions {
                limit: Some(1),
                ..OptimizeOptions::default()
            },
        )
        .expect("optimize should succeed");
        assert_eq!(top.len(), 1);
        assert_eq!(top[0], all[0]);
    }

    #[test]
    fn empty_weapon_pool_is_a_data_integrity_error() {
        let catalog = EquipmentCatalog {
            weapons: vec![Item::new("Broadsword").with_license("Swords 1")],
            ..EquipmentCatalog::default()
        };
        let err = optimize(
            &Character::new("Ashe", 42.0, 40.0, 38.0, 33.0),
            &ScenarioParameters::default(),
            &catalog,
            &NoLicenses,
            &OptimizeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            OptimizeError::EmptyWeaponPool {
                character: "Ashe".to_string()
            }
        );
    }

    #[test]
    fn malformed_item_error_names_character_and_candidate() {
        let catalog = EquipmentCatalog {
            weapons: vec![Item::new("Unarmed")],
            helms: vec![
                Item::new("Odd Hat").with(ModifierField::Haste, ModifierValue::Number(1.0))
            ],
            ..EquipmentCatalog::default()
        };
        let err = optimize(
            &Character::new("Fran", 43.0, 38.0, 38.0, 36.0),
            &ScenarioParameters::default(),
            &catalog,
            &AllLicenses,
            &OptimizeOptions::default(),
        )
        .unwrap_err();
        match err {
            OptimizeError::Compose {
                character,
                candidate,
                source,
            } => {
                assert_eq!(character, "Fran");
                assert_eq!(candidate, "Unarmed + Odd Hat");
                assert!(matches!(source, ComposeError::InvalidModifierType { .. }));
            }
            other => panic!("expected compose error, got {other}"),
        }
    }

    #[test]
    fn collapsing_keeps_wrongly_shaped_modifiers_for_compose_to_reject() {
        let catalog = EquipmentCatalog {
            weapons: vec![Item::new("Unarmed")],
            helms: vec![
                Item::new("Odd Hat").with(ModifierField::Haste, ModifierValue::Number(0.0))
            ],
            ..EquipmentCatalog::default()
        };
        let err = optimize(
            &Character::new("Fran", 43.0, 38.0, 38.0, 36.0),
            &ScenarioParameters::default(),
            &catalog,
            &AllLicenses,
            &OptimizeOptions {
                collapse_equivalent: true,
                ..OptimizeOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::Compose {
                source: ComposeError::InvalidModifierType { .. },
                ..
            }
        ));
    }

    #[test]
    fn default_options_return_inert_items_too() {
        let catalog = catalog();
        let vaan = Character::new("Vaan", 45.0, 37.0, 40.0, 33.0);
        let scenario = ScenarioParameters::default();
        let every = optimize(
            &vaan,
            &scenario,
            &catalog,
            &AllLicenses,
            &OptimizeOptions::default(),
        )
        .expect("optimize should succeed");
        // 2 weapons x (none, Hermes Sandals, Bangle)
        assert_eq!(every.len(), 6);
        assert!(every
            .iter()
            .any(|row| row.loadout.accessory.is_some_and(|item| item.name == "Bangle")));

        let collapsed = optimize(
            &vaan,
            &scenario,
            &catalog,
            &AllLicenses,
            &OptimizeOptions {
                collapse_equivalent: true,
                ..OptimizeOptions::default()
            },
        )
        .expect("optimize should succeed");
        assert_eq!(collapsed.len(), 4);
        assert_eq!(collapsed[0].damage.dps, every[0].damage.dps);
    }
}
