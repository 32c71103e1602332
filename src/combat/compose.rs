//! Profile composer: folds equipped items into a character's base profile.
//!
//! Numeric modifiers add, flag modifiers OR, so the composed totals do not depend on fold
//! order. The weapon is the only slot allowed to set the formula family and animation class,
//! and it may set each at most once.

use thiserror::Error;

use crate::combat::profile::AttributeProfile;
use crate::data::item::{FieldKind, Item, ModifierField, ModifierValue, Slot};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    #[error("item '{item}' declares {field} as a {found}, expected a {expected}")]
    InvalidModifierType {
        item: String,
        field: ModifierField,
        expected: FieldKind,
        found: &'static str,
    },
    #[error("item '{item}' in the {slot} slot may not define weapon-only field {field}")]
    WeaponOnlyField {
        item: String,
        slot: Slot,
        field: ModifierField,
    },
    #[error("item '{item}' defines {field} more than once")]
    FieldRedefined { item: String, field: ModifierField },
}

/// Compose `base` with `equipped` items, given in slot order with absent slots skipped.
pub fn compose<'a, I>(
    base: &AttributeProfile,
    equipped: I,
) -> Result<AttributeProfile, ComposeError>
where
    I: IntoIterator<Item = (Slot, &'a Item)>,
{
    let mut profile = base.clone();
    let mut formula_set = false;
    let mut animation_set = false;

    for (slot, item) in equipped {
        for modifier in &item.modifiers {
            let field = modifier.field;
            if field.is_weapon_only() && slot != Slot::Weapon {
                return Err(ComposeError::WeaponOnlyField {
                    item: item.name.clone(),
                    slot,
                    field,
                });
            }
            match (field.kind(), modifier.value) {
                (FieldKind::Numeric, ModifierValue::Number(delta)) => {
                    if let Some(target) = numeric_slot(&mut profile, field) {
                        *target += delta;
                    }
                }
                (FieldKind::Flag, ModifierValue::Flag(granted)) => {
                    if let Some(target) = flag_slot(&mut profile, field) {
                        *target = *target || granted;
                    }
                }
                (FieldKind::Formula, ModifierValue::Formula(formula)) => {
                    if formula_set {
                        return Err(ComposeError::FieldRedefined {
                            item: item.name.clone(),
                            field,
                        });
                    }
                    formula_set = true;
                    profile.damage_formula = formula;
                }
                (FieldKind::Animation, ModifierValue::Animation(class)) => {
                    if animation_set {
                        return Err(ComposeError::FieldRedefined {
                            item: item.name.clone(),
                            field,
                        });
                    }
                    animation_set = true;
                    profile.animation = class;
                }
                (expected, value) => {
                    return Err(ComposeError::InvalidModifierType {
                        item: item.name.clone(),
                        field,
                        expected,
                        found: value.shape(),
                    });
                }
            }
        }
    }

    Ok(profile)
}

fn numeric_slot(profile: &mut AttributeProfile, field: ModifierField) -> Option<&mut f64> {
    match field {
        ModifierField::Attack => Some(&mut profile.attack),
        ModifierField::Combo => Some(&mut profile.combo),
        ModifierField::ChargeTime => Some(&mut profile.charge_time),
        ModifierField::Strength => Some(&mut profile.strength),
        ModifierField::Magic => Some(&mut profile.magic),
        ModifierField::Vitality => Some(&mut profile.vitality),
        ModifierField::Speed => Some(&mut profile.speed),
        _ => None,
    }
}

fn flag_slot(profile: &mut AttributeProfile, field: ModifierField) -> Option<&mut bool> {
    match field {
        ModifierField::Brawler => Some(&mut profile.boons.brawler),
        ModifierField::Berserk => Some(&mut profile.boons.berserk),
        ModifierField::Haste => Some(&mut profile.boons.haste),
        ModifierField::Bravery => Some(&mut profile.boons.bravery),
        ModifierField::Focus => Some(&mut profile.boons.focus),
        ModifierField::Adrenaline => Some(&mut profile.boons.adrenaline),
        ModifierField::ComboExtension => Some(&mut profile.boons.combo_extension),
        ModifierField::ElementDamage(element) => {
            Some(&mut profile.elements.get_mut(element).damage)
        }
        ModifierField::ElementBonus(element) => {
            Some(&mut profile.elements.get_mut(element).bonus)
        }
        _ => None,
    }
}
