//! Loadouts and the per-slot candidate lists the optimizer enumerates.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::combat::profile::AnimationClass;
use crate::data::catalog::EquipmentCatalog;
use crate::data::item::{Item, Slot};
use crate::data::ownership::LicenseOwnership;
use crate::data::pool::available_items;

/// One weapon plus at most one item in each optional slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loadout<'a> {
    pub weapon: &'a Item,
    pub ammo: Option<&'a Item>,
    pub helm: Option<&'a Item>,
    pub armor: Option<&'a Item>,
    pub accessory: Option<&'a Item>,
}

impl<'a> Loadout<'a> {
    pub fn weapon_only(weapon: &'a Item) -> Self {
        Self {
            weapon,
            ammo: None,
            helm: None,
            armor: None,
            accessory: None,
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&'a Item> {
        match slot {
            Slot::Weapon => Some(self.weapon),
            Slot::Ammo => self.ammo,
            Slot::Helm => self.helm,
            Slot::Armor => self.armor,
            Slot::Accessory => self.accessory,
        }
    }

    /// Equipped items in fold order, empty slots skipped.
    pub fn equipped(&self) -> impl Iterator<Item = (Slot, &'a Item)> + '_ {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|item| (slot, item)))
    }

    /// Slot item names; `None` for empty optional slots.
    pub fn names(&self) -> [Option<&'a str>; 5] {
        Slot::ALL.map(|slot| self.get(slot).map(|item| item.name.as_str()))
    }
}

impl fmt::Display for Loadout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.weapon.name)?;
        for slot in &Slot::ALL[1..] {
            if let Some(item) = self.get(*slot) {
                write!(f, " + {}", item.name)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Loadout<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Loadout", 5)?;
        for slot in Slot::ALL {
            let key = slot.as_str();
            state.serialize_field(key, &self.get(slot).map(|item| item.name.as_str()))?;
        }
        state.end()
    }
}

/// Filtered candidates for every slot, ready for cross-product enumeration.
///
/// Optional slots always start with `None` ("equip nothing").
#[derive(Debug, Clone)]
pub struct SlotChoices<'a> {
    pub weapons: Vec<&'a Item>,
    ammo: Vec<&'a Item>,
    pub helms: Vec<Option<&'a Item>>,
    pub armor: Vec<Option<&'a Item>>,
    pub accessories: Vec<Option<&'a Item>>,
    /// Optional-slot items dropped as equivalent to another choice.
    pub collapsed: usize,
}

impl<'a> SlotChoices<'a> {
    pub fn new<O>(catalog: &'a EquipmentCatalog, ownership: &O, collapse_equivalent: bool) -> Self
    where
        O: LicenseOwnership + ?Sized,
    {
        let mut collapsed = 0;
        let mut optional = |slot: Slot| {
            let pool = available_items(catalog.slot(slot), ownership);
            let before = pool.len();
            let pool = if collapse_equivalent {
                collapse(pool)
            } else {
                pool
            };
            collapsed += before - pool.len();
            let mut choices = Vec::with_capacity(pool.len() + 1);
            choices.push(None);
            choices.extend(pool.into_iter().map(Some));
            choices
        };
        let helms = optional(Slot::Helm);
        let armor = optional(Slot::Armor);
        let accessories = optional(Slot::Accessory);

        let ammo_pool = available_items(catalog.slot(Slot::Ammo), ownership);
        let ammo_before = ammo_pool.len();
        let ammo = if collapse_equivalent {
            collapse(ammo_pool)
        } else {
            ammo_pool
        };
        collapsed += ammo_before - ammo.len();

        Self {
            weapons: available_items(catalog.slot(Slot::Weapon), ownership),
            ammo,
            helms,
            armor,
            accessories,
            collapsed,
        }
    }

    /// Ammunition choices for `weapon`: only `None` unless the weapon fires ammo, then
    /// `None` plus every owned round that fits its class.
    pub fn ammo_for(&self, weapon: &Item) -> Vec<Option<&'a Item>> {
        let mut choices = vec![None];
        let Some(class) = weapon.animation().filter(AnimationClass::uses_ammo) else {
            return choices;
        };
        choices.extend(
            self.ammo
                .iter()
                .filter(|round| round.fits.map_or(true, |fits| fits == class))
                .map(|round| Some(*round)),
        );
        choices
    }

    pub fn candidate_count(&self) -> usize {
        let per_weapon = self.helms.len() * self.armor.len() * self.accessories.len();
        self.weapons
            .iter()
            .map(|weapon| self.ammo_for(weapon).len() * per_weapon)
            .sum()
    }

    /// Every legal loadout, weapon-major in catalog order.
    pub fn enumerate(&self) -> Vec<Loadout<'a>> {
        let mut loadouts = Vec::with_capacity(self.candidate_count());
        for weapon in &self.weapons {
            for ammo in self.ammo_for(weapon) {
                for helm in &self.helms {
                    for armor in &self.armor {
                        for accessory in &self.accessories {
                            loadouts.push(Loadout {
                                weapon: *weapon,
                                ammo,
                                helm: *helm,
                                armor: *armor,
                                accessory: *accessory,
                            });
                        }
                    }
                }
            }
        }
        loadouts
    }
}

/// Drop inert items (equivalent to an empty slot) and items whose modifiers and ammo fit
/// match an earlier item.
fn collapse(pool: Vec<&Item>) -> Vec<&Item> {
    let mut kept: Vec<&Item> = Vec::with_capacity(pool.len());
    for item in pool {
        if item.is_inert() {
            continue;
        }
        if kept.iter().any(|other| equivalent(other, item)) {
            continue;
        }
        kept.push(item);
    }
    kept
}

fn equivalent(left: &Item, right: &Item) -> bool {
    if left.fits != right.fits || left.modifiers.len() != right.modifiers.len() {
        return false;
    }
    left.modifiers
        .iter()
        .all(|modifier| right.value_of(modifier.field) == Some(modifier.value))
}
