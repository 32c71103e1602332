//! Equipment pool filter: narrows a catalog to what a character can currently equip.

use crate::data::item::Item;
use crate::data::ownership::LicenseOwnership;

/// Items with no license, plus items whose license `ownership` reports as obtained.
/// Catalog order is preserved.
pub fn available_items<'a, O>(catalog: &'a [Item], ownership: &O) -> Vec<&'a Item>
where
    O: LicenseOwnership + ?Sized,
{
    catalog
        .iter()
        .filter(|item| match &item.license {
            None => true,
            Some(license) => ownership.owns(license),
        })
        .collect()
}
