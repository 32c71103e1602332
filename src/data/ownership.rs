//! License ownership: the one thing the core asks of the license board.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::character::{Character, LicensedAbilities};
use crate::data::item::LicenseRef;

/// "Is license X currently obtained" for one character.
pub trait LicenseOwnership {
    fn owns(&self, license: &LicenseRef) -> bool;
}

impl<F> LicenseOwnership for F
where
    F: Fn(&LicenseRef) -> bool,
{
    fn owns(&self, license: &LicenseRef) -> bool {
        self(license)
    }
}

impl LicenseOwnership for BTreeSet<LicenseRef> {
    fn owns(&self, license: &LicenseRef) -> bool {
        self.contains(license)
    }
}

impl LicenseOwnership for HashSet<LicenseRef> {
    fn owns(&self, license: &LicenseRef) -> bool {
        self.contains(license)
    }
}

/// Every license obtained.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllLicenses;

impl LicenseOwnership for AllLicenses {
    fn owns(&self, _license: &LicenseRef) -> bool {
        true
    }
}

/// No license obtained; only licenseless items remain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLicenses;

impl LicenseOwnership for NoLicenses {
    fn owns(&self, _license: &LicenseRef) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterLicenses {
    pub licenses: BTreeSet<LicenseRef>,
    #[serde(flatten)]
    pub abilities: LicensedAbilities,
}

/// One character's frozen view of the board.
#[derive(Debug, Clone, Copy)]
pub enum CharacterOwnership<'a> {
    All,
    Owned(&'a BTreeSet<LicenseRef>),
}

impl LicenseOwnership for CharacterOwnership<'_> {
    fn owns(&self, license: &LicenseRef) -> bool {
        match self {
            Self::All => true,
            Self::Owned(owned) => owned.contains(license),
        }
    }
}

/// Ownership for the whole party, frozen for the duration of an optimization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipSnapshot {
    #[serde(alias = "all")]
    pub all_licenses: bool,
    pub characters: BTreeMap<String, CharacterLicenses>,
}

static NO_LICENSES: BTreeSet<LicenseRef> = BTreeSet::new();

impl OwnershipSnapshot {
    pub fn all() -> Self {
        Self {
            all_licenses: true,
            characters: BTreeMap::new(),
        }
    }

    pub fn for_character(&self, name: &str) -> CharacterOwnership<'_> {
        if self.all_licenses {
            return CharacterOwnership::All;
        }
        match self.entry(name) {
            Some(entry) => CharacterOwnership::Owned(&entry.licenses),
            None => CharacterOwnership::Owned(&NO_LICENSES),
        }
    }

    pub fn abilities_for(&self, name: &str) -> LicensedAbilities {
        self.entry(name)
            .map(|entry| entry.abilities)
            .unwrap_or_default()
    }

    /// `character` with the abilities this snapshot grants OR'ed in.
    pub fn resolve(&self, character: &Character) -> Character {
        let mut resolved = character.clone();
        resolved.abilities = character
            .abilities
            .union(self.abilities_for(&character.name));
        resolved
    }

    fn entry(&self, name: &str) -> Option<&CharacterLicenses> {
        self.characters
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, entry)| entry)
    }
}
