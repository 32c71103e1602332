//! Equipment catalogs: one item list per slot, loaded from YAML once and read-only afterwards.
//!
//! The built-in catalog is compiled into the binary from `data/equipment/*.yaml`.
//! `GAMBIT_DATA_DIR` (see [crate::data::settings]) points at a directory with the same layout.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::combat::profile::AnimationClass;
use crate::data::item::{Item, Slot};
use crate::data::validate::{parse_item, validate_slot, ValidationReport, ValidationSeverity};

const BUILTIN_WEAPONS: &str = include_str!("../../data/equipment/weapons.yaml");
const BUILTIN_AMMO: &str = include_str!("../../data/equipment/ammo.yaml");
const BUILTIN_HELMS: &str = include_str!("../../data/equipment/helms.yaml");
const BUILTIN_ARMOR: &str = include_str!("../../data/equipment/armor.yaml");
const BUILTIN_ACCESSORIES: &str = include_str!("../../data/equipment/accessories.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {slot} catalog: {source}")]
    Parse {
        slot: Slot,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("catalog failed validation with {} error(s)", .0.count(ValidationSeverity::Error))]
    Invalid(ValidationReport),
}

#[derive(Debug, Deserialize)]
struct SlotFile {
    #[serde(default)]
    data_version: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    fits: Option<AnimationClass>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

/// File name for each slot's catalog inside a data directory.
pub fn slot_file_name(slot: Slot) -> &'static str {
    match slot {
        Slot::Weapon => "weapons.yaml",
        Slot::Ammo => "ammo.yaml",
        Slot::Helm => "helms.yaml",
        Slot::Armor => "armor.yaml",
        Slot::Accessory => "accessories.yaml",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentCatalog {
    pub weapons: Vec<Item>,
    pub ammo: Vec<Item>,
    pub helms: Vec<Item>,
    pub armor: Vec<Item>,
    pub accessories: Vec<Item>,
    pub data_version: Option<String>,
}

impl EquipmentCatalog {
    pub fn slot(&self, slot: Slot) -> &[Item] {
        match slot {
            Slot::Weapon => &self.weapons,
            Slot::Ammo => &self.ammo,
            Slot::Helm => &self.helms,
            Slot::Armor => &self.armor,
            Slot::Accessory => &self.accessories,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Vec<Item> {
        match slot {
            Slot::Weapon => &mut self.weapons,
            Slot::Ammo => &mut self.ammo,
            Slot::Helm => &mut self.helms,
            Slot::Armor => &mut self.armor,
            Slot::Accessory => &mut self.accessories,
        }
    }

    pub fn find(&self, slot: Slot, name: &str) -> Option<&Item> {
        self.slot(slot).iter().find(|item| item.name == name)
    }

    pub fn len(&self) -> usize {
        Slot::ALL.iter().map(|slot| self.slot(*slot).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_sources(builtin_sources())
    }

    /// Load every slot file from `dir`. A missing optional-slot file means an empty slot;
    /// a missing weapon file is an error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let sources = read_dir_sources(dir.as_ref())?;
        Self::from_yaml_sources(sources.iter().map(|(slot, raw)| (*slot, raw.as_str())))
    }

    /// Every diagnostic for the catalog in `dir`, or for the built-in catalog when `None`.
    pub fn report(dir: Option<&Path>) -> Result<ValidationReport, CatalogError> {
        let (_, report) = match dir {
            Some(dir) => {
                let sources = read_dir_sources(dir)?;
                Self::parse_with_report(
                    sources.iter().map(|(slot, raw)| (*slot, raw.as_str())),
                )?
            }
            None => Self::parse_with_report(builtin_sources())?,
        };
        Ok(report)
    }

    /// Parse and validate per-slot YAML. Fails with the full report if any row is invalid.
    pub fn from_yaml_sources<'a, I>(sources: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (Slot, &'a str)>,
    {
        let (catalog, report) = Self::parse_with_report(sources)?;
        for diag in &report.diagnostics {
            if diag.severity == ValidationSeverity::Warning {
                warn!(context = %diag.context, "{}", diag.message);
            }
        }
        if report.has_errors() {
            return Err(CatalogError::Invalid(report));
        }
        debug!(items = catalog.len(), version = ?catalog.data_version, "equipment catalog loaded");
        Ok(catalog)
    }

    /// Parse per-slot YAML and return the catalog together with every diagnostic, even errors.
    /// Used by the `validate` command to list all problems at once.
    pub fn parse_with_report<'a, I>(sources: I) -> Result<(Self, ValidationReport), CatalogError>
    where
        I: IntoIterator<Item = (Slot, &'a str)>,
    {
        let mut catalog = Self::default();
        let mut report = ValidationReport::default();
        let mut seen_weapons = false;

        for (slot, raw) in sources {
            let file: SlotFile = serde_yaml::from_str(raw)
                .map_err(|source| CatalogError::Parse { slot, source })?;
            if slot == Slot::Weapon {
                seen_weapons = true;
                catalog.data_version = file.data_version.clone();
            }
            for (index, row) in file.items.iter().enumerate() {
                if let Some(item) = parse_item(
                    &mut report,
                    slot,
                    index,
                    &row.name,
                    row.license.as_deref(),
                    row.fits,
                    &row.fields,
                ) {
                    catalog.slot_mut(slot).push(item);
                }
            }
        }

        for slot in Slot::ALL {
            if slot == Slot::Weapon && !seen_weapons {
                continue;
            }
            validate_slot(&mut report, slot, catalog.slot(slot));
        }
        if !seen_weapons {
            report.push(ValidationSeverity::Error, "weapon", "weapon catalog is missing");
        }

        Ok((catalog, report))
    }
}

fn builtin_sources() -> [(Slot, &'static str); 5] {
    [
        (Slot::Weapon, BUILTIN_WEAPONS),
        (Slot::Ammo, BUILTIN_AMMO),
        (Slot::Helm, BUILTIN_HELMS),
        (Slot::Armor, BUILTIN_ARMOR),
        (Slot::Accessory, BUILTIN_ACCESSORIES),
    ]
}

fn read_dir_sources(dir: &Path) -> Result<Vec<(Slot, String)>, CatalogError> {
    let mut sources = Vec::with_capacity(Slot::ALL.len());
    for slot in Slot::ALL {
        let path = dir.join(slot_file_name(slot));
        if slot != Slot::Weapon && !path.exists() {
            debug!(slot = %slot, path = %path.display(), "catalog file absent, slot left empty");
            continue;
        }
        let raw = fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        sources.push((slot, raw));
    }
    Ok(sources)
}
