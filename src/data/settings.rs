//! Configuration: environment overrides, scenario and ownership files, and the range checks
//! user-facing surfaces apply before handing a scenario to the core.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::combat::scenario::{BattleSpeed, ScenarioParameters};
use crate::data::catalog::{CatalogError, EquipmentCatalog};
use crate::data::character::{Roster, RosterError};
use crate::data::ownership::OwnershipSnapshot;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const BIND_ENV: &str = "GAMBIT_BIND";
pub const DATA_DIR_ENV: &str = "GAMBIT_DATA_DIR";
pub const WORKERS_ENV: &str = "GAMBIT_WORKERS";
pub const CHARACTERS_FILE: &str = "characters.yaml";

pub const LEVEL_RANGE: (f64, f64) = (1.0, 99.0);
pub const PERCENT_HP_RANGE: (f64, f64) = (1.0, 100.0);
pub const DEFENSE_RANGE: (f64, f64) = (0.0, 250.0);

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Process-level settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub data_dir: Option<PathBuf>,
    /// Rayon workers for party runs; 0 uses every core.
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_dir: None,
            workers: 0,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; unparsable worker counts fall back to 0.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            bind_addr: lookup(BIND_ENV)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            data_dir: lookup(DATA_DIR_ENV)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            workers: lookup(WORKERS_ENV)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.workers),
        }
    }

    /// Catalog and roster, from `data_dir` when set, otherwise the embedded data.
    pub fn load_reference_data(&self) -> Result<ReferenceData, ReferenceDataError> {
        match &self.data_dir {
            Some(dir) => {
                let catalog = EquipmentCatalog::load_dir(dir)?;
                let roster_path = dir.join(CHARACTERS_FILE);
                let roster = if roster_path.exists() {
                    Roster::load(roster_path)?
                } else {
                    Roster::builtin()?
                };
                Ok(ReferenceData { catalog, roster })
            }
            None => Ok(ReferenceData {
                catalog: EquipmentCatalog::builtin()?,
                roster: Roster::builtin()?,
            }),
        }
    }
}

/// Read-only reference tables shared by every optimization.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub catalog: EquipmentCatalog,
    pub roster: Roster,
}

#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).map_err(|source| SettingsError::Json {
            path: path.display().to_string(),
            source,
        })
    } else {
        serde_yaml::from_str(&raw).map_err(|source| SettingsError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Load and range-check a scenario file (`.json`, otherwise YAML).
pub fn load_scenario(path: impl AsRef<Path>) -> Result<ScenarioParameters, SettingsError> {
    let scenario: ScenarioParameters = load_file(path.as_ref())?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn load_ownership(path: impl AsRef<Path>) -> Result<OwnershipSnapshot, SettingsError> {
    load_file(path.as_ref())
}

/// First out-of-range field, if any. Reactions are already restricted by their type.
pub fn validate_scenario(scenario: &ScenarioParameters) -> Result<(), SettingsError> {
    let checks = [
        ("level", scenario.level, LEVEL_RANGE),
        ("percent_hp", scenario.percent_hp, PERCENT_HP_RANGE),
        ("defense", scenario.defense, DEFENSE_RANGE),
        ("magick_defense", scenario.magick_defense, DEFENSE_RANGE),
        (
            "battle_speed",
            f64::from(scenario.battle_speed.0),
            (f64::from(BattleSpeed::MIN), f64::from(BattleSpeed::MAX)),
        ),
    ];
    for (field, value, (min, max)) in checks {
        if !(min..=max).contains(&value) {
            return Err(SettingsError::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
    }
    Ok(())
}
