//! Playable character roster: base stats before equipment.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::profile::AttributeProfile;
use crate::combat::scenario::ScenarioParameters;

const BUILTIN_CHARACTERS: &str = include_str!("../../data/characters.yaml");

/// Abilities a character holds through the license subsystem. The caller resolves them;
/// the core only reads the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicensedAbilities {
    pub brawler: bool,
    pub focus: bool,
    pub adrenaline: bool,
}

impl LicensedAbilities {
    pub fn union(self, other: Self) -> Self {
        Self {
            brawler: self.brawler || other.brawler,
            focus: self.focus || other.focus,
            adrenaline: self.adrenaline || other.adrenaline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub index: usize,
    pub name: String,
    pub strength: f64,
    pub magic: f64,
    pub vitality: f64,
    pub speed: f64,
    #[serde(default)]
    pub abilities: LicensedAbilities,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        strength: f64,
        magic: f64,
        vitality: f64,
        speed: f64,
    ) -> Self {
        Self {
            index: 0,
            name: name.into(),
            strength,
            magic,
            vitality,
            speed,
            abilities: LicensedAbilities::default(),
        }
    }

    pub fn with_abilities(mut self, abilities: LicensedAbilities) -> Self {
        self.abilities = abilities;
        self
    }

    /// Unequipped profile: base stats plus party buffs available in `scenario` and
    /// this character's licensed abilities.
    pub fn base_profile(&self, scenario: &ScenarioParameters) -> AttributeProfile {
        let mut profile = AttributeProfile {
            strength: self.strength,
            magic: self.magic,
            vitality: self.vitality,
            speed: self.speed,
            ..AttributeProfile::default()
        };
        profile.boons.berserk = scenario.buffs.berserk;
        profile.boons.haste = scenario.buffs.haste;
        profile.boons.bravery = scenario.buffs.bravery;
        profile.boons.brawler = self.abilities.brawler;
        profile.boons.focus = self.abilities.focus;
        profile.boons.adrenaline = self.abilities.adrenaline;
        profile
    }
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("roster is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    characters: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    pub fn new(mut characters: Vec<Character>) -> Result<Self, RosterError> {
        if characters.is_empty() {
            return Err(RosterError::Empty);
        }
        for (index, character) in characters.iter_mut().enumerate() {
            character.index = index;
        }
        Ok(Self { characters })
    }

    pub fn builtin() -> Result<Self, RosterError> {
        Self::from_yaml(BUILTIN_CHARACTERS)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, RosterError> {
        let file: RosterFile = serde_yaml::from_str(raw)?;
        Self::new(file.characters)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn get(&self, index: usize) -> Option<&Character> {
        self.characters.get(index)
    }

    /// Lookup by case-insensitive name or by numeric index.
    pub fn find(&self, key: &str) -> Option<&Character> {
        if let Ok(index) = key.parse::<usize>() {
            return self.get(index);
        }
        self.characters
            .iter()
            .find(|character| character.name.eq_ignore_ascii_case(key))
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
