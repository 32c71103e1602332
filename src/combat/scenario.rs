//! Combat-scenario inputs shared across characters and independent of equipment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::profile::Elemental;

/// Target's damage-taken multiplier for one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Reaction {
    Immune,
    Resist,
    #[default]
    Neutral,
    Weak,
}

impl Reaction {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Immune => 0.0,
            Self::Resist => 0.5,
            Self::Neutral => 1.0,
            Self::Weak => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidReaction(pub f64);

impl fmt::Display for InvalidReaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reaction must be one of 0, 0.5, 1, 2 (got {})", self.0)
    }
}

impl TryFrom<f64> for Reaction {
    type Error = InvalidReaction;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.0 {
            Ok(Self::Immune)
        } else if value == 0.5 {
            Ok(Self::Resist)
        } else if value == 1.0 {
            Ok(Self::Neutral)
        } else if value == 2.0 {
            Ok(Self::Weak)
        } else {
            Err(InvalidReaction(value))
        }
    }
}

impl From<Reaction> for f64 {
    fn from(reaction: Reaction) -> Self {
        reaction.multiplier()
    }
}

/// Battle-speed setting, 1 (slowest) through 6 (fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleSpeed(pub u8);

impl BattleSpeed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// Timing multiplier for this tier. Out-of-range tiers clamp to the nearest valid one.
    pub fn time_factor(self) -> f64 {
        const FACTORS: [f64; 6] = [2.0, 1.75, 1.5, 1.3, 1.15, 1.0];
        let tier = self.0.clamp(Self::MIN, Self::MAX);
        FACTORS[usize::from(tier - 1)]
    }
}

impl Default for BattleSpeed {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

/// Party-castable buffs that are available in this fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffToggles {
    pub berserk: bool,
    pub haste: bool,
    pub bravery: bool,
}

impl Default for BuffToggles {
    fn default() -> Self {
        Self {
            berserk: true,
            haste: true,
            bravery: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParameters {
    /// Target physical defense, 0..=250.
    pub defense: f64,
    /// Target magical defense, 0..=250.
    pub magick_defense: f64,
    /// Character HP percentage, 1..=100.
    pub percent_hp: f64,
    pub reactions: Elemental<Reaction>,
    /// Character level, 1..=99.
    pub level: f64,
    /// Target resists guns and measures.
    pub resist_gun: bool,
    pub battle_speed: BattleSpeed,
    /// The three swiftness licenses.
    pub swiftness: [bool; 3],
    pub buffs: BuffToggles,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            defense: 30.0,
            magick_defense: 30.0,
            percent_hp: 100.0,
            reactions: Elemental::splat(Reaction::Neutral),
            level: 70.0,
            resist_gun: false,
            battle_speed: BattleSpeed::default(),
            swiftness: [false; 3],
            buffs: BuffToggles::default(),
        }
    }
}

impl ScenarioParameters {
    pub fn swiftness_count(&self) -> usize {
        self.swiftness.iter().filter(|owned| **owned).count()
    }
}
