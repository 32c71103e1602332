//! Attribute profile: the composed numeric/boolean attribute set the damage formula runs on.
//! Built fresh for every candidate loadout and never retained.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Ice,
    Lightning,
    Water,
    Wind,
    Earth,
    Dark,
    Holy,
}

impl Element {
    pub const ALL: [Element; 8] = [
        Self::Fire,
        Self::Ice,
        Self::Lightning,
        Self::Water,
        Self::Wind,
        Self::Earth,
        Self::Dark,
        Self::Holy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Ice => "ice",
            Self::Lightning => "lightning",
            Self::Water => "water",
            Self::Wind => "wind",
            Self::Earth => "earth",
            Self::Dark => "dark",
            Self::Holy => "holy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::Ice => "Ice",
            Self::Lightning => "Lightning",
            Self::Water => "Water",
            Self::Wind => "Wind",
            Self::Earth => "Earth",
            Self::Dark => "Dark",
            Self::Holy => "Holy",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per element. Serialized as a map keyed by element name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Elemental<T> {
    pub fire: T,
    pub ice: T,
    pub lightning: T,
    pub water: T,
    pub wind: T,
    pub earth: T,
    pub dark: T,
    pub holy: T,
}

impl<T> Elemental<T> {
    pub fn get(&self, element: Element) -> &T {
        match element {
            Element::Fire => &self.fire,
            Element::Ice => &self.ice,
            Element::Lightning => &self.lightning,
            Element::Water => &self.water,
            Element::Wind => &self.wind,
            Element::Earth => &self.earth,
            Element::Dark => &self.dark,
            Element::Holy => &self.holy,
        }
    }

    pub fn get_mut(&mut self, element: Element) -> &mut T {
        match element {
            Element::Fire => &mut self.fire,
            Element::Ice => &mut self.ice,
            Element::Lightning => &mut self.lightning,
            Element::Water => &mut self.water,
            Element::Wind => &mut self.wind,
            Element::Earth => &mut self.earth,
            Element::Dark => &mut self.dark,
            Element::Holy => &mut self.holy,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, &T)> {
        Element::ALL.into_iter().map(move |element| (element, self.get(element)))
    }
}

impl<T: Copy> Elemental<T> {
    pub fn splat(value: T) -> Self {
        Self {
            fire: value,
            ice: value,
            lightning: value,
            water: value,
            wind: value,
            earth: value,
            dark: value,
            holy: value,
        }
    }
}

/// Damage formula family, declared by the weapon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageFormula {
    #[default]
    Unarmed,
    Sword,
    Pole,
    Mace,
    Katana,
    Hammer,
    Dagger,
    Gun,
}

impl DamageFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unarmed => "unarmed",
            Self::Sword => "sword",
            Self::Pole => "pole",
            Self::Mace => "mace",
            Self::Katana => "katana",
            Self::Hammer => "hammer",
            Self::Dagger => "dagger",
            Self::Gun => "gun",
        }
    }
}

/// Animation/timing class, declared by the weapon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationClass {
    #[default]
    Unarmed,
    Dagger,
    Ninja,
    Katana,
    Sword,
    Bigsword,
    Hammer,
    Pole,
    Spear,
    Mace,
    Bow,
    Gun,
    Xbow,
    Measure,
    Rod,
    Staff,
    Handbomb,
}

impl AnimationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unarmed => "unarmed",
            Self::Dagger => "dagger",
            Self::Ninja => "ninja",
            Self::Katana => "katana",
            Self::Sword => "sword",
            Self::Bigsword => "bigsword",
            Self::Hammer => "hammer",
            Self::Pole => "pole",
            Self::Spear => "spear",
            Self::Mace => "mace",
            Self::Bow => "bow",
            Self::Gun => "gun",
            Self::Xbow => "xbow",
            Self::Measure => "measure",
            Self::Rod => "rod",
            Self::Staff => "staff",
            Self::Handbomb => "handbomb",
        }
    }

    /// Human-readable weapon class name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unarmed => "Unarmed",
            Self::Dagger => "Dagger",
            Self::Ninja => "Ninja Sword",
            Self::Katana => "Katana",
            Self::Sword => "Sword",
            Self::Bigsword => "Greatsword",
            Self::Hammer => "Hammer/Axe",
            Self::Pole => "Pole",
            Self::Spear => "Spear",
            Self::Mace => "Mace",
            Self::Bow => "Bow",
            Self::Gun => "Gun",
            Self::Xbow => "Crossbow",
            Self::Measure => "Measure",
            Self::Rod => "Rod",
            Self::Staff => "Staff",
            Self::Handbomb => "Handbomb",
        }
    }

    /// Classes that fire ammunition. Only these make the ammo slot matter.
    pub fn uses_ammo(&self) -> bool {
        matches!(
            self,
            Self::Bow | Self::Gun | Self::Xbow | Self::Measure | Self::Handbomb
        )
    }

    /// Classes a gun/measure-resistant target shrugs off.
    pub fn is_gun_or_measure(&self) -> bool {
        matches!(self, Self::Gun | Self::Measure)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Boons {
    pub brawler: bool,
    pub berserk: bool,
    pub haste: bool,
    pub bravery: bool,
    pub focus: bool,
    pub adrenaline: bool,
    /// Longer, more frequent combos (Genji Gloves).
    pub combo_extension: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementAffinity {
    /// The attack carries this element.
    pub damage: bool,
    /// A 1.5x bonus for this element is available.
    pub bonus: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeProfile {
    pub damage_formula: DamageFormula,
    pub animation: AnimationClass,
    /// Weapon attack value.
    pub attack: f64,
    /// Weapon CB value: combo chance in percent.
    pub combo: f64,
    /// Weapon CT value.
    pub charge_time: f64,
    pub strength: f64,
    pub magic: f64,
    pub vitality: f64,
    pub speed: f64,
    pub boons: Boons,
    pub elements: Elemental<ElementAffinity>,
}

impl AttributeProfile {
    /// Elements the attack carries, in canonical element order.
    pub fn damage_elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.elements
            .iter()
            .filter(|(_, affinity)| affinity.damage)
            .map(|(element, _)| element)
    }

    /// Gun-family formula fired from anything but a gun: resolved as non-elemental pierce.
    pub fn is_pierce(&self) -> bool {
        self.damage_formula == DamageFormula::Gun && self.animation != AnimationClass::Gun
    }
}
