//! Equipment items and the modifier field table.
//!
//! Each item carries a partial attribute modifier: numeric fields are additive deltas,
//! boolean fields are grants (never revokes), and the weapon alone may declare the damage
//! formula and animation class. The set of legal fields is the explicit [FIELD_TABLE];
//! catalog loading checks every declared key against it.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::combat::profile::{AnimationClass, DamageFormula, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Weapon,
    Ammo,
    Helm,
    Armor,
    Accessory,
}

impl Slot {
    /// Fold order used by the composer.
    pub const ALL: [Slot; 5] = [
        Self::Weapon,
        Self::Ammo,
        Self::Helm,
        Self::Armor,
        Self::Accessory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Ammo => "ammo",
            Self::Helm => "helm",
            Self::Armor => "armor",
            Self::Accessory => "accessory",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to a license. Passed through to the ownership predicate, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseRef(String);

impl LicenseRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Flag,
    Formula,
    Animation,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "number",
            Self::Flag => "boolean",
            Self::Formula => "damage formula",
            Self::Animation => "animation class",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierField {
    Attack,
    Combo,
    ChargeTime,
    Strength,
    Magic,
    Vitality,
    Speed,
    Brawler,
    Berserk,
    Haste,
    Bravery,
    Focus,
    Adrenaline,
    ComboExtension,
    ElementDamage(Element),
    ElementBonus(Element),
    DamageFormula,
    Animation,
}

/// Every key an item may declare, in display order.
pub const FIELD_TABLE: &[(&str, ModifierField)] = &[
    ("damage_formula", ModifierField::DamageFormula),
    ("animation", ModifierField::Animation),
    ("attack", ModifierField::Attack),
    ("charge_time", ModifierField::ChargeTime),
    ("combo", ModifierField::Combo),
    ("strength", ModifierField::Strength),
    ("magic", ModifierField::Magic),
    ("vitality", ModifierField::Vitality),
    ("speed", ModifierField::Speed),
    ("brawler", ModifierField::Brawler),
    ("berserk", ModifierField::Berserk),
    ("haste", ModifierField::Haste),
    ("bravery", ModifierField::Bravery),
    ("focus", ModifierField::Focus),
    ("adrenaline", ModifierField::Adrenaline),
    ("combo_extension", ModifierField::ComboExtension),
    ("fire_damage", ModifierField::ElementDamage(Element::Fire)),
    ("ice_damage", ModifierField::ElementDamage(Element::Ice)),
    ("lightning_damage", ModifierField::ElementDamage(Element::Lightning)),
    ("water_damage", ModifierField::ElementDamage(Element::Water)),
    ("wind_damage", ModifierField::ElementDamage(Element::Wind)),
    ("earth_damage", ModifierField::ElementDamage(Element::Earth)),
    ("dark_damage", ModifierField::ElementDamage(Element::Dark)),
    ("holy_damage", ModifierField::ElementDamage(Element::Holy)),
    ("fire_bonus", ModifierField::ElementBonus(Element::Fire)),
    ("ice_bonus", ModifierField::ElementBonus(Element::Ice)),
    ("lightning_bonus", ModifierField::ElementBonus(Element::Lightning)),
    ("water_bonus", ModifierField::ElementBonus(Element::Water)),
    ("wind_bonus", ModifierField::ElementBonus(Element::Wind)),
    ("earth_bonus", ModifierField::ElementBonus(Element::Earth)),
    ("dark_bonus", ModifierField::ElementBonus(Element::Dark)),
    ("holy_bonus", ModifierField::ElementBonus(Element::Holy)),
];

impl ModifierField {
    pub fn from_key(key: &str) -> Option<Self> {
        FIELD_TABLE
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, field)| *field)
    }

    pub fn key(&self) -> &'static str {
        FIELD_TABLE
            .iter()
            .find(|(_, field)| field == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Attack
            | Self::Combo
            | Self::ChargeTime
            | Self::Strength
            | Self::Magic
            | Self::Vitality
            | Self::Speed => FieldKind::Numeric,
            Self::DamageFormula => FieldKind::Formula,
            Self::Animation => FieldKind::Animation,
            _ => FieldKind::Flag,
        }
    }

    /// Only the weapon may define the formula family and timing class.
    pub fn is_weapon_only(&self) -> bool {
        matches!(self, Self::DamageFormula | Self::Animation)
    }

    /// Short tooltip label (e.g. "Att", "Haste", "Fire Damage").
    pub fn label(&self) -> String {
        match self {
            Self::Attack => "Att".to_string(),
            Self::Combo => "Cb".to_string(),
            Self::ChargeTime => "CT".to_string(),
            Self::Strength => "Str".to_string(),
            Self::Magic => "Mag".to_string(),
            Self::Vitality => "Vit".to_string(),
            Self::Speed => "Spd".to_string(),
            Self::Brawler => "Brawler".to_string(),
            Self::Berserk => "Berserk".to_string(),
            Self::Haste => "Haste".to_string(),
            Self::Bravery => "Bravery".to_string(),
            Self::Focus => "Focus".to_string(),
            Self::Adrenaline => "Adrenaline".to_string(),
            Self::ComboExtension => "Combo+".to_string(),
            Self::ElementDamage(element) => format!("{} Damage", element.label()),
            Self::ElementBonus(element) => format!("{} Bonus", element.label()),
            Self::DamageFormula => "Formula".to_string(),
            Self::Animation => "Class".to_string(),
        }
    }
}

impl fmt::Display for ModifierField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for ModifierField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModifierValue {
    Number(f64),
    Flag(bool),
    Formula(DamageFormula),
    Animation(AnimationClass),
}

impl ModifierValue {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Flag(_) => "boolean",
            Self::Formula(_) => "damage formula",
            Self::Animation(_) => "animation class",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Modifier {
    pub field: ModifierField,
    pub value: ModifierValue,
}

impl Modifier {
    pub fn new(field: ModifierField, value: ModifierValue) -> Self {
        Self { field, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseRef>,
    /// Ammunition only: the weapon class this ammo is loaded into. `None` fits any ranged class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fits: Option<AnimationClass>,
    pub modifiers: Vec<Modifier>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            license: None,
            fits: None,
            modifiers: Vec::new(),
        }
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(LicenseRef::new(license));
        self
    }

    pub fn with_fits(mut self, class: AnimationClass) -> Self {
        self.fits = Some(class);
        self
    }

    pub fn with(mut self, field: ModifierField, value: ModifierValue) -> Self {
        self.modifiers.push(Modifier::new(field, value));
        self
    }

    pub fn with_number(self, field: ModifierField, value: f64) -> Self {
        self.with(field, ModifierValue::Number(value))
    }

    pub fn with_flag(self, field: ModifierField) -> Self {
        self.with(field, ModifierValue::Flag(true))
    }

    pub fn with_formula(self, formula: DamageFormula) -> Self {
        self.with(ModifierField::DamageFormula, ModifierValue::Formula(formula))
    }

    pub fn with_animation(self, class: AnimationClass) -> Self {
        self.with(ModifierField::Animation, ModifierValue::Animation(class))
    }

    pub fn value_of(&self, field: ModifierField) -> Option<ModifierValue> {
        self.modifiers
            .iter()
            .find(|modifier| modifier.field == field)
            .map(|modifier| modifier.value)
    }

    pub fn formula(&self) -> Option<DamageFormula> {
        match self.value_of(ModifierField::DamageFormula) {
            Some(ModifierValue::Formula(formula)) => Some(formula),
            _ => None,
        }
    }

    pub fn animation(&self) -> Option<AnimationClass> {
        match self.value_of(ModifierField::Animation) {
            Some(ModifierValue::Animation(class)) => Some(class),
            _ => None,
        }
    }

    /// True when equipping this item changes nothing the damage formula reads.
    pub fn is_inert(&self) -> bool {
        // A value of the wrong shape is never inert; compose must get to reject it.
        self.modifiers
            .iter()
            .all(|modifier| match (modifier.field.kind(), modifier.value) {
                (FieldKind::Numeric, ModifierValue::Number(value)) => value == 0.0,
                (FieldKind::Flag, ModifierValue::Flag(granted)) => !granted,
                _ => false,
            })
    }

    /// Comma-separated tooltip: weapon class, "Pierce", then every non-trivial modifier.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(class) = self.animation() {
            parts.push(class.label().to_string());
        }
        if self.formula() == Some(DamageFormula::Gun)
            && self.animation() != Some(AnimationClass::Gun)
        {
            parts.push("Pierce".to_string());
        }
        for (_, field) in FIELD_TABLE {
            match self.value_of(*field) {
                Some(ModifierValue::Number(value)) if value > 0.0 => {
                    parts.push(format!("{value} {}", field.label()));
                }
                Some(ModifierValue::Flag(true)) => parts.push(field.label()),
                _ => {}
            }
        }
        parts.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_table_round_trips_every_key() {
        for (key, field) in FIELD_TABLE {
            assert_eq!(ModifierField::from_key(key), Some(*field));
            assert_eq!(field.key(), *key);
        }
        assert_eq!(ModifierField::from_key("genji"), None);
    }

    #[test]
    fn only_formula_and_animation_are_weapon_only() {
        let weapon_only: Vec<_> = FIELD_TABLE
            .iter()
            .filter(|(_, field)| field.is_weapon_only())
            .map(|(key, _)| *key)
            .collect();
        assert_eq!(weapon_only, vec!["damage_formula", "animation"]);
    }

    #[test]
    fn summary_marks_crossbow_as_pierce() {
        let item = Item::new("Recurve Crossbow")
            .with_formula(DamageFormula::Gun)
            .with_animation(AnimationClass::Xbow)
            .with_number(ModifierField::Attack, 58.0)
            .with_flag(ModifierField::ElementDamage(Element::Dark));
        assert_eq!(item.summary(), "Crossbow,Pierce,58 Att,Dark Damage");
    }

    #[test]
    fn item_with_only_zero_deltas_is_inert() {
        assert!(Item::new("Ribbon").is_inert());
        assert!(Item::new("Bangle").with_number(ModifierField::Speed, 0.0).is_inert());
        assert!(!Item::new("Sash").with_number(ModifierField::Speed, 20.0).is_inert());
    }

    #[test]
    fn wrongly_shaped_zero_is_not_inert() {
        let odd = Item::new("Odd Hat").with(ModifierField::Haste, ModifierValue::Number(0.0));
        assert!(!odd.is_inert());
        let odd = Item::new("Odd Ring").with(ModifierField::Speed, ModifierValue::Flag(false));
        assert!(!odd.is_inert());
    }
}
