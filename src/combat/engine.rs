//! Damage calculator: composed profile + scenario -> per-hit damage, cycle timing and DPS.
//!
//! Random damage ranges are replaced by their expected value so the result is a pure
//! function of its inputs. The calculator is total over the documented input ranges:
//! intermediate terms are floored at zero and the cycle time is bounded away from zero.

use serde::{Deserialize, Serialize};

use crate::combat::profile::{AnimationClass, AttributeProfile, DamageFormula};
use crate::combat::scenario::ScenarioParameters;

/// Mean of the usual damage roll, uniform on [1, 1.125].
pub const AVERAGE_DAMAGE_ROLL: f64 = 1.0625;
/// Mean of the hammer/axe roll, uniform on [0, 1.111].
pub const AVERAGE_HAMMER_ROLL: f64 = 0.5555;
/// Unarmed attack power without the brawler license.
pub const UNARMED_ATTACK: f64 = 11.0;

pub const ELEMENT_BONUS_MULTIPLIER: f64 = 1.5;
pub const BERSERK_MULTIPLIER: f64 = 1.5;
pub const BRAVERY_MULTIPLIER: f64 = 1.3;
pub const FOCUS_MULTIPLIER: f64 = 1.5;
pub const ADRENALINE_MULTIPLIER: f64 = 1.5;
/// Damage left over when a gun/measure-resistant target is hit by a gun or measure.
pub const GUN_RESIST_FACTOR: f64 = 0.0;
/// HP percentage at or below which a character counts as critical.
pub const CRITICAL_HP_PERCENT: f64 = 20.0;

/// Extra hits in an average combo chain, without and with the combo-extension boon.
pub const COMBO_CHAIN_HITS: f64 = 3.0;
pub const EXTENDED_COMBO_CHAIN_HITS: f64 = 4.0;
/// Combo chance (percent) granted by the combo-extension boon.
pub const COMBO_EXTENSION_RATE: f64 = 5.0;

pub const HASTE_CHARGE_FACTOR: f64 = 0.5;
pub const SWIFTNESS_CHARGE_REDUCTION: f64 = 0.1;
/// Seconds per 10 CT at the reference speed.
pub const CHARGE_SECONDS_PER_TEN_CT: f64 = 1.0;
pub const REFERENCE_SPEED: f64 = 30.0;
/// Floor for a full attack cycle in seconds.
pub const MIN_CYCLE_SECONDS: f64 = 0.05;

/// Damage and timing breakdown for one composed profile.
///
/// These six fields are what consumers display per ranked row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    /// Formula output before mitigation.
    pub base_damage: f64,
    /// Per-hit damage after mitigation, elements, HP gating, buffs and resistances.
    pub modified_damage: f64,
    /// Modified damage times the expected hits per attack cycle.
    pub combo_damage: f64,
    /// Seconds.
    pub charge_time: f64,
    /// Seconds.
    pub animation_time: f64,
    pub dps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mitigation {
    Physical,
    Magical,
    None,
}

impl DamageFormula {
    fn mitigation(self) -> Mitigation {
        match self {
            Self::Unarmed | Self::Sword | Self::Katana | Self::Dagger | Self::Hammer => {
                Mitigation::Physical
            }
            Self::Pole | Self::Mace => Mitigation::Magical,
            Self::Gun => Mitigation::None,
        }
    }

    /// Berserk only strengthens formulas driven by the wielder's arm.
    fn berserk_applies(self) -> bool {
        self != Self::Gun
    }
}

/// Animation length in seconds at battle speed 6.
pub fn animation_seconds(class: AnimationClass) -> f64 {
    match class {
        AnimationClass::Unarmed => 0.6,
        AnimationClass::Dagger | AnimationClass::Ninja => 0.7,
        AnimationClass::Katana | AnimationClass::Sword => 0.9,
        AnimationClass::Pole | AnimationClass::Spear => 1.0,
        AnimationClass::Mace | AnimationClass::Rod | AnimationClass::Staff => 1.1,
        AnimationClass::Bigsword | AnimationClass::Hammer => 1.2,
        AnimationClass::Xbow | AnimationClass::Measure | AnimationClass::Handbomb => 1.2,
        AnimationClass::Bow => 1.3,
        AnimationClass::Gun => 1.5,
    }
}

pub fn calculate(profile: &AttributeProfile, scenario: &ScenarioParameters) -> DamageResult {
    let attack = effective_attack(profile, scenario);
    let (roll, multiplier) = formula_terms(profile, scenario);
    let rolled = attack * roll;
    let base_damage = rolled * multiplier;

    let defense = match profile.damage_formula.mitigation() {
        Mitigation::Physical => scenario.defense,
        Mitigation::Magical => scenario.magick_defense,
        Mitigation::None => 0.0,
    };
    let mut modified_damage = (rolled - defense).max(0.0) * multiplier;

    modified_damage *= element_multiplier(profile, scenario);
    modified_damage *= hp_multiplier(profile, scenario);
    modified_damage *= buff_multiplier(profile);

    if scenario.resist_gun && profile.animation.is_gun_or_measure() {
        modified_damage *= GUN_RESIST_FACTOR;
    }

    let combo_damage = modified_damage * hits_per_cycle(profile);
    let charge_time = charge_seconds(profile, scenario);
    let animation_time =
        animation_seconds(profile.animation) * scenario.battle_speed.time_factor();
    let dps = combo_damage / (charge_time + animation_time).max(MIN_CYCLE_SECONDS);

    DamageResult {
        base_damage,
        modified_damage,
        combo_damage,
        charge_time,
        animation_time,
        dps,
    }
}

fn effective_attack(profile: &AttributeProfile, scenario: &ScenarioParameters) -> f64 {
    if profile.damage_formula != DamageFormula::Unarmed {
        return profile.attack;
    }
    let fist = if profile.boons.brawler {
        (scenario.level + profile.strength) / 2.0
    } else {
        UNARMED_ATTACK
    };
    profile.attack + fist
}

/// Returns (average roll, stat multiplier) for the profile's formula family.
fn formula_terms(profile: &AttributeProfile, scenario: &ScenarioParameters) -> (f64, f64) {
    let lv = scenario.level;
    let st = profile.strength;
    let mag = profile.magic;
    let spd = profile.speed;
    match profile.damage_formula {
        DamageFormula::Unarmed | DamageFormula::Sword => {
            (AVERAGE_DAMAGE_ROLL, 1.0 + st * (lv + st) / 256.0)
        }
        DamageFormula::Katana | DamageFormula::Pole => {
            (AVERAGE_DAMAGE_ROLL, 1.0 + st * (lv + mag) / 256.0)
        }
        DamageFormula::Dagger => (AVERAGE_DAMAGE_ROLL, 1.0 + st * (lv + spd) / 218.0),
        DamageFormula::Hammer => (
            AVERAGE_HAMMER_ROLL,
            1.0 + st * (lv + profile.vitality) / 128.0,
        ),
        DamageFormula::Mace => (AVERAGE_DAMAGE_ROLL, 1.0 + mag * (lv + mag) / 256.0),
        DamageFormula::Gun => (AVERAGE_DAMAGE_ROLL, 1.0 + spd * (lv + spd) / 256.0),
    }
}

fn element_multiplier(profile: &AttributeProfile, scenario: &ScenarioParameters) -> f64 {
    if profile.is_pierce() {
        return 1.0;
    }
    profile
        .damage_elements()
        .map(|element| {
            let reaction = scenario.reactions.get(element).multiplier();
            if profile.elements.get(element).bonus {
                reaction * ELEMENT_BONUS_MULTIPLIER
            } else {
                reaction
            }
        })
        .reduce(f64::max)
        .unwrap_or(1.0)
}

/// Focus pays off at full HP, adrenaline once HP is critical.
fn hp_multiplier(profile: &AttributeProfile, scenario: &ScenarioParameters) -> f64 {
    let mut multiplier = 1.0;
    if profile.boons.focus && scenario.percent_hp >= 100.0 {
        multiplier *= FOCUS_MULTIPLIER;
    }
    if profile.boons.adrenaline && scenario.percent_hp <= CRITICAL_HP_PERCENT {
        multiplier *= ADRENALINE_MULTIPLIER;
    }
    multiplier
}

fn buff_multiplier(profile: &AttributeProfile) -> f64 {
    let mut multiplier = 1.0;
    if profile.boons.berserk && profile.damage_formula.berserk_applies() {
        multiplier *= BERSERK_MULTIPLIER;
    }
    if profile.boons.bravery {
        multiplier *= BRAVERY_MULTIPLIER;
    }
    multiplier
}

/// Expected hits per attack cycle: the opening hit plus the expected combo follow-ups.
pub fn hits_per_cycle(profile: &AttributeProfile) -> f64 {
    let (bonus_rate, chain) = if profile.boons.combo_extension {
        (COMBO_EXTENSION_RATE, EXTENDED_COMBO_CHAIN_HITS)
    } else {
        (0.0, COMBO_CHAIN_HITS)
    };
    let rate = ((profile.combo.max(0.0) + bonus_rate) / 100.0).min(1.0);
    1.0 + rate * chain
}

fn charge_seconds(profile: &AttributeProfile, scenario: &ScenarioParameters) -> f64 {
    let speed_factor = REFERENCE_SPEED / (REFERENCE_SPEED + profile.speed.max(0.0)) * 2.0;
    let mut seconds =
        profile.charge_time.max(0.0) / 10.0 * CHARGE_SECONDS_PER_TEN_CT * speed_factor;
    if profile.boons.haste {
        seconds *= HASTE_CHARGE_FACTOR;
    }
    seconds *= 1.0 - SWIFTNESS_CHARGE_REDUCTION * scenario.swiftness_count() as f64;
    seconds * scenario.battle_speed.time_factor()
}
