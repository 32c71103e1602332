//! CSV export of ranked loadouts: one row per result, best first.

use std::io;

use serde::Serialize;

use crate::optimizer::ranking::RankedResult;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    dps: f64,
    weapon: &'a str,
    ammo: &'a str,
    helm: &'a str,
    armor: &'a str,
    accessory: &'a str,
    base_damage: f64,
    modified_damage: f64,
    combo_damage: f64,
    charge_time: f64,
    animation_time: f64,
}

/// Write `results` as CSV with a header row. Empty optional slots are written as "".
pub fn write_csv<W: io::Write>(writer: W, results: &[RankedResult<'_>]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (position, result) in results.iter().enumerate() {
        let [weapon, ammo, helm, armor, accessory] =
            result.loadout.names().map(|name| name.unwrap_or_default());
        let damage = &result.damage;
        csv_writer.serialize(CsvRow {
            rank: position + 1,
            dps: damage.dps,
            weapon,
            ammo,
            helm,
            armor,
            accessory,
            base_damage: damage.base_damage,
            modified_damage: damage.modified_damage,
            combo_damage: damage.combo_damage,
            charge_time: damage.charge_time,
            animation_time: damage.animation_time,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(results: &[RankedResult<'_>]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, results)?;
    String::from_utf8(buffer)
        .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::engine::DamageResult;
    use crate::data::item::Item;
    use crate::optimizer::loadout::Loadout;

    #[test]
    fn csv_has_header_and_blank_empty_slots() {
        let weapon = Item::new("Kotetsu");
        let accessory = Item::new("Bangle");
        let rows = [RankedResult {
            loadout: Loadout {
                accessory: Some(&accessory),
                ..Loadout::weapon_only(&weapon)
            },
            damage: DamageResult {
                dps: 12.5,
                ..DamageResult::default()
            },
        }];
        let csv = to_csv_string(&rows).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("rank,dps,weapon,ammo,helm,armor,accessory,base_damage,modified_damage,combo_damage,charge_time,animation_time")
        );
        assert_eq!(lines.next(), Some("1,12.5,Kotetsu,,,,Bangle,0.0,0.0,0.0,0.0,0.0"));
        assert_eq!(lines.next(), None);
    }
}
