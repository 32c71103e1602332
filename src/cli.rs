use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::combat::compose::compose;
use crate::combat::engine::calculate;
use crate::combat::scenario::ScenarioParameters;
use crate::data::catalog::EquipmentCatalog;
use crate::data::item::Slot;
use crate::data::ownership::OwnershipSnapshot;
use crate::data::settings::{load_ownership, load_scenario, ReferenceData, Settings};
use crate::data::validate::ValidationSeverity;
use crate::optimizer::export::write_csv;
use crate::optimizer::{optimize, optimize_party, Loadout, OptimizeOptions, RankedResult};
use crate::parallel::WorkerPool;
use crate::server::{self, AppState};

const USAGE: &str = "usage: gambit <serve|optimize|party|calculate|validate|export> [options]\n\
  optimize <character> [--scenario FILE] [--ownership FILE] [--all-licenses] [--limit N] [--no-collapse] [--table]\n\
  party [--scenario FILE] [--ownership FILE] [--all-licenses] [--limit N] [--workers N]\n\
  calculate <character> <weapon> [--ammo NAME] [--helm NAME] [--armor NAME] [--accessory NAME] [--scenario FILE]\n\
  validate [DATA_DIR]\n\
  export <character> [--scenario FILE] [--ownership FILE] [--all-licenses] [--limit N] [--out FILE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Optimize,
    Party,
    Calculate,
    Validate,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("optimize") => Some(Command::Optimize),
        Some("party") => Some(Command::Party),
        Some("calculate") => Some(Command::Calculate),
        Some("validate") => Some(Command::Validate),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    run_with_settings(args, &Settings::from_env())
}

pub fn run_with_settings(args: &[String], settings: &Settings) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    if command == Command::Validate {
        return handle_validate(args, settings);
    }

    let data = match settings.load_reference_data() {
        Ok(data) => data,
        Err(err) => {
            eprintln!("failed to load reference data: {err}");
            return 1;
        }
    };
    match command {
        Command::Serve => handle_serve(settings, data),
        Command::Optimize => handle_optimize(args, &data),
        Command::Party => handle_party(args, settings, &data),
        Command::Calculate => handle_calculate(args, &data),
        Command::Export => handle_export(args, &data),
        Command::Validate => handle_validate(args, settings),
    }
}

fn handle_serve(settings: &Settings, data: ReferenceData) -> i32 {
    let state = AppState {
        data,
        pool: WorkerPool::with_workers(settings.workers),
    };
    match server::run_server(&settings.bind_addr, &state) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// Inputs shared by every optimize-style command.
struct RunInputs {
    scenario: ScenarioParameters,
    ownership: OwnershipSnapshot,
    options: OptimizeOptions,
}

fn run_inputs(args: &[String]) -> Result<RunInputs, String> {
    let scenario = match flag_value(args, "--scenario") {
        Some(path) => load_scenario(path).map_err(|err| err.to_string())?,
        None => ScenarioParameters::default(),
    };
    let ownership = if has_flag(args, "--all-licenses") {
        OwnershipSnapshot::all()
    } else {
        match flag_value(args, "--ownership") {
            Some(path) => load_ownership(path).map_err(|err| err.to_string())?,
            None => OwnershipSnapshot::default(),
        }
    };
    let limit = match flag_value(args, "--limit") {
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|_| format!("invalid --limit '{raw}'"))?,
        ),
        None => None,
    };
    Ok(RunInputs {
        scenario,
        ownership,
        options: OptimizeOptions {
            limit,
            collapse_equivalent: !has_flag(args, "--no-collapse"),
        },
    })
}

fn handle_optimize(args: &[String], data: &ReferenceData) -> i32 {
    let Some(key) = positional(args, 0) else {
        eprintln!("usage: gambit optimize <character> [options]");
        return 2;
    };
    let Some(character) = data.roster.find(key) else {
        eprintln!("unknown character '{key}'");
        return 2;
    };
    let inputs = match run_inputs(args) {
        Ok(inputs) => inputs,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let character = inputs.ownership.resolve(character);
    let owned = inputs.ownership.for_character(&character.name);
    let ranked = match optimize(
        &character,
        &inputs.scenario,
        &data.catalog,
        &owned,
        &inputs.options,
    ) {
        Ok(ranked) => ranked,
        Err(err) => {
            eprintln!("optimization failed: {err}");
            return 1;
        }
    };

    if has_flag(args, "--table") {
        print_table(&ranked);
        0
    } else {
        print_json(&ranked)
    }
}

fn handle_party(args: &[String], settings: &Settings, data: &ReferenceData) -> i32 {
    let inputs = match run_inputs(args) {
        Ok(inputs) => inputs,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let workers = match flag_value(args, "--workers") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(workers) => workers,
            Err(_) => {
                eprintln!("invalid --workers '{raw}'");
                return 2;
            }
        },
        None => settings.workers,
    };

    match optimize_party(
        data.roster.characters(),
        &inputs.scenario,
        &data.catalog,
        &inputs.ownership,
        &inputs.options,
        &WorkerPool::with_workers(workers),
    ) {
        Ok(outcomes) => {
            let code = print_json(&outcomes);
            if outcomes.iter().all(|outcome| outcome.is_ok()) {
                code
            } else {
                1
            }
        }
        Err(err) => {
            eprintln!("failed to start worker pool: {err}");
            1
        }
    }
}

fn handle_calculate(args: &[String], data: &ReferenceData) -> i32 {
    let (Some(key), Some(weapon_name)) = (positional(args, 0), positional(args, 1)) else {
        eprintln!("usage: gambit calculate <character> <weapon> [options]");
        return 2;
    };
    let Some(character) = data.roster.find(key) else {
        eprintln!("unknown character '{key}'");
        return 2;
    };
    let Some(weapon) = data.catalog.find(Slot::Weapon, weapon_name) else {
        eprintln!("unknown weapon '{weapon_name}'");
        return 2;
    };
    let mut loadout = Loadout::weapon_only(weapon);
    for (slot, flag) in [
        (Slot::Ammo, "--ammo"),
        (Slot::Helm, "--helm"),
        (Slot::Armor, "--armor"),
        (Slot::Accessory, "--accessory"),
    ] {
        let Some(name) = flag_value(args, flag) else {
            continue;
        };
        let Some(item) = data.catalog.find(slot, name) else {
            eprintln!("unknown {slot} '{name}'");
            return 2;
        };
        match slot {
            Slot::Ammo => loadout.ammo = Some(item),
            Slot::Helm => loadout.helm = Some(item),
            Slot::Armor => loadout.armor = Some(item),
            Slot::Accessory => loadout.accessory = Some(item),
            Slot::Weapon => {}
        }
    }
    let scenario = match flag_value(args, "--scenario") {
        Some(path) => match load_scenario(path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("{err}");
                return 2;
            }
        },
        None => ScenarioParameters::default(),
    };

    match compose(&character.base_profile(&scenario), loadout.equipped()) {
        Ok(profile) => print_json(&serde_json::json!({
            "character": character.name,
            "loadout": loadout,
            "damage": calculate(&profile, &scenario),
        })),
        Err(err) => {
            eprintln!("cannot compose loadout: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String], settings: &Settings) -> i32 {
    let dir = args
        .get(2)
        .map(Path::new)
        .or(settings.data_dir.as_deref());
    let label = dir.map_or_else(|| "built-in catalog".to_string(), |dir| dir.display().to_string());

    match EquipmentCatalog::report(dir) {
        Ok(report) => {
            for diag in &report.diagnostics {
                eprintln!("- {diag}");
            }
            if report.has_errors() {
                eprintln!(
                    "validation failed: {} error(s), {} warning(s)",
                    report.count(ValidationSeverity::Error),
                    report.count(ValidationSeverity::Warning)
                );
                1
            } else {
                println!("validation passed: {label}");
                0
            }
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

fn handle_export(args: &[String], data: &ReferenceData) -> i32 {
    let Some(key) = positional(args, 0) else {
        eprintln!("usage: gambit export <character> [--out FILE] [options]");
        return 2;
    };
    let Some(character) = data.roster.find(key) else {
        eprintln!("unknown character '{key}'");
        return 2;
    };
    let inputs = match run_inputs(args) {
        Ok(inputs) => inputs,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let character = inputs.ownership.resolve(character);
    let owned = inputs.ownership.for_character(&character.name);
    let ranked = match optimize(
        &character,
        &inputs.scenario,
        &data.catalog,
        &owned,
        &inputs.options,
    ) {
        Ok(ranked) => ranked,
        Err(err) => {
            eprintln!("optimization failed: {err}");
            return 1;
        }
    };

    let written = match flag_value(args, "--out") {
        Some(path) => File::create(path)
            .map_err(csv::Error::from)
            .and_then(|file| write_csv(file, &ranked)),
        None => write_csv(io::stdout().lock(), &ranked),
    };
    match written {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn print_json<T: serde::Serialize>(payload: &T) -> i32 {
    match serde_json::to_string_pretty(payload) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            1
        }
    }
}

fn print_table(ranked: &[RankedResult<'_>]) {
    let mut out = io::stdout().lock();
    let _ = writeln!(
        out,
        "dps\tweapon\tammo\thelm\tarmor\taccessory\tbase\tmodified\tcombo\tcharge\tanimation"
    );
    for row in ranked {
        let names = row
            .loadout
            .names()
            .map(|name| name.unwrap_or("-"))
            .join("\t");
        let damage = &row.damage;
        let _ = writeln!(
            out,
            "{:.2}\t{}\t{:.1}\t{:.1}\t{:.1}\t{:.2}\t{:.2}",
            damage.dps,
            names,
            damage.base_damage,
            damage.modified_damage,
            damage.combo_damage,
            damage.charge_time,
            damage.animation_time
        );
    }
    if let Some(best) = ranked.first() {
        let _ = writeln!(
            out,
            "\nbest weapon: {} ({})",
            best.loadout.weapon.name,
            best.loadout.weapon.summary()
        );
        for slot in &Slot::ALL[1..] {
            if let Some(item) = best.loadout.get(*slot) {
                let _ = writeln!(out, "  {slot}: {} ({})", item.name, item.summary());
            }
        }
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().skip(2).any(|arg| arg == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .skip(2)
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 3))
        .map(String::as_str)
}

/// `n`th argument after the command that is neither a flag nor a flag's value.
fn positional(args: &[String], n: usize) -> Option<&str> {
    let mut rest = args.iter().skip(2);
    let mut found = Vec::new();
    while let Some(arg) = rest.next() {
        if arg.starts_with("--") {
            if !BOOLEAN_FLAGS.contains(&arg.as_str()) {
                rest.next();
            }
            continue;
        }
        found.push(arg.as_str());
    }
    found.get(n).copied()
}

const BOOLEAN_FLAGS: &[&str] = &["--all-licenses", "--no-collapse", "--table"];

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn positional_skips_flags_and_their_values() {
        let argv = args(&[
            "gambit",
            "calculate",
            "--scenario",
            "boss.yaml",
            "Vaan",
            "--table",
            "Broadsword",
        ]);
        assert_eq!(positional(&argv, 0), Some("Vaan"));
        assert_eq!(positional(&argv, 1), Some("Broadsword"));
        assert_eq!(flag_value(&argv, "--scenario"), Some("boss.yaml"));
        assert!(has_flag(&argv, "--table"));
        assert_eq!(flag_value(&argv, "--limit"), None);
    }

    #[test]
    fn unknown_command_is_none() {
        assert_eq!(parse_command(&args(&["gambit", "simulate"])), None);
        assert_eq!(parse_command(&args(&["gambit", "party"])), Some(Command::Party));
    }
}
