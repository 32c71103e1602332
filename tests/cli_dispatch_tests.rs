use std::fs;
use std::process::{Command, Output};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_gambit")
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("GAMBIT_DATA_DIR")
        .env_remove("GAMBIT_WORKERS")
        .output()
        .expect("gambit should run")
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9
}

#[test]
fn missing_command_prints_usage() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: gambit"));
}

#[test]
fn optimize_command_emits_ranked_json() {
    let output = run(&["optimize", "basch", "--all-licenses", "--limit", "4"]);
    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("optimize should emit json");
    let rows = payload.as_array().expect("array of results");
    assert_eq!(rows.len(), 4);
    assert!(rows[0]["loadout"]["weapon"].is_string());
    assert!(rows[0]["damage"]["dps"].is_number());
}

#[test]
fn optimize_command_rejects_unknown_character() {
    let output = run(&["optimize", "Gilgamesh"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown character"));
}

#[test]
fn optimize_command_reads_scenario_and_ownership_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scenario = dir.path().join("scenario.json");
    let ownership = dir.path().join("ownership.yaml");
    fs::write(&scenario, r#"{"level": 50}"#).expect("write scenario");
    fs::write(&ownership, "characters:\n  Vaan:\n    licenses: [Swords 1]\n")
        .expect("write ownership");

    let output = run(&[
        "optimize",
        "Vaan",
        "--scenario",
        scenario.to_str().expect("utf-8 path"),
        "--ownership",
        ownership.to_str().expect("utf-8 path"),
        "--limit",
        "1",
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(payload[0]["loadout"]["weapon"], "Broadsword");
}

#[test]
fn calculate_command_matches_server_shape() {
    let output = run(&["calculate", "Basch", "Broadsword"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(payload["character"], "Basch");
    let damage = &payload["damage"];
    let combo = damage["combo_damage"].as_f64().expect("combo");
    let cycle = damage["charge_time"].as_f64().expect("charge")
        + damage["animation_time"].as_f64().expect("animation");
    assert!(approx_eq(damage["dps"].as_f64().expect("dps"), combo / cycle));
}

#[test]
fn calculate_command_reports_unknown_items() {
    let output = run(&["calculate", "Basch", "Broadsword", "--helm", "Paper Hat"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown helm 'Paper Hat'"));
}

#[test]
fn validate_command_passes_builtin_catalog() {
    let output = run(&["validate"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn validate_command_fails_on_unknown_field() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("weapons.yaml"),
        "items:\n  - name: Unarmed\n  - name: Odd Blade\n    license: Swords 1\n    sharpness: 4\n",
    )
    .expect("write weapons");

    let output = run(&["validate", dir.path().to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sharpness"), "{stderr}");
    assert!(stderr.contains("validation failed"), "{stderr}");
}

#[test]
fn export_command_writes_csv_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("fran.csv");
    let output = run(&[
        "export",
        "Fran",
        "--all-licenses",
        "--limit",
        "10",
        "--out",
        out.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let csv = fs::read_to_string(&out).expect("csv written");
    let mut lines = csv.lines();
    assert!(lines.next().is_some_and(|header| header.starts_with("rank,dps,weapon")));
    assert_eq!(lines.count(), 10);
}

#[test]
fn party_command_rejects_invalid_worker_count() {
    let output = run(&["party", "--workers", "many"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid --workers 'many'"));
    assert!(output.stdout.is_empty());
}

#[test]
fn party_command_reports_every_character() {
    let output = run(&["party", "--limit", "1", "--workers", "2"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let party = payload.as_array().expect("array");
    assert_eq!(party.len(), 6);
    assert!(party.iter().all(|entry| entry["error"].is_null()));
}
