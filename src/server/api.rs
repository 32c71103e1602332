use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::compose::{compose, ComposeError};
use crate::combat::engine::{calculate, DamageResult};
use crate::combat::scenario::ScenarioParameters;
use crate::data::character::{Character, LicensedAbilities};
use crate::data::item::{Item, Slot};
use crate::data::ownership::{CharacterLicenses, CharacterOwnership, OwnershipSnapshot};
use crate::data::settings::{validate_scenario, ReferenceData, SettingsError};
use crate::optimizer::{optimize, optimize_party, Loadout, OptimizeError, OptimizeOptions};
use crate::parallel::WorkerPool;

const DEFAULT_RESULT_LIMIT: usize = 25;
const MAX_RESULT_LIMIT: usize = 1000;

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data: ReferenceData,
    pub pool: WorkerPool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationErrorResponse {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            status: "error",
            message: "Validation failed",
            errors,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid request")]
    Validation(ValidationErrorResponse),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    #[error("worker pool unavailable: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

fn encode<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(payload).map_err(ApiError::Encode)
}

fn parse<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(ApiError::Parse)
}

pub fn health_payload(state: &AppState) -> Result<String, ApiError> {
    encode(&serde_json::json!({
        "status": "ok",
        "service": "gambit-api",
        "version": env!("CARGO_PKG_VERSION"),
        "data_version": state.data.catalog.data_version,
    }))
}

pub fn characters_payload(state: &AppState) -> Result<String, ApiError> {
    encode(&serde_json::json!({ "characters": state.data.roster.characters() }))
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentListItem<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<&'a str>,
    pub summary: String,
}

pub fn equipment_payload(state: &AppState) -> Result<String, ApiError> {
    let mut slots = serde_json::Map::new();
    for slot in Slot::ALL {
        let items: Vec<EquipmentListItem<'_>> = state
            .data
            .catalog
            .slot(slot)
            .iter()
            .map(|item| EquipmentListItem {
                name: &item.name,
                license: item.license.as_ref().map(|license| license.as_str()),
                summary: item.summary(),
            })
            .collect();
        let items = serde_json::to_value(items).map_err(ApiError::Encode)?;
        slots.insert(slot.as_str().to_string(), items);
    }
    encode(&serde_json::json!({ "equipment": slots }))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadoutRequest {
    pub weapon: String,
    pub ammo: Option<String>,
    pub helm: Option<String>,
    pub armor: Option<String>,
    pub accessory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    pub character: String,
    pub loadout: LoadoutRequest,
    #[serde(default)]
    pub scenario: ScenarioParameters,
    #[serde(default)]
    pub abilities: LicensedAbilities,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculateResponse<'a> {
    pub status: &'static str,
    pub character: &'a str,
    pub loadout: Loadout<'a>,
    pub damage: DamageResult,
}

pub fn calculate_payload(body: &str, state: &AppState) -> Result<String, ApiError> {
    let request: CalculateRequest = parse(body)?;
    let mut issues = Vec::new();
    let character = lookup_character(state, &request.character, &mut issues);
    check_scenario(&request.scenario, &mut issues);
    let loadout = resolve_loadout(state, &request.loadout, &mut issues);
    let (Some(character), Some(loadout), true) = (character, loadout, issues.is_empty()) else {
        return Err(ApiError::Validation(ValidationErrorResponse::from_issues(issues)));
    };

    let character = character
        .clone()
        .with_abilities(character.abilities.union(request.abilities));
    let profile = compose(&character.base_profile(&request.scenario), loadout.equipped())?;
    encode(&CalculateResponse {
        status: "ok",
        character: &character.name,
        loadout,
        damage: calculate(&profile, &request.scenario),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRequest {
    pub character: String,
    #[serde(default)]
    pub scenario: ScenarioParameters,
    /// Owned licenses and abilities. Omitted means only licenseless items.
    #[serde(default)]
    pub ownership: CharacterLicenses,
    #[serde(default)]
    pub all_licenses: bool,
    pub limit: Option<usize>,
    pub collapse_equivalent: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedRow<'a> {
    pub rank: usize,
    pub loadout: Loadout<'a>,
    pub damage: DamageResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResponse<'a> {
    pub status: &'static str,
    pub character: &'a str,
    pub returned: usize,
    pub results: Vec<RankedRow<'a>>,
}

pub fn optimize_payload(body: &str, state: &AppState) -> Result<String, ApiError> {
    let request: OptimizeRequest = parse(body)?;
    let mut issues = Vec::new();
    let character = lookup_character(state, &request.character, &mut issues);
    check_scenario(&request.scenario, &mut issues);
    let options = options_from(request.limit, request.collapse_equivalent, &mut issues);
    let (Some(character), true) = (character, issues.is_empty()) else {
        return Err(ApiError::Validation(ValidationErrorResponse::from_issues(issues)));
    };

    let character = character
        .clone()
        .with_abilities(character.abilities.union(request.ownership.abilities));
    let ownership = if request.all_licenses {
        CharacterOwnership::All
    } else {
        CharacterOwnership::Owned(&request.ownership.licenses)
    };
    let ranked = optimize(
        &character,
        &request.scenario,
        &state.data.catalog,
        &ownership,
        &options,
    )?;
    let results: Vec<RankedRow<'_>> = ranked
        .into_iter()
        .enumerate()
        .map(|(position, row)| RankedRow {
            rank: position + 1,
            loadout: row.loadout,
            damage: row.damage,
        })
        .collect();
    encode(&OptimizeResponse {
        status: "ok",
        character: &character.name,
        returned: results.len(),
        results,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartyRequest {
    pub scenario: ScenarioParameters,
    pub ownership: OwnershipSnapshot,
    pub limit: Option<usize>,
    pub collapse_equivalent: Option<bool>,
}

pub fn optimize_party_payload(body: &str, state: &AppState) -> Result<String, ApiError> {
    let request: PartyRequest = if body.trim().is_empty() {
        PartyRequest::default()
    } else {
        parse(body)?
    };
    let mut issues = Vec::new();
    check_scenario(&request.scenario, &mut issues);
    let options = options_from(request.limit, request.collapse_equivalent, &mut issues);
    if !issues.is_empty() {
        return Err(ApiError::Validation(ValidationErrorResponse::from_issues(issues)));
    }

    let outcomes = optimize_party(
        state.data.roster.characters(),
        &request.scenario,
        &state.data.catalog,
        &request.ownership,
        &options,
        &state.pool,
    )?;
    let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
    encode(&serde_json::json!({
        "status": if failed == 0 { "ok" } else { "partial" },
        "failed": failed,
        "party": outcomes,
    }))
}

fn lookup_character<'s>(
    state: &'s AppState,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<&'s Character> {
    let found = state.data.roster.find(key.trim());
    if found.is_none() {
        issues.push(ValidationIssue {
            field: "character".to_string(),
            messages: vec![format!("unknown character '{key}'")],
        });
    }
    found
}

fn check_scenario(scenario: &ScenarioParameters, issues: &mut Vec<ValidationIssue>) {
    if let Err(SettingsError::OutOfRange {
        field,
        value,
        min,
        max,
    }) = validate_scenario(scenario)
    {
        issues.push(ValidationIssue {
            field: format!("scenario.{field}"),
            messages: vec![format!("{value} is outside {min}..={max}")],
        });
    }
}

fn options_from(
    limit: Option<usize>,
    collapse_equivalent: Option<bool>,
    issues: &mut Vec<ValidationIssue>,
) -> OptimizeOptions {
    let limit = limit.unwrap_or(DEFAULT_RESULT_LIMIT);
    if !(1..=MAX_RESULT_LIMIT).contains(&limit) {
        issues.push(ValidationIssue {
            field: "limit".to_string(),
            messages: vec![format!("must be between 1 and {MAX_RESULT_LIMIT}")],
        });
    }
    OptimizeOptions {
        limit: Some(limit),
        collapse_equivalent: collapse_equivalent.unwrap_or(true),
    }
}

fn resolve_loadout<'s>(
    state: &'s AppState,
    request: &LoadoutRequest,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Loadout<'s>> {
    let mut lookup = |slot: Slot, name: Option<&str>| -> Option<&'s Item> {
        let name = name?.trim();
        let item = state.data.catalog.find(slot, name);
        if item.is_none() {
            issues.push(ValidationIssue {
                field: format!("loadout.{slot}"),
                messages: vec![format!("unknown {slot} '{name}'")],
            });
        }
        item
    };
    let weapon = lookup(Slot::Weapon, Some(request.weapon.as_str()));
    let ammo = lookup(Slot::Ammo, request.ammo.as_deref());
    let helm = lookup(Slot::Helm, request.helm.as_deref());
    let armor = lookup(Slot::Armor, request.armor.as_deref());
    let accessory = lookup(Slot::Accessory, request.accessory.as_deref());
    Some(Loadout {
        weapon: weapon?,
        ammo,
        helm,
        armor,
        accessory,
    })
}
