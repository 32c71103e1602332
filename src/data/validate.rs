use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

use crate::combat::profile::{AnimationClass, DamageFormula};
use crate::data::item::{FieldKind, Item, LicenseRef, Modifier, ModifierField, ModifierValue, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.diagnostics.extend(other.diagnostics);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diag in &self.diagnostics {
            writeln!(f, "{diag}")?;
        }
        Ok(())
    }
}

/// Convert one raw catalog row into a typed [Item], checking every key against the field table.
///
/// Returns `None` only when the row is unusable (empty name). Rejected modifiers are dropped
/// and reported as errors, so callers must consult the report before trusting the catalog.
pub fn parse_item(
    report: &mut ValidationReport,
    slot: Slot,
    index: usize,
    name: &str,
    license: Option<&str>,
    fits: Option<AnimationClass>,
    fields: &BTreeMap<String, Value>,
) -> Option<Item> {
    let context = format!("{slot}[{index}] '{name}'");
    if name.trim().is_empty() {
        report.push(ValidationSeverity::Error, context, "missing non-empty 'name'");
        return None;
    }

    let mut item = Item::new(name.trim());
    match license.map(str::trim) {
        Some("") => report.push(
            ValidationSeverity::Error,
            format!("{context}.license"),
            "license reference is empty",
        ),
        Some(license) => item.license = Some(LicenseRef::new(license)),
        None => {}
    }

    if fits.is_some() && slot != Slot::Ammo {
        report.push(
            ValidationSeverity::Warning,
            format!("{context}.fits"),
            "'fits' only applies to ammunition and is ignored here",
        );
    } else if let Some(class) = fits {
        if !class.uses_ammo() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.fits"),
                format!("{} weapons do not take ammunition", class.label()),
            );
        }
        item.fits = Some(class);
    }

    for (key, raw) in fields {
        let field_context = format!("{context}.{key}");
        let Some(field) = ModifierField::from_key(key) else {
            report.push(ValidationSeverity::Error, field_context, "unknown modifier field");
            continue;
        };
        if field.is_weapon_only() && slot != Slot::Weapon {
            report.push(
                ValidationSeverity::Error,
                field_context,
                format!("only weapons may define {field}"),
            );
            continue;
        }
        let value = match convert_value(field.kind(), raw) {
            Ok(value) => value,
            Err(found) => {
                report.push(
                    ValidationSeverity::Error,
                    field_context,
                    format!("expected a {}, found {found}", field.kind()),
                );
                continue;
            }
        };
        if value == ModifierValue::Flag(false) {
            report.push(
                ValidationSeverity::Info,
                field_context,
                "false grants nothing; the key can be removed",
            );
        }
        item.modifiers.push(Modifier::new(field, value));
    }

    Some(item)
}

fn convert_value(kind: FieldKind, raw: &Value) -> Result<ModifierValue, String> {
    match (kind, raw) {
        (FieldKind::Numeric, Value::Number(number)) => number
            .as_f64()
            .filter(|value| value.is_finite())
            .map(ModifierValue::Number)
            .ok_or_else(|| format!("non-finite number {number}")),
        (FieldKind::Flag, Value::Bool(granted)) => Ok(ModifierValue::Flag(*granted)),
        (FieldKind::Formula, Value::String(_)) => {
            serde_yaml::from_value::<DamageFormula>(raw.clone())
                .map(ModifierValue::Formula)
                .map_err(|_| format!("unknown damage formula {}", describe(raw)))
        }
        (FieldKind::Animation, Value::String(_)) => {
            serde_yaml::from_value::<AnimationClass>(raw.clone())
                .map(ModifierValue::Animation)
                .map_err(|_| format!("unknown animation class {}", describe(raw)))
        }
        (_, other) => Err(describe(other)),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => format!("boolean {flag}"),
        Value::Number(number) => format!("number {number}"),
        Value::String(text) => format!("string '{text}'"),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(_) => "a tagged value".to_string(),
    }
}

/// Whole-slot checks that need every row: duplicate names and the licenseless baseline weapon.
pub fn validate_slot(report: &mut ValidationReport, slot: Slot, items: &[Item]) {
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        if !seen.insert(item.name.as_str()) {
            report.push(
                ValidationSeverity::Error,
                format!("{slot}[{index}] '{}'", item.name),
                "duplicate item name",
            );
        }
    }

    if slot == Slot::Weapon && !items.iter().any(|item| item.license.is_none()) {
        report.push(
            ValidationSeverity::Error,
            slot.as_str(),
            "no licenseless baseline weapon; some characters would have nothing to equip",
        );
    }
}
