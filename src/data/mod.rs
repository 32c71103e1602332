pub mod catalog;
pub mod character;
pub mod item;
pub mod ownership;
pub mod pool;
pub mod settings;
pub mod validate;

pub use catalog::{CatalogError, EquipmentCatalog};
pub use character::{Character, LicensedAbilities, Roster, RosterError};
pub use item::{
    FieldKind, Item, LicenseRef, Modifier, ModifierField, ModifierValue, Slot, FIELD_TABLE,
};
pub use ownership::{
    AllLicenses, CharacterOwnership, LicenseOwnership, NoLicenses, OwnershipSnapshot,
};
pub use pool::available_items;
pub use settings::{ReferenceData, Settings, SettingsError};
pub use validate::{ValidationDiagnostic, ValidationReport, ValidationSeverity};
