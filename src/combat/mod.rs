pub mod compose;
pub mod engine;
pub mod profile;
pub mod scenario;

pub use compose::{compose, ComposeError};
pub use engine::{calculate, DamageResult};
pub use profile::{
    AnimationClass, AttributeProfile, Boons, DamageFormula, Element, ElementAffinity, Elemental,
};
pub use scenario::{BattleSpeed, BuffToggles, Reaction, ScenarioParameters};
