//! Whole-party optimization. Each character's pass is independent and shares only the
//! read-only catalog and ownership snapshot, so passes run in parallel on a rayon pool.

use rayon::prelude::*;
use rayon::ThreadPoolBuildError;
use serde::Serialize;
use tracing::{debug, error};

use crate::combat::scenario::ScenarioParameters;
use crate::data::catalog::EquipmentCatalog;
use crate::data::character::Character;
use crate::data::ownership::OwnershipSnapshot;
use crate::optimizer::{optimize, OptimizeError, OptimizeOptions, RankedResult};
use crate::parallel::WorkerPool;

/// One character's outcome. A failure here never affects the other characters.
#[derive(Debug, Clone)]
pub struct PartyOutcome<'a> {
    pub index: usize,
    pub character: String,
    pub result: Result<Vec<RankedResult<'a>>, OptimizeError>,
}

impl PartyOutcome<'_> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl Serialize for PartyOutcome<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("PartyOutcome", 4)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("character", &self.character)?;
        match &self.result {
            Ok(results) => {
                state.serialize_field("results", results)?;
                state.serialize_field("error", &Option::<String>::None)?;
            }
            Err(err) => {
                state.serialize_field("results", &Vec::<RankedResult<'_>>::new())?;
                state.serialize_field("error", &Some(err.to_string()))?;
            }
        }
        state.end()
    }
}

/// Optimize every character in `party` against the same scenario, in roster order.
pub fn optimize_party<'a>(
    party: &[Character],
    scenario: &ScenarioParameters,
    catalog: &'a EquipmentCatalog,
    ownership: &OwnershipSnapshot,
    options: &OptimizeOptions,
    pool: &WorkerPool,
) -> Result<Vec<PartyOutcome<'a>>, ThreadPoolBuildError> {
    debug!(characters = party.len(), workers = pool.workers, "optimizing party");
    pool.install(|| {
        party
            .par_iter()
            .map(|member| {
                let character = ownership.resolve(member);
                let owned = ownership.for_character(&character.name);
                let result = optimize(&character, scenario, catalog, &owned, options);
                if let Err(err) = &result {
                    error!(
                        character = %character.name,
                        error = %err,
                        "character optimization failed"
                    );
                }
                PartyOutcome {
                    index: character.index,
                    character: character.name,
                    result,
                }
            })
            .collect()
    })
}
