use serde::Serialize;

use crate::combat::engine::DamageResult;
use crate::optimizer::loadout::Loadout;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedResult<'a> {
    pub loadout: Loadout<'a>,
    pub damage: DamageResult,
}

/// Best DPS first. The sort is stable, so equal DPS keeps discovery order.
pub fn rank_results(mut results: Vec<RankedResult<'_>>) -> Vec<RankedResult<'_>> {
    results.sort_by(|left, right| right.damage.dps.total_cmp(&left.damage.dps));
    results
}
