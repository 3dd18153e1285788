//! Volume-weighted average price per side

use std::collections::BTreeMap;

use super::Outcome;
use crate::error::Undefined;
use crate::types::{ContractTable, OptionSide};

/// `Σ(lastPrice · volume) / Σ volume` for each side present in `table`.
///
/// A side with rows but zero traded volume has no value; a side with no
/// rows is absent from the map, so an empty table yields an empty map.
pub fn vwap(table: &ContractTable) -> BTreeMap<OptionSide, Outcome<f64>> {
    let mut sums: BTreeMap<OptionSide, (f64, u64)> = BTreeMap::new();
    for row in table.iter() {
        let entry = sums.entry(row.side).or_insert((0.0, 0));
        entry.0 += row.last_price * row.volume as f64;
        entry.1 += row.volume;
    }

    sums.into_iter()
        .map(|(side, (pv, volume))| {
            let value = if volume == 0 {
                Err(Undefined::MissingSide(side))
            } else {
                Ok(pv / volume as f64)
            };
            (side, value)
        })
        .collect()
}
