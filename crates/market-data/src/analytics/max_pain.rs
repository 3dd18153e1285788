//! Max-pain strike: where option writers pay out the least at expiry

use std::collections::BTreeMap;

use super::Outcome;
use crate::error::Undefined;
use crate::types::{ContractTable, Metric, StrikeKey};

#[derive(Debug, Clone, PartialEq)]
pub struct MaxPain {
    /// Strike with the smallest total writer payout
    pub strike: f64,
    /// Writer payout for every candidate settlement strike
    pub pain_by_strike: BTreeMap<StrikeKey, f64>,
}

/// Evaluate `pain(s0) = Σ_s max(0, s0 − s)·CALL_OI(s) + max(0, s − s0)·PUT_OI(s)`
/// for every distinct strike `s0`.
///
/// Quadratic in the number of strikes. Ties resolve to the lowest strike.
pub fn max_pain(table: &ContractTable) -> Outcome<MaxPain> {
    let oi = table.totals_by_strike(Metric::OpenInterest);
    if oi.is_empty() {
        return Err(Undefined::EmptyInput);
    }

    let pain_by_strike: BTreeMap<StrikeKey, f64> = oi
        .keys()
        .map(|&settle| {
            let pain = oi
                .iter()
                .map(|(strike, totals)| {
                    let call_payout = (settle.0 - strike.0).max(0.0) * totals.call as f64;
                    let put_payout = (strike.0 - settle.0).max(0.0) * totals.put as f64;
                    call_payout + put_payout
                })
                .sum();
            (settle, pain)
        })
        .collect();

    let mut best: Option<(StrikeKey, f64)> = None;
    for (&strike, &pain) in &pain_by_strike {
        match best {
            Some((_, lowest)) if pain >= lowest => {}
            _ => best = Some((strike, pain)),
        }
    }

    let (strike, _) = best.ok_or(Undefined::EmptyInput)?;
    Ok(MaxPain {
        strike: strike.0,
        pain_by_strike,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContractRow, OptionSide};
    use assert_matches::assert_matches;
    use ordered_float::OrderedFloat;

    fn row(strike: f64, side: OptionSide, oi: u64) -> ContractRow {
        ContractRow::new(strike, side).with_open_interest(oi)
    }

    #[test]
    fn test_max_pain_minimizes_payout() {
        let table = ContractTable::new(vec![
            row(90.0, OptionSide::Call, 100),
            row(100.0, OptionSide::Call, 50),
            row(100.0, OptionSide::Put, 60),
            row(110.0, OptionSide::Put, 100),
        ]);

        let result = max_pain(&table).unwrap();
        assert_eq!(result.strike, 100.0);
        // settle at 100: calls at 90 pay 10*100, puts at 110 pay 10*100
        assert_eq!(result.pain_by_strike[&OrderedFloat(100.0)], 2000.0);

        let best = result.pain_by_strike[&OrderedFloat(result.strike)];
        assert!(result.pain_by_strike.values().all(|&p| best <= p));
    }

    #[test]
    fn test_single_strike() {
        let table = ContractTable::new(vec![row(250.0, OptionSide::Put, 9)]);
        let result = max_pain(&table).unwrap();
        assert_eq!(result.strike, 250.0);
        assert_eq!(result.pain_by_strike.len(), 1);
    }

    #[test]
    fn test_tie_breaks_to_lowest_strike() {
        // zero OI everywhere: every strike has zero pain
        let table = ContractTable::new(vec![
            row(300.0, OptionSide::Call, 0),
            row(200.0, OptionSide::Put, 0),
            row(100.0, OptionSide::Call, 0),
        ]);
        assert_eq!(max_pain(&table).unwrap().strike, 100.0);
    }

    #[test]
    fn test_empty_table() {
        assert_matches!(max_pain(&ContractTable::default()), Err(Undefined::EmptyInput));
    }
}
