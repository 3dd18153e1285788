//! Implied-volatility skew

use super::Outcome;
use crate::error::Undefined;
use crate::types::{median, ContractTable, OptionSide};

/// `median(PUT IV) / median(CALL IV)`
pub fn skew(table: &ContractTable) -> Outcome<f64> {
    if table.is_empty() {
        return Err(Undefined::EmptyInput);
    }

    let side_median = |side| median(table.side(side).map(|r| r.implied_volatility).collect());

    let call = side_median(OptionSide::Call).ok_or(Undefined::MissingSide(OptionSide::Call))?;
    if call == 0.0 {
        return Err(Undefined::ZeroCallSide);
    }
    let put = side_median(OptionSide::Put).ok_or(Undefined::MissingSide(OptionSide::Put))?;

    Ok(put / call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContractRow;
    use assert_matches::assert_matches;

    fn iv(side: OptionSide, value: f64) -> ContractRow {
        ContractRow::new(100.0, side).with_iv(value)
    }

    #[test]
    fn test_skew_ratio_of_medians() {
        let table = ContractTable::new(vec![
            iv(OptionSide::Call, 10.0),
            iv(OptionSide::Call, 12.0),
            iv(OptionSide::Call, 40.0),
            iv(OptionSide::Put, 15.0),
            iv(OptionSide::Put, 21.0),
        ]);
        // call median 12, put median 18
        assert!((skew(&table).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_skew_undefined_cases() {
        assert_matches!(skew(&ContractTable::default()), Err(Undefined::EmptyInput));

        let no_calls = ContractTable::new(vec![iv(OptionSide::Put, 15.0)]);
        assert_matches!(skew(&no_calls), Err(Undefined::MissingSide(OptionSide::Call)));

        let zero_calls = ContractTable::new(vec![iv(OptionSide::Call, 0.0), iv(OptionSide::Put, 15.0)]);
        assert_matches!(skew(&zero_calls), Err(Undefined::ZeroCallSide));

        let no_puts = ContractTable::new(vec![iv(OptionSide::Call, 11.0)]);
        assert_matches!(skew(&no_puts), Err(Undefined::MissingSide(OptionSide::Put)));
    }
}
