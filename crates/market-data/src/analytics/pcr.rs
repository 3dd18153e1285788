//! Put/Call ratio in its two modes, plus the OI-change ratio

use serde::Serialize;

use super::Outcome;
use crate::error::Undefined;
use crate::types::{ContractTable, Metric, OptionSide, StrikeFilter};

/// Global-sum PCR: `Σ PUT.metric / Σ CALL.metric` over rows passing `filter`.
///
/// Strikes with liquidity on one side only still count here; use
/// [`pcr_excluding_zero`] when they should not.
pub fn pcr_global(table: &ContractTable, metric: Metric, filter: StrikeFilter) -> Outcome<f64> {
    let mut call = 0u64;
    let mut put = 0u64;
    let mut seen = false;

    for row in table.iter().filter(|r| filter.contains(r.strike)) {
        seen = true;
        match row.side {
            OptionSide::Call => call += metric.of(row),
            OptionSide::Put => put += metric.of(row),
        }
    }

    if !seen {
        return Err(Undefined::EmptyInput);
    }
    if call == 0 {
        return Err(Undefined::ZeroCallSide);
    }
    Ok(put as f64 / call as f64)
}

/// Per-strike exclusion PCR.
///
/// Rows are grouped by strike; a strike only counts when both its CALL and
/// PUT totals are non-zero. The ratio is taken over the surviving strikes.
pub fn pcr_excluding_zero(
    table: &ContractTable,
    metric: Metric,
    filter: StrikeFilter,
) -> Outcome<f64> {
    let scoped = table.filtered(filter);
    if scoped.is_empty() {
        return Err(Undefined::EmptyInput);
    }

    let (call, put) = scoped
        .totals_by_strike(metric)
        .values()
        .filter(|t| t.is_live())
        .fold((0u64, 0u64), |(c, p), t| (c + t.call, p + t.put));

    if call == 0 && put == 0 {
        return Err(Undefined::NoLiveStrikes);
    }
    if call == 0 {
        return Err(Undefined::ZeroCallSide);
    }
    Ok(put as f64 / call as f64)
}

/// OI and volume totals over the strikes that survive the exclusion rule.
///
/// Survival is decided on open interest; volume totals use the same strikes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LiveStrikeTotals {
    #[serde(rename = "CE_OI")]
    pub call_oi: u64,
    #[serde(rename = "PE_OI")]
    pub put_oi: u64,
    #[serde(rename = "CE_vol")]
    pub call_volume: u64,
    #[serde(rename = "PE_vol")]
    pub put_volume: u64,
}

pub fn live_strike_totals(table: &ContractTable, filter: StrikeFilter) -> LiveStrikeTotals {
    let scoped = table.filtered(filter);
    let oi = scoped.totals_by_strike(Metric::OpenInterest);
    let volume = scoped.totals_by_strike(Metric::Volume);

    let mut totals = LiveStrikeTotals::default();
    for (strike, oi_totals) in oi.iter().filter(|(_, t)| t.is_live()) {
        totals.call_oi += oi_totals.call;
        totals.put_oi += oi_totals.put;
        if let Some(v) = volume.get(strike) {
            totals.call_volume += v.call;
            totals.put_volume += v.put;
        }
    }
    totals
}

/// Summed open-interest change per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PcrChange {
    pub call_change: i64,
    pub put_change: i64,
}

impl PcrChange {
    /// `Σ PUT change / Σ CALL change`; undefined when the CALL sum is zero
    pub fn ratio(&self) -> Outcome<f64> {
        if self.call_change == 0 {
            return Err(Undefined::ZeroCallSide);
        }
        Ok(self.put_change as f64 / self.call_change as f64)
    }
}

/// Sum OI change per side over every row of `table` (no strike filter)
pub fn pcr_change(table: &ContractTable) -> PcrChange {
    table.iter().fold(PcrChange::default(), |mut acc, row| {
        match row.side {
            OptionSide::Call => acc.call_change += row.open_interest_change,
            OptionSide::Put => acc.put_change += row.open_interest_change,
        }
        acc
    })
}
