//! ATM / ITM / OTM bucketing of a window table

use serde::Serialize;

use super::Outcome;
use crate::error::Undefined;
use crate::types::{ContractRow, ContractTable, OptionSide};

/// Display marker for a side with no rows in a bucket
pub const NO_DATA: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Moneyness {
    Atm,
    Itm,
    Otm,
}

/// Classify one leg against the ATM strike
pub fn classify(strike: f64, side: OptionSide, atm: f64) -> Moneyness {
    if strike == atm {
        return Moneyness::Atm;
    }
    match (strike < atm, side) {
        (true, OptionSide::Call) | (false, OptionSide::Put) => Moneyness::Itm,
        _ => Moneyness::Otm,
    }
}

/// Inclusive strike span observed on one side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeSpan {
    pub min: f64,
    pub max: f64,
}

impl StrikeSpan {
    fn extend(span: Option<Self>, strike: f64) -> Option<Self> {
        Some(match span {
            None => Self { min: strike, max: strike },
            Some(s) => Self {
                min: s.min.min(strike),
                max: s.max.max(strike),
            },
        })
    }

    /// `"min-max"`
    pub fn label(&self) -> String {
        format!("{}-{}", strike_label(self.min), strike_label(self.max))
    }
}

fn strike_label(strike: f64) -> String {
    if strike.fract() == 0.0 {
        format!("{}", strike as i64)
    } else {
        strike.to_string()
    }
}

/// Accumulated sums for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub call_oi: u64,
    pub put_oi: u64,
    pub call_volume: u64,
    pub put_volume: u64,
    pub call_oi_change: i64,
    pub put_oi_change: i64,
    pub call_strikes: Option<StrikeSpan>,
    pub put_strikes: Option<StrikeSpan>,
}

impl Bucket {
    fn add(&mut self, row: &ContractRow) {
        match row.side {
            OptionSide::Call => {
                self.call_oi += row.open_interest;
                self.call_volume += row.volume;
                self.call_oi_change += row.open_interest_change;
                self.call_strikes = StrikeSpan::extend(self.call_strikes, row.strike);
            }
            OptionSide::Put => {
                self.put_oi += row.open_interest;
                self.put_volume += row.volume;
                self.put_oi_change += row.open_interest_change;
                self.put_strikes = StrikeSpan::extend(self.put_strikes, row.strike);
            }
        }
    }

    /// `PUT_OI / CALL_OI`
    pub fn pcr(&self) -> Outcome<f64> {
        if self.call_oi == 0 {
            return Err(Undefined::ZeroCallSide);
        }
        Ok(self.put_oi as f64 / self.call_oi as f64)
    }

    pub fn call_range(&self) -> String {
        self.call_strikes
            .map_or_else(|| NO_DATA.to_string(), |s| s.label())
    }

    pub fn put_range(&self) -> String {
        self.put_strikes
            .map_or_else(|| NO_DATA.to_string(), |s| s.label())
    }

    pub fn report(&self) -> BucketReport {
        BucketReport {
            call_oi: self.call_oi,
            put_oi: self.put_oi,
            call_volume: self.call_volume,
            put_volume: self.put_volume,
            call_oi_change: self.call_oi_change,
            put_oi_change: self.put_oi_change,
            call_range: self.call_range(),
            put_range: self.put_range(),
            pcr: self.pcr().ok(),
        }
    }
}

/// Wire form of a [`Bucket`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketReport {
    #[serde(rename = "CE_OI")]
    pub call_oi: u64,
    #[serde(rename = "PE_OI")]
    pub put_oi: u64,
    #[serde(rename = "CE_vol")]
    pub call_volume: u64,
    #[serde(rename = "PE_vol")]
    pub put_volume: u64,
    #[serde(rename = "CE_OI_change")]
    pub call_oi_change: i64,
    #[serde(rename = "PE_OI_change")]
    pub put_oi_change: i64,
    #[serde(rename = "CE_range")]
    pub call_range: String,
    #[serde(rename = "PE_range")]
    pub put_range: String,
    #[serde(rename = "PCR")]
    pub pcr: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Buckets {
    pub atm: Bucket,
    pub itm: Bucket,
    pub otm: Bucket,
    pub total: Bucket,
}

impl Buckets {
    pub fn get(&self, moneyness: Moneyness) -> &Bucket {
        match moneyness {
            Moneyness::Atm => &self.atm,
            Moneyness::Itm => &self.itm,
            Moneyness::Otm => &self.otm,
        }
    }

    fn get_mut(&mut self, moneyness: Moneyness) -> &mut Bucket {
        match moneyness {
            Moneyness::Atm => &mut self.atm,
            Moneyness::Itm => &mut self.itm,
            Moneyness::Otm => &mut self.otm,
        }
    }

    pub fn report(&self) -> BucketsReport {
        BucketsReport {
            atm: self.atm.report(),
            itm: self.itm.report(),
            otm: self.otm.report(),
            total: self.total.report(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct BucketsReport {
    pub atm: BucketReport,
    pub itm: BucketReport,
    pub otm: BucketReport,
    pub total: BucketReport,
}

/// Every row lands in exactly one of ATM/ITM/OTM, and always in TOTAL
pub fn bucket_by_moneyness(table: &ContractTable, atm: f64) -> Buckets {
    let mut buckets = Buckets::default();
    for row in table.iter() {
        buckets.total.add(row);
        buckets.get_mut(classify(row.strike, row.side, atm)).add(row);
    }
    buckets
}
