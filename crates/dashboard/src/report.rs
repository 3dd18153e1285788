//! Response payloads assembled by the orchestrator

use chrono::NaiveDate;
use market_data::analytics::{BucketsReport, LiveStrikeTotals, MaxPain, PcrChange};
use market_data::greeks::Greeks;
use market_data::OptionSide;
use serde::Serialize;
use std::collections::BTreeMap;

/// OI-change sums per side and their ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PcrChangeReport {
    #[serde(rename = "CE_OI_change")]
    pub call_change: i64,
    #[serde(rename = "PE_OI_change")]
    pub put_change: i64,
    #[serde(rename = "PCR_change")]
    pub ratio: Option<f64>,
}

impl From<PcrChange> for PcrChangeReport {
    fn from(change: PcrChange) -> Self {
        Self {
            call_change: change.call_change,
            put_change: change.put_change,
            ratio: change.ratio().ok(),
        }
    }
}

/// Max-pain winner and the writer payout at every candidate strike.
///
/// Strikes are keyed by their decimal text so the map is a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxPainReport {
    pub max_pain_strike: f64,
    pub pain_map: BTreeMap<String, f64>,
}

impl From<MaxPain> for MaxPainReport {
    fn from(mp: MaxPain) -> Self {
        Self {
            max_pain_strike: mp.strike,
            pain_map: mp
                .pain_by_strike
                .into_iter()
                .map(|(strike, pain)| (strike.0.to_string(), pain))
                .collect(),
        }
    }
}

/// `/window_stats` payload. Every undefined metric is `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    pub atm: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    /// Exclusion-mode OI ratio over the window
    pub pcr_window: Option<f64>,
    /// Exclusion-mode volume ratio over the window
    pub pcr_window_volume: Option<f64>,
    pub pcr_window_details: LiveStrikeTotals,
    pub pcr_buckets: Option<BucketsReport>,
    pub pcr_window_change: Option<PcrChangeReport>,
    /// Global-sum OI ratio over the whole chain
    pub pcr_overall: Option<f64>,
    pub vwap: BTreeMap<OptionSide, Option<f64>>,
    pub max_pain: Option<MaxPainReport>,
    pub skew: Option<f64>,
    pub prev_close: Option<f64>,
    pub avg_val: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WindowStats {
    /// All-null payload carrying the failure reason
    pub fn unavailable(error: impl ToString) -> Self {
        Self {
            atm: None,
            low: None,
            high: None,
            pcr_window: None,
            pcr_window_volume: None,
            pcr_window_details: LiveStrikeTotals::default(),
            pcr_buckets: None,
            pcr_window_change: None,
            pcr_overall: None,
            vwap: BTreeMap::new(),
            max_pain: None,
            skew: None,
            prev_close: None,
            avg_val: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreeksRow {
    pub expiry: NaiveDate,
    pub strike: f64,
    #[serde(rename = "optionType")]
    pub side: OptionSide,
    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: f64,
    #[serde(rename = "lastPrice")]
    pub last_price: f64,
    pub days_to_expiry: i64,
    #[serde(flatten)]
    pub greeks: Greeks,
}

/// `/greeks` payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreeksReport {
    pub spot: Option<f64>,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub rows: Vec<GreeksRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_data::types::StrikeKey;

    #[test]
    fn test_unavailable_shape() {
        let json = serde_json::to_value(WindowStats::unavailable("fetch failed")).unwrap();
        assert!(json["atm"].is_null());
        assert!(json["pcr_window"].is_null());
        assert_eq!(json["pcr_window_details"]["CE_OI"], 0);
        assert_eq!(json["vwap"], serde_json::json!({}));
        assert_eq!(json["error"], "fetch failed");
    }

    #[test]
    fn test_error_omitted_on_success() {
        let mut stats = WindowStats::unavailable("x");
        stats.error = None;
        let json = serde_json::to_value(stats).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_max_pain_report_keys() {
        let mp = MaxPain {
            strike: 100.0,
            pain_by_strike: [(100.0, 0.0), (150.0, 2500.0)]
                .into_iter()
                .map(|(k, v)| (StrikeKey::from(k), v))
                .collect(),
        };
        let json = serde_json::to_value(MaxPainReport::from(mp)).unwrap();
        assert_eq!(json["max_pain_strike"], 100.0);
        assert_eq!(json["pain_map"]["100"], 0.0);
        assert_eq!(json["pain_map"]["150"], 2500.0);
    }

    #[test]
    fn test_pcr_change_report() {
        let report = PcrChangeReport::from(PcrChange {
            call_change: 0,
            put_change: 12,
        });
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["PE_OI_change"], 12);
        assert!(json["PCR_change"].is_null());
    }
}
