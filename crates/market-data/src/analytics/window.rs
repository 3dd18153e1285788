//! ATM strike and strike-window resolution

use serde::{Deserialize, Serialize};

use super::Outcome;
use crate::error::Undefined;

/// Strike granularity of the index chain
pub const DEFAULT_STRIKE_STEP: f64 = 50.0;

/// Points below ATM covered by the fixed window
pub const FIXED_WINDOW_BELOW: f64 = 500.0;

/// Points above ATM covered by the fixed window.
///
/// Deliberately one step wider than [`FIXED_WINDOW_BELOW`].
pub const FIXED_WINDOW_ABOVE: f64 = 550.0;

/// How the analysis window around ATM is sized
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowPolicy {
    /// Fixed point offsets: `[atm - below, atm + above]`
    Fixed { below: f64, above: f64 },
    /// `k` strikes either side: `[atm - k*step, atm + k*step]`
    StrikeCount(u32),
}

impl WindowPolicy {
    pub fn fixed() -> Self {
        WindowPolicy::Fixed {
            below: FIXED_WINDOW_BELOW,
            above: FIXED_WINDOW_ABOVE,
        }
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Resolved ATM strike and inclusive window bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmWindow {
    pub atm: f64,
    pub low: f64,
    pub high: f64,
}

/// Nearest multiple of `step`, halves rounding away from zero
pub fn round_to_strike(spot: f64, step: f64) -> f64 {
    (spot / step).round() * step
}

pub fn resolve_window(spot: Option<f64>, step: f64, policy: WindowPolicy) -> Outcome<AtmWindow> {
    if !(step.is_finite() && step > 0.0) {
        return Err(Undefined::InvalidStep);
    }
    let spot = spot.filter(|s| s.is_finite()).ok_or(Undefined::NoSpot)?;

    let atm = round_to_strike(spot, step);
    let (low, high) = match policy {
        WindowPolicy::Fixed { below, above } => (atm - below, atm + above),
        WindowPolicy::StrikeCount(k) => {
            let span = k as f64 * step;
            (atm - span, atm + span)
        }
    };

    Ok(AtmWindow { atm, low, high })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_round_to_strike() {
        assert_eq!(round_to_strike(10023.0, 50.0), 10000.0);
        assert_eq!(round_to_strike(10025.0, 50.0), 10050.0);
        assert_eq!(round_to_strike(10074.9, 50.0), 10050.0);
        assert_eq!(round_to_strike(105.0, 50.0), 100.0);
    }

    #[test]
    fn test_fixed_window_is_asymmetric() {
        let w = resolve_window(Some(10010.0), 50.0, WindowPolicy::fixed()).unwrap();
        assert_eq!(w, AtmWindow { atm: 10000.0, low: 9500.0, high: 10550.0 });
    }

    #[test]
    fn test_strike_count_window() {
        let w = resolve_window(Some(25012.0), 50.0, WindowPolicy::StrikeCount(3)).unwrap();
        assert_eq!(w, AtmWindow { atm: 25000.0, low: 24850.0, high: 25150.0 });
    }

    #[test]
    fn test_no_spot() {
        assert_matches!(resolve_window(None, 50.0, WindowPolicy::fixed()), Err(Undefined::NoSpot));
        assert_matches!(
            resolve_window(Some(100.0), 0.0, WindowPolicy::fixed()),
            Err(Undefined::InvalidStep)
        );
    }
}
