//! Black-Scholes pricing and Greeks with a continuous dividend yield
//!
//! Theta is quoted per calendar day. Expired or zero-volatility contracts
//! fall back to intrinsic-value conventions instead of dividing by zero.

use serde::Serialize;
use std::f64::consts::PI;

use crate::types::{ContractRow, OptionSide};

pub const DAYS_PER_YEAR: f64 = 365.0;

/// Inputs for one contract
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsInputs {
    pub spot: f64,
    pub strike: f64,
    /// Years to expiry
    pub time: f64,
    /// Annualized volatility as a fraction (0.15 = 15%)
    pub vol: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    pub side: OptionSide,
}

impl BsInputs {
    fn is_degenerate(&self) -> bool {
        self.time <= 0.0 || self.vol <= 0.0 || self.spot <= 0.0 || self.strike <= 0.0
    }

    fn d1_d2(&self) -> (f64, f64) {
        let sqrt_t = self.time.sqrt();
        let d1 = ((self.spot / self.strike).ln()
            + (self.rate - self.dividend_yield + 0.5 * self.vol * self.vol) * self.time)
            / (self.vol * sqrt_t);
        (d1, d1 - self.vol * sqrt_t)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Greeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    /// Per calendar day
    pub theta: f64,
}

pub fn norm_pdf(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-0.5 * x * x).exp()
}

/// Abramowitz-Stegun 26.2.17, absolute error below 7.5e-8
pub fn norm_cdf(x: f64) -> f64 {
    let k = 1.0 / (1.0 + 0.2316419 * x.abs());
    let poly = k
        * (0.319381530
            + k * (-0.356563782 + k * (1.781477937 + k * (-1.821255978 + k * 1.330274429))));

    let approx = 1.0 - norm_pdf(x) * poly;

    if x >= 0.0 {
        approx
    } else {
        1.0 - approx
    }
}

pub fn intrinsic_value(spot: f64, strike: f64, side: OptionSide) -> f64 {
    match side {
        OptionSide::Call => (spot - strike).max(0.0),
        OptionSide::Put => (strike - spot).max(0.0),
    }
}

pub fn black_scholes_price(input: &BsInputs) -> f64 {
    if input.is_degenerate() {
        return intrinsic_value(input.spot, input.strike, input.side);
    }

    let (d1, d2) = input.d1_d2();
    let disc_q = (-input.dividend_yield * input.time).exp();
    let disc_r = (-input.rate * input.time).exp();

    match input.side {
        OptionSide::Call => input.spot * disc_q * norm_cdf(d1) - input.strike * disc_r * norm_cdf(d2),
        OptionSide::Put => input.strike * disc_r * norm_cdf(-d2) - input.spot * disc_q * norm_cdf(-d1),
    }
}

pub fn black_scholes_greeks(input: &BsInputs) -> Greeks {
    let price = black_scholes_price(input);

    if input.is_degenerate() {
        let delta = match input.side {
            OptionSide::Call if input.spot > input.strike => 1.0,
            OptionSide::Put if input.spot < input.strike => -1.0,
            _ => 0.0,
        };
        return Greeks {
            price,
            delta,
            ..Greeks::default()
        };
    }

    let s = input.spot;
    let k = input.strike;
    let t = input.time;
    let v = input.vol;
    let r = input.rate;
    let q = input.dividend_yield;

    let (d1, d2) = input.d1_d2();
    let pdf = norm_pdf(d1);
    let sqrt_t = t.sqrt();
    let disc_q = (-q * t).exp();
    let disc_r = (-r * t).exp();

    let delta = match input.side {
        OptionSide::Call => disc_q * norm_cdf(d1),
        OptionSide::Put => disc_q * (norm_cdf(d1) - 1.0),
    };

    let gamma = disc_q * pdf / (s * v * sqrt_t);
    let vega = s * disc_q * pdf * sqrt_t;

    let decay = -(s * v * disc_q * pdf) / (2.0 * sqrt_t);
    let theta_year = match input.side {
        OptionSide::Call => decay + q * s * disc_q * norm_cdf(d1) - r * k * disc_r * norm_cdf(d2),
        OptionSide::Put => decay - q * s * disc_q * norm_cdf(-d1) + r * k * disc_r * norm_cdf(-d2),
    };

    Greeks {
        price,
        delta,
        gamma,
        vega,
        theta: theta_year / DAYS_PER_YEAR,
    }
}

/// Greeks for one chain row. IV on the row is a percentage.
pub fn row_greeks(row: &ContractRow, spot: f64, time: f64, rate: f64, dividend_yield: f64) -> Greeks {
    black_scholes_greeks(&BsInputs {
        spot,
        strike: row.strike,
        time,
        vol: row.implied_volatility / 100.0,
        rate,
        dividend_yield,
        side: row.side,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm(side: OptionSide) -> BsInputs {
        BsInputs {
            spot: 25000.0,
            strike: 25000.0,
            time: 30.0 / DAYS_PER_YEAR,
            vol: 0.15,
            rate: 0.07,
            dividend_yield: 0.0,
            side,
        }
    }

    #[test]
    fn test_put_call_parity_with_dividend() {
        let mut call = atm(OptionSide::Call);
        call.dividend_yield = 0.01;
        let mut put = call;
        put.side = OptionSide::Put;

        let lhs = black_scholes_price(&call) - black_scholes_price(&put);
        let rhs = call.spot * (-call.dividend_yield * call.time).exp()
            - call.strike * (-call.rate * call.time).exp();
        assert!((lhs - rhs).abs() < 0.05);
    }

    #[test]
    fn test_atm_call_delta_near_half() {
        let g = black_scholes_greeks(&atm(OptionSide::Call));
        assert!(g.delta > 0.5 && g.delta < 0.6);
        assert!(g.gamma > 0.0);
        assert!(g.vega > 0.0);
        assert!(g.theta < 0.0);
    }

    #[test]
    fn test_put_delta_negative() {
        let g = black_scholes_greeks(&atm(OptionSide::Put));
        assert!(g.delta < 0.0 && g.delta > -0.5);
    }

    #[test]
    fn test_theta_is_per_day() {
        let g = black_scholes_greeks(&atm(OptionSide::Call));
        // an ATM NIFTY call at 15% vol loses tens of points a day, not thousands
        assert!(g.theta > -50.0 && g.theta < -1.0);
    }

    #[test]
    fn test_expired_contract_uses_intrinsic() {
        let mut input = atm(OptionSide::Call);
        input.time = 0.0;
        input.spot = 25100.0;
        let g = black_scholes_greeks(&input);
        assert_eq!(g.price, 100.0);
        assert_eq!(g.delta, 1.0);
        assert_eq!(g.gamma, 0.0);
        assert_eq!(g.theta, 0.0);

        input.side = OptionSide::Put;
        input.spot = 24900.0;
        let g = black_scholes_greeks(&input);
        assert_eq!(g.price, 100.0);
        assert_eq!(g.delta, -1.0);
    }

    #[test]
    fn test_zero_vol_out_of_money() {
        let mut input = atm(OptionSide::Call);
        input.vol = 0.0;
        input.strike = 25500.0;
        let g = black_scholes_greeks(&input);
        assert_eq!(g.price, 0.0);
        assert_eq!(g.delta, 0.0);
    }

    #[test]
    fn test_row_greeks_reads_percentage_iv() {
        let row = ContractRow::new(25000.0, OptionSide::Call).with_iv(15.0);
        let from_row = row_greeks(&row, 25000.0, 30.0 / DAYS_PER_YEAR, 0.07, 0.0);
        assert_eq!(from_row, black_scholes_greeks(&atm(OptionSide::Call)));
    }

    #[test]
    fn test_norm_cdf_symmetry() {
        assert!((norm_cdf(0.5) + norm_cdf(-0.5) - 1.0).abs() < 1e-10);
        assert!((norm_cdf(10.0) - 1.0).abs() < 1e-10);
    }
}
