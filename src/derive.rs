//! Derived metrics computed from resolved raw metrics
//!
//! The dollar index proxy replicates the ICE US Dollar Index formula from six
//! USD-based currency rates. Providers quote every pair as USD→XXX, so the
//! EUR and GBP legs are inverted before the weights are applied.

use crate::{
    constants::{
        DXY_CAD_WEIGHT, DXY_CHF_WEIGHT, DXY_CONSTANT, DXY_EUR_WEIGHT, DXY_GBP_WEIGHT,
        DXY_JPY_WEIGHT, DXY_SEK_WEIGHT, USD_CAD, USD_CHF, USD_EUR, USD_GBP, USD_JPY, USD_SEK,
    },
    error::DerivationError,
    types::DerivationRule,
};
use std::collections::BTreeMap;

/// The six USD-quoted rates the dollar index proxy needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DollarIndexInputs {
    /// Euros per US dollar
    pub usd_eur: f64,
    /// Yen per US dollar
    pub usd_jpy: f64,
    /// Pounds per US dollar
    pub usd_gbp: f64,
    /// Canadian dollars per US dollar
    pub usd_cad: f64,
    /// Kronor per US dollar
    pub usd_sek: f64,
    /// Francs per US dollar
    pub usd_chf: f64,
}

impl DollarIndexInputs {
    /// Reads the inputs from a map keyed by metric name
    pub fn from_map(values: &BTreeMap<String, f64>) -> Result<Self, DerivationError> {
        let get = |name: &str| {
            values
                .get(name)
                .copied()
                .ok_or_else(|| DerivationError::MissingInput(name.to_string()))
        };

        Ok(Self {
            usd_eur: get(USD_EUR)?,
            usd_jpy: get(USD_JPY)?,
            usd_gbp: get(USD_GBP)?,
            usd_cad: get(USD_CAD)?,
            usd_sek: get(USD_SEK)?,
            usd_chf: get(USD_CHF)?,
        })
    }

    fn legs(&self) -> [(&'static str, f64); 6] {
        [
            (USD_EUR, self.usd_eur),
            (USD_JPY, self.usd_jpy),
            (USD_GBP, self.usd_gbp),
            (USD_CAD, self.usd_cad),
            (USD_SEK, self.usd_sek),
            (USD_CHF, self.usd_chf),
        ]
    }
}

/// Computes the dollar index proxy
///
/// ```text
/// 50.14348112 × EURUSD^-0.576 × USDJPY^0.136 × GBPUSD^-0.119
///             × USDCAD^0.091 × USDSEK^0.042 × USDCHF^0.036
/// ```
///
/// with `EURUSD = 1 / usd_eur` and `GBPUSD = 1 / usd_gbp`. Every input must
/// be finite and strictly positive; otherwise nothing is computed.
pub fn dollar_index_proxy(inputs: &DollarIndexInputs) -> Result<f64, DerivationError> {
    for (name, value) in inputs.legs() {
        if !value.is_finite() || value <= 0.0 {
            return Err(DerivationError::UnusableInput {
                name: name.to_string(),
                value,
            });
        }
    }

    let eur_usd = 1.0 / inputs.usd_eur;
    let gbp_usd = 1.0 / inputs.usd_gbp;

    let value = DXY_CONSTANT
        * eur_usd.powf(DXY_EUR_WEIGHT)
        * inputs.usd_jpy.powf(DXY_JPY_WEIGHT)
        * gbp_usd.powf(DXY_GBP_WEIGHT)
        * inputs.usd_cad.powf(DXY_CAD_WEIGHT)
        * inputs.usd_sek.powf(DXY_SEK_WEIGHT)
        * inputs.usd_chf.powf(DXY_CHF_WEIGHT);

    if value.is_finite() {
        Ok(value)
    } else {
        Err(DerivationError::NonFinite)
    }
}

fn dollar_index_from_map(values: &BTreeMap<String, f64>) -> Result<f64, DerivationError> {
    dollar_index_proxy(&DollarIndexInputs::from_map(values)?)
}

/// Derivation rule for the dollar index proxy metric
pub fn dollar_index_rule() -> DerivationRule {
    DerivationRule::new(
        "dollar-index-proxy",
        &[USD_EUR, USD_JPY, USD_GBP, USD_CAD, USD_SEK, USD_CHF],
        dollar_index_from_map,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample() -> DollarIndexInputs {
        DollarIndexInputs {
            usd_eur: 0.92,
            usd_jpy: 150.0,
            usd_gbp: 0.79,
            usd_cad: 1.35,
            usd_sek: 10.5,
            usd_chf: 0.88,
        }
    }

    fn expected_sample_value() -> f64 {
        50.14348112
            * (1.0_f64 / 0.92).powf(-0.576)
            * 150.0_f64.powf(0.136)
            * (1.0_f64 / 0.79).powf(-0.119)
            * 1.35_f64.powf(0.091)
            * 10.5_f64.powf(0.042)
            * 0.88_f64.powf(0.036)
    }

    fn assert_close(actual: f64, expected: f64) {
        let rel = ((actual - expected) / expected).abs();
        assert!(rel < 1e-9, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn test_known_inputs() {
        let value = dollar_index_proxy(&sample()).unwrap();
        assert_close(value, expected_sample_value());
        // Sanity: the proxy for these rates sits in the usual DXY range
        assert!(value > 95.0 && value < 115.0, "got {}", value);
    }

    #[test]
    fn test_eur_and_gbp_legs_are_inverted() {
        // Feeding the raw USD→EUR / USD→GBP quotes straight into the formula
        // (no reciprocal) must give a different number.
        let inputs = sample();
        let uninverted = DXY_CONSTANT
            * inputs.usd_eur.powf(DXY_EUR_WEIGHT)
            * inputs.usd_jpy.powf(DXY_JPY_WEIGHT)
            * inputs.usd_gbp.powf(DXY_GBP_WEIGHT)
            * inputs.usd_cad.powf(DXY_CAD_WEIGHT)
            * inputs.usd_sek.powf(DXY_SEK_WEIGHT)
            * inputs.usd_chf.powf(DXY_CHF_WEIGHT);

        let value = dollar_index_proxy(&inputs).unwrap();
        assert!((value - uninverted).abs() > 1.0);

        // A stronger euro (fewer euros per dollar) weakens the index.
        let mut strong_euro = inputs;
        strong_euro.usd_eur = 0.85;
        assert!(dollar_index_proxy(&strong_euro).unwrap() < value);

        // Likewise for sterling.
        let mut strong_pound = inputs;
        strong_pound.usd_gbp = 0.70;
        assert!(dollar_index_proxy(&strong_pound).unwrap() < value);
    }

    #[test]
    fn test_zero_input_is_unavailable() {
        let mut inputs = sample();
        inputs.usd_gbp = 0.0;
        assert_eq!(
            dollar_index_proxy(&inputs),
            Err(DerivationError::UnusableInput {
                name: USD_GBP.to_string(),
                value: 0.0
            })
        );

        let mut inputs = sample();
        inputs.usd_eur = 0.0;
        assert!(dollar_index_proxy(&inputs).is_err());
    }

    #[test]
    fn test_negative_and_nan_inputs_are_unavailable() {
        let mut inputs = sample();
        inputs.usd_chf = -0.88;
        assert!(dollar_index_proxy(&inputs).is_err());

        let mut inputs = sample();
        inputs.usd_sek = f64::NAN;
        assert!(dollar_index_proxy(&inputs).is_err());
    }

    #[test]
    fn test_rule_with_missing_input() {
        let rule = dollar_index_rule();
        let mut resolved: HashMap<String, f64> = HashMap::new();
        for (name, value) in sample().legs() {
            resolved.insert(name.to_string(), value);
        }
        assert_close(rule.apply(&resolved).unwrap(), expected_sample_value());

        for (name, _) in sample().legs() {
            let mut partial = resolved.clone();
            partial.remove(name);
            assert_eq!(
                rule.apply(&partial),
                Err(DerivationError::MissingInput(name.to_string()))
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let a = dollar_index_proxy(&sample()).unwrap();
        let b = dollar_index_proxy(&sample()).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
