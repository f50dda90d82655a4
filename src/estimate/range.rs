//! Coarse per-chain link range estimation.

use serde::{Deserialize, Serialize};

use super::factors::FactorTables;
use super::types::{Environment, RfChain};

/// Lower clamp for any estimated range (m).
pub const MIN_RANGE_M: f64 = 20.0;
/// Upper clamp for any estimated range (m).
pub const MAX_RANGE_M: f64 = 5000.0;

/// Estimated link distance for one chain.
///
/// `range_m` is `None` only for backhaul infrastructure radios (cellular).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEstimate {
    pub range_m: Option<u32>,
    pub description: String,
}

/// Range estimate tagged with the chain it was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRange {
    pub radio_id: String,
    pub antenna_id: String,
    #[serde(flatten)]
    pub estimate: RangeEstimate,
}

/// Open-air baseline distance (m) by radio type and band.
fn baseline_m(chain: &RfChain) -> f64 {
    let radio = &chain.radio;
    match radio.kind().as_str() {
        "wifi" => {
            let bands = radio.band_text();
            let mut tokens = bands.split(|c: char| c.is_whitespace() || c == ',' || c == '/');
            if bands.contains("2.4") {
                150.0
            } else if tokens.any(is_5ghz_token) {
                80.0
            } else {
                100.0
            }
        }
        "lora" => 2000.0,
        "analog_fpv" => 1000.0,
        "sdr" => 500.0,
        _ => 100.0,
    }
}

/// `5`, `5ghz`, `5.8`, `5g`; not `915mhz` or `5500mhz`.
fn is_5ghz_token(token: &str) -> bool {
    token
        .strip_prefix('5')
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// Multiplier for the chain's antenna gain, bucketed.
fn gain_factor(chain: &RfChain) -> f64 {
    let gain = chain
        .antenna
        .gain_dbi
        .or(chain.radio.antenna_gain_dbi)
        .unwrap_or(0.0);
    if gain >= 14.0 {
        3.0
    } else if gain >= 9.0 {
        2.0
    } else if gain >= 4.0 {
        1.5
    } else {
        1.0
    }
}

/// Estimates link range for one chain in the given environment.
pub fn estimate_range(chain: &RfChain, environment: &Environment, tables: &FactorTables) -> RangeEstimate {
    if chain.radio.is_type("cellular") {
        return RangeEstimate {
            range_m: None,
            description: "Backhaul via 4G/5G network".to_string(),
        };
    }

    let raw = baseline_m(chain) * gain_factor(chain) * tables.range_factor(environment);
    let clamped = if raw.is_finite() {
        raw.clamp(MIN_RANGE_M, MAX_RANGE_M)
    } else {
        MIN_RANGE_M
    };

    RangeEstimate {
        range_m: Some(clamped.round() as u32),
        description: format!("{} link estimate", chain.radio.radio_type.to_uppercase()),
    }
}

/// Estimates every chain of a node, preserving chain order.
pub fn estimate_ranges(chains: &[RfChain], environment: &Environment, tables: &FactorTables) -> Vec<ChainRange> {
    chains
        .iter()
        .map(|chain| ChainRange {
            radio_id: chain.radio.id.clone(),
            antenna_id: chain.antenna.id.clone(),
            estimate: estimate_range(chain, environment, tables),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Antenna, Radio};

    fn chain(radio_type: &str, band: &str, gain: Option<f64>) -> RfChain {
        RfChain {
            radio: Radio {
                id: "r".into(),
                radio_type: radio_type.into(),
                bands: vec![band.into()],
                ..Radio::default()
            },
            antenna: Antenna {
                id: "a".into(),
                gain_dbi: gain,
                ..Antenna::default()
            },
        }
    }

    #[test]
    fn wifi_24_high_gain_rural() {
        let est = estimate_range(
            &chain("wifi", "2.4GHz", Some(14.0)),
            &Environment::RuralOpen,
            &FactorTables::default(),
        );
        assert_eq!(est.range_m, Some(450));
        assert_eq!(est.description, "WIFI link estimate");
    }

    #[test]
    fn wifi_5_only_uses_shorter_baseline() {
        let est = estimate_range(&chain("wifi", "5GHz", None), &Environment::RuralOpen, &FactorTables::default());
        assert_eq!(est.range_m, Some(80));
    }

    #[test]
    fn sub_ghz_wifi_is_not_mistaken_for_5ghz() {
        let tables = FactorTables::default();
        let halow = estimate_range(&chain("wifi", "915MHz", None), &Environment::RuralOpen, &tables);
        assert_eq!(halow.range_m, Some(100));
        let dual = estimate_range(&chain("wifi", "5.8 GHz", None), &Environment::RuralOpen, &tables);
        assert_eq!(dual.range_m, Some(80));
    }

    #[test]
    fn radio_gain_is_fallback() {
        let mut c = chain("sdr", "", None);
        c.radio.antenna_gain_dbi = Some(9.0);
        let est = estimate_range(&c, &Environment::RuralOpen, &FactorTables::default());
        assert_eq!(est.range_m, Some(1000));
    }

    #[test]
    fn cellular_has_no_range() {
        let est = estimate_range(
            &chain("cellular", "lte", Some(20.0)),
            &Environment::Lab,
            &FactorTables::default(),
        );
        assert_eq!(est.range_m, None);
        assert!(est.description.contains("Backhaul"));
    }

    #[test]
    fn ranges_are_clamped() {
        let tables = FactorTables::default();
        let high = estimate_range(&chain("lora", "915MHz", Some(15.0)), &Environment::RuralOpen, &tables);
        assert_eq!(high.range_m, Some(5000));
        let low = estimate_range(&chain("bluetooth", "", None), &Environment::Subterranean, &tables);
        assert_eq!(low.range_m, Some(20));
    }
}
