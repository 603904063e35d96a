//! Input models shared by the allocation and rebalance planners.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{FLOOR_GRANT_THRESHOLD, NEAREST_GRANT_THRESHOLD};

/// One holding under management, as supplied by the data-entry layer.
///
/// Numeric fields are deserialized leniently: numbers, numeric strings and
/// `null` are all accepted so that half-edited form values still produce a
/// plan. Unusable values end up as `None` (or `0` for the target) and are
/// sanitized by the planners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub target_percent: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub current_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub current_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub price: Option<f64>,
}

impl Asset {
    pub fn new(key: impl Into<String>, target_percent: f64) -> Self {
        Self {
            key: key.into(),
            target_percent,
            ..Default::default()
        }
    }

    /// Sets the current market value and the independently tracked weight.
    pub fn with_current(mut self, value: f64, percent: f64) -> Self {
        self.current_value = Some(value);
        self.current_percent = Some(percent);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// Policy for converting a currency allocation into whole shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// No share rounding; allocations are exact currency amounts.
    #[default]
    Exact,
    /// Round down to whole shares.
    Floor,
    /// Round down, then grant extra shares to the largest remainders.
    Nearest,
}

impl RoundingMode {
    /// Normalizes a mode string. Unrecognized values fall back to `Exact`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "floor" => RoundingMode::Floor,
            "nearest" => RoundingMode::Nearest,
            _ => RoundingMode::Exact,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::Exact => "exact",
            RoundingMode::Floor => "floor",
            RoundingMode::Nearest => "nearest",
        }
    }

    pub fn rounds_to_shares(&self) -> bool {
        !matches!(self, RoundingMode::Exact)
    }

    /// Remainder a rounded-down position must reach before leftover cash
    /// may buy it one more share. `None` when the mode does not round.
    pub fn grant_threshold(&self) -> Option<f64> {
        match self {
            RoundingMode::Exact => None,
            RoundingMode::Floor => Some(FLOOR_GRANT_THRESHOLD),
            RoundingMode::Nearest => Some(NEAREST_GRANT_THRESHOLD),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RoundingMode::parse(s))
    }
}

impl From<&str> for RoundingMode {
    fn from(value: &str) -> Self {
        RoundingMode::parse(value)
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoundingMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => RoundingMode::parse(&s),
            _ => RoundingMode::Exact,
        })
    }
}

fn number_from_value(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Accepts a number, a numeric string or anything else (which becomes `0`).
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(value).unwrap_or(0.0))
}

/// Accepts a number, a numeric string or anything else (which becomes `None`).
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rounding_modes_normalize_to_exact() {
        assert_eq!(RoundingMode::parse("FLOOR"), RoundingMode::Floor);
        assert_eq!(RoundingMode::parse(" nearest "), RoundingMode::Nearest);
        assert_eq!(RoundingMode::parse("banker"), RoundingMode::Exact);
        assert_eq!(RoundingMode::parse(""), RoundingMode::Exact);

        let mode: RoundingMode = serde_json::from_str("42").unwrap();
        assert_eq!(mode, RoundingMode::Exact);
        let mode: RoundingMode = serde_json::from_str("\"nearest\"").unwrap();
        assert_eq!(mode, RoundingMode::Nearest);
    }

    #[test]
    fn grant_threshold_is_named_per_mode() {
        assert_eq!(RoundingMode::Exact.grant_threshold(), None);
        assert_eq!(
            RoundingMode::Floor.grant_threshold(),
            Some(FLOOR_GRANT_THRESHOLD)
        );
        assert_eq!(
            RoundingMode::Nearest.grant_threshold(),
            Some(NEAREST_GRANT_THRESHOLD)
        );
    }

    #[test]
    fn asset_numeric_fields_deserialize_leniently() {
        let asset: Asset = serde_json::from_str(
            r#"{"key":"VTI","targetPercent":"60","currentValue":null,"currentPercent":"abc","price":212.5}"#,
        )
        .unwrap();

        assert_eq!(asset.key, "VTI");
        assert_eq!(asset.target_percent, 60.0);
        assert_eq!(asset.current_value, None);
        assert_eq!(asset.current_percent, None);
        assert_eq!(asset.price, Some(212.5));
    }

    #[test]
    fn asset_without_key_is_a_structural_error() {
        let result = serde_json::from_str::<Asset>(r#"{"targetPercent":10}"#);
        assert!(result.is_err());
    }
}
