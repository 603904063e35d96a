//! Allocation plan models: splitting a deposit by target weight.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::planning::{lenient_f64, Asset, RoundingMode};

/// Request body for the allocation planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub assets: Vec<Asset>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub deposit: f64,
    #[serde(default)]
    pub rounding_mode: RoundingMode,
}

/// Planned purchase for a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRow {
    pub key: String,
    /// Sanitized target percent as supplied
    pub target_percent: f64,
    /// Share of the deposit (0-1) after normalizing targets
    pub weight: f64,
    pub price: Option<f64>,
    /// Deposit share before share rounding
    pub raw_amount: f64,
    /// Deposit share after share rounding
    pub final_amount: f64,
    /// `final_amount - raw_amount`
    pub diff_amount: f64,
    pub shares: Option<f64>,
    pub raw_shares: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationTotals {
    pub deposit: f64,
    pub raw_total: f64,
    pub final_total: f64,
    pub diff_total: f64,
    pub leftover: f64,
    /// Sum of target percents before normalization
    pub target_sum: f64,
    /// Denominator actually used for weights
    pub effective_target: f64,
    pub rounding_mode: RoundingMode,
    pub rounding_applied: bool,
    pub price_coverage_count: usize,
    pub missing_price_tickers: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationWarnings {
    pub non_hundred_target: bool,
    pub missing_prices: bool,
    pub zero_deposit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPlan {
    pub rows: BTreeMap<String, AllocationRow>,
    pub totals: AllocationTotals,
    pub warnings: AllocationWarnings,
}

impl AllocationPlan {
    pub fn row(&self, key: &str) -> Option<&AllocationRow> {
        self.rows.get(key)
    }
}
