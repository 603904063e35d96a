use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::planning::{lenient_f64, Asset, RoundingMode};

// ============================================================================
// Input Models
// ============================================================================

fn default_auto_distribute() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceRequest {
    pub assets: Vec<Asset>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub deposit: f64,
    #[serde(default)]
    pub rounding_mode: RoundingMode,
    /// Live prices by asset key; wins over `Asset::price`
    #[serde(default)]
    pub price_map: HashMap<String, f64>,
    /// Assets excluded from receiving funds this cycle
    #[serde(default)]
    pub locked_keys: Vec<String>,
    #[serde(default = "default_auto_distribute")]
    pub auto_distribute_leftover: bool,
}

impl Default for RebalanceRequest {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            deposit: 0.0,
            rounding_mode: RoundingMode::Exact,
            price_map: HashMap::new(),
            locked_keys: Vec::new(),
            auto_distribute_leftover: true,
        }
    }
}

// ============================================================================
// Output Models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceRow {
    pub key: String,
    pub target_percent: f64,
    pub current_value: f64,
    pub current_percent: f64,
    pub weight: f64,
    /// Target value within the post-deposit portfolio
    pub ideal_value: f64,
    /// `ideal_value - current_value`; negative when above target
    pub raw_need: f64,
    pub locked: bool,
    pub price: Option<f64>,
    pub raw_allocation: f64,
    pub final_allocation: f64,
    pub allocation_diff: f64,
    pub shares: Option<f64>,
    pub raw_shares: Option<f64>,
    pub new_value: f64,
    pub new_percent: f64,
    /// Deviation from target after the deposit
    pub delta: f64,
    /// Deviation from target before the deposit
    pub pre_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceTotals {
    pub deposit: f64,
    pub total_current: f64,
    /// Portfolio value after the final allocations
    pub final_total_value: f64,
    pub positive_needs_sum: f64,
    pub raw_assigned: f64,
    pub assigned: f64,
    pub leftover_cash: f64,
    pub target_sum: f64,
    pub effective_target: f64,
    pub rounding_mode: RoundingMode,
    pub rounding_applied: bool,
    pub price_coverage_count: usize,
    pub missing_price_tickers: Vec<String>,
    pub impacted_count: usize,
    pub resolved_count: usize,
    pub needs_count: usize,
    pub max_delta_after: f64,
    pub locked_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceWarnings {
    pub non_hundred_target: bool,
    pub missing_prices: bool,
    pub zero_deposit: bool,
    pub no_active_assets: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancePlan {
    pub rows: BTreeMap<String, RebalanceRow>,
    pub totals: RebalanceTotals,
    pub warnings: RebalanceWarnings,
}

impl RebalancePlan {
    pub fn row(&self, key: &str) -> Option<&RebalanceRow> {
        self.rows.get(key)
    }
}
