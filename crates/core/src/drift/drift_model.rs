//! Drift report models.

use serde::{Deserialize, Serialize};

use crate::planning::{lenient_opt_f64, Asset};

/// Request body for a drift report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftRequest {
    pub assets: Vec<Asset>,
    /// Tolerated drift in percentage points; the configured default when absent
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub drift_band: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftEntry {
    pub key: String,
    /// Target percent normalized so that all targets sum to 100
    pub target_percent: f64,
    pub current_value: f64,
    /// Weight recomputed from current values
    pub actual_percent: f64,
    pub drift: f64,
    pub target_value: f64,
    /// Positive to buy, negative to sell
    pub trade_amount: f64,
    pub trade_shares: Option<f64>,
    pub action: TradeAction,
    pub within_band: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub entries: Vec<DriftEntry>,
    pub total_value: f64,
    pub drift_band: f64,
    pub max_abs_drift: f64,
    pub rebalance_needed: bool,
    pub buy_total: f64,
    pub sell_total: f64,
}

impl DriftReport {
    pub fn entry(&self, key: &str) -> Option<&DriftEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}
