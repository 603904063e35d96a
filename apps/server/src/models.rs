//! Request bodies whose optional settings fall back to server configuration.

use std::collections::HashMap;

use rebalancer_core::planning::lenient_f64;
use rebalancer_core::{AllocationRequest, Asset, RebalanceRequest, RoundingMode};
use serde::Deserialize;

use crate::config::PlannerDefaults;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPlanBody {
    pub assets: Vec<Asset>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub deposit: f64,
    #[serde(default)]
    pub rounding_mode: Option<RoundingMode>,
}

impl AllocationPlanBody {
    pub fn into_request(self, defaults: &PlannerDefaults) -> AllocationRequest {
        AllocationRequest {
            assets: self.assets,
            deposit: self.deposit,
            rounding_mode: self.rounding_mode.unwrap_or(defaults.rounding_mode),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancePlanBody {
    pub assets: Vec<Asset>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub deposit: f64,
    #[serde(default)]
    pub rounding_mode: Option<RoundingMode>,
    #[serde(default)]
    pub price_map: HashMap<String, f64>,
    #[serde(default)]
    pub locked_keys: Vec<String>,
    #[serde(default)]
    pub auto_distribute_leftover: Option<bool>,
}

impl RebalancePlanBody {
    pub fn into_request(self, defaults: &PlannerDefaults) -> RebalanceRequest {
        RebalanceRequest {
            assets: self.assets,
            deposit: self.deposit,
            rounding_mode: self.rounding_mode.unwrap_or(defaults.rounding_mode),
            price_map: self.price_map,
            locked_keys: self.locked_keys,
            auto_distribute_leftover: self
                .auto_distribute_leftover
                .unwrap_or(defaults.auto_distribute_leftover),
        }
    }
}
