use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::allocation::AllocationRequest;
use crate::errors::{Error, Result, ValidationError};
use crate::planning::{lenient_f64, validate_asset_keys, Asset, RoundingMode};
use crate::rebalancing::RebalanceRequest;

// ============================================================================
// Domain Models
// ============================================================================

/// A saved planning scenario: target configuration plus deposit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub assets: Vec<Asset>,
    pub deposit: f64,
    pub rounding_mode: RoundingMode,
    pub locked_keys: Vec<String>,
    pub auto_distribute_leftover: bool,
    pub price_map: HashMap<String, f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Scenario {
    pub fn allocation_request(&self) -> AllocationRequest {
        AllocationRequest {
            assets: self.assets.clone(),
            deposit: self.deposit,
            rounding_mode: self.rounding_mode,
        }
    }

    pub fn rebalance_request(&self) -> RebalanceRequest {
        RebalanceRequest {
            assets: self.assets.clone(),
            deposit: self.deposit,
            rounding_mode: self.rounding_mode,
            price_map: self.price_map.clone(),
            locked_keys: self.locked_keys.clone(),
            auto_distribute_leftover: self.auto_distribute_leftover,
        }
    }
}

// ============================================================================
// Input Models
// ============================================================================

fn default_auto_distribute() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScenario {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub deposit: f64,
    #[serde(default)]
    pub rounding_mode: RoundingMode,
    #[serde(default)]
    pub locked_keys: Vec<String>,
    #[serde(default = "default_auto_distribute")]
    pub auto_distribute_leftover: bool,
    #[serde(default)]
    pub price_map: HashMap<String, f64>,
}

impl NewScenario {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Scenario name cannot be empty".to_string(),
            )));
        }

        validate_asset_keys(&self.assets)?;

        let keys: HashSet<&str> = self.assets.iter().map(|a| a.key.as_str()).collect();
        if let Some(unknown) = self.locked_keys.iter().find(|k| !keys.contains(k.as_str())) {
            return Err(Error::Validation(ValidationError::UnknownLockedKey(
                unknown.clone(),
            )));
        }
        Ok(())
    }

    /// Builds the stored scenario. `created_at` is kept when updating.
    pub fn into_scenario(self, created_at: Option<String>) -> Scenario {
        let now = chrono::Utc::now().to_rfc3339();
        Scenario {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name.trim().to_string(),
            assets: self.assets,
            deposit: self.deposit,
            rounding_mode: self.rounding_mode,
            locked_keys: self.locked_keys,
            auto_distribute_leftover: self.auto_distribute_leftover,
            price_map: self.price_map,
            created_at: created_at.unwrap_or_else(|| now.clone()),
            updated_at: now,
        }
    }
}
