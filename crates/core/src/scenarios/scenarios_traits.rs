use async_trait::async_trait;

use crate::allocation::AllocationPlan;
use crate::errors::Result;
use crate::rebalancing::RebalancePlan;

use super::scenarios_model::{NewScenario, Scenario};

/// Storage seam for saved scenarios.
#[async_trait]
pub trait ScenarioRepositoryTrait: Send + Sync {
    fn list(&self) -> Result<Vec<Scenario>>;
    fn get_by_id(&self, id: &str) -> Result<Option<Scenario>>;
    async fn upsert(&self, scenario: Scenario) -> Result<Scenario>;
    /// Returns the number of deleted records.
    async fn delete(&self, id: &str) -> Result<usize>;
}

#[async_trait]
pub trait ScenarioServiceTrait: Send + Sync {
    fn get_scenarios(&self) -> Result<Vec<Scenario>>;
    fn get_scenario(&self, id: &str) -> Result<Scenario>;
    async fn save_scenario(&self, scenario: NewScenario) -> Result<Scenario>;
    async fn delete_scenario(&self, id: &str) -> Result<()>;

    /// Runs the allocation planner against a saved scenario
    fn allocation_plan(&self, id: &str) -> Result<AllocationPlan>;

    /// Runs the rebalance-deposit planner against a saved scenario
    fn rebalance_plan(&self, id: &str) -> Result<RebalancePlan>;
}
