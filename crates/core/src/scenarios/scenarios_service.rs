use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::allocation::AllocationPlan;
use crate::errors::{Error, Result};
use crate::rebalancing::RebalancePlan;

use super::scenarios_model::{NewScenario, Scenario};
use super::scenarios_traits::{ScenarioRepositoryTrait, ScenarioServiceTrait};

pub struct ScenarioService {
    repository: Arc<dyn ScenarioRepositoryTrait>,
}

impl ScenarioService {
    pub fn new(repository: Arc<dyn ScenarioRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ScenarioServiceTrait for ScenarioService {
    fn get_scenarios(&self) -> Result<Vec<Scenario>> {
        let mut scenarios = self.repository.list()?;
        scenarios.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(scenarios)
    }

    fn get_scenario(&self, id: &str) -> Result<Scenario> {
        self.repository
            .get_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("Scenario {} not found", id)))
    }

    async fn save_scenario(&self, scenario: NewScenario) -> Result<Scenario> {
        scenario.validate()?;

        let created_at = match &scenario.id {
            Some(id) => Some(self.get_scenario(id)?.created_at),
            None => None,
        };

        let saved = self
            .repository
            .upsert(scenario.into_scenario(created_at))
            .await?;
        info!("Saved scenario {} ({})", saved.name, saved.id);
        Ok(saved)
    }

    async fn delete_scenario(&self, id: &str) -> Result<()> {
        let deleted = self.repository.delete(id).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Scenario {} not found", id)));
        }
        info!("Deleted scenario {}", id);
        Ok(())
    }

    fn allocation_plan(&self, id: &str) -> Result<AllocationPlan> {
        let scenario = self.get_scenario(id)?;
        debug!("Computing allocation plan for scenario {}", id);
        scenario.allocation_request().plan()
    }

    fn rebalance_plan(&self, id: &str) -> Result<RebalancePlan> {
        let scenario = self.get_scenario(id)?;
        debug!("Computing rebalance plan for scenario {}", id);
        scenario.rebalance_request().plan()
    }
}
