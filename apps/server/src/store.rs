//! In-memory scenario storage for the web server.

use async_trait::async_trait;
use dashmap::DashMap;
use rebalancer_core::errors::Result;
use rebalancer_core::scenarios::{Scenario, ScenarioRepositoryTrait};

/// Keeps scenarios for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryScenarioRepository {
    scenarios: DashMap<String, Scenario>,
}

impl InMemoryScenarioRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScenarioRepositoryTrait for InMemoryScenarioRepository {
    fn list(&self) -> Result<Vec<Scenario>> {
        Ok(self
            .scenarios
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Scenario>> {
        Ok(self.scenarios.get(id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, scenario: Scenario) -> Result<Scenario> {
        self.scenarios.insert(scenario.id.clone(), scenario.clone());
        Ok(scenario)
    }

    async fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.scenarios.remove(id).map_or(0, |_| 1))
    }
}
