//! Saved planning scenarios - domain models, service, and traits.

mod scenarios_model;
mod scenarios_service;
mod scenarios_traits;

pub use scenarios_model::{NewScenario, Scenario};
pub use scenarios_service::ScenarioService;
pub use scenarios_traits::{ScenarioRepositoryTrait, ScenarioServiceTrait};
