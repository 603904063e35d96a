use std::sync::Arc;

use rebalancer_core::scenarios::{ScenarioService, ScenarioServiceTrait};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    config::{Config, PlannerDefaults},
    store::InMemoryScenarioRepository,
};

pub struct AppState {
    pub scenario_service: Arc<dyn ScenarioServiceTrait + Send + Sync>,
    pub planner: PlannerDefaults,
}

pub fn init_tracing() {
    let log_format = std::env::var("RB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    let scenario_repository = Arc::new(InMemoryScenarioRepository::new());
    let scenario_service = Arc::new(ScenarioService::new(scenario_repository));

    tracing::info!(
        "Planner defaults: rounding={} auto_distribute_leftover={} drift_band={}",
        config.planner.rounding_mode,
        config.planner.auto_distribute_leftover,
        config.planner.drift_band
    );

    Arc::new(AppState {
        scenario_service,
        planner: config.planner,
    })
}
