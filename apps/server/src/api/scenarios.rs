use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rebalancer_core::{
    scenarios::{NewScenario, Scenario},
    AllocationPlan, RebalancePlan,
};

async fn get_scenarios(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Scenario>>> {
    let scenarios = state.scenario_service.get_scenarios()?;
    Ok(Json(scenarios))
}

async fn get_scenario(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Scenario>> {
    let scenario = state.scenario_service.get_scenario(&id)?;
    Ok(Json(scenario))
}

async fn save_scenario(
    State(state): State<Arc<AppState>>,
    Json(scenario): Json<NewScenario>,
) -> ApiResult<Json<Scenario>> {
    let saved = state.scenario_service.save_scenario(scenario).await?;
    Ok(Json(saved))
}

async fn delete_scenario(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.scenario_service.delete_scenario(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn scenario_allocation_plan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AllocationPlan>> {
    let plan = state.scenario_service.allocation_plan(&id)?;
    Ok(Json(plan))
}

async fn scenario_rebalance_plan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RebalancePlan>> {
    let plan = state.scenario_service.rebalance_plan(&id)?;
    Ok(Json(plan))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/scenarios", get(get_scenarios).post(save_scenario))
        .route("/scenarios/{id}", get(get_scenario).delete(delete_scenario))
        .route("/scenarios/{id}/allocation", post(scenario_allocation_plan))
        .route("/scenarios/{id}/rebalance", post(scenario_rebalance_plan))
}
