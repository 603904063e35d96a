use std::sync::Arc;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{AllocationPlanBody, RebalancePlanBody},
};
use axum::{extract::State, routing::post, Json, Router};
use rebalancer_core::{drift::DriftRequest, AllocationPlan, DriftReport, RebalancePlan};

async fn allocation_plan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AllocationPlanBody>,
) -> ApiResult<Json<AllocationPlan>> {
    let plan = body.into_request(&state.planner).plan()?;
    tracing::debug!(
        "Allocation plan: {} rows, leftover {:.2}",
        plan.rows.len(),
        plan.totals.leftover
    );
    Ok(Json(plan))
}

async fn rebalance_plan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RebalancePlanBody>,
) -> ApiResult<Json<RebalancePlan>> {
    let plan = body.into_request(&state.planner).plan()?;
    tracing::debug!(
        "Rebalance plan: {} rows, leftover {:.2}",
        plan.rows.len(),
        plan.totals.leftover_cash
    );
    Ok(Json(plan))
}

async fn drift_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DriftRequest>,
) -> ApiResult<Json<DriftReport>> {
    let report = body.report(state.planner.drift_band)?;
    Ok(Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plans/allocation", post(allocation_plan))
        .route("/plans/rebalance", post(rebalance_plan))
        .route("/drift", post(drift_report))
}
