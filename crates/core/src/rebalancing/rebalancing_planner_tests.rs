use std::collections::HashMap;

use super::*;
use crate::constants::MAX_PLANNABLE_AMOUNT;
use crate::errors::{Error, ValidationError};
use crate::planning::{Asset, RoundingMode};

const NO_LOCKS: [&str; 0] = [];

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn sixty_forty() -> Vec<Asset> {
    vec![
        Asset::new("A", 60.0).with_current(600.0, 60.0),
        Asset::new("B", 40.0).with_current(400.0, 40.0),
    ]
}

#[test]
fn locked_asset_absorbs_nothing() {
    let plan = compute_rebalance_plan(
        &sixty_forty(),
        200.0,
        RoundingMode::Exact,
        &HashMap::new(),
        ["B"],
        true,
    )
    .unwrap();

    let a = plan.row("A").unwrap();
    let b = plan.row("B").unwrap();
    assert_eq!(b.final_allocation, 0.0);
    assert!(b.locked);
    assert_close(a.final_allocation, 200.0);
    assert_close(plan.totals.leftover_cash, 0.0);

    assert_eq!(plan.totals.locked_count, 1);
    assert_eq!(plan.totals.needs_count, 1);
    assert_eq!(plan.totals.impacted_count, 1);
    assert_close(plan.totals.positive_needs_sum, 120.0);
    assert_close(a.new_percent, 800.0 / 1200.0 * 100.0);
    assert_close(plan.totals.max_delta_after, 800.0 / 12.0 - 60.0);
    assert!(!plan.warnings.no_active_assets);
}

#[test]
fn leftover_stays_idle_when_auto_distribution_is_off() {
    let plan = compute_rebalance_plan(
        &sixty_forty(),
        200.0,
        RoundingMode::Exact,
        &HashMap::new(),
        ["B"],
        false,
    )
    .unwrap();

    assert_close(plan.row("A").unwrap().final_allocation, 120.0);
    assert_eq!(plan.row("B").unwrap().final_allocation, 0.0);
    assert_close(plan.totals.leftover_cash, 80.0);
    assert_close(plan.totals.assigned, 120.0);
}

#[test]
fn shortfalls_are_scaled_down_when_the_deposit_is_short() {
    let assets = vec![
        Asset::new("A", 50.0).with_current(900.0, 90.0),
        Asset::new("B", 50.0).with_current(100.0, 10.0),
    ];

    let plan = compute_rebalance_plan(
        &assets,
        200.0,
        RoundingMode::Exact,
        &HashMap::new(),
        NO_LOCKS,
        true,
    )
    .unwrap();

    let a = plan.row("A").unwrap();
    let b = plan.row("B").unwrap();
    assert_close(a.raw_need, -300.0);
    assert_close(b.raw_need, 500.0);
    assert_eq!(a.final_allocation, 0.0);
    assert_close(b.final_allocation, 200.0);
    assert!(b.final_allocation <= b.raw_need);
    assert_eq!(plan.totals.leftover_cash, 0.0);
}

#[test]
fn drift_improvement_is_tracked() {
    let assets = vec![
        Asset::new("A", 50.0).with_current(700.0, 70.0),
        Asset::new("B", 50.0).with_current(300.0, 30.0),
    ];

    let plan = compute_rebalance_plan(
        &assets,
        200.0,
        RoundingMode::Exact,
        &HashMap::new(),
        NO_LOCKS,
        true,
    )
    .unwrap();

    let a = plan.row("A").unwrap();
    let b = plan.row("B").unwrap();
    assert_eq!(a.final_allocation, 0.0);
    assert_close(b.final_allocation, 200.0);
    assert_close(a.pre_delta, 20.0);
    assert_close(b.pre_delta, -20.0);
    assert_close(b.delta, 500.0 / 12.0 - 50.0);
    assert_eq!(plan.totals.resolved_count, 2);
    assert_eq!(plan.totals.impacted_count, 1);
    assert_close(plan.totals.max_delta_after, 700.0 / 12.0 - 50.0);
}

#[test]
fn nearest_grants_extra_shares_within_the_raw_assignment() {
    let mut prices = HashMap::new();
    prices.insert("A".to_string(), 16.0);
    prices.insert("B".to_string(), 30.0);

    let nearest = compute_rebalance_plan(
        &sixty_forty(),
        200.0,
        RoundingMode::Nearest,
        &prices,
        NO_LOCKS,
        true,
    )
    .unwrap();

    assert_eq!(nearest.row("A").unwrap().shares, Some(8.0));
    assert_eq!(nearest.row("B").unwrap().shares, Some(2.0));
    assert_close(nearest.totals.assigned, 188.0);
    assert_close(nearest.totals.leftover_cash, 12.0);
    assert!(nearest.totals.assigned <= nearest.totals.raw_assigned);
    assert!(nearest.totals.rounding_applied);

    let floor = compute_rebalance_plan(
        &sixty_forty(),
        200.0,
        RoundingMode::Floor,
        &prices,
        NO_LOCKS,
        true,
    )
    .unwrap();

    assert_eq!(floor.row("A").unwrap().shares, Some(7.0));
    assert_eq!(floor.row("B").unwrap().shares, Some(2.0));
    assert_close(floor.totals.leftover_cash, 28.0);
    assert_close(floor.row("A").unwrap().allocation_diff, -8.0);
}

#[test]
fn price_map_wins_over_asset_price() {
    let assets = vec![
        Asset::new("A", 60.0).with_current(600.0, 60.0).with_price(1000.0),
        Asset::new("B", 40.0).with_current(400.0, 40.0),
    ];
    let mut prices = HashMap::new();
    prices.insert("A".to_string(), 20.0);

    let plan = compute_rebalance_plan(
        &assets,
        200.0,
        RoundingMode::Floor,
        &prices,
        NO_LOCKS,
        true,
    )
    .unwrap();

    let a = plan.row("A").unwrap();
    assert_eq!(a.price, Some(20.0));
    assert_eq!(a.shares, Some(6.0));
    assert_eq!(plan.totals.price_coverage_count, 1);
    assert_eq!(plan.totals.missing_price_tickers, vec!["B"]);
    assert!(plan.warnings.missing_prices);
    assert_close(plan.row("B").unwrap().final_allocation, 80.0);
}

#[test]
fn zero_targets_fall_back_to_equal_weight() {
    let assets = vec![
        Asset::new("A", 0.0).with_current(100.0, 50.0),
        Asset::new("B", 0.0).with_current(100.0, 50.0),
    ];

    let plan = compute_rebalance_plan(
        &assets,
        100.0,
        RoundingMode::Exact,
        &HashMap::new(),
        NO_LOCKS,
        true,
    )
    .unwrap();

    assert!(plan.warnings.non_hundred_target);
    assert_eq!(plan.totals.effective_target, 2.0);
    assert_close(plan.row("A").unwrap().weight, 0.5);
    assert_close(plan.row("A").unwrap().final_allocation, 50.0);
    assert_close(plan.row("B").unwrap().final_allocation, 50.0);
}

#[test]
fn all_locked_assets_leave_the_deposit_unallocated() {
    let plan = compute_rebalance_plan(
        &sixty_forty(),
        300.0,
        RoundingMode::Exact,
        &HashMap::new(),
        vec!["A".to_string(), "B".to_string()],
        true,
    )
    .unwrap();

    assert!(plan.warnings.no_active_assets);
    assert!(!plan.warnings.zero_deposit);
    assert!(plan.rows.values().all(|r| r.final_allocation == 0.0));
    assert_eq!(plan.totals.leftover_cash, 300.0);
    assert_eq!(plan.totals.locked_count, 2);
    assert_eq!(plan.totals.needs_count, 0);
    assert_close(plan.row("A").unwrap().new_percent, 60.0);
}

#[test]
fn empty_asset_list_reports_the_full_deposit_as_leftover() {
    let plan = compute_rebalance_plan(
        &[],
        250.0,
        RoundingMode::Nearest,
        &HashMap::new(),
        NO_LOCKS,
        true,
    )
    .unwrap();

    assert!(plan.rows.is_empty());
    assert!(plan.warnings.no_active_assets);
    assert!(plan.warnings.zero_deposit);
    assert_eq!(plan.totals.leftover_cash, 250.0);
    assert_eq!(plan.totals.assigned, 0.0);
    assert_eq!(plan.totals.max_delta_after, 0.0);
}

#[test]
fn zero_deposit_keeps_holdings_unchanged() {
    let plan = compute_rebalance_plan(
        &sixty_forty(),
        f64::NAN,
        RoundingMode::Exact,
        &HashMap::new(),
        NO_LOCKS,
        true,
    )
    .unwrap();

    assert!(plan.warnings.zero_deposit);
    assert_eq!(plan.totals.deposit, 0.0);
    assert_eq!(plan.totals.impacted_count, 0);
    assert_eq!(plan.totals.leftover_cash, 0.0);
    for row in plan.rows.values() {
        assert_eq!(row.final_allocation, 0.0);
        assert_eq!(row.new_value, row.current_value);
    }
}

#[test]
fn extreme_values_still_produce_finite_allocations() {
    let assets = vec![
        Asset::new("A", 50.0).with_current(1.7e308, 50.0),
        Asset::new("B", 50.0),
    ];
    let plan = compute_rebalance_plan(
        &assets,
        1.7e308,
        RoundingMode::Exact,
        &HashMap::new(),
        NO_LOCKS,
        true,
    )
    .unwrap();

    for row in plan.rows.values() {
        assert!(row.final_allocation.is_finite() && row.final_allocation >= 0.0);
        assert!(row.new_percent.is_finite());
    }
    assert_eq!(plan.totals.deposit, MAX_PLANNABLE_AMOUNT);
    assert_close(plan.row("A").unwrap().final_allocation, 0.0);
    assert_close(plan.row("B").unwrap().final_allocation, MAX_PLANNABLE_AMOUNT);
    assert_eq!(plan.totals.leftover_cash, 0.0);
}

#[test]
fn request_defaults_to_auto_distribution() {
    let request: RebalanceRequest = serde_json::from_str(
        r#"{
            "assets": [
                {"key": "A", "targetPercent": 60, "currentValue": 600, "currentPercent": 60},
                {"key": "B", "targetPercent": 40, "currentValue": "400", "currentPercent": 40}
            ],
            "deposit": 200,
            "lockedKeys": ["B"]
        }"#,
    )
    .unwrap();

    assert!(request.auto_distribute_leftover);
    assert_eq!(request.rounding_mode, RoundingMode::Exact);

    let plan = request.plan().unwrap();
    assert_close(plan.row("A").unwrap().final_allocation, 200.0);
}

#[test]
fn blank_keys_fail_fast() {
    let assets = vec![Asset::new("", 100.0)];

    let result = compute_rebalance_plan(
        &assets,
        100.0,
        RoundingMode::Exact,
        &HashMap::new(),
        NO_LOCKS,
        true,
    );

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::MissingField(_)))
    ));
}
