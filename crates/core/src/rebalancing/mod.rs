//! Rebalance-deposit planner: fund drift shortfalls, then spread the rest.

mod rebalancing_model;
mod rebalancing_planner;

pub use rebalancing_model::*;
pub use rebalancing_planner::*;

#[cfg(test)]
mod rebalancing_planner_tests;
