//! Rebalancer Core - deposit planning, drift analysis and scenarios.
//!
//! This crate contains the pure planning engine behind the investment
//! dashboard: the allocation planner, the rebalance-deposit planner and the
//! shared sanitization and share-rounding utilities they are built on.
//! It is storage-agnostic and defines traits that outer layers implement.

pub mod allocation;
pub mod constants;
pub mod drift;
pub mod errors;
pub mod planning;
pub mod rebalancing;
pub mod scenarios;

// Re-export the planner entry points and shared input types
pub use allocation::{compute_allocation_plan, AllocationPlan, AllocationRequest};
pub use drift::{compute_drift_report, DriftReport};
pub use planning::{Asset, RoundingMode};
pub use rebalancing::{compute_rebalance_plan, RebalancePlan, RebalanceRequest};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
