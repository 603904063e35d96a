//! Allocation planner: split a deposit by target percent.

mod allocation_model;
mod allocation_planner;

pub use allocation_model::*;
pub use allocation_planner::*;
