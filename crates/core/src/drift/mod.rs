//! Target-vs-current drift analysis with buy/sell suggestions.

mod drift_calculator;
mod drift_model;

pub use drift_calculator::*;
pub use drift_model::*;
