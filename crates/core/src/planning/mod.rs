//! Shared building blocks of the deposit planners: input model,
//! sanitization and the share-rounding engine.

mod planning_model;
mod sanitize;
mod share_rounding;

pub use planning_model::*;
pub use sanitize::*;
pub use share_rounding::*;
