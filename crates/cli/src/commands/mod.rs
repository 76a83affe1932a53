//! CLI command implementations.

pub mod analytics;
pub mod funnel;
pub mod migrate;
