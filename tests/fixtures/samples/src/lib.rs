//! Sample wrappers covering each hook and capability tier.

pub mod model;
pub mod names;
pub mod numbers;
pub mod scores;
