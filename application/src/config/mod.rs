//! Application-level configuration.
//!
//! - [`OrchestrationParams`] - depth, timeout and fan-out bounds of one orchestration

pub mod orchestration_params;

pub use orchestration_params::OrchestrationParams;
