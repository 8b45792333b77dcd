//! Orchestration domain
//!
//! Types and pure fusion logic for dispatching one query to several agents
//! and combining their answers.
//!
//! - [`pattern`] - the five dispatch strategies and adaptive selection
//! - [`request`] - the immutable [`OrchestrationRequest`](request::OrchestrationRequest)
//! - [`entities`] - lifecycle stages of one orchestration
//! - [`value_objects`] - per-agent sub-results and the unified result
//! - [`fusion`] - ensemble weighting, competitive scoring, parallel racing

pub mod entities;
pub mod fusion;
pub mod pattern;
pub mod request;
pub mod value_objects;
