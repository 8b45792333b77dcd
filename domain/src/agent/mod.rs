//! Agent domain
//!
//! Agents are named specializations that each wrap one remote reasoning call.
//!
//! - [`entities`] - [`AgentRecord`](entities::AgentRecord), stats and call outcomes
//! - [`registry`] - the catalog plus the consultation affinity graph
//! - [`specialization`] - the five specialties
//! - [`value_objects`] - ids, endpoint config, collaboration hints

pub mod entities;
pub mod registry;
pub mod specialization;
pub mod value_objects;
