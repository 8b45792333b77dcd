//! Use cases
//!
//! - [`invoke_agent`] - one agent call with its nested consultations
//! - [`orchestrate`] - the public entry point running the five patterns

pub mod invoke_agent;
pub mod orchestrate;
