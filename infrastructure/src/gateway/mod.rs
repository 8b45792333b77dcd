//! Reasoning service adapter
//!
//! [`HttpReasoningGateway`] implements the
//! [`ReasoningGateway`](conclave_application::ReasoningGateway) port over an
//! OpenAI-compatible chat completions API.

mod http;
pub mod protocol;

pub use http::{AGENT_HEADER, COMPUTE_PROFILE_HEADER, HttpReasoningGateway};
