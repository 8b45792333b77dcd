//! Query and response heuristics.
//!
//! The scores here are deliberately simple length and keyword measures; no
//! trained model backs them. Every consumer relies on the exact formulas, so
//! changes must keep them stable.

pub mod complexity;
pub mod confidence;

pub use complexity::{COMPLEX_QUERY_THRESHOLD, complexity_score, technical_term_count};
pub use confidence::{consultation_confidence, query_fingerprint, response_confidence};
