//! Prompt domain
//!
//! Builders for the prompts sent to the reasoning service: the enriched
//! prompt of a primary invocation and the framing of a consultation.

mod template;

pub use template::{CONSULTATION_EXCERPT_CHARS, MEMORY_ENTRY_CHARS, PromptParts, PromptTemplate};
