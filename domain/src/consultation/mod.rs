//! Consultation domain
//!
//! Before an agent answers, it may ask its affinity partners for guidance.
//! Those partners may in turn consult their own partners, down to a fixed
//! maximum depth.
//!
//! ```text
//! Idle → Consulting(0) → Consulting(1) → Consulting(2) → Responding → Done
//! ```
//!
//! The [`ConsultationSession`] is a small value passed down the call chain.
//! Entering a nested consultation produces a new session one level deeper;
//! the caller's own session is untouched, so depth is restored on every exit
//! path (success, failure, timeout, cancellation) without any cleanup code.

pub mod entities;
pub mod session;

pub use entities::ConsultationEntry;
pub use session::{ConsultationDepthExceeded, ConsultationSession, DEFAULT_MAX_CONSULTATION_DEPTH};
