//! Domain layer for conclave
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agents and affinity
//!
//! An agent is a named specialization wrapping one remote reasoning call.
//! Each agent lists preferred consultation partners; together these lists
//! form a fixed directed graph that may contain cycles.
//!
//! ## Consultation
//!
//! Before answering, an agent asks its partners for guidance. Nesting is
//! bounded by [`ConsultationSession`], which is passed by value.
//!
//! ## Patterns
//!
//! Five ways of dispatching a query and fusing answers: sequential,
//! parallel, ensemble, competitive and adaptive.
//!
//! ## Governance
//!
//! Sliding request/cost windows per user, agent and globally, plus monthly
//! quotas per subscription tier.

pub mod agent;
pub mod analysis;
pub mod config;
pub mod consultation;
pub mod core;
pub mod governance;
pub mod orchestration;
pub mod prompt;

// Re-export commonly used types
pub use agent::{
    entities::{AgentCallOutcome, AgentRecord, PerformanceStats},
    registry::AgentRegistry,
    specialization::Specialization,
    value_objects::{AgentEndpointConfig, AgentId, CollaborationHint},
};
pub use analysis::{
    COMPLEX_QUERY_THRESHOLD, complexity_score, consultation_confidence, query_fingerprint,
    response_confidence,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use consultation::{
    ConsultationDepthExceeded, ConsultationEntry, ConsultationSession,
    DEFAULT_MAX_CONSULTATION_DEPTH,
};
pub use crate::core::error::DomainError;
pub use governance::{
    AdmissionDecision, AdmissionDenial, DenialReason, QuotaStatus, RateLimits, SlidingWindow,
    Tier, TierQuota, UsageSnapshot, UserId, WindowEntry, WindowKey, WindowScope, WindowSpan,
    month_key, month_reset_epoch, quota_key,
};
pub use orchestration::{
    entities::OrchestrationStage,
    fusion::{
        ENSEMBLE_MIN_NORMALIZED_WEIGHT, EnsembleFusion, EnsembleInput, RaceDecision, RaceSlot,
        competitive_score, competitive_winner, decide_race, ensemble_fuse,
    },
    pattern::{OrchestrationPattern, adaptive_selection, should_stop_sequence},
    request::{DEFAULT_QUALITY_THRESHOLD, OrchestrationRequest},
    value_objects::{
        AgentResponse, AgentSubResult, CompetitiveScore, EnsembleWeight, OrchestrationResult,
        PatternMetadata,
    },
};
pub use prompt::{PromptParts, PromptTemplate};
