//! Orchestrate use case
//!
//! The single entry point of the engine: validate the request, pick the
//! agents and the pattern, pass admission (rate, cost, monthly quota), run
//! the pattern and fuse the answers.
//!
//! Stages: Received → PatternSelected → Dispatching → Fused → Done, or
//! Failed when every agent of the pattern failed.

mod dispatch;
mod patterns;

use crate::governance::{RateGovernor, TierQuotaManager};
use crate::ports::clock::SystemClock;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reasoning_gateway::ReasoningGateway;
use crate::use_cases::invoke_agent::{
    AgentInvoker, InvocationContext, SharedRegistry, read_registry,
};
use conclave_domain::{
    AdmissionDecision, AdmissionDenial, AgentRecord, AgentSubResult, DomainError,
    OrchestrationPattern, OrchestrationRequest, OrchestrationResult, OrchestrationStage,
    QuotaStatus, RateLimits, Tier, UsageSnapshot, UserId, complexity_score,
};
use dispatch::Dispatcher;
use patterns::{PatternInput, planned_agents};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Response offered to the end user when every agent failed.
pub const FALLBACK_RESPONSE: &str =
    "We could not complete this request right now. Please try again in a moment.";

/// Errors surfaced by [`OrchestrateUseCase::orchestrate`]
#[derive(Error, Debug, Clone)]
pub enum OrchestrateError {
    #[error("Request denied: {0}")]
    Denied(AdmissionDenial),

    #[error("Every agent in the {pattern} pattern failed")]
    Failed {
        pattern: OrchestrationPattern,
        errors: Vec<AgentSubResult>,
        fallback_response: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),
}

impl OrchestrateError {
    pub fn denial(&self) -> Option<&AdmissionDenial> {
        match self {
            OrchestrateError::Denied(denial) => Some(denial),
            _ => None,
        }
    }
}

/// Who is asking, and under which subscription tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user: UserId,
    pub tier: Tier,
}

impl Caller {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            tier: Tier::default(),
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }
}

/// Use case for orchestrating one query across agents
pub struct OrchestrateUseCase<G: ReasoningGateway + 'static> {
    invoker: Arc<AgentInvoker<G>>,
    governor: Arc<RateGovernor>,
    quota: Arc<TierQuotaManager>,
    logger: Arc<dyn ConversationLogger>,
}

impl<G: ReasoningGateway + 'static> OrchestrateUseCase<G> {
    /// Use case with default limits and process-local governance state.
    pub fn new(invoker: AgentInvoker<G>) -> Self {
        let clock = Arc::new(SystemClock);
        Self {
            invoker: Arc::new(invoker),
            governor: Arc::new(RateGovernor::new(RateLimits::default(), clock.clone())),
            quota: Arc::new(TierQuotaManager::new(clock)),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_governor(mut self, governor: RateGovernor) -> Self {
        self.governor = Arc::new(governor);
        self
    }

    pub fn with_quota(mut self, quota: TierQuotaManager) -> Self {
        self.quota = Arc::new(quota);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &SharedRegistry {
        self.invoker.registry()
    }

    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    pub fn quota(&self) -> &TierQuotaManager {
        &self.quota
    }

    /// Current rate and spend of `user`.
    pub async fn get_usage(&self, user: &UserId) -> UsageSnapshot {
        self.governor.usage(user).await
    }

    /// Monthly quota position of `user` on `tier`.
    pub async fn get_tier_status(&self, user: &UserId, tier: Tier) -> QuotaStatus {
        self.quota.status(user, tier).await
    }

    /// Orchestrate with default (no-op) progress
    pub async fn orchestrate(
        &self,
        request: OrchestrationRequest,
        caller: &Caller,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        self.orchestrate_with_progress(request, caller, &NoProgress)
            .await
    }

    /// Orchestrate with progress callbacks
    pub async fn orchestrate_with_progress(
        &self,
        request: OrchestrationRequest,
        caller: &Caller,
        progress: &dyn ProgressNotifier,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        let started = Instant::now();
        stage(OrchestrationStage::Received, None);
        request.validate()?;

        let agents = self.select_agents(&request)?;
        let pattern = select_pattern(request.pattern.as_deref());
        let complexity = complexity_score(&request.query, request.context.len());
        let agents = planned_agents(pattern, &agents, complexity);
        stage(OrchestrationStage::PatternSelected, Some(pattern));
        info!(
            user = %caller.user,
            pattern = %pattern,
            complexity,
            "Orchestrating across {} agents",
            agents.len()
        );

        let projected_cost: f64 = agents.iter().map(|a| a.cost_per_call).sum();
        if let AdmissionDecision::Denied(denial) = self
            .governor
            .admit(&caller.user, None, projected_cost)
            .await
        {
            return Err(self.deny(caller, denial));
        }
        if let Some(denial) = self.saturated_agents(&agents).await {
            return Err(self.deny(caller, denial));
        }
        let reservation = self
            .quota
            .reserve(&caller.user, caller.tier)
            .await
            .map_err(|denial| self.deny(caller, denial))?;

        let ctx = InvocationContext::new(caller.user.clone())
            .with_context(request.context.clone())
            .with_compute_profile(self.quota.quota(caller.tier).compute_profile)
            .with_complexity(complexity);
        let input = PatternInput {
            agents: &agents,
            query: &request.query,
            ctx: &ctx,
            threshold: request.threshold_or(self.invoker.params().default_quality_threshold),
            complexity,
        };
        let dispatcher = Dispatcher::new(Arc::clone(&self.invoker), Arc::clone(&self.governor));

        stage(OrchestrationStage::Dispatching, Some(pattern));
        let ids: Vec<_> = agents.iter().map(|a| a.id.clone()).collect();
        progress.on_pattern_start(pattern, &ids);
        let outcome = patterns::run(pattern, &dispatcher, &input, progress).await;
        progress.on_pattern_complete(pattern, outcome.is_ok());

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(errors) => {
                self.quota.release(&reservation).await;
                stage(OrchestrationStage::Failed, Some(pattern));
                warn!(user = %caller.user, pattern = %pattern, "Every agent failed");
                self.logger.log(ConversationEvent::new(
                    "orchestration_failed",
                    serde_json::json!({
                        "user": caller.user.as_str(),
                        "pattern": pattern.as_str(),
                        "errors": errors
                            .iter()
                            .map(|e| serde_json::json!({
                                "agent": e.agent_id.as_str(),
                                "error": e.error,
                            }))
                            .collect::<Vec<_>>(),
                    }),
                ));
                return Err(OrchestrateError::Failed {
                    pattern,
                    errors,
                    fallback_response: FALLBACK_RESPONSE.to_string(),
                });
            }
        };
        stage(OrchestrationStage::Fused, Some(pattern));

        let total_cost = outcome.total_cost();
        self.governor.record(&caller.user, None, total_cost).await;

        let result = OrchestrationResult {
            agents_used: outcome.agents_used(),
            final_text: outcome.final_text,
            confidence: outcome.confidence,
            pattern,
            sub_results: outcome.sub_results,
            total_cost,
            total_latency_ms: started.elapsed().as_millis() as u64,
            metadata: Some(outcome.metadata),
        };
        stage(OrchestrationStage::Done, Some(pattern));
        info!(
            user = %caller.user,
            pattern = %pattern,
            confidence = result.confidence,
            cost = result.total_cost,
            "Orchestration complete"
        );
        self.logger.log(ConversationEvent::new(
            "orchestration_complete",
            serde_json::json!({
                "user": caller.user.as_str(),
                "pattern": pattern.as_str(),
                "agents_used": result.agents_used,
                "confidence": result.confidence,
                "total_cost": result.total_cost,
                "latency_ms": result.total_latency_ms,
                "consultations": result.consultation_count(),
            }),
        ));
        Ok(result)
    }

    /// Agents named by the request (unknown ids skipped), else every agent.
    fn select_agents(
        &self,
        request: &OrchestrationRequest,
    ) -> Result<Vec<AgentRecord>, DomainError> {
        let registry = read_registry(self.invoker.registry());
        let agents: Vec<AgentRecord> = match &request.agents {
            None => registry.agents().to_vec(),
            Some(ids) => ids
                .iter()
                .filter_map(|id| match registry.get(id) {
                    Ok(agent) => Some(agent.clone()),
                    Err(e) => {
                        warn!("{}, skipping", e);
                        None
                    }
                })
                .collect(),
        };
        if agents.is_empty() {
            return Err(DomainError::NoAgents);
        }
        Ok(agents)
    }

    /// Denial with the earliest retry hint when every planned agent is at its
    /// per-minute limit, else `None`.
    async fn saturated_agents(&self, agents: &[AgentRecord]) -> Option<AdmissionDenial> {
        let mut earliest: Option<AdmissionDenial> = None;
        for agent in agents {
            match self.governor.admit_agent(&agent.id).await {
                AdmissionDecision::Allowed => return None,
                AdmissionDecision::Denied(denial) => {
                    if earliest
                        .as_ref()
                        .is_none_or(|e| denial.retry_after_seconds < e.retry_after_seconds)
                    {
                        earliest = Some(denial);
                    }
                }
            }
        }
        earliest
    }

    fn deny(&self, caller: &Caller, denial: AdmissionDenial) -> OrchestrateError {
        warn!(
            user = %caller.user,
            reason = %denial.reason,
            retry_after = denial.retry_after_seconds,
            "{}", denial.message
        );
        self.logger.log(ConversationEvent::new(
            "admission_denied",
            serde_json::json!({
                "user": caller.user.as_str(),
                "reason": denial.reason.as_str(),
                "message": denial.message,
                "limit": denial.limit,
                "current": denial.current,
                "retry_after_seconds": denial.retry_after_seconds,
            }),
        ));
        OrchestrateError::Denied(denial)
    }
}

/// Requested pattern, falling back to adaptive.
fn select_pattern(requested: Option<&str>) -> OrchestrationPattern {
    match requested {
        None => OrchestrationPattern::Adaptive,
        Some(name) => name.parse().unwrap_or_else(|e| {
            warn!("{}, using adaptive", e);
            OrchestrationPattern::Adaptive
        }),
    }
}

fn stage(stage: OrchestrationStage, pattern: Option<OrchestrationPattern>) {
    debug!(
        stage = stage.as_str(),
        pattern = pattern.map(|p| p.as_str()),
        "Orchestration stage"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestrationParams;
    use crate::ports::clock::ManualClock;
    use crate::testing::{RecordingLogger, Reply, ScriptedGateway, default_registry, shared_registry};
    use conclave_domain::{AgentId, DenialReason, PatternMetadata, Specialization, TierQuota};
    use std::time::Duration;

    const T0: i64 = 1_717_200_000_000;

    fn agent(id: &str, quality: f64) -> AgentRecord {
        AgentRecord::new(id, id.to_uppercase(), Specialization::Analytical)
            .with_quality_threshold(quality)
            .with_cost(0.01)
    }

    struct Harness {
        use_case: OrchestrateUseCase<ScriptedGateway>,
        gateway: Arc<ScriptedGateway>,
        clock: Arc<ManualClock>,
        logger: Arc<RecordingLogger>,
    }

    fn harness(gateway: ScriptedGateway, registry: SharedRegistry, limits: RateLimits) -> Harness {
        let gateway = Arc::new(gateway);
        let clock = Arc::new(ManualClock::new(T0));
        let logger = Arc::new(RecordingLogger::default());
        let invoker = AgentInvoker::new(gateway.clone(), registry)
            .with_params(OrchestrationParams::default().with_max_consultation_depth(0));
        let use_case = OrchestrateUseCase::new(invoker)
            .with_governor(RateGovernor::new(limits, clock.clone()))
            .with_quota(TierQuotaManager::new(clock.clone()))
            .with_logger(logger.clone());
        Harness {
            use_case,
            gateway,
            clock,
            logger,
        }
    }

    fn three_agents(gateway: ScriptedGateway) -> Harness {
        harness(
            gateway,
            shared_registry(vec![agent("a1", 0.9), agent("a2", 0.9), agent("a3", 0.9)]),
            RateLimits::default(),
        )
    }

    fn alice() -> Caller {
        Caller::new("alice")
    }

    #[tokio::test]
    async fn test_sequential_stops_early_on_confident_answer() {
        let h = three_agents(ScriptedGateway::new().reply("a2", Reply::sized(970)));
        let request = OrchestrationRequest::new("Draft a plan")
            .with_pattern("sequential")
            .with_quality_threshold(0.9);

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();

        assert_eq!(
            h.gateway.called_agents(),
            vec![AgentId::new("a1"), AgentId::new("a2")]
        );
        assert_eq!(result.final_text.len(), 970);
        assert!((result.confidence - 0.97).abs() < 1e-9);
        assert_eq!(
            result.metadata,
            Some(PatternMetadata::Sequential {
                stopped_early: true,
                invoked: 2
            })
        );
    }

    #[tokio::test]
    async fn test_sequential_hands_excerpt_and_errors_forward() {
        let h = three_agents(ScriptedGateway::new().reply("a1", Reply::Fail("down".into())));
        let request = OrchestrationRequest::new("Draft a plan").with_pattern("sequential");

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();

        let calls = h.gateway.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[1].prompt.contains("- a1_error: "));
        assert!(calls[2].prompt.contains("- previous_agent: a2"));
        assert!(calls[2].prompt.contains("- previous_response: answer from a2"));
        assert_eq!(result.final_text, "answer from a3");
        assert_eq!(result.agents_used, vec![AgentId::new("a2"), AgentId::new("a3")]);
        assert_eq!(result.failed().count(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_surfaces_fallback_and_releases_quota() {
        let gateway = ScriptedGateway::new()
            .reply("a1", Reply::Fail("down".into()))
            .reply("a2", Reply::Fail("down".into()))
            .reply("a3", Reply::Fail("down".into()));
        let h = three_agents(gateway);
        let request = OrchestrationRequest::new("Draft a plan").with_pattern("ensemble");

        let err = h.use_case.orchestrate(request, &alice()).await.unwrap_err();

        match err {
            OrchestrateError::Failed {
                pattern,
                errors,
                fallback_response,
            } => {
                assert_eq!(pattern, OrchestrationPattern::Ensemble);
                assert_eq!(errors.len(), 3);
                assert_eq!(fallback_response, FALLBACK_RESPONSE);
            }
            other => panic!("unexpected error: {other}"),
        }
        let user = UserId::new("alice");
        assert_eq!(h.use_case.get_tier_status(&user, Tier::Basic).await.used, 0);
        assert_eq!(h.use_case.get_usage(&user).await.per_minute, 0);
        assert_eq!(h.logger.events("orchestration_failed").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_earliest_agent_meeting_threshold_wins() {
        let gateway = ScriptedGateway::new()
            .reply("a1", Reply::Delayed(Duration::from_secs(2), "x".repeat(500)))
            .reply("a2", Reply::sized(900))
            .reply("a3", Reply::sized(950));
        let h = three_agents(gateway);
        let request = OrchestrationRequest::new("q")
            .with_pattern("parallel")
            .with_quality_threshold(0.8);

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();

        assert_eq!(result.final_text.len(), 900);
        match result.metadata {
            Some(PatternMetadata::Parallel {
                met_threshold,
                winner,
                ..
            }) => {
                assert!(met_threshold);
                assert_eq!(winner, AgentId::new("a2"));
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_aborts_remaining_calls_once_decided() {
        let gateway = ScriptedGateway::new()
            .reply("a1", Reply::sized(900))
            .reply("a2", Reply::Delayed(Duration::from_secs(30), "late".into()));
        let h = harness(
            gateway,
            shared_registry(vec![agent("a1", 0.9), agent("a2", 0.9)]),
            RateLimits::default(),
        );
        let request = OrchestrationRequest::new("q").with_pattern("parallel");

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();

        assert_eq!(result.sub_results.len(), 1);
        assert_eq!(result.agents_used, vec![AgentId::new("a1")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_below_threshold_uses_competitive_score() {
        let gateway = ScriptedGateway::new()
            .reply("a1", Reply::sized(300))
            .reply("a2", Reply::sized(600))
            .reply("a3", Reply::sized(500));
        let h = three_agents(gateway);
        let request = OrchestrationRequest::new("q")
            .with_pattern("parallel")
            .with_quality_threshold(0.8);

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();

        match result.metadata {
            Some(PatternMetadata::Parallel {
                met_threshold,
                winner,
                scores,
                ..
            }) => {
                assert!(!met_threshold);
                assert_eq!(winner, AgentId::new("a2"));
                assert_eq!(scores.len(), 3);
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ensemble_drops_low_weight_section_but_keeps_its_confidence() {
        let gateway = ScriptedGateway::new()
            .reply("a", Reply::sized(800))
            .reply("b", Reply::sized(500));
        let h = harness(
            gateway,
            shared_registry(vec![agent("a", 0.9), agent("b", 0.1)]),
            RateLimits::default(),
        );
        let request = OrchestrationRequest::new("q").with_pattern("ensemble");

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();

        assert!(result.final_text.starts_with("### A (weight 0.94)"));
        assert!(!result.final_text.contains("### B"));
        let expected = (0.72 * 0.8 + 0.05 * 0.5) / 0.77;
        assert!((result.confidence - expected).abs() < 1e-9);
        assert_eq!(result.agents_used.len(), 2);
        assert!((result.total_cost - 0.02).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_competitive_tie_goes_to_earlier_agent() {
        let gateway = ScriptedGateway::new()
            .reply("a", Reply::sized(720))
            .reply("b", Reply::sized(810))
            .reply("c", Reply::sized(810));
        let h = harness(
            gateway,
            shared_registry(vec![agent("a", 1.0), agent("b", 1.0), agent("c", 1.0)]),
            RateLimits::default(),
        );
        let request = OrchestrationRequest::new("q").with_pattern("competitive");

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();

        match result.metadata {
            Some(PatternMetadata::Competitive {
                winner,
                winning_score,
                scores,
            }) => {
                assert_eq!(winner, AgentId::new("b"));
                assert!((winning_score - 0.81).abs() < 1e-9);
                assert_eq!(scores.len(), 3);
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_adaptive_simple_query_uses_best_priority_agent() {
        let h = harness(ScriptedGateway::new(), default_registry(), RateLimits::default());

        let result = h
            .use_case
            .orchestrate(OrchestrationRequest::new("hi"), &alice())
            .await
            .unwrap();

        assert_eq!(result.pattern, OrchestrationPattern::Adaptive);
        assert_eq!(h.gateway.called_agents(), vec![AgentId::new("strategist")]);
        match result.metadata {
            Some(PatternMetadata::Adaptive { selected, .. }) => {
                assert_eq!(selected, vec![AgentId::new("strategist")]);
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_pattern_falls_back_to_adaptive() {
        let h = three_agents(ScriptedGateway::new());
        let request = OrchestrationRequest::new("hi").with_pattern("round-robin");

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();
        assert_eq!(result.pattern, OrchestrationPattern::Adaptive);
    }

    #[tokio::test]
    async fn test_unknown_agents_are_skipped() {
        let h = three_agents(ScriptedGateway::new());
        let request = OrchestrationRequest::new("q")
            .with_pattern("sequential")
            .with_agents(["ghost", "a3"]);

        let result = h.use_case.orchestrate(request, &alice()).await.unwrap();
        assert_eq!(result.agents_used, vec![AgentId::new("a3")]);

        let request = OrchestrationRequest::new("q").with_agents(["ghost"]);
        let err = h.use_case.orchestrate(request, &alice()).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestrateError::InvalidRequest(DomainError::NoAgents)
        ));
    }

    #[tokio::test]
    async fn test_user_at_minute_limit_is_denied_until_window_moves() {
        let h = harness(
            ScriptedGateway::new(),
            shared_registry(vec![agent("a1", 0.9)]),
            RateLimits::default().with_user_per_minute(2),
        );
        for _ in 0..2 {
            h.use_case
                .orchestrate(OrchestrationRequest::new("q"), &alice())
                .await
                .unwrap();
        }

        let err = h
            .use_case
            .orchestrate(OrchestrationRequest::new("q"), &alice())
            .await
            .unwrap_err();
        let denial = err.denial().unwrap();
        assert_eq!(denial.reason, DenialReason::UserPerMinute);
        assert_eq!(denial.retry_after_seconds, 60);
        assert_eq!(h.logger.events("admission_denied").len(), 1);
        // A denied request never reaches an agent.
        assert_eq!(h.gateway.call_count(), 2);

        h.clock.advance_secs(60);
        assert!(
            h.use_case
                .orchestrate(OrchestrationRequest::new("q"), &alice())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_projected_cost_over_cap_is_denied() {
        let h = harness(
            ScriptedGateway::new(),
            shared_registry(vec![agent("a1", 0.9), agent("a2", 0.9)]),
            RateLimits::default().with_user_hourly_cost_cap(0.015),
        );
        let request = OrchestrationRequest::new("q").with_pattern("ensemble");

        let err = h.use_case.orchestrate(request, &alice()).await.unwrap_err();
        assert_eq!(err.denial().unwrap().reason, DenialReason::UserHourlyCost);
    }

    #[tokio::test]
    async fn test_tier_status_counts_one_per_successful_orchestration() {
        let h = three_agents(ScriptedGateway::new());
        let user = UserId::new("alice");
        let before = h.use_case.get_tier_status(&user, Tier::Basic).await;

        h.use_case
            .orchestrate(OrchestrationRequest::new("q"), &alice())
            .await
            .unwrap();

        let after = h.use_case.get_tier_status(&user, Tier::Basic).await;
        assert_eq!(after.used, before.used + 1);
        assert_eq!(after.limit, 250);
        assert_eq!(h.logger.events("orchestration_complete").len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_monthly_quota_is_denied() {
        let gateway = Arc::new(ScriptedGateway::new());
        let clock = Arc::new(ManualClock::new(T0));
        let invoker = AgentInvoker::new(
            gateway.clone(),
            shared_registry(vec![agent("a1", 0.9)]),
        );
        let use_case = OrchestrateUseCase::new(invoker)
            .with_governor(RateGovernor::new(RateLimits::default(), clock.clone()))
            .with_quota(TierQuotaManager::new(clock).with_quota(TierQuota {
                tier: Tier::Premium,
                monthly_limit: 1,
                compute_units: 2.5,
                compute_profile: "dedicated-gpu".to_string(),
            }));
        let caller = Caller::new("alice").with_tier(Tier::Premium);

        use_case
            .orchestrate(OrchestrationRequest::new("q"), &caller)
            .await
            .unwrap();
        let err = use_case
            .orchestrate(OrchestrationRequest::new("q"), &caller)
            .await
            .unwrap_err();

        assert_eq!(err.denial().unwrap().reason, DenialReason::MonthlyQuota);
        assert_eq!(gateway.calls()[0].compute_profile.as_deref(), Some("dedicated-gpu"));
    }

    #[tokio::test]
    async fn test_rate_limited_agent_counts_as_failed_slot() {
        let h = harness(
            ScriptedGateway::new(),
            shared_registry(vec![agent("a1", 0.9), agent("a2", 0.9)]),
            RateLimits::default().with_agent_per_minute(1),
        );
        h.use_case
            .orchestrate(
                OrchestrationRequest::new("q")
                    .with_pattern("sequential")
                    .with_agents(["a1"]),
                &alice(),
            )
            .await
            .unwrap();

        let result = h
            .use_case
            .orchestrate(
                OrchestrationRequest::new("q").with_pattern("competitive"),
                &alice(),
            )
            .await
            .unwrap();

        assert_eq!(result.agents_used, vec![AgentId::new("a2")]);
        let failed: Vec<_> = result.failed().collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].error.as_deref().unwrap().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_every_agent_at_limit_is_denied_with_retry_hint() {
        let h = harness(
            ScriptedGateway::new(),
            shared_registry(vec![agent("a1", 0.9)]),
            RateLimits::default().with_agent_per_minute(1),
        );
        h.use_case
            .orchestrate(OrchestrationRequest::new("q"), &alice())
            .await
            .unwrap();
        h.clock.advance_millis(10_000);

        let err = h
            .use_case
            .orchestrate(OrchestrationRequest::new("q"), &alice())
            .await
            .unwrap_err();

        let denial = err.denial().unwrap();
        assert_eq!(denial.reason, DenialReason::AgentPerMinute);
        assert_eq!(denial.retry_after_seconds, 50);
        assert_eq!(h.gateway.called_agents().len(), 1);
        assert_eq!(
            h.use_case.get_tier_status(&UserId::new("alice"), Tier::Basic).await.used,
            1
        );
    }

    #[tokio::test]
    async fn test_invalid_request() {
        let h = three_agents(ScriptedGateway::new());
        let err = h
            .use_case
            .orchestrate(OrchestrationRequest::new(""), &alice())
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestrateError::InvalidRequest(_)));
    }
}
