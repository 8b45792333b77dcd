//! Invoke Agent use case
//!
//! One agent call: ask the agent's consultation partners for guidance
//! (bounded by the [`ConsultationSession`]), build the enriched prompt, call
//! the reasoning gateway under a timeout, and fold the outcome into the
//! agent's stats on both the success and failure paths.

use crate::config::OrchestrationParams;
use crate::ports::agent_config_store::{AgentConfigStore, EmptyConfigStore};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::reasoning_gateway::{CompletionRequest, ReasoningGateway};
use conclave_domain::{
    AdmissionDenial, AgentCallOutcome, AgentEndpointConfig, AgentId, AgentRecord, AgentRegistry,
    AgentResponse, ConsultationDepthExceeded, ConsultationEntry, ConsultationSession,
    PromptParts, PromptTemplate, UserId, consultation_confidence, query_fingerprint,
    response_confidence,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Registry shared between the invoker and the orchestrator.
pub type SharedRegistry = Arc<RwLock<AgentRegistry>>;

/// Errors of a single agent invocation.
///
/// None of these abort an orchestration; they mark one agent as failed.
#[derive(Error, Debug, Clone)]
pub enum InvokeError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Agent {0} has no credential configured")]
    AgentNotConfigured(AgentId),

    #[error("Agent {agent} call failed: {reason}")]
    AgentCallFailed { agent: AgentId, reason: String },

    #[error("Agent {agent} timed out after {seconds}s")]
    Timeout { agent: AgentId, seconds: u64 },

    #[error("Agent {agent} rate limited: {denial}")]
    RateLimited {
        agent: AgentId,
        denial: AdmissionDenial,
    },
}

/// Errors of a consultation.
#[derive(Error, Debug, Clone)]
pub enum ConsultError {
    #[error(transparent)]
    DepthExceeded(#[from] ConsultationDepthExceeded),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// Per-request data every agent call needs.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub user: UserId,
    pub context: BTreeMap<String, String>,
    /// Compute profile of the caller's tier, forwarded to the gateway.
    pub compute_profile: Option<String>,
    /// Complexity of the top-level query; decides whether the master joins.
    pub complexity: f64,
}

impl InvocationContext {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            context: BTreeMap::new(),
            compute_profile: None,
            complexity: 0.0,
        }
    }

    pub fn with_context(mut self, context: BTreeMap<String, String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_compute_profile(mut self, profile: impl Into<String>) -> Self {
        self.compute_profile = Some(profile.into());
        self
    }

    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }
}

/// Calls agents, including the nested consultations they trigger.
pub struct AgentInvoker<G: ReasoningGateway + 'static> {
    gateway: Arc<G>,
    registry: SharedRegistry,
    config_store: Arc<dyn AgentConfigStore>,
    logger: Arc<dyn ConversationLogger>,
    default_config: AgentEndpointConfig,
    params: OrchestrationParams,
}

impl<G: ReasoningGateway + 'static> AgentInvoker<G> {
    pub fn new(gateway: Arc<G>, registry: SharedRegistry) -> Self {
        Self {
            gateway,
            registry,
            config_store: Arc::new(EmptyConfigStore),
            logger: Arc::new(NoConversationLogger),
            default_config: AgentEndpointConfig::fallback("default"),
            params: OrchestrationParams::default(),
        }
    }

    pub fn with_config_store(mut self, store: Arc<dyn AgentConfigStore>) -> Self {
        self.config_store = store;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Configuration used for agents the store knows nothing about.
    pub fn with_default_config(mut self, config: AgentEndpointConfig) -> Self {
        self.default_config = config;
        self
    }

    pub fn with_params(mut self, params: OrchestrationParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &OrchestrationParams {
        &self.params
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Top-level call of `agent` for `query`.
    pub async fn invoke(
        &self,
        agent: &AgentId,
        query: &str,
        ctx: &InvocationContext,
    ) -> Result<AgentResponse, InvokeError> {
        let session = ConsultationSession::top_level(self.params.max_consultation_depth);
        self.invoke_in_session(agent, query, ctx, session).await
    }

    /// Ask `consultant` for guidance on `query` on behalf of `requester`.
    ///
    /// A missing requester starts a fresh session at depth zero. Fails with
    /// [`ConsultError::DepthExceeded`] when the session is already at its
    /// maximum depth.
    pub async fn consult(
        &self,
        consultant: &AgentId,
        query: &str,
        requester: Option<&AgentId>,
        ctx: &InvocationContext,
        session: &ConsultationSession,
    ) -> Result<ConsultationEntry, ConsultError> {
        let nested = session.for_requester(requester).enter()?;
        let requester_record = match requester {
            Some(id) => Some(self.lookup(id)?),
            None => None,
        };
        let consultant_record = self.lookup(consultant)?;
        let prompt =
            PromptTemplate::consultation_prompt(requester_record.as_ref(), &consultant_record, query);
        let depth = nested.depth();

        let result = self
            .invoke_in_session(consultant, &prompt, ctx, nested)
            .await;

        self.logger.log(ConversationEvent::new(
            "consultation",
            serde_json::json!({
                "consultant": consultant.as_str(),
                "requester": requester.map(AgentId::as_str),
                "depth": depth,
                "success": result.is_ok(),
            }),
        ));

        let response = result?;
        debug!(
            consultant = %consultant,
            depth,
            "Consultation answered ({} chars)",
            response.content.chars().count()
        );
        let confidence = consultation_confidence(&response.content);
        Ok(ConsultationEntry::answered(
            consultant.clone(),
            requester.cloned(),
            depth,
            response.content,
            confidence,
            response.cost,
        ))
    }

    /// Call `agent` within `session`.
    ///
    /// Boxed because consultations recurse back into this method.
    pub fn invoke_in_session<'a>(
        &'a self,
        agent: &'a AgentId,
        query: &'a str,
        ctx: &'a InvocationContext,
        session: ConsultationSession,
    ) -> BoxFuture<'a, Result<AgentResponse, InvokeError>> {
        async move {
            let started = Instant::now();
            let record = self.lookup(agent)?;

            let consultations = if session.can_consult() {
                self.gather_consultations(&record, query, ctx, &session)
                    .await
            } else {
                debug!(
                    agent = %agent,
                    depth = session.depth(),
                    "Consultation depth reached, answering without partners"
                );
                Vec::new()
            };

            let config = match self.resolve_config(agent).await {
                Ok(config) => config,
                Err(e) => {
                    warn!(agent = %agent, "{}, using default configuration", e);
                    self.default_config.clone()
                }
            };
            let memory = self.config_store.memory(agent, &ctx.user).await;
            let recent = &memory[memory.len().saturating_sub(self.params.memory_entries)..];
            let directives = self.config_store.strategic_directives().await;
            let hints = self.config_store.collaboration_hints(agent).await;

            let prompt = PromptTemplate::enriched_prompt(&PromptParts {
                directives: &directives,
                hints: &hints,
                memory: recent,
                consultations: &consultations,
                context: Some(&ctx.context),
                query,
            });
            let request = CompletionRequest {
                agent_id: agent.clone(),
                system_prompt: PromptTemplate::system_prompt(
                    &record,
                    config.prompt_template.as_deref(),
                ),
                prompt,
                config,
                compute_profile: ctx.compute_profile.clone(),
            };

            let fingerprint = query_fingerprint(query);
            let requester = session.requesting_agent().cloned();
            let outcome =
                tokio::time::timeout(self.params.call_timeout, self.gateway.complete(&request))
                    .await;
            let latency_ms = started.elapsed().as_millis() as u64;

            let result = match outcome {
                Ok(Ok(content)) => {
                    let confidence = response_confidence(&content);
                    self.record_outcome(
                        AgentCallOutcome::success(
                            agent.clone(),
                            fingerprint,
                            content.chars().count(),
                            latency_ms,
                            confidence,
                        )
                        .requested_by(requester),
                        session.depth(),
                        None,
                    );
                    let consulted_cost: f64 = consultations.iter().map(|c| c.cost).sum();
                    Ok(AgentResponse {
                        agent_id: agent.clone(),
                        specialization: record.specialization,
                        content,
                        confidence,
                        latency_ms,
                        cost: record.cost_per_call + consulted_cost,
                        consultations,
                    })
                }
                Ok(Err(e)) => Err(InvokeError::AgentCallFailed {
                    agent: agent.clone(),
                    reason: e.to_string(),
                }),
                Err(_) => Err(InvokeError::Timeout {
                    agent: agent.clone(),
                    seconds: self.params.call_timeout.as_secs(),
                }),
            };

            if let Err(e) = &result {
                warn!(agent = %agent, depth = session.depth(), "{}", e);
                self.record_outcome(
                    AgentCallOutcome::failure(agent.clone(), query_fingerprint(query), latency_ms)
                        .requested_by(session.requesting_agent().cloned()),
                    session.depth(),
                    Some(e.to_string()),
                );
            }
            result
        }
        .boxed()
    }

    async fn gather_consultations(
        &self,
        record: &AgentRecord,
        query: &str,
        ctx: &InvocationContext,
        session: &ConsultationSession,
    ) -> Vec<ConsultationEntry> {
        let partners = {
            let registry = read_registry(&self.registry);
            registry
                .consultation_partners(&record.id, session.requesting_agent(), ctx.complexity)
                .unwrap_or_default()
        };

        let mut entries = Vec::with_capacity(partners.len());
        for partner in partners {
            match self
                .consult(&partner.id, query, Some(&record.id), ctx, session)
                .await
            {
                Ok(entry) => entries.push(entry),
                Err(ConsultError::DepthExceeded(e)) => {
                    debug!(agent = %record.id, "{}", e);
                    break;
                }
                Err(ConsultError::Invoke(e)) => {
                    warn!(
                        agent = %record.id,
                        consultant = %partner.id,
                        "Consultation failed: {}", e
                    );
                    entries.push(ConsultationEntry::empty(
                        partner.id.clone(),
                        Some(record.id.clone()),
                        session.depth() + 1,
                        e.to_string(),
                    ));
                }
            }
        }
        entries
    }

    /// Configuration from the store, or the default one.
    ///
    /// A stored configuration without a credential counts as not configured
    /// whenever the default configuration carries one.
    async fn resolve_config(&self, agent: &AgentId) -> Result<AgentEndpointConfig, InvokeError> {
        match self.config_store.agent_config(agent).await {
            Some(config)
                if config.credential.is_some() || self.default_config.credential.is_none() =>
            {
                Ok(config)
            }
            Some(_) => Err(InvokeError::AgentNotConfigured(agent.clone())),
            None => {
                debug!(agent = %agent, "No stored configuration, using default");
                Ok(self.default_config.clone())
            }
        }
    }

    fn lookup(&self, agent: &AgentId) -> Result<AgentRecord, InvokeError> {
        read_registry(&self.registry)
            .get(agent)
            .cloned()
            .map_err(|_| InvokeError::UnknownAgent(agent.clone()))
    }

    fn record_outcome(&self, outcome: AgentCallOutcome, depth: u8, error: Option<String>) {
        {
            let mut registry = self
                .registry
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            registry.record_outcome(&outcome);
        }
        if outcome.success {
            info!(
                agent = %outcome.agent_id,
                depth,
                latency_ms = outcome.latency_ms,
                "Agent responded"
            );
        }
        self.logger.log(ConversationEvent::new(
            "agent_call",
            serde_json::json!({
                "agent": outcome.agent_id.as_str(),
                "requester": outcome.requesting_agent.as_ref().map(AgentId::as_str),
                "depth": depth,
                "fingerprint": outcome.query_fingerprint,
                "success": outcome.success,
                "latency_ms": outcome.latency_ms,
                "response_length": outcome.response_length,
                "confidence": outcome.confidence,
                "error": error,
            }),
        ));
    }
}

pub(crate) fn read_registry(
    registry: &SharedRegistry,
) -> std::sync::RwLockReadGuard<'_, AgentRegistry> {
    registry
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
