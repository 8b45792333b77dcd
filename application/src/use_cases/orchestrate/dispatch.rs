//! Agent dispatch shared by the orchestration patterns.
//!
//! Every primary agent call passes the per-agent rate check first and is
//! recorded against the agent's window once it succeeds. Concurrent
//! patterns run calls on a [`JoinSet`] bounded by a [`Semaphore`].

use crate::governance::RateGovernor;
use crate::ports::progress::ProgressNotifier;
use crate::ports::reasoning_gateway::ReasoningGateway;
use crate::use_cases::invoke_agent::{AgentInvoker, InvocationContext, InvokeError};
use conclave_domain::{
    AdmissionDecision, AgentRecord, AgentSubResult, RaceDecision, RaceSlot, decide_race,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::warn;

pub(super) struct Dispatcher<G: ReasoningGateway + 'static> {
    invoker: Arc<AgentInvoker<G>>,
    governor: Arc<RateGovernor>,
    max_concurrency: usize,
}

impl<G: ReasoningGateway + 'static> Clone for Dispatcher<G> {
    fn clone(&self) -> Self {
        Self {
            invoker: Arc::clone(&self.invoker),
            governor: Arc::clone(&self.governor),
            max_concurrency: self.max_concurrency,
        }
    }
}

/// Sub-results of a parallel race.
pub(super) struct RaceOutcome {
    /// One slot per agent, in dispatch order; `None` if the call was cut short.
    pub results: Vec<Option<AgentSubResult>>,
    /// Index of the earliest agent meeting the threshold.
    pub winner: Option<usize>,
}

impl<G: ReasoningGateway + 'static> Dispatcher<G> {
    pub(super) fn new(invoker: Arc<AgentInvoker<G>>, governor: Arc<RateGovernor>) -> Self {
        let max_concurrency = invoker.params().max_concurrency.max(1);
        Self {
            invoker,
            governor,
            max_concurrency,
        }
    }

    /// Run one agent and turn any failure into a failed sub-result.
    pub(super) async fn run_one(
        &self,
        agent: &AgentRecord,
        query: &str,
        ctx: &InvocationContext,
    ) -> AgentSubResult {
        let started = Instant::now();
        if let AdmissionDecision::Denied(denial) = self.governor.admit_agent(&agent.id).await {
            let err = InvokeError::RateLimited {
                agent: agent.id.clone(),
                denial,
            };
            warn!(agent = %agent.id, "{}", err);
            return AgentSubResult::failure(agent.id.clone(), err.to_string(), 0);
        }

        match self.invoker.invoke(&agent.id, query, ctx).await {
            Ok(response) => {
                self.governor.record_agent(&agent.id).await;
                response.into()
            }
            Err(e) => AgentSubResult::failure(
                agent.id.clone(),
                e.to_string(),
                started.elapsed().as_millis() as u64,
            ),
        }
    }

    /// Run every agent concurrently; sub-results come back in dispatch order.
    pub(super) async fn run_all(
        &self,
        agents: &[AgentRecord],
        query: &str,
        ctx: &InvocationContext,
        progress: &dyn ProgressNotifier,
    ) -> Vec<AgentSubResult> {
        let mut join_set = self.spawn_all(agents, query, ctx);
        let mut slots: Vec<Option<AgentSubResult>> = vec![None; agents.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    progress.on_agent_complete(&result.agent_id, result.success);
                    slots[index] = Some(result);
                }
                Err(e) => warn!("Agent task join error: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(agents)
            .map(|(slot, agent)| {
                slot.unwrap_or_else(|| {
                    AgentSubResult::failure(agent.id.clone(), "agent task did not complete", 0)
                })
            })
            .collect()
    }

    /// Run every agent concurrently until the race is decided.
    ///
    /// Remaining calls are aborted as soon as a winner is known.
    pub(super) async fn race(
        &self,
        agents: &[AgentRecord],
        query: &str,
        ctx: &InvocationContext,
        threshold: f64,
        progress: &dyn ProgressNotifier,
    ) -> RaceOutcome {
        let mut join_set = self.spawn_all(agents, query, ctx);
        let mut slots = vec![RaceSlot::Pending; agents.len()];
        let mut results: Vec<Option<AgentSubResult>> = vec![None; agents.len()];

        while let Some(joined) = join_set.join_next().await {
            let (index, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!("Agent task join error: {}", e);
                    continue;
                }
            };
            progress.on_agent_complete(&result.agent_id, result.success);
            slots[index] = if result.success {
                RaceSlot::Completed {
                    confidence: result.confidence,
                }
            } else {
                RaceSlot::Failed
            };
            results[index] = Some(result);

            match decide_race(&slots, threshold) {
                RaceDecision::Winner(winner) => {
                    join_set.abort_all();
                    return RaceOutcome {
                        results,
                        winner: Some(winner),
                    };
                }
                RaceDecision::Exhausted => break,
                RaceDecision::Undecided => {}
            }
        }

        RaceOutcome {
            results,
            winner: None,
        }
    }

    fn spawn_all(
        &self,
        agents: &[AgentRecord],
        query: &str,
        ctx: &InvocationContext,
    ) -> JoinSet<(usize, AgentSubResult)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for (index, agent) in agents.iter().enumerate() {
            let dispatcher = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let agent = agent.clone();
            let query = query.to_string();
            let ctx = ctx.clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = dispatcher.run_one(&agent, &query, &ctx).await;
                (index, result)
            });
        }
        join_set
    }
}
