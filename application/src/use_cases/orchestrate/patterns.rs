//! The five orchestration patterns.
//!
//! Each pattern returns either a [`PatternOutcome`] or, when no agent
//! succeeded, every failed sub-result.

use super::dispatch::Dispatcher;
use crate::ports::progress::ProgressNotifier;
use crate::ports::reasoning_gateway::ReasoningGateway;
use crate::use_cases::invoke_agent::InvocationContext;
use conclave_domain::core::string::excerpt;
use conclave_domain::{
    AgentId, AgentRecord, AgentSubResult, CompetitiveScore, EnsembleInput, OrchestrationPattern,
    PatternMetadata, adaptive_selection, competitive_score, competitive_winner, ensemble_fuse,
    should_stop_sequence,
};
use tracing::{debug, info};

/// Characters of the previous answer handed to the next sequential agent.
pub(super) const PREVIOUS_RESPONSE_EXCERPT_CHARS: usize = 200;

/// Fused answer of one pattern run.
#[derive(Debug, Clone)]
pub(super) struct PatternOutcome {
    pub final_text: String,
    pub confidence: f64,
    pub sub_results: Vec<AgentSubResult>,
    pub metadata: PatternMetadata,
}

impl PatternOutcome {
    pub(super) fn agents_used(&self) -> Vec<AgentId> {
        self.sub_results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.agent_id.clone())
            .collect()
    }

    pub(super) fn total_cost(&self) -> f64 {
        self.sub_results.iter().map(|r| r.cost).sum()
    }
}

pub(super) type PatternResult = Result<PatternOutcome, Vec<AgentSubResult>>;

/// Agents a pattern will actually dispatch to.
///
/// Adaptive narrows the list by complexity; every other pattern uses it as is.
pub(super) fn planned_agents(
    pattern: OrchestrationPattern,
    agents: &[AgentRecord],
    complexity: f64,
) -> Vec<AgentRecord> {
    match pattern {
        OrchestrationPattern::Adaptive => {
            let selected = adaptive_selection(complexity, agents);
            selected
                .iter()
                .filter_map(|id| agents.iter().find(|a| &a.id == id).cloned())
                .collect()
        }
        _ => agents.to_vec(),
    }
}

pub(super) struct PatternInput<'a> {
    pub agents: &'a [AgentRecord],
    pub query: &'a str,
    pub ctx: &'a InvocationContext,
    pub threshold: f64,
    pub complexity: f64,
}

pub(super) async fn run<G: ReasoningGateway + 'static>(
    pattern: OrchestrationPattern,
    dispatcher: &Dispatcher<G>,
    input: &PatternInput<'_>,
    progress: &dyn ProgressNotifier,
) -> PatternResult {
    match pattern {
        OrchestrationPattern::Sequential => sequential(dispatcher, input, progress).await,
        OrchestrationPattern::Parallel => parallel(dispatcher, input, progress).await,
        OrchestrationPattern::Ensemble => ensemble(dispatcher, input, progress).await,
        OrchestrationPattern::Competitive => competitive(dispatcher, input, progress).await,
        OrchestrationPattern::Adaptive => adaptive(dispatcher, input, progress).await,
    }
}

struct SequentialRun {
    sub_results: Vec<AgentSubResult>,
    final_index: usize,
    stopped_early: bool,
}

/// Agents in order, each seeing an excerpt of the previous answer.
async fn run_sequence<G: ReasoningGateway + 'static>(
    dispatcher: &Dispatcher<G>,
    input: &PatternInput<'_>,
    progress: &dyn ProgressNotifier,
) -> Result<SequentialRun, Vec<AgentSubResult>> {
    let mut ctx = input.ctx.clone();
    let mut sub_results: Vec<AgentSubResult> = Vec::with_capacity(input.agents.len());
    let mut final_index = None;
    let mut stopped_early = false;

    for (position, agent) in input.agents.iter().enumerate() {
        let result = dispatcher.run_one(agent, input.query, &ctx).await;
        progress.on_agent_complete(&result.agent_id, result.success);

        if !result.success {
            ctx.context.insert(
                format!("{}_error", agent.id),
                result.error.clone().unwrap_or_default(),
            );
            sub_results.push(result);
            continue;
        }

        ctx.context
            .insert("previous_agent".to_string(), agent.id.to_string());
        ctx.context.insert(
            "previous_response".to_string(),
            excerpt(result.content.trim(), PREVIOUS_RESPONSE_EXCERPT_CHARS).to_string(),
        );
        let is_last = position + 1 == input.agents.len();
        let stop = should_stop_sequence(result.confidence, is_last);
        final_index = Some(sub_results.len());
        sub_results.push(result);

        if stop {
            debug!(agent = %agent.id, "Confident answer, stopping the sequence early");
            stopped_early = true;
            break;
        }
    }

    match final_index {
        Some(final_index) => Ok(SequentialRun {
            sub_results,
            final_index,
            stopped_early,
        }),
        None => Err(sub_results),
    }
}

async fn sequential<G: ReasoningGateway + 'static>(
    dispatcher: &Dispatcher<G>,
    input: &PatternInput<'_>,
    progress: &dyn ProgressNotifier,
) -> PatternResult {
    let run = run_sequence(dispatcher, input, progress).await?;
    let last = &run.sub_results[run.final_index];
    Ok(PatternOutcome {
        final_text: last.content.clone(),
        confidence: last.confidence,
        metadata: PatternMetadata::Sequential {
            stopped_early: run.stopped_early,
            invoked: run.sub_results.len(),
        },
        sub_results: run.sub_results,
    })
}

async fn parallel<G: ReasoningGateway + 'static>(
    dispatcher: &Dispatcher<G>,
    input: &PatternInput<'_>,
    progress: &dyn ProgressNotifier,
) -> PatternResult {
    let race = dispatcher
        .race(input.agents, input.query, input.ctx, input.threshold, progress)
        .await;

    if let Some(winner) = race.winner.and_then(|i| race.results[i].clone()) {
        info!(agent = %winner.agent_id, "Parallel winner met the threshold");
        let sub_results: Vec<AgentSubResult> = race.results.into_iter().flatten().collect();
        return Ok(PatternOutcome {
            final_text: winner.content.clone(),
            confidence: winner.confidence,
            metadata: PatternMetadata::Parallel {
                threshold: input.threshold,
                met_threshold: true,
                winner: winner.agent_id,
                scores: Vec::new(),
            },
            sub_results,
        });
    }

    // Nobody met the threshold: fall back to the best competitive score.
    let sub_results: Vec<AgentSubResult> = race.results.into_iter().flatten().collect();
    let (scores, best) = score(input.agents, &sub_results);
    let Some(best) = best else {
        return Err(sub_results);
    };
    let winner = &sub_results[best];
    Ok(PatternOutcome {
        final_text: winner.content.clone(),
        confidence: winner.confidence,
        metadata: PatternMetadata::Parallel {
            threshold: input.threshold,
            met_threshold: false,
            winner: winner.agent_id.clone(),
            scores,
        },
        sub_results,
    })
}

async fn ensemble<G: ReasoningGateway + 'static>(
    dispatcher: &Dispatcher<G>,
    input: &PatternInput<'_>,
    progress: &dyn ProgressNotifier,
) -> PatternResult {
    let sub_results = dispatcher
        .run_all(input.agents, input.query, input.ctx, progress)
        .await;

    let inputs: Vec<EnsembleInput> = sub_results
        .iter()
        .zip(input.agents)
        .filter(|(result, _)| result.success)
        .map(|(result, agent)| EnsembleInput {
            agent_id: agent.id.clone(),
            display_name: agent.display_name.clone(),
            quality_threshold: agent.quality_threshold,
            confidence: result.confidence,
            content: result.content.clone(),
        })
        .collect();
    if inputs.is_empty() {
        return Err(sub_results);
    }

    let fusion = ensemble_fuse(&inputs);
    Ok(PatternOutcome {
        final_text: fusion.text,
        confidence: fusion.confidence,
        metadata: PatternMetadata::Ensemble {
            weights: fusion.weights,
        },
        sub_results,
    })
}

async fn competitive<G: ReasoningGateway + 'static>(
    dispatcher: &Dispatcher<G>,
    input: &PatternInput<'_>,
    progress: &dyn ProgressNotifier,
) -> PatternResult {
    let sub_results = dispatcher
        .run_all(input.agents, input.query, input.ctx, progress)
        .await;

    let (scores, best) = score(input.agents, &sub_results);
    let Some(best) = best else {
        return Err(sub_results);
    };
    let winner = &sub_results[best];
    let winning_score = scores
        .iter()
        .find(|s| s.agent_id == winner.agent_id)
        .map_or(0.0, |s| s.score);
    Ok(PatternOutcome {
        final_text: winner.content.clone(),
        confidence: winner.confidence,
        metadata: PatternMetadata::Competitive {
            winner: winner.agent_id.clone(),
            winning_score,
            scores,
        },
        sub_results,
    })
}

async fn adaptive<G: ReasoningGateway + 'static>(
    dispatcher: &Dispatcher<G>,
    input: &PatternInput<'_>,
    progress: &dyn ProgressNotifier,
) -> PatternResult {
    // `input.agents` is already the adaptive selection (see `planned_agents`).
    let run = run_sequence(dispatcher, input, progress).await?;
    let last = &run.sub_results[run.final_index];
    Ok(PatternOutcome {
        final_text: last.content.clone(),
        confidence: last.confidence,
        metadata: PatternMetadata::Adaptive {
            complexity: input.complexity,
            selected: input.agents.iter().map(|a| a.id.clone()).collect(),
            stopped_early: run.stopped_early,
        },
        sub_results: run.sub_results,
    })
}

/// Competitive scores of the successful sub-results, and the index (into
/// `sub_results`) of the winner.
fn score(
    agents: &[AgentRecord],
    sub_results: &[AgentSubResult],
) -> (Vec<CompetitiveScore>, Option<usize>) {
    let mut scores = Vec::new();
    let mut positions = Vec::new();
    for (position, result) in sub_results.iter().enumerate() {
        if !result.success {
            continue;
        }
        let quality = agents
            .iter()
            .find(|a| a.id == result.agent_id)
            .map_or(0.0, |a| a.quality_threshold);
        scores.push(CompetitiveScore {
            agent_id: result.agent_id.clone(),
            score: competitive_score(result.confidence, result.latency_ms, quality),
        });
        positions.push(position);
    }
    let best = competitive_winner(&scores).map(|i| positions[i]);
    (scores, best)
}
