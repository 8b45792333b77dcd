//! Agent registry and consultation affinity
//!
//! The registry is the process-lifetime catalog of [`AgentRecord`]s. The
//! `partners` list on each record forms a fixed directed graph (the affinity
//! matrix). The graph may contain cycles; recursion through it is bounded by
//! the consultation depth, not by cycle detection.

use super::entities::{AgentCallOutcome, AgentRecord};
use super::specialization::Specialization;
use super::value_objects::AgentId;
use crate::analysis::COMPLEX_QUERY_THRESHOLD;
use crate::core::error::DomainError;

/// Catalog of agents in registration order.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<AgentRecord>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with one agent per specialization.
    ///
    /// | id | priority | cost | quality |
    /// |----|----------|------|---------|
    /// | creative | 3 | 0.020 | 0.80 |
    /// | analyst | 2 | 0.030 | 0.90 |
    /// | synthesizer | 2 | 0.025 | 0.85 |
    /// | strategist | 1 | 0.040 | 0.88 |
    /// | orchestrator | 1 | 0.050 | 0.95 |
    pub fn with_default_roster() -> Self {
        let mut registry = Self::new();
        registry.register(
            AgentRecord::new("creative", "Creative Generator", Specialization::Creative)
                .with_priority(3)
                .with_cost(0.02)
                .with_quality_threshold(0.80)
                .with_partners(["analyst", "synthesizer"]),
        );
        registry.register(
            AgentRecord::new("analyst", "Analytical Reviewer", Specialization::Analytical)
                .with_priority(2)
                .with_cost(0.03)
                .with_quality_threshold(0.90)
                .with_partners(["strategist", "synthesizer"]),
        );
        registry.register(
            AgentRecord::new("synthesizer", "Synthesis Engine", Specialization::Synthesis)
                .with_priority(2)
                .with_cost(0.025)
                .with_quality_threshold(0.85)
                .with_partners(["creative", "analyst", "strategist"]),
        );
        registry.register(
            AgentRecord::new("strategist", "Strategic Planner", Specialization::Strategic)
                .with_priority(1)
                .with_cost(0.04)
                .with_quality_threshold(0.88)
                .with_partners(["analyst", "orchestrator"]),
        );
        registry.register(
            AgentRecord::new(
                "orchestrator",
                "Master Orchestrator",
                Specialization::MasterOrchestrator,
            )
            .with_priority(1)
            .with_cost(0.05)
            .with_quality_threshold(0.95)
            .with_partners(["creative", "analyst", "synthesizer", "strategist"]),
        );
        registry
    }

    /// Add an agent, replacing any existing record with the same id in place.
    pub fn register(&mut self, record: AgentRecord) {
        match self.agents.iter_mut().find(|a| a.id == record.id) {
            Some(existing) => *existing = record,
            None => self.agents.push(record),
        }
    }

    /// All agents in registration order.
    pub fn agents(&self) -> &[AgentRecord] {
        &self.agents
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: &AgentId) -> Result<&AgentRecord, DomainError> {
        self.agents
            .iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| DomainError::UnknownAgent(id.to_string()))
    }

    /// The first registered master orchestrator, if any.
    pub fn master(&self) -> Option<&AgentRecord> {
        self.agents.iter().find(|a| a.specialization.is_master())
    }

    /// Consultation partners for `id`, in affinity order.
    ///
    /// Deduplicated; never contains `id` itself or `requester`. Unknown
    /// partner ids in the matrix are skipped. When `complexity` reaches
    /// [`COMPLEX_QUERY_THRESHOLD`] the master orchestrator is appended even if
    /// the matrix does not list it.
    pub fn consultation_partners(
        &self,
        id: &AgentId,
        requester: Option<&AgentId>,
        complexity: f64,
    ) -> Result<Vec<AgentRecord>, DomainError> {
        let agent = self.get(id)?;
        let excluded = |candidate: &AgentId| candidate == id || Some(candidate) == requester;

        let mut partners: Vec<AgentRecord> = Vec::new();
        for partner_id in &agent.partners {
            if excluded(partner_id) || partners.iter().any(|p| &p.id == partner_id) {
                continue;
            }
            if let Ok(partner) = self.get(partner_id) {
                partners.push(partner.clone());
            }
        }

        if complexity >= COMPLEX_QUERY_THRESHOLD
            && let Some(master) = self.master()
            && !excluded(&master.id)
            && !partners.iter().any(|p| p.id == master.id)
        {
            partners.push(master.clone());
        }

        Ok(partners)
    }

    /// Fold a call outcome into the agent's rolling stats. Unknown ids are ignored.
    pub fn record_outcome(&mut self, outcome: &AgentCallOutcome) {
        if let Some(agent) = self.agents.iter_mut().find(|a| a.id == outcome.agent_id) {
            agent.stats.record(outcome);
        }
    }
}
