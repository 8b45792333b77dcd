//! Sliding-window rate and cost governor.
//!
//! Windows live in a [`WindowStore`]. When a shared store is configured but
//! unreachable, the governor logs the failure and continues on its
//! process-local windows, so governance infrastructure never blocks a
//! request. Local windows under-count when several processes share a user.

use super::memory_store::InMemoryWindowStore;
use crate::ports::clock::Clock;
use crate::ports::window_store::WindowStore;
use conclave_domain::{
    AdmissionDecision, AdmissionDenial, AgentId, DenialReason, RateLimits, SlidingWindow,
    UsageSnapshot, UserId, WindowEntry, WindowKey, WindowScope, WindowSpan,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Gates every request and agent call against the configured [`RateLimits`].
pub struct RateGovernor {
    limits: RateLimits,
    shared: Option<Arc<dyn WindowStore>>,
    local: InMemoryWindowStore,
    clock: Arc<dyn Clock>,
}

impl RateGovernor {
    /// Governor backed only by process-local windows.
    pub fn new(limits: RateLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            limits,
            shared: None,
            local: InMemoryWindowStore::new(),
            clock,
        }
    }

    /// Use `store` as the primary window store.
    pub fn with_shared_store(mut self, store: Arc<dyn WindowStore>) -> Self {
        self.shared = Some(store);
        self
    }

    pub fn limits(&self) -> &RateLimits {
        &self.limits
    }

    /// Check whether `user` (and optionally `agent`) may make a call costing
    /// `projected_cost`.
    ///
    /// Checks run in order: user per minute, user per hour, user hourly cost,
    /// agent per minute, global per minute. The first failing check decides.
    pub async fn admit(
        &self,
        user: &UserId,
        agent: Option<&AgentId>,
        projected_cost: f64,
    ) -> AdmissionDecision {
        let now = self.clock.now_millis();
        let user_scope = WindowScope::User(user.clone());

        let mut minute = self
            .window(&WindowKey::requests(user_scope.clone(), WindowSpan::Minute), now)
            .await;
        if let Some(denial) = count_denial(
            &mut minute,
            now,
            self.limits.user_per_minute,
            DenialReason::UserPerMinute,
            format!(
                "Rate limit exceeded: {} requests per minute",
                self.limits.user_per_minute
            ),
        ) {
            return AdmissionDecision::Denied(denial);
        }

        let mut hour = self
            .window(&WindowKey::requests(user_scope.clone(), WindowSpan::Hour), now)
            .await;
        if let Some(denial) = count_denial(
            &mut hour,
            now,
            self.limits.user_per_hour,
            DenialReason::UserPerHour,
            format!(
                "Rate limit exceeded: {} requests per hour",
                self.limits.user_per_hour
            ),
        ) {
            return AdmissionDecision::Denied(denial);
        }

        let mut spend = self
            .window(&WindowKey::cost(user_scope, WindowSpan::Hour), now)
            .await;
        let current = spend.total(now);
        let cap = self.limits.user_hourly_cost_cap;
        if current + projected_cost > cap {
            let excess = current + projected_cost - cap;
            let retry_after_seconds = spend
                .seconds_until_released(now, excess)
                .unwrap_or(WindowSpan::Hour.seconds());
            return AdmissionDecision::Denied(AdmissionDenial {
                reason: DenialReason::UserHourlyCost,
                message: format!("Cost limit exceeded: ${:.2} per hour", cap),
                limit: cap,
                current,
                retry_after_seconds,
            });
        }

        if let Some(agent) = agent
            && let AdmissionDecision::Denied(denial) = self.agent_decision(agent, now).await
        {
            return AdmissionDecision::Denied(denial);
        }

        let mut global = self
            .window(&WindowKey::requests(WindowScope::Global, WindowSpan::Minute), now)
            .await;
        if let Some(denial) = count_denial(
            &mut global,
            now,
            self.limits.global_per_minute,
            DenialReason::GlobalPerMinute,
            format!(
                "Global rate limit exceeded: {} requests per minute",
                self.limits.global_per_minute
            ),
        ) {
            return AdmissionDecision::Denied(denial);
        }

        AdmissionDecision::Allowed
    }

    /// Record a completed request for `user`.
    ///
    /// Only called after success. Appends to the user, global and (when
    /// given) agent windows, and to the cost window when `cost` is positive.
    pub async fn record(&self, user: &UserId, agent: Option<&AgentId>, cost: f64) {
        let now = self.clock.now_millis();
        let user_scope = WindowScope::User(user.clone());

        self.append(
            &WindowKey::requests(user_scope.clone(), WindowSpan::Minute),
            WindowEntry::hit(now),
        )
        .await;
        self.append(
            &WindowKey::requests(user_scope.clone(), WindowSpan::Hour),
            WindowEntry::hit(now),
        )
        .await;
        if cost > 0.0 {
            self.append(
                &WindowKey::cost(user_scope, WindowSpan::Hour),
                WindowEntry::cost(now, cost),
            )
            .await;
        }
        self.append(
            &WindowKey::requests(WindowScope::Global, WindowSpan::Minute),
            WindowEntry::hit(now),
        )
        .await;
        if let Some(agent) = agent {
            self.record_agent(agent).await;
        }
        debug!(user = %user, cost, "Recorded request");
    }

    /// Per-agent check only, used before each agent call inside a pattern.
    pub async fn admit_agent(&self, agent: &AgentId) -> AdmissionDecision {
        let now = self.clock.now_millis();
        self.agent_decision(agent, now).await
    }

    /// Record one completed call of `agent`.
    pub async fn record_agent(&self, agent: &AgentId) {
        let now = self.clock.now_millis();
        self.append(
            &WindowKey::requests(WindowScope::Agent(agent.clone()), WindowSpan::Minute),
            WindowEntry::hit(now),
        )
        .await;
    }

    /// Current consumption of `user`.
    pub async fn usage(&self, user: &UserId) -> UsageSnapshot {
        let now = self.clock.now_millis();
        let user_scope = WindowScope::User(user.clone());
        let mut minute = self
            .window(&WindowKey::requests(user_scope.clone(), WindowSpan::Minute), now)
            .await;
        let mut hour = self
            .window(&WindowKey::requests(user_scope.clone(), WindowSpan::Hour), now)
            .await;
        let mut spend = self
            .window(&WindowKey::cost(user_scope, WindowSpan::Hour), now)
            .await;
        UsageSnapshot {
            per_minute: minute.count(now) as u32,
            per_hour: hour.count(now) as u32,
            cost_per_hour: spend.total(now),
        }
    }

    async fn agent_decision(&self, agent: &AgentId, now: i64) -> AdmissionDecision {
        let mut window = self
            .window(
                &WindowKey::requests(WindowScope::Agent(agent.clone()), WindowSpan::Minute),
                now,
            )
            .await;
        match count_denial(
            &mut window,
            now,
            self.limits.agent_per_minute,
            DenialReason::AgentPerMinute,
            format!(
                "Agent {} rate limit exceeded: {} calls per minute",
                agent, self.limits.agent_per_minute
            ),
        ) {
            Some(denial) => AdmissionDecision::Denied(denial),
            None => AdmissionDecision::Allowed,
        }
    }

    async fn window(&self, key: &WindowKey, now: i64) -> SlidingWindow {
        let span_ms = key.span.millis();
        if let Some(shared) = &self.shared {
            match shared.live_entries(key, now).await {
                Ok(entries) => return SlidingWindow::from_entries(span_ms, entries, now),
                Err(e) => warn!(
                    key = %key.storage_key(),
                    "Window store read failed, using local windows: {}", e
                ),
            }
        }
        let entries = self.local.live_entries(key, now).await.unwrap_or_default();
        SlidingWindow::from_entries(span_ms, entries, now)
    }

    async fn append(&self, key: &WindowKey, entry: WindowEntry) {
        if let Some(shared) = &self.shared {
            match shared.append(key, entry).await {
                Ok(()) => return,
                Err(e) => warn!(
                    key = %key.storage_key(),
                    "Window store write failed, using local windows: {}", e
                ),
            }
        }
        // The local store cannot fail.
        let _ = self.local.append(key, entry).await;
    }
}

fn count_denial(
    window: &mut SlidingWindow,
    now: i64,
    limit: u32,
    reason: DenialReason,
    message: String,
) -> Option<AdmissionDenial> {
    let current = window.count(now);
    if current < limit as usize {
        return None;
    }
    Some(AdmissionDenial {
        reason,
        message,
        limit: f64::from(limit),
        current: current as f64,
        retry_after_seconds: window.seconds_until_oldest_expires(now),
    })
}
