//! Admission decisions

use serde::{Deserialize, Serialize};

/// Which limit rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    UserPerMinute,
    UserPerHour,
    UserHourlyCost,
    AgentPerMinute,
    GlobalPerMinute,
    MonthlyQuota,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::UserPerMinute => "user_per_minute",
            DenialReason::UserPerHour => "user_per_hour",
            DenialReason::UserHourlyCost => "user_hourly_cost",
            DenialReason::AgentPerMinute => "agent_per_minute",
            DenialReason::GlobalPerMinute => "global_per_minute",
            DenialReason::MonthlyQuota => "monthly_quota",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured rejection, detailed enough for the caller to schedule a retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionDenial {
    pub reason: DenialReason,
    pub message: String,
    pub limit: f64,
    pub current: f64,
    pub retry_after_seconds: u64,
}

impl std::fmt::Display for AdmissionDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (retry after {}s)",
            self.message, self.retry_after_seconds
        )
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdmissionDecision {
    Allowed,
    Denied(AdmissionDenial),
}

impl AdmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionDecision::Allowed)
    }

    pub fn denial(&self) -> Option<&AdmissionDenial> {
        match self {
            AdmissionDecision::Allowed => None,
            AdmissionDecision::Denied(denial) => Some(denial),
        }
    }

    /// Convert into a `Result`, for use with `?`.
    pub fn into_result(self) -> Result<(), AdmissionDenial> {
        match self {
            AdmissionDecision::Allowed => Ok(()),
            AdmissionDecision::Denied(denial) => Err(denial),
        }
    }
}

/// Current consumption of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub per_minute: u32,
    pub per_hour: u32,
    pub cost_per_hour: f64,
}
