//! Console output formatter for orchestration results

use crate::output::formatter::OutputFormatter;
use chrono::{DateTime, Utc};
use colored::Colorize;
use conclave_application::OrchestrateError;
use conclave_domain::{
    AdmissionDenial, AgentRecord, AgentSubResult, CompetitiveScore, ConfigIssue,
    OrchestrationPattern, OrchestrationResult, PatternMetadata, QuotaStatus, RateLimits,
    Severity, UsageSnapshot, UserId, core::string::excerpt,
};

const CONSULTATION_PREVIEW_CHARS: usize = 120;

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Conclave Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Pattern:".cyan().bold(),
            result.pattern
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Agents used:".cyan().bold(),
            Self::join_ids(result.agents_used.iter().map(|a| a.as_str()))
        ));
        output.push_str(&format!(
            "{} {:.2}   {} ${:.4}   {} {}ms\n",
            "Confidence:".cyan().bold(),
            result.confidence,
            "Cost:".cyan().bold(),
            result.total_cost,
            "Latency:".cyan().bold(),
            result.total_latency_ms
        ));

        output.push_str(&Self::section_header("Agents"));
        for sub in &result.sub_results {
            output.push_str(&Self::sub_result(sub));
        }

        if let Some(metadata) = &result.metadata {
            output.push_str(&Self::section_header("Pattern Details"));
            output.push_str(&Self::metadata(metadata));
        }

        output.push_str(&Self::section_header("Final Answer"));
        output.push_str(&format!("\n{}\n", result.final_text));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &OrchestrationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Only the final answer, with a one-line summary underneath
    pub fn format_text_only(result: &OrchestrationResult) -> String {
        format!(
            "{}\n\n{}\n",
            result.final_text,
            format!(
                "[{} | {} | ${:.4}]",
                result.pattern,
                Self::join_ids(result.agents_used.iter().map(|a| a.as_str())),
                result.total_cost
            )
            .dimmed()
        )
    }

    /// Current rate and spend of a user against the configured limits
    pub fn format_usage(user: &UserId, usage: &UsageSnapshot, limits: &RateLimits) -> String {
        let mut output = format!("{} {}\n", "Usage for".cyan().bold(), user);
        output.push_str(&format!(
            "  Requests this minute: {:>6} / {}\n",
            usage.per_minute, limits.user_per_minute
        ));
        output.push_str(&format!(
            "  Requests this hour:   {:>6} / {}\n",
            usage.per_hour, limits.user_per_hour
        ));
        output.push_str(&format!(
            "  Spend this hour:     ${:>6.2} / ${:.2}\n",
            usage.cost_per_hour, limits.user_hourly_cost_cap
        ));
        output
    }

    /// Monthly quota position of a user
    pub fn format_tier_status(user: &UserId, status: &QuotaStatus) -> String {
        let reset = DateTime::<Utc>::from_timestamp(status.reset_epoch, 0)
            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| status.reset_epoch.to_string());
        let state = if status.allowed {
            "available".green()
        } else {
            "exhausted".red()
        };
        let mut output = format!(
            "{} {} ({} tier)\n",
            "Quota for".cyan().bold(),
            user,
            status.tier
        );
        output.push_str(&format!(
            "  Used: {} / {} ({} remaining, {})\n",
            status.used,
            status.limit,
            status.remaining(),
            state
        ));
        output.push_str(&format!("  Compute profile: {}\n", status.compute_profile));
        output.push_str(&format!("  Resets: {}\n", reset));
        output
    }

    /// Registered agents with their partners and statistics
    pub fn format_agents(agents: &[AgentRecord]) -> String {
        let mut output = format!("{}\n", "Registered agents".cyan().bold());
        for agent in agents {
            output.push_str(&format!(
                "\n{} {}\n",
                agent.id.as_str().yellow().bold(),
                format!("({})", agent.display_name).dimmed()
            ));
            output.push_str(&format!(
                "  {}  priority {}  ${:.3}/call  threshold {:.2}\n",
                agent.specialization.role(),
                agent.priority,
                agent.cost_per_call,
                agent.quality_threshold
            ));
            output.push_str(&format!(
                "  consults: {}\n",
                Self::join_ids(agent.partners.iter().map(|p| p.as_str()))
            ));
            if agent.stats.total_calls > 0 {
                output.push_str(&format!(
                    "  calls: {}  success rate: {:.0}%  avg latency: {:.0}ms\n",
                    agent.stats.total_calls,
                    agent.stats.success_rate * 100.0,
                    agent.stats.average_latency_ms
                ));
            }
        }
        output
    }

    /// A rejected request and when to retry
    pub fn format_denial(denial: &AdmissionDenial) -> String {
        format!(
            "{} {}\n  reason: {}  (current {} / limit {})\n  {}\n",
            "Request denied:".red().bold(),
            denial.message,
            denial.reason,
            Self::number(denial.current),
            Self::number(denial.limit),
            format!("Retry in {}.", Self::duration(denial.retry_after_seconds)).yellow()
        )
    }

    /// Every agent of a pattern failed
    pub fn format_failure(
        pattern: OrchestrationPattern,
        errors: &[AgentSubResult],
        fallback_response: &str,
    ) -> String {
        let mut output = format!(
            "{} every agent in the {} pattern failed\n",
            "Error:".red().bold(),
            pattern
        );
        for sub in errors {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "x".red(),
                sub.agent_id,
                sub.error.as_deref().unwrap_or("unknown error")
            ));
        }
        output.push_str(&format!("\n{}\n", fallback_response));
        output
    }

    /// Human-readable rendering of an orchestration error
    pub fn format_error(error: &OrchestrateError) -> String {
        match error {
            OrchestrateError::Denied(denial) => Self::format_denial(denial),
            OrchestrateError::Failed {
                pattern,
                errors,
                fallback_response,
            } => Self::format_failure(*pattern, errors, fallback_response),
            OrchestrateError::InvalidRequest(e) => {
                format!("{} {}\n", "Invalid request:".red().bold(), e)
            }
        }
    }

    /// Machine-readable rendering of an orchestration error
    pub fn format_error_json(error: &OrchestrateError) -> String {
        let value = match error {
            OrchestrateError::Denied(denial) => serde_json::json!({
                "error": "denied",
                "denial": denial,
            }),
            OrchestrateError::Failed {
                pattern,
                errors,
                fallback_response,
            } => serde_json::json!({
                "error": "failed",
                "pattern": pattern,
                "errors": errors,
                "fallback_response": fallback_response,
            }),
            OrchestrateError::InvalidRequest(e) => serde_json::json!({
                "error": "invalid_request",
                "message": e.to_string(),
            }),
        };
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// One configuration issue, prefixed by its severity
    pub fn format_config_issue(issue: &ConfigIssue) -> String {
        match issue.severity {
            Severity::Error => format!("{} {}", "config error:".red().bold(), issue.message),
            Severity::Warning => format!("{} {}", "config warning:".yellow().bold(), issue.message),
        }
    }

    fn sub_result(sub: &AgentSubResult) -> String {
        let mut output = String::new();
        if sub.success {
            output.push_str(&format!(
                "\n{} {}\n{}\n",
                format!("── {} ──", sub.agent_id).yellow().bold(),
                format!(
                    "confidence {:.2}, {}ms, ${:.4}",
                    sub.confidence, sub.latency_ms, sub.cost
                )
                .dimmed(),
                sub.content
            ));
        } else {
            output.push_str(&format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", sub.agent_id).red().bold(),
                sub.error.as_deref().unwrap_or("Unknown")
            ));
        }
        for consultation in &sub.consultations {
            let line = if consultation.is_empty() {
                format!(
                    "  <- {} (depth {}): no answer ({})",
                    consultation.consultant,
                    consultation.depth,
                    consultation.error.as_deref().unwrap_or("empty")
                )
                .dimmed()
                .to_string()
            } else {
                format!(
                    "  <- {} (depth {}): {}",
                    consultation.consultant,
                    consultation.depth,
                    excerpt(consultation.response.trim(), CONSULTATION_PREVIEW_CHARS)
                )
            };
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    fn metadata(metadata: &PatternMetadata) -> String {
        match metadata {
            PatternMetadata::Sequential {
                stopped_early,
                invoked,
            } => format!(
                "Invoked {} agent(s){}\n",
                invoked,
                if *stopped_early {
                    ", stopped early on a confident answer"
                } else {
                    ""
                }
            ),
            PatternMetadata::Parallel {
                threshold,
                met_threshold,
                winner,
                scores,
            } => {
                let mut output = if *met_threshold {
                    format!("{} met the threshold {:.2} first\n", winner, threshold)
                } else {
                    format!(
                        "No agent met the threshold {:.2}; {} won on score\n",
                        threshold, winner
                    )
                };
                output.push_str(&Self::scores(scores));
                output
            }
            PatternMetadata::Ensemble { weights } => weights
                .iter()
                .map(|w| {
                    format!(
                        "  {:<14} weight {:.2}{}\n",
                        w.agent_id.as_str(),
                        w.normalized,
                        if w.included { "" } else { "  (excluded)" }
                    )
                })
                .collect(),
            PatternMetadata::Competitive {
                winner,
                winning_score,
                scores,
            } => format!(
                "{} won with score {:.3}\n{}",
                winner,
                winning_score,
                Self::scores(scores)
            ),
            PatternMetadata::Adaptive {
                complexity,
                selected,
                stopped_early,
            } => format!(
                "Complexity {:.2} selected {}{}\n",
                complexity,
                Self::join_ids(selected.iter().map(|a| a.as_str())),
                if *stopped_early {
                    ", stopped early"
                } else {
                    ""
                }
            ),
        }
    }

    fn scores(scores: &[CompetitiveScore]) -> String {
        scores
            .iter()
            .map(|s| format!("  {:<14} score {:.3}\n", s.agent_id.as_str(), s.score))
            .collect()
    }

    fn join_ids<'a>(ids: impl Iterator<Item = &'a str>) -> String {
        let joined = ids.collect::<Vec<_>>().join(", ");
        if joined.is_empty() {
            "none".to_string()
        } else {
            joined
        }
    }

    fn number(value: f64) -> String {
        if value.fract() == 0.0 {
            format!("{}", value as i64)
        } else {
            format!("{:.2}", value)
        }
    }

    fn duration(seconds: u64) -> String {
        match seconds {
            0..=59 => format!("{}s", seconds),
            60..=3599 => format!("{}m {}s", seconds / 60, seconds % 60),
            3600..=86_399 => format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60),
            _ => format!("{}d {}h", seconds / 86_400, (seconds % 86_400) / 3600),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &OrchestrationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &OrchestrationResult) -> String {
        Self::format_json(result)
    }

    fn format_text_only(&self, result: &OrchestrationResult) -> String {
        Self::format_text_only(result)
    }
}
