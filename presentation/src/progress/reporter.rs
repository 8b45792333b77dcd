//! Progress reporting during an orchestration

use colored::Colorize;
use conclave_application::ProgressNotifier;
use conclave_domain::{AgentId, OrchestrationPattern};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Mutex, MutexGuard};

/// Reports progress with an indicatif bar on stderr
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn pattern_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pattern_display_name(pattern: OrchestrationPattern) -> &'static str {
        match pattern {
            OrchestrationPattern::Sequential => "Sequential",
            OrchestrationPattern::Parallel => "Parallel race",
            OrchestrationPattern::Ensemble => "Ensemble",
            OrchestrationPattern::Competitive => "Competitive",
            OrchestrationPattern::Adaptive => "Adaptive",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_pattern_start(&self, pattern: OrchestrationPattern, agents: &[AgentId]) {
        let pb = ProgressBar::with_draw_target(
            Some(agents.len() as u64),
            ProgressDrawTarget::stderr(),
        );
        pb.set_style(Self::pattern_style());
        pb.set_prefix(Self::pattern_display_name(pattern));
        pb.set_message("consulting...");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));

        *self.slot() = Some(pb);
    }

    fn on_agent_complete(&self, agent: &AgentId, success: bool) {
        if let Some(pb) = self.slot().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_pattern_complete(&self, pattern: OrchestrationPattern, success: bool) {
        if let Some(pb) = self.slot().take() {
            let name = Self::pattern_display_name(pattern);
            if success {
                pb.finish_with_message(format!("{} complete", name).green().to_string());
            } else {
                pb.abandon_with_message(format!("{} failed", name).red().to_string());
            }
        }
    }
}

/// Simple text-based progress (no fancy UI), one line per event on stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_pattern_start(&self, pattern: OrchestrationPattern, agents: &[AgentId]) {
        let names: Vec<&str> = agents.iter().map(|a| a.as_str()).collect();
        eprintln!(
            "{} {} ({})",
            "->".cyan(),
            ProgressReporter::pattern_display_name(pattern).bold(),
            names.join(", ")
        );
    }

    fn on_agent_complete(&self, agent: &AgentId, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), agent);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), agent);
        }
    }

    fn on_pattern_complete(&self, _pattern: OrchestrationPattern, _success: bool) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_lifecycle_clears_bar() {
        let reporter = ProgressReporter::new();
        let agents = vec![AgentId::new("analyst"), AgentId::new("creative")];
        reporter.on_pattern_start(OrchestrationPattern::Parallel, &agents);
        reporter.on_agent_complete(&agents[0], true);
        assert_eq!(reporter.slot().as_ref().map(|pb| pb.position()), Some(1));

        reporter.on_pattern_complete(OrchestrationPattern::Parallel, true);
        assert!(reporter.slot().is_none());
    }

    #[test]
    fn test_completion_without_start_is_ignored() {
        let reporter = ProgressReporter::default();
        reporter.on_agent_complete(&AgentId::new("analyst"), false);
        reporter.on_pattern_complete(OrchestrationPattern::Sequential, false);
        assert!(reporter.slot().is_none());
    }
}
