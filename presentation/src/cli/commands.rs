//! CLI command definitions

use clap::{Parser, ValueEnum};
use conclave_domain::Tier;
use std::path::PathBuf;

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Only the final answer
    Text,
    /// Final answer plus every agent's result, scores and consultations
    Full,
    /// JSON output
    Json,
}

impl From<OutputFormat> for conclave_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => conclave_domain::OutputFormat::Text,
            OutputFormat::Full => conclave_domain::OutputFormat::Full,
            OutputFormat::Json => conclave_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for conclave
#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(author, version, about = "Multi-agent orchestration with consultation and spend governance")]
#[command(long_about = r#"
Conclave sends a query to a team of specialist agents (creative, analyst,
synthesizer, strategist, orchestrator). Before answering, each agent consults
its preferred partners. Answers are combined with one of five patterns:

  sequential   agents in turn, stopping at the first confident answer
  parallel     all at once, first agent in order above the threshold wins
  ensemble     all at once, answers weighted by confidence and merged
  competitive  all at once, best confidence x speed score wins
  adaptive     picks agents by query complexity, then runs sequentially

Every request is checked against per-user, per-agent and global rate limits,
an hourly spend cap, and the monthly quota of the caller's tier.

Configuration files are loaded from (in priority order):
1. CONCLAVE_* environment variables
2. --config <path>          Explicit config file
3. ./conclave.toml          Project-level config
4. ~/.config/conclave/config.toml   Global config

Example:
  conclave "Draft a launch plan for our new API"
  conclave -p ensemble -a analyst -a strategist "Should we raise prices?"
  conclave --usage --user alice
"#)]
pub struct Cli {
    /// The query to orchestrate (not required with --usage, --tier-status or --list-agents)
    pub query: Option<String>,

    /// Agents to use, in dispatch order (can be specified multiple times)
    #[arg(short, long, value_name = "ID")]
    pub agent: Vec<String>,

    /// Orchestration pattern; unknown names fall back to adaptive
    #[arg(short, long, value_name = "NAME")]
    pub pattern: Option<String>,

    /// Quality threshold in [0, 1]
    #[arg(short, long, value_name = "F")]
    pub threshold: Option<f64>,

    /// User the request is made for
    #[arg(long, value_name = "ID", default_value = "local")]
    pub user: String,

    /// Subscription tier of the user
    #[arg(long, value_name = "TIER", default_value = "basic")]
    pub tier: Tier,

    /// Extra context passed to every agent (can be specified multiple times)
    #[arg(short, long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub context: Vec<(String, String)>,

    /// Output format (defaults to [output] format, then text)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Show the user's current rate and spend, then exit
    #[arg(long)]
    pub usage: bool,

    /// Show the user's monthly quota position, then exit
    #[arg(long)]
    pub tier_status: bool,

    /// List registered agents, then exit
    #[arg(long)]
    pub list_agents: bool,
}

impl Cli {
    /// Whether the invocation only inspects state and sends no query.
    pub fn is_inspection(&self) -> bool {
        self.show_config || self.usage || self.tier_status || self.list_agents
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "conclave",
            "-a",
            "analyst",
            "--agent",
            "strategist",
            "-p",
            "ensemble",
            "-t",
            "0.7",
            "--user",
            "alice",
            "--tier",
            "premium",
            "-c",
            "audience=investors",
            "-o",
            "json",
            "-vv",
            "Should we expand?",
        ])
        .unwrap();
        assert_eq!(cli.query.as_deref(), Some("Should we expand?"));
        assert_eq!(cli.agent, vec!["analyst", "strategist"]);
        assert_eq!(cli.pattern.as_deref(), Some("ensemble"));
        assert_eq!(cli.threshold, Some(0.7));
        assert_eq!(cli.user, "alice");
        assert_eq!(cli.tier, Tier::Premium);
        assert_eq!(
            cli.context,
            vec![("audience".to_string(), "investors".to_string())]
        );
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.is_inspection());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["conclave", "--usage"]).unwrap();
        assert!(cli.query.is_none());
        assert_eq!(cli.user, "local");
        assert_eq!(cli.tier, Tier::Basic);
        assert!(cli.output.is_none());
        assert!(cli.is_inspection());
    }

    #[test]
    fn test_rejects_bad_context_and_tier() {
        assert!(Cli::try_parse_from(["conclave", "-c", "novalue", "q"]).is_err());
        assert!(Cli::try_parse_from(["conclave", "-c", "=v", "q"]).is_err());
        assert!(Cli::try_parse_from(["conclave", "--tier", "gold", "q"]).is_err());
    }

    #[test]
    fn test_context_value_may_contain_equals() {
        assert_eq!(
            parse_key_value("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
    }
}
