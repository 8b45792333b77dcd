//! CLI entrypoint for conclave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use conclave_application::{
    AgentInvoker, Caller, Clock, ConversationLogger, NoConversationLogger, NoProgress,
    OrchestrateError, OrchestrateUseCase, ProgressNotifier, RateGovernor, SharedRegistry,
    SystemClock, TierQuotaManager,
};
use conclave_domain::{AgentRegistry, OrchestrationRequest, OutputFormat, UserId};
use conclave_infrastructure::{
    ConfigLoader, FileAgentConfigStore, FileConfig, HttpReasoningGateway,
    JsonlConversationLogger, SqliteStore,
};
use conclave_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter};
use std::process::ExitCode;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Exit status of a malformed request.
const EXIT_INVALID: u8 = 2;
/// Exit status of a request rejected by rate, spend or quota limits.
const EXIT_DENIED: u8 = 3;
/// Exit status when every agent failed.
const EXIT_FAILED: u8 = 4;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli);

    info!("Starting conclave");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let registry = AgentRegistry::with_default_roster();
    let issues = config.validate(&registry.ids());
    for issue in &issues {
        eprintln!("{}", ConsoleFormatter::format_config_issue(issue));
    }
    if issues.iter().any(|issue| issue.is_error()) {
        bail!("Configuration has errors; fix them and retry.");
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", toml::to_string_pretty(&redacted(&config))?);
        return Ok(ExitCode::SUCCESS);
    }

    // === Dependency Injection ===
    let registry: SharedRegistry = Arc::new(RwLock::new(registry));
    let use_case = build_use_case(&config, registry.clone());
    let user = UserId::new(cli.user.clone());

    if cli.list_agents {
        let registry = registry.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        println!("{}", ConsoleFormatter::format_agents(registry.agents()));
    }
    if cli.usage {
        let usage = use_case.get_usage(&user).await;
        println!(
            "{}",
            ConsoleFormatter::format_usage(&user, &usage, use_case.governor().limits())
        );
    }
    if cli.tier_status {
        let status = use_case.get_tier_status(&user, cli.tier).await;
        println!("{}", ConsoleFormatter::format_tier_status(&user, &status));
    }
    if cli.is_inspection() {
        return Ok(ExitCode::SUCCESS);
    }

    let Some(query) = cli.query.clone() else {
        bail!("A query is required. Use --usage, --tier-status or --list-agents to inspect state.");
    };

    let mut request = OrchestrationRequest::new(query);
    for (key, value) in &cli.context {
        request = request.with_context(key.clone(), value.clone());
    }
    if !cli.agent.is_empty() {
        request = request.with_agents(cli.agent.clone());
    }
    if let Some(pattern) = &cli.pattern {
        request = request.with_pattern(pattern.clone());
    }
    if let Some(threshold) = cli.threshold {
        request = request.with_quality_threshold(threshold);
    }
    let caller = Caller::new(user).with_tier(cli.tier);

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    let progress: Box<dyn ProgressNotifier> =
        if cli.quiet || format == OutputFormat::Json || !config.output.show_progress {
            Box::new(NoProgress)
        } else {
            Box::new(ProgressReporter::new())
        };

    match use_case
        .orchestrate_with_progress(request, &caller, progress.as_ref())
        .await
    {
        Ok(result) => {
            println!("{}", ConsoleFormatter.render(&result, format));
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if format == OutputFormat::Json {
                println!("{}", ConsoleFormatter::format_error_json(&error));
            } else {
                eprint!("{}", ConsoleFormatter::format_error(&error));
            }
            Ok(ExitCode::from(exit_status(&error)))
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v`/`-q`.
fn init_logging(cli: &Cli) -> WorkerGuard {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .init();

    guard
}

fn build_use_case(
    config: &FileConfig,
    registry: SharedRegistry,
) -> OrchestrateUseCase<HttpReasoningGateway> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let logger: Arc<dyn ConversationLogger> = match &config.logging.conversation_log {
        Some(path) => match JsonlConversationLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoConversationLogger),
        },
        None => Arc::new(NoConversationLogger),
    };

    let mut governor = RateGovernor::new(config.governance.to_rate_limits(), clock.clone());
    let mut quota = config
        .quota
        .tier_quotas()
        .into_iter()
        .fold(TierQuotaManager::new(clock.clone()), |manager, tier_quota| {
            manager.with_quota(tier_quota)
        });

    if let Some(database) = &config.storage.database {
        match SqliteStore::open(database, clock.clone()) {
            Ok(store) => {
                info!("Using shared governance store at {}", database.display());
                let store = Arc::new(store);
                governor = governor.with_shared_store(store.clone());
                quota = quota.with_shared_store(store);
            }
            Err(e) => warn!(
                "Shared governance store {} unavailable, limits are per process: {}",
                database.display(),
                e
            ),
        }
    }

    let gateway = HttpReasoningGateway::new(config.gateway.base_url.clone())
        .with_require_credential(config.gateway.require_credential);

    let invoker = AgentInvoker::new(Arc::new(gateway), registry)
        .with_config_store(Arc::new(FileAgentConfigStore::new(config.clone())))
        .with_logger(logger.clone())
        .with_default_config(config.gateway.default_agent_config())
        .with_params(config.orchestration.to_params());

    OrchestrateUseCase::new(invoker)
        .with_governor(governor)
        .with_quota(quota)
        .with_logger(logger)
}

/// Copy of the configuration that is safe to print.
fn redacted(config: &FileConfig) -> FileConfig {
    let mut config = config.clone();
    if config.gateway.api_key.is_some() {
        config.gateway.api_key = Some("<redacted>".to_string());
    }
    config
}

fn exit_status(error: &OrchestrateError) -> u8 {
    match error {
        OrchestrateError::InvalidRequest(_) => EXIT_INVALID,
        OrchestrateError::Denied(_) => EXIT_DENIED,
        OrchestrateError::Failed { .. } => EXIT_FAILED,
    }
}
