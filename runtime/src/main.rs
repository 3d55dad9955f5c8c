//! Entry point wiring a concrete [`http_host::HttpHost`] to
//! [`engine::Executor`], on the single current-thread runtime spec.md §5
//! requires for cooperative, non-parallel strategy execution.

mod http_host;
mod settings;

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::settings::RuntimeSettings;

#[derive(Parser, Debug)]
#[command(name = "runtime", about = "Runs the multi-strategy execution engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every known strategy and run the executor until a terminate
    /// signal arrives.
    Run,
    /// Print the names of the strategies that would be loaded, without
    /// starting anything.
    List,
    /// Load and print the resolved configuration, then exit; does not
    /// start the executor.
    CheckConfig,
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = RuntimeSettings::load()?;

    match cli.command {
        Command::CheckConfig => {
            // Logging isn't needed for this subcommand; print and exit
            // before touching tracing or building a runtime.
            println!("{settings:#?}");
            return Ok(());
        }
        Command::List => {
            init_tracing(&settings.log_filter);
            let registry = demo_strategies::registry(settings.exchange_base_url.clone());
            for name in registry.names() {
                println!("{name}");
            }
            return Ok(());
        }
        Command::Run => {}
    }

    init_tracing(&settings.log_filter);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run(settings))
}

async fn run(settings: RuntimeSettings) -> anyhow::Result<()> {
    let registry = demo_strategies::registry(settings.exchange_base_url.clone());
    let strategy_names = registry.names();

    let host = std::sync::Arc::new(http_host::HttpHost::new(strategy_names));
    let mut executor = engine::Executor::new(host, registry);
    if let Some(deadline_ms) = settings.shutdown_deadline_ms {
        executor = executor.with_shutdown_deadline(Duration::from_millis(deadline_ms));
    }

    executor.start().await?;
    let outcome = executor.run().await;
    tracing::info!(%outcome, "executor run loop ended");
    executor.clear_strategies().await;

    match outcome {
        engine::ExecutorError::Interrupt(_) => Ok(()),
        other => Err(other.into()),
    }
}
