//! ersatz-hooks - push mock server fixtures before contract tests run.

use clap::{Args, Parser, Subcommand};
use ersatz_hooks::fixture::DEFAULT_FIXTURE_PATH;
use ersatz_hooks::prelude::*;
use ersatz_hooks::runtime::DEFAULT_HANDLER_PORT;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ersatz-hooks")]
#[command(author, version)]
#[command(about = "Push YAML fixtures to an ersatz mock server before contract tests run")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the "before all" hook once and exit
    Push {
        #[command(flatten)]
        fixture: FixtureArgs,
    },
    /// Serve the hooks handler protocol for a test runner
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1")]
        listen_host: String,

        /// Port to listen on
        #[arg(long, default_value_t = DEFAULT_HANDLER_PORT)]
        listen_port: u16,

        #[command(flatten)]
        fixture: FixtureArgs,

        /// Hook files passed by the runner (hooks are compiled in; ignored)
        #[arg(trailing_var_arg = true)]
        hookfiles: Vec<String>,
    },
}

#[derive(Args)]
struct FixtureArgs {
    /// Fixture file to push
    #[arg(long, env = "ERSATZ_FIXTURES", default_value = DEFAULT_FIXTURE_PATH)]
    fixtures: PathBuf,

    /// Mock server host
    #[arg(long, env = "ERSATZ_HOST", default_value = "localhost")]
    host: String,

    /// Mock server port
    #[arg(long, env = "ERSATZ_PORT", default_value_t = 9000)]
    port: u16,

    /// Mock server configuration endpoint
    #[arg(long, default_value = "/__configure")]
    configure_path: String,

    /// Milliseconds to wait for the mock server to apply the fixtures
    #[arg(long, env = "ERSATZ_SETTLE_MS", default_value_t = 5000)]
    settle_ms: u64,

    /// What to do when the mock server cannot be reached (abort|continue)
    #[arg(long, default_value = "abort")]
    on_push_failure: PushFailurePolicy,
}

impl FixtureArgs {
    fn into_config(self) -> FixtureConfig {
        FixtureConfig::new()
            .fixture_path(self.fixtures)
            .host(self.host)
            .port(self.port)
            .configure_path(self.configure_path)
            .settle_delay_ms(self.settle_ms)
            .on_push_failure(self.on_push_failure)
    }
}

async fn fixture_registry(args: FixtureArgs) -> Result<HookRegistry, HookError> {
    let registry = HookRegistry::new();
    registry
        .register("fixtures", Box::new(FixtureHook::new(args.into_config())))
        .await?;
    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Push { fixture } => {
            let registry = fixture_registry(fixture).await?;
            registry.run(HookEvent::BeforeAll, "cli").await?;
        }
        Command::Serve {
            listen_host,
            listen_port,
            fixture,
            hookfiles,
        } => {
            if !hookfiles.is_empty() {
                tracing::debug!("Ignoring hook files {:?}; hooks are compiled in", hookfiles);
            }

            let registry = fixture_registry(fixture).await?;
            let config = ServerConfig::new().host(listen_host).port(listen_port);
            HooksServer::new(config, Arc::new(registry)).run().await?;
        }
    }

    Ok(())
}
