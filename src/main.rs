//! minutes CLI - Entry point
//!
//! Usage: minutes <command> [options]

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minutes::cli::{Cli, Commands, Ctx};
use minutes::config::Config;
use minutes::core::error;
use minutes::output;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse CLI arguments and resolve per-invocation context once
    let cli = Cli::parse();
    let ctx = Ctx {
        config: Config::load(),
        mode: cli.source.mode(cli.no_network),
        format: output::resolve_format(cli.output),
        jsonl: cli.jsonl,
    };

    let result = match cli.command {
        Commands::Meeting(args) => minutes::cli::meeting::run(args, &ctx).await,
        Commands::Workspace(args) => minutes::cli::workspace::run(args, &ctx).await,
        Commands::Folder(args) => minutes::cli::folder::run(args, &ctx).await,
        Commands::People(args) => minutes::cli::people::run(args, &ctx).await,
        Commands::Whoami => minutes::cli::misc::whoami(&ctx),
        Commands::Sync => minutes::cli::misc::sync(&ctx).await,
        Commands::Cache => minutes::cli::misc::cache(&ctx),
        Commands::Shared => minutes::cli::misc::shared(&ctx).await,
    };

    if let Err(err) = result {
        eprintln!("error: {:#}", err);
        std::process::exit(error::exit_code(&err));
    }
}
