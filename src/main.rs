//! Flange - cache for vanilla and patched server builds
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use flange::cli::{commands, Cli, Commands};
use flange::config::ConfigManager;
use flange::error::FlangeResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> FlangeResult<()> {
    let cli = Cli::parse();

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("flange=warn"),
        1 => EnvFilter::new("flange=info"),
        _ => EnvFilter::new("flange=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    // Pack and inspect only touch the files they are given
    match cli.command {
        Commands::Pack(args) => return commands::pack(args).await,
        Commands::Inspect(args) => return commands::inspect(args).await,
        _ => {}
    }

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load().await?;

    let cache_root = ConfigManager::cache_root(&config, cli.cache_dir.as_deref());
    debug!("Cache root: {}", cache_root.display());

    match cli.command {
        Commands::Pack(_) | Commands::Inspect(_) => unreachable!("handled above"),
        Commands::Fetch(args) => commands::fetch(args, &config, &cache_root).await,
        Commands::Resolve(args) => commands::resolve(args, &config, &cache_root).await,
        Commands::Cache(args) => commands::cache(args, &config, &cache_root).await,
        Commands::Config(args) => commands::config(args, &config, &manager).await,
    }
}
