//! Prerender - static HTML for GraphQL-backed pages
//!
//! CLI entry point that dispatches to subcommands.

use clap::{CommandFactory, Parser};
use console::style;
use prerender::cli::commands::Project;
use prerender::cli::{Cli, Commands, LogFormat};
use prerender::config::ConfigManager;
use prerender::error::{PrerenderError, PrerenderResult};
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

fn init_logging(verbose: u8, format: LogFormat) {
    // 0 = warn, 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("prerender=warn"),
        1 => EnvFilter::new("prerender=info"),
        _ => EnvFilter::new("prerender=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.with_target(false).without_time().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run() -> PrerenderResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    // Commands that don't need config loading
    match cli.command {
        Commands::Init(args) => return prerender::cli::commands::init(args).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "prerender", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let cwd = std::env::current_dir().map_err(|e| PrerenderError::io("getting current directory", e))?;

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    let root = local_config_path
        .as_deref()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or(cwd);
    let project = Project::new(config, root);

    match cli.command {
        Commands::Render(args) => prerender::cli::commands::render(args, &project).await,
        Commands::Routes(args) => prerender::cli::commands::routes(args, &project).await,
        Commands::Config(args) => {
            prerender::cli::commands::config(args, &project, &config_manager).await
        }
        Commands::Init(_) | Commands::Completions { .. } => {
            unreachable!("handled before config loading")
        }
    }
}
