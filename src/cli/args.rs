//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Prerender - static HTML for GraphQL-backed pages
///
/// Renders each route, executes the GraphQL queries it declares against
/// the project's handler and writes finished HTML into the dist directory.
#[derive(Parser, Debug)]
#[command(name = "prerender")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Global configuration file path
    #[arg(short, long, global = true, env = "PRERENDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local prerender.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prerender routes into the dist directory
    Render(RenderArgs),

    /// List routes and the paths they expand to
    Routes(RoutesArgs),

    /// Create a project-local prerender.toml
    Init(InitArgs),

    /// Show configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Arguments for the render command
#[derive(Parser, Debug, Default)]
pub struct RenderArgs {
    /// Only render these paths (repeatable)
    #[arg(short, long = "route")]
    pub routes: Vec<String>,

    /// Dist directory (overrides build.dist_dir)
    #[arg(long)]
    pub dist: Option<PathBuf>,

    /// Route manifest (overrides build.manifest)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Render without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON run report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the routes command
#[derive(Parser, Debug, Default)]
pub struct RoutesArgs {
    /// Route manifest (overrides build.manifest)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing prerender.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the merged configuration
    Show,

    /// Show configuration file path
    Path,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// One path per line
    Plain,
}
