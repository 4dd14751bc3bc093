//! CLI argument definitions using clap derive

use crate::cache::Category;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Flange - local cache for vanilla and patched server builds
///
/// Downloads upstream builds and patch containers, and rebuilds patched
/// builds locally by applying binary diffs.
#[derive(Parser, Debug)]
#[command(name = "flange")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FLANGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root (overrides the configured root)
    #[arg(long, global = true, env = "FLANGE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a vanilla build into the cache
    Fetch(FetchArgs),

    /// Build a patched version, fetching its patch and base as needed
    Resolve(ResolveArgs),

    /// Wrap a raw bsdiff patch into a patch container
    Pack(PackArgs),

    /// Show the header of a patch container
    Inspect(InspectArgs),

    /// Inspect and maintain the local cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Upstream version to download (e.g. 1.8)
    #[arg(id = "target_version", value_name = "VERSION")]
    pub version: String,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Patched version to build
    #[arg(id = "target_version", value_name = "VERSION")]
    pub version: String,

    /// Download the patch container from this URL instead of the configured locators
    #[arg(long)]
    pub diff_url: Option<String>,
}

/// Arguments for the pack command
#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Base version the patch applies to
    #[arg(short, long)]
    pub base: String,

    /// Raw patch file (BSDIFF40)
    pub patch: PathBuf,

    /// Output container path
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Patch container file
    pub container: PathBuf,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one path per line)
    Plain,
}

/// Cache category selector for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Vanilla,
    Patch,
    Modded,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Vanilla => Category::Vanilla,
            CategoryArg::Patch => Category::Patch,
            CategoryArg::Modded => Category::Modded,
        }
    }
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the cache root
    Path,

    /// List cached artifacts
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Only list one category
        #[arg(long)]
        category: Option<CategoryArg>,
    },

    /// Check cached artifacts against their recorded digests
    Verify {
        /// Only verify one category
        #[arg(long)]
        category: Option<CategoryArg>,
    },

    /// Remove abandoned partial downloads
    Gc {
        /// Remove partial files older than N minutes (default: from config)
        #[arg(long)]
        older_than_mins: Option<u64>,

        /// Dry run - show what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete cached artifacts
    Clear {
        /// Only clear one category
        #[arg(long)]
        category: Option<CategoryArg>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
