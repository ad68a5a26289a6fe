//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use px::core::Scheme;
use px::sources::TransportKind;
use px::util::ColorChoice;

/// px - install packages into a sandboxed store and bundle source units
#[derive(Debug, Parser)]
#[command(name = "px")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Store root directory (must exist)
    #[arg(long, global = true, env = "PX_PKGS", value_name = "PATH")]
    pub pkgs: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone a package into the store
    Install(InstallArgs),

    /// Remove a package from the store
    Uninstall(UninstallArgs),

    /// Run a program with the store on its search path
    Run(RunArgs),

    /// Compile source units into one bundle
    Pack(PackArgs),

    /// Print the store as a tree
    List,

    /// Show the units of a bundle, or one unit's contents
    Inspect(InspectArgs),

    /// Create a package from a template (not implemented)
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Package locator, e.g. `example.org/pkg` or `https://example.org/pkg`
    pub uri: String,

    /// Scheme for locators without one
    #[arg(long)]
    pub scheme: Option<Scheme>,

    /// Clone transport (git, libgit2)
    #[arg(long)]
    pub transport: Option<TransportKind>,
}

#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// Package locator used at install time
    pub uri: String,

    /// Scheme for locators without one
    #[arg(long)]
    pub scheme: Option<Scheme>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Entry point to run
    pub program: PathBuf,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Program that launches the entry ("" runs the entry itself)
    #[arg(long)]
    pub interpreter: Option<String>,

    /// Kill the program after this many seconds (0 = no limit)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Source units, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Bundle to write
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Bundle to read
    pub bundle: PathBuf,

    /// Unit to materialize (defaults to listing all units)
    pub unit: Option<String>,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Template locator
    pub template: String,
}
