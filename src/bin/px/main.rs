//! px CLI - install packages into a sandboxed store and bundle source units

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use px::bundle::PackError;
use px::core::errors::GENERIC_FAILURE;
use px::core::StoreError;
use px::util::{cancel, GlobalContext, Shell};

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
    pub pkgs: Option<PathBuf>,
}

impl GlobalOptions {
    /// Open the store and load configuration.
    pub fn context(&self) -> Result<GlobalContext> {
        GlobalContext::new(self.pkgs.as_deref())
    }
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            exit_code(&e)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.quiet, cli.verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{:?}", cli);

    cancel::install_interrupt_handler()?;

    let global_opts = GlobalOptions {
        shell: Shell::from_flags(cli.quiet, cli.verbose, cli.color),
        pkgs: cli.pkgs,
    };

    // Execute command
    match cli.command {
        Commands::Install(args) => commands::install::execute(args, &global_opts).map(|_| 0),
        Commands::Uninstall(args) => commands::uninstall::execute(args, &global_opts).map(|_| 0),
        Commands::Run(args) => commands::run::execute(args, &global_opts),
        Commands::Pack(args) => commands::pack::execute(args, &global_opts).map(|_| 0),
        Commands::List => commands::list::execute(&global_opts).map(|_| 0),
        Commands::Inspect(args) => commands::inspect::execute(args, &global_opts).map(|_| 0),
        Commands::Init(args) => commands::init::execute(args).map(|_| 0),
    }
}

/// Log filter used when `RUST_LOG` is unset; quiet wins over verbose.
fn default_filter(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "px=warn"
    } else if verbose {
        "px=debug"
    } else {
        "px=info"
    }
}

/// Map an error to the process exit status.
///
/// The first store or pack error in the chain decides; anything else is a
/// generic failure.
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<PackError>() {
            return e.exit_code();
        }
    }
    GENERIC_FAILURE
}
