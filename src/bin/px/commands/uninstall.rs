//! `px uninstall` command

use anyhow::Result;

use crate::cli::UninstallArgs;
use crate::GlobalOptions;
use px::core::PackageLocator;
use px::ops::px_install::{uninstall, UninstallResult};
use px::util::Status;

pub fn execute(args: UninstallArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = global_opts.context()?;

    let scheme = args.scheme.unwrap_or_else(|| ctx.config().default_scheme());
    let locator = PackageLocator::parse(&args.uri);

    match uninstall(ctx.store(), &locator, scheme)? {
        UninstallResult::Removed { name, dest } => {
            shell.status(Status::Removed, format!("{} ({})", name, dest.display()));
        }
        UninstallResult::Skipped => {
            shell.warn("empty package locator, nothing to remove");
        }
    }

    Ok(())
}
