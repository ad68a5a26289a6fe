//! `px install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use crate::GlobalOptions;
use px::core::PackageLocator;
use px::ops::px_install::{install, InstallOptions, InstallResult};
use px::sources;
use px::util::Status;

pub fn execute(args: InstallArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ctx = global_opts.context()?;

    if let Some(kind) = args.transport {
        ctx.config_mut().install.transport = Some(kind);
    }

    let opts = InstallOptions {
        default_scheme: args.scheme.unwrap_or_else(|| ctx.config().default_scheme()),
        strip_vcs: ctx.config().strip_vcs(),
    };

    let locator = PackageLocator::parse(&args.uri);
    let transport = sources::from_config(ctx.config(), ctx.cancel_token());

    shell.status(Status::Cloning, &locator);
    match install(ctx.store(), &locator, transport.as_ref(), &opts)? {
        InstallResult::Installed { name, dest, .. } => {
            shell.status(Status::Installed, format!("{} ({})", name, dest.display()));
        }
        InstallResult::Skipped => {
            shell.warn("empty package locator, nothing to install");
        }
    }

    Ok(())
}
