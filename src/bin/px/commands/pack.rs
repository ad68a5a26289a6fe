//! `px pack` command

use anyhow::Result;

use crate::cli::PackArgs;
use crate::GlobalOptions;
use px::bundle::{BindingCompiler, JsonCodec};
use px::ops::px_pack::pack;
use px::util::Status;

pub fn execute(args: PackArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    // Validates the store root like every other command.
    let _ctx = global_opts.context()?;

    shell.status(Status::Compiling, format!("{} unit(s)", args.files.len()));
    let result = pack(&args.files, &args.output, &BindingCompiler, &JsonCodec)?;

    shell.status(
        Status::Packed,
        format!("{} [{}]", result.output.display(), result.units.join(", ")),
    );
    Ok(())
}
