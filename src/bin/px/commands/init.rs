//! `px init` command

use anyhow::{bail, Result};

use crate::cli::InitArgs;

pub fn execute(args: InitArgs) -> Result<()> {
    bail!("`px init` is not implemented (template `{}`)", args.template)
}
