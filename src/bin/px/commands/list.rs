//! `px list` command

use anyhow::Result;

use crate::GlobalOptions;
use px::ops::px_list::list;

pub fn execute(global_opts: &GlobalOptions) -> Result<()> {
    let ctx = global_opts.context()?;
    let listing = list(ctx.store())?;

    print!("{}", listing.tree);
    println!();
    println!("{}", listing.summary());
    Ok(())
}
