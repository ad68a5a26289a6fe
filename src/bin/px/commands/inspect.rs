//! `px inspect` command

use anyhow::Result;

use crate::cli::InspectArgs;
use crate::GlobalOptions;
use px::bundle::Namespace;
use px::ops::px_pack::{inspect, InspectResult};

pub fn execute(args: InspectArgs, global_opts: &GlobalOptions) -> Result<()> {
    let _ctx = global_opts.context()?;

    match inspect(&args.bundle, args.unit.as_deref())? {
        InspectResult::Directory(units) => {
            for unit in units {
                println!("{}", unit);
            }
        }
        InspectResult::Unit(ns) => print!("{}", render_namespace(&ns)),
    }
    Ok(())
}

/// Doc string, then one `name = value` line per attribute.
fn render_namespace(ns: &Namespace) -> String {
    let mut out = format!("{}\n", ns.doc());
    for (name, value) in ns.attributes() {
        out.push_str(&format!("{} = {}\n", name, value));
    }
    out
}
