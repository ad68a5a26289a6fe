//! `px run` command

use anyhow::Result;

use crate::cli::RunArgs;
use crate::GlobalOptions;
use px::ops::px_run::{run, RunOptions};
use px::util::Status;

/// Returns the program's exit code.
pub fn execute(args: RunArgs, global_opts: &GlobalOptions) -> Result<i32> {
    let shell = &global_opts.shell;
    let ctx = global_opts.context()?;
    let config = ctx.config();

    let interpreter = match args.interpreter {
        Some(program) if program.is_empty() => None,
        Some(program) => Some(program),
        None => config.interpreter().map(str::to_string),
    };
    let timeout = match args.timeout {
        Some(0) => None,
        Some(secs) => Some(std::time::Duration::from_secs(secs)),
        None => config.run_timeout(),
    };

    let opts = RunOptions {
        interpreter,
        search_path_var: config.search_path_var().to_string(),
        args: args.args,
        timeout,
    };

    shell.status(Status::Running, args.program.display());
    let code = run(ctx.store(), &args.program, &opts, ctx.cancel_token())?;
    if code != 0 {
        tracing::debug!("{} exited with status {}", args.program.display(), code);
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse_run_args(args: &[&str]) -> RunArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            run: RunArgs,
        }
        TestCli::parse_from(args).run
    }

    #[test]
    fn test_run_args_defaults() {
        let args = parse_run_args(&["test", "main.py"]);
        assert_eq!(args.program, PathBuf::from("main.py"));
        assert!(args.args.is_empty());
        assert!(args.interpreter.is_none());
        assert!(args.timeout.is_none());
    }

    #[test]
    fn test_run_trailing_args_keep_hyphens() {
        let args = parse_run_args(&["test", "main.py", "--flag", "-x", "value"]);
        assert_eq!(args.args, vec!["--flag", "-x", "value"]);
    }

    #[test]
    fn test_run_interpreter_and_timeout() {
        let args = parse_run_args(&["test", "--interpreter", "sh", "--timeout", "5", "main.sh"]);
        assert_eq!(args.interpreter.as_deref(), Some("sh"));
        assert_eq!(args.timeout, Some(5));
        assert_eq!(args.program, PathBuf::from("main.sh"));
    }

    #[test]
    fn test_run_empty_interpreter() {
        let args = parse_run_args(&["test", "--interpreter", "", "main"]);
        assert_eq!(args.interpreter.as_deref(), Some(""));
    }
}
