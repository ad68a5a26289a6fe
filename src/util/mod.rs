//! Shared utilities

pub mod cancel;
pub mod config;
pub mod context;
pub mod fs;
pub mod process;
pub mod shell;

pub use cancel::CancelToken;
pub use config::Config;
pub use context::GlobalContext;
pub use shell::{ColorChoice, Shell, Status};
