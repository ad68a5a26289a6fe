//! High-level operations.
//!
//! This module contains the implementation of px commands.

pub mod px_install;
pub mod px_list;
pub mod px_pack;
pub mod px_run;

pub use px_install::{install, uninstall, InstallOptions, InstallResult, UninstallResult};
pub use px_list::{list, StoreListing};
pub use px_pack::{inspect, pack, InspectResult, PackResult};
pub use px_run::{run, RunOptions};
