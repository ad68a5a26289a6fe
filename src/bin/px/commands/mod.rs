//! Command implementations

pub mod init;
pub mod inspect;
pub mod install;
pub mod list;
pub mod pack;
pub mod run;
pub mod uninstall;
