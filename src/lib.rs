//! px - a small package store and unit bundler
//!
//! This crate provides the library behind the `px` command: installing
//! packages from remote repositories into a sandboxed store directory,
//! running programs against that store, and packing source units into
//! self-contained bundles.

pub mod bundle;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for px unit tests.
///
/// Only compiled for tests. Provides a recording clone transport and
/// helpers for building fixture repositories and source units.
#[cfg(test)]
pub mod test_support;

pub use core::{PackageLocator, Scheme, StoreError, StoreRoot};
pub use util::context::GlobalContext;
