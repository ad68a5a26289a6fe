//! Core data structures for px.
//!
//! - Package locators and their resolution against a default scheme
//! - The store root and its sandbox guard
//! - Store error taxonomy

pub mod errors;
pub mod locator;
pub mod store;

pub use errors::StoreError;
pub use locator::{resolve, PackageLocator, ResolvedLocator, Scheme};
pub use store::{contained_path, InstalledPackage, PackageState, StoreRoot};
