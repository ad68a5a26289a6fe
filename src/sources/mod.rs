//! Package sources.
//!
//! Sources are responsible for transferring a remote package into the
//! store. Only whole-repository clones are supported.

pub mod transport;

pub use transport::{from_config, CloneTransport, GitCliTransport, LibGit2Transport, TransportKind};
