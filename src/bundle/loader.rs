//! Loading bundles back into namespaces.
//!
//! Opening a bundle only parses and checks its layout. A unit's artifact
//! is deserialized and executed the first time that unit is asked for.

use std::path::Path;

use anyhow::{Context, Result};

use crate::bundle::artifact::Namespace;
use crate::bundle::compiler::ArtifactCodec;
use crate::bundle::errors::PackError;
use crate::bundle::format::Bundle;

/// A parsed bundle whose units are materialized on demand.
#[derive(Debug)]
pub struct BundleReader<C> {
    bundle: Bundle,
    directory: Vec<String>,
    codec: C,
}

impl<C: ArtifactCodec> BundleReader<C> {
    /// Read and parse the bundle at `path`.
    pub fn open(path: &Path, codec: C) -> Result<Self> {
        let text = crate::util::fs::read_to_string(path)?;
        Self::parse(&text, codec)
            .with_context(|| format!("failed to load bundle: {}", path.display()))
    }

    /// Parse bundle text, checking that it was written with `codec`.
    pub fn parse(text: &str, codec: C) -> Result<Self, PackError> {
        let bundle = Bundle::parse(text)?;
        if bundle.codec() != codec.name() {
            return Err(PackError::format(
                2,
                format!(
                    "bundle uses codec `{}`, loader provides `{}`",
                    bundle.codec(),
                    codec.name()
                ),
            ));
        }
        let directory = bundle.directory();
        Ok(BundleReader {
            bundle,
            directory,
            codec,
        })
    }

    /// The directory listing: registered unit names, each once.
    pub fn dir(&self) -> &[String] {
        &self.directory
    }

    /// Materialize one unit as a namespace.
    ///
    /// Duplicate names resolve to the last stanza carrying them.
    pub fn namespace(&self, name: &str) -> Result<Namespace, PackError> {
        let unit = self.bundle.unit(name).ok_or_else(|| PackError::UnknownUnit {
            name: name.to_string(),
        })?;

        let mut ns = Namespace::new(&unit.name, &unit.doc);
        ns.mark_leaf();
        ns.set_package(&unit.name);

        let artifact = self.codec.deserialize(&unit.name, &unit.bytes)?;
        artifact.execute_into(&mut ns);
        Ok(ns)
    }

    /// Materialize every unit, in directory order.
    pub fn load_all(&self) -> Result<Vec<Namespace>, PackError> {
        self.directory
            .iter()
            .map(|name| self.namespace(name))
            .collect()
    }
}
