//! Unit bundles.
//!
//! A bundle packs several compiled source units into one self-contained
//! text file that can later be loaded back as independent, named
//! namespaces. Compilation and artifact encoding are pluggable; see
//! [`compiler`].

pub mod artifact;
pub mod compiler;
pub mod errors;
pub mod format;
pub mod loader;

pub use artifact::{Binding, CodeArtifact, Namespace, SourceUnit, Value};
pub use compiler::{ArtifactCodec, BindingCompiler, Compiler, JsonCodec};
pub use errors::PackError;
pub use format::{Bundle, BundleUnit};
pub use loader::BundleReader;

/// Compiles source units into a [`Bundle`].
pub struct Bundler<'a> {
    compiler: &'a dyn Compiler,
    codec: &'a dyn ArtifactCodec,
}

impl<'a> Bundler<'a> {
    pub fn new(compiler: &'a dyn Compiler, codec: &'a dyn ArtifactCodec) -> Self {
        Bundler { compiler, codec }
    }

    /// Compile and serialize `units` in order.
    ///
    /// `bundle_name` only shapes each unit's documentation string.
    pub fn build(&self, units: &[SourceUnit], bundle_name: &str) -> Result<Bundle, PackError> {
        let mut bundle = Bundle::new(self.codec.name());

        for unit in units {
            tracing::debug!("compiling unit `{}` from {}", unit.name, unit.file_name);
            let artifact = self.compiler.compile(unit)?;
            let bytes = self.codec.serialize(&unit.name, &artifact)?;

            bundle.push(BundleUnit {
                name: unit.name.clone(),
                doc: unit_doc(&unit.name, bundle_name),
                bytes,
            });
        }

        Ok(bundle)
    }
}

/// Documentation string given to a unit's namespace.
pub fn unit_doc(unit: &str, bundle_name: &str) -> String {
    format!("Sub-unit {} of {}", unit, bundle_name)
}
