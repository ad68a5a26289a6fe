//! Implementation of `px pack` and `px inspect`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::bundle::{
    ArtifactCodec, BundleReader, Bundler, Compiler, JsonCodec, Namespace, PackError, SourceUnit,
};
use crate::util::fs::{read_to_string, write_atomic};

/// Result of packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackResult {
    pub output: PathBuf,
    /// Directory listing of the written bundle
    pub units: Vec<String>,
    /// Whether an existing file was replaced
    pub replaced: bool,
}

/// Compile `files` into one bundle at `output`.
///
/// Every input is checked before anything is compiled; on the first missing
/// one nothing is written. The output replaces any existing file atomically.
pub fn pack(
    files: &[PathBuf],
    output: &Path,
    compiler: &dyn Compiler,
    codec: &dyn ArtifactCodec,
) -> Result<PackResult> {
    if files.is_empty() {
        return Err(PackError::NoInputs.into());
    }
    if let Some(missing) = files.iter().find(|f| !f.is_file()) {
        return Err(PackError::MissingInput {
            path: missing.clone(),
        }
        .into());
    }

    let mut units = Vec::with_capacity(files.len());
    for file in files {
        let text = read_to_string(file)?;
        units.push(SourceUnit::new(file, text));
    }

    let bundle_name = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bundle = Bundler::new(compiler, codec).build(&units, &bundle_name)?;
    let text = bundle.render()?;

    let replaced = output.is_file();
    if replaced {
        tracing::warn!("{} exists and will be rewritten", output.display());
    }
    write_atomic(output, text.as_bytes())?;

    Ok(PackResult {
        output: output.to_path_buf(),
        units: bundle.directory(),
        replaced,
    })
}

/// What `px inspect` reports.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectResult {
    /// The bundle's directory listing
    Directory(Vec<String>),
    /// One materialized unit
    Unit(Namespace),
}

/// Load a bundle and query its directory, or materialize one unit.
pub fn inspect(bundle: &Path, unit: Option<&str>) -> Result<InspectResult> {
    let reader = BundleReader::open(bundle, JsonCodec)?;
    match unit {
        Some(name) => Ok(InspectResult::Unit(reader.namespace(name)?)),
        None => Ok(InspectResult::Directory(reader.dir().to_vec())),
    }
}
