//! Compiled units and the namespaces they execute into.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A bound value. Units bind JSON values.
pub type Value = serde_json::Value;

/// One input file to the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Unit name: the file stem
    pub name: String,
    /// File base name, the only path metadata a compiled artifact keeps
    pub file_name: String,
    /// Raw source text
    pub text: String,
}

impl SourceUnit {
    /// Describe `path` as a unit; the name is the stem, the file name the base name.
    pub fn new(path: &Path, text: String) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        SourceUnit {
            name,
            file_name,
            text,
        }
    }
}

/// A single top-level binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

/// Compiled form of a [`SourceUnit`]. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeArtifact {
    /// Base name of the file the artifact was compiled from
    source: String,
    bindings: Vec<Binding>,
}

impl CodeArtifact {
    pub fn new(source: impl Into<String>, bindings: Vec<Binding>) -> Self {
        CodeArtifact {
            source: source.into(),
            bindings,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Execute the artifact with `ns`'s attribute map as its global scope.
    pub fn execute_into(&self, ns: &mut Namespace) {
        for binding in &self.bindings {
            ns.attributes
                .insert(binding.name.clone(), binding.value.clone());
        }
    }
}

/// A named, queryable scope that one unit's bindings land in.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    name: String,
    doc: String,
    leaf: bool,
    package: Option<String>,
    attributes: BTreeMap<String, Value>,
}

impl Namespace {
    /// A new, empty namespace.
    pub fn new(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            doc: doc.into(),
            leaf: false,
            package: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Compile-and-run shortcut: a namespace holding `artifact`'s bindings.
    pub fn from_artifact(name: impl Into<String>, artifact: &CodeArtifact) -> Self {
        let mut ns = Namespace::new(name, "");
        artifact.execute_into(&mut ns);
        ns
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Mark as a leaf: the namespace holds no sub-units.
    pub fn mark_leaf(&mut self) {
        self.leaf = true;
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub fn set_package(&mut self, package: impl Into<String>) {
        self.package = Some(package.into());
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.attributes.get(attr)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Attribute names, sorted.
    pub fn dir(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }
}
