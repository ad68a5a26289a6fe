//! The compiler and codec collaborators.
//!
//! The bundler does not care what a unit's language is. It needs something
//! that turns source text into a [`CodeArtifact`] and something that turns an
//! artifact into bytes and back. The shipped pair is [`BindingCompiler`] and
//! [`JsonCodec`].

use crate::bundle::artifact::{Binding, CodeArtifact, SourceUnit, Value};
use crate::bundle::errors::PackError;

/// Turns a source unit into a compiled artifact.
pub trait Compiler {
    fn compile(&self, unit: &SourceUnit) -> Result<CodeArtifact, PackError>;
}

/// Serializes artifacts to bytes and back.
pub trait ArtifactCodec {
    /// Name recorded in the bundle prelude.
    fn name(&self) -> &str;

    fn serialize(&self, unit: &str, artifact: &CodeArtifact) -> Result<Vec<u8>, PackError>;

    fn deserialize(&self, unit: &str, bytes: &[u8]) -> Result<CodeArtifact, PackError>;
}

/// Compiler for binding units.
///
/// A binding unit is a list of lines of the form `name = <json literal>`.
/// Blank lines and lines starting with `#` are ignored. Rebinding a name
/// replaces its value.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingCompiler;

impl Compiler for BindingCompiler {
    fn compile(&self, unit: &SourceUnit) -> Result<CodeArtifact, PackError> {
        let mut bindings = Vec::new();

        for (idx, raw) in unit.text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let err = |message: String| PackError::Compile {
                unit: unit.name.clone(),
                line: idx + 1,
                message,
            };

            let (name, value) = line
                .split_once('=')
                .ok_or_else(|| err("expected `name = value`".to_string()))?;
            let name = name.trim();
            if !is_identifier(name) {
                return Err(err(format!("invalid binding name `{}`", name)));
            }
            let value: Value = serde_json::from_str(value.trim())
                .map_err(|e| err(format!("invalid value: {}", e)))?;

            bindings.push(Binding {
                name: name.to_string(),
                value,
            });
        }

        Ok(CodeArtifact::new(unit.file_name.clone(), bindings))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// JSON encoding of artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ArtifactCodec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, unit: &str, artifact: &CodeArtifact) -> Result<Vec<u8>, PackError> {
        serde_json::to_vec(artifact).map_err(|e| PackError::Codec {
            codec: self.name().to_string(),
            unit: unit.to_string(),
            message: e.to_string(),
        })
    }

    fn deserialize(&self, unit: &str, bytes: &[u8]) -> Result<CodeArtifact, PackError> {
        serde_json::from_slice(bytes).map_err(|e| PackError::Codec {
            codec: self.name().to_string(),
            unit: unit.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn unit(text: &str) -> SourceUnit {
        SourceUnit::new(Path::new("dir/calc.units"), text.to_string())
    }

    #[test]
    fn test_compile_bindings() {
        let artifact = BindingCompiler
            .compile(&unit(
                "# constants\nanswer = 42\n\ngreeting = \"hi\"\nitems = [1, 2]\n",
            ))
            .unwrap();

        assert_eq!(artifact.source(), "calc.units");
        let names: Vec<_> = artifact.bindings().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["answer", "greeting", "items"]);
        assert_eq!(artifact.bindings()[2].value, json!([1, 2]));
    }

    #[test]
    fn test_compile_reports_line() {
        let err = BindingCompiler
            .compile(&unit("a = 1\nb 2\n"))
            .unwrap_err();
        match err {
            PackError::Compile { unit, line, .. } => {
                assert_eq!(unit, "calc");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_compile_rejects_bad_name_and_value() {
        assert!(BindingCompiler.compile(&unit("9lives = 1")).is_err());
        assert!(BindingCompiler.compile(&unit("x = not json")).is_err());
    }

    #[test]
    fn test_json_codec_is_deterministic() {
        let artifact = BindingCompiler
            .compile(&unit("b = {\"z\": 1, \"a\": 2}\na = true\n"))
            .unwrap();
        let first = JsonCodec.serialize("calc", &artifact).unwrap();
        let second = JsonCodec.serialize("calc", &artifact).unwrap();
        assert_eq!(first, second);
        assert_eq!(JsonCodec.deserialize("calc", &first).unwrap(), artifact);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        assert!(JsonCodec.deserialize("calc", b"\x00\x01").is_err());
    }
}
