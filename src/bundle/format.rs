//! The bundle file format.
//!
//! A bundle is UTF-8 text, one directive per line, each line being a verb
//! followed by a single space and a JSON payload:
//!
//! ```text
//! px-bundle 1
//! codec "json"
//! unit {"name":"a","doc":"Sub-unit a of out"}
//! leaf "a"
//! package "a"
//! exec {"name":"a","bytes":"7b22..."}
//! all ["a"]
//! dir "all"
//! ```
//!
//! Two prelude lines, a four-line stanza per unit in input order, and two
//! trailer lines: the directory listing and the directory query bound to it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bundle::errors::PackError;

/// First verb of every bundle.
pub const MAGIC: &str = "px-bundle";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Name of the listing the directory query returns.
const LISTING: &str = "all";

/// One unit as stored in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleUnit {
    pub name: String,
    pub doc: String,
    /// Serialized artifact
    pub bytes: Vec<u8>,
}

/// The logical contents of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    codec: String,
    units: Vec<BundleUnit>,
}

#[derive(Serialize, Deserialize)]
struct UnitHeader {
    name: String,
    doc: String,
}

#[derive(Serialize, Deserialize)]
struct ExecPayload {
    name: String,
    bytes: String,
}

impl Bundle {
    pub fn new(codec: impl Into<String>) -> Self {
        Bundle {
            codec: codec.into(),
            units: Vec::new(),
        }
    }

    pub fn push(&mut self, unit: BundleUnit) {
        self.units.push(unit);
    }

    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// All stanzas, in input order, duplicates included.
    pub fn units(&self) -> &[BundleUnit] {
        &self.units
    }

    /// The registered unit for `name`: the last stanza carrying it.
    pub fn unit(&self, name: &str) -> Option<&BundleUnit> {
        self.units.iter().rev().find(|u| u.name == name)
    }

    /// Unit names in first-appearance order, each once.
    pub fn directory(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for unit in &self.units {
            if !names.contains(&unit.name) {
                names.push(unit.name.clone());
            }
        }
        names
    }

    /// Render the bundle text.
    pub fn render(&self) -> Result<String, PackError> {
        let mut out = String::new();
        push_line(&mut out, MAGIC, &FORMAT_VERSION)?;
        push_line(&mut out, "codec", &self.codec)?;

        for unit in &self.units {
            push_line(
                &mut out,
                "unit",
                &UnitHeader {
                    name: unit.name.clone(),
                    doc: unit.doc.clone(),
                },
            )?;
            push_line(&mut out, "leaf", &unit.name)?;
            push_line(&mut out, "package", &unit.name)?;
            push_line(
                &mut out,
                "exec",
                &ExecPayload {
                    name: unit.name.clone(),
                    bytes: hex::encode(&unit.bytes),
                },
            )?;
        }

        push_line(&mut out, LISTING, &self.directory())?;
        push_line(&mut out, "dir", &LISTING)?;
        Ok(out)
    }

    /// Parse bundle text, checking every stanza and the trailer.
    pub fn parse(text: &str) -> Result<Self, PackError> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
        let last = text.lines().count();
        let mut next = |expected: &str| next_line(&mut lines, last, expected);

        let (lineno, line) = next(MAGIC)?;
        let version: u32 = payload(lineno, line, MAGIC)?;
        if version != FORMAT_VERSION {
            return Err(PackError::format(
                lineno,
                format!("unsupported bundle version {}", version),
            ));
        }

        let (lineno, line) = next("codec")?;
        let codec: String = payload(lineno, line, "codec")?;
        let mut bundle = Bundle::new(codec);

        loop {
            let (lineno, line) = next("unit")?;
            if verb(line) == LISTING {
                let listing: Vec<String> = payload(lineno, line, LISTING)?;
                if listing != bundle.directory() {
                    return Err(PackError::format(
                        lineno,
                        "directory listing does not match the units",
                    ));
                }
                break;
            }

            let header: UnitHeader = payload(lineno, line, "unit")?;
            for expected in ["leaf", "package"] {
                let (lineno, line) = next(expected)?;
                let name: String = payload(lineno, line, expected)?;
                if name != header.name {
                    return Err(PackError::format(
                        lineno,
                        format!("`{}` names `{}` inside unit `{}`", expected, name, header.name),
                    ));
                }
            }
            let (lineno, line) = next("exec")?;
            let exec: ExecPayload = payload(lineno, line, "exec")?;
            if exec.name != header.name {
                return Err(PackError::format(
                    lineno,
                    format!("`exec` names `{}` inside unit `{}`", exec.name, header.name),
                ));
            }
            let bytes = hex::decode(&exec.bytes)
                .map_err(|e| PackError::format(lineno, format!("invalid artifact bytes: {}", e)))?;

            bundle.push(BundleUnit {
                name: header.name,
                doc: header.doc,
                bytes,
            });
        }

        let (lineno, line) = next("dir")?;
        let target: String = payload(lineno, line, "dir")?;
        if target != LISTING {
            return Err(PackError::format(
                lineno,
                format!("directory query bound to unknown listing `{}`", target),
            ));
        }

        if let Some((lineno, _)) = lines.find(|(_, l)| !l.trim().is_empty()) {
            return Err(PackError::format(lineno, "trailing content after directory query"));
        }

        Ok(bundle)
    }
}

fn next_line<'t>(
    lines: &mut impl Iterator<Item = (usize, &'t str)>,
    last: usize,
    expected: &str,
) -> Result<(usize, &'t str), PackError> {
    lines.next().ok_or_else(|| {
        PackError::format(last, format!("unexpected end, expected `{}`", expected))
    })
}

fn push_line<T: Serialize + ?Sized>(out: &mut String, verb: &str, value: &T) -> Result<(), PackError> {
    let json = serde_json::to_string(value)
        .map_err(|e| PackError::format(0, format!("failed to encode `{}`: {}", verb, e)))?;
    out.push_str(verb);
    out.push(' ');
    out.push_str(&json);
    out.push('\n');
    Ok(())
}

fn verb(line: &str) -> &str {
    line.split_once(' ').map_or(line, |(v, _)| v)
}

fn payload<T: DeserializeOwned>(lineno: usize, line: &str, expected: &str) -> Result<T, PackError> {
    let (verb, json) = line
        .split_once(' ')
        .ok_or_else(|| PackError::format(lineno, format!("expected `{}` directive", expected)))?;
    if verb != expected {
        return Err(PackError::format(
            lineno,
            format!("expected `{}`, found `{}`", expected, verb),
        ));
    }
    serde_json::from_str(json)
        .map_err(|e| PackError::format(lineno, format!("invalid `{}` payload: {}", expected, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, bytes: &[u8]) -> BundleUnit {
        BundleUnit {
            name: name.to_string(),
            doc: format!("Sub-unit {} of out", name),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_render_layout() {
        let mut bundle = Bundle::new("json");
        bundle.push(unit("a", b"{}"));

        let text = bundle.render().unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "px-bundle 1",
                "codec \"json\"",
                "unit {\"name\":\"a\",\"doc\":\"Sub-unit a of out\"}",
                "leaf \"a\"",
                "package \"a\"",
                "exec {\"name\":\"a\",\"bytes\":\"7b7d\"}",
                "all [\"a\"]",
                "dir \"all\"",
            ]
        );
    }

    #[test]
    fn test_directory_dedupes_in_first_appearance_order() {
        let mut bundle = Bundle::new("json");
        bundle.push(unit("a", b"1"));
        bundle.push(unit("b", b"2"));
        bundle.push(unit("a", b"3"));

        assert_eq!(bundle.directory(), vec!["a", "b"]);
        assert_eq!(bundle.unit("a").unwrap().bytes, b"3");
        assert_eq!(bundle.units().len(), 3);
    }

    #[test]
    fn test_parse_rendered_bundle() {
        let mut bundle = Bundle::new("json");
        bundle.push(unit("a", b"{\"x\":1}"));
        bundle.push(unit("b", b"[]"));

        let parsed = Bundle::parse(&bundle.render().unwrap()).unwrap();
        assert_eq!(parsed, bundle);
    }

    #[test]
    fn test_parse_empty_bundle() {
        let text = "px-bundle 1\ncodec \"json\"\nall []\ndir \"all\"\n";
        let parsed = Bundle::parse(text).unwrap();
        assert!(parsed.directory().is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_version() {
        let text = "px-bundle 2\ncodec \"json\"\nall []\ndir \"all\"\n";
        assert!(matches!(
            Bundle::parse(text),
            Err(PackError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_mismatched_listing() {
        let mut bundle = Bundle::new("json");
        bundle.push(unit("a", b"{}"));
        let text = bundle.render().unwrap().replace("all [\"a\"]", "all [\"a\",\"b\"]");
        assert!(Bundle::parse(&text).is_err());
    }

    #[test]
    fn test_parse_rejects_truncated_stanza() {
        let text = "px-bundle 1\ncodec \"json\"\nunit {\"name\":\"a\",\"doc\":\"\"}\nleaf \"a\"\n";
        assert!(Bundle::parse(text).is_err());
    }

    #[test]
    fn test_parse_rejects_stanza_name_mismatch() {
        let mut bundle = Bundle::new("json");
        bundle.push(unit("a", b"{}"));
        let text = bundle.render().unwrap().replace("package \"a\"", "package \"b\"");
        assert!(Bundle::parse(&text).is_err());
    }
}
