//! Bundle error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::errors::GENERIC_FAILURE;

/// Error raised while building or loading a bundle.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("file `{}` does not exist or is not a file", path.display())]
    MissingInput { path: PathBuf },

    #[error("no input files given")]
    NoInputs,

    #[error("in unit `{unit}`, line {line}: {message}")]
    Compile {
        unit: String,
        line: usize,
        message: String,
    },

    #[error("codec `{codec}` failed for unit `{unit}`: {message}")]
    Codec {
        codec: String,
        unit: String,
        message: String,
    },

    #[error("malformed bundle at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("bundle has no unit named `{name}`")]
    UnknownUnit { name: String },
}

impl PackError {
    /// The process exit status this error maps to.
    pub fn exit_code(&self) -> i32 {
        GENERIC_FAILURE
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        PackError::Format {
            line,
            message: message.into(),
        }
    }
}
