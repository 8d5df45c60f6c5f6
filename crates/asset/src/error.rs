//! Typed failures for decoding and loading assets.

use std::path::PathBuf;

use thiserror::Error;

/// The model text could not be turned into meshes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed OBJ line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("required object '{0}' is missing")]
    MissingObject(&'static str),

    #[error("object '{0}' has no triangles")]
    EmptyObject(&'static str),

    #[error("object '{0}' has a face corner without texture coordinates")]
    MissingTexcoord(String),

    #[error("too many vertices (>{})", u32::MAX)]
    TooManyVertices,
}

impl DecodeError {
    pub(crate) fn malformed(line_no: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line: line_no + 1,
            reason: reason.into(),
        }
    }
}

/// Fetching or decoding an asset failed. Network and decode failures share
/// one type so callers can treat them as "asset unavailable".
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid asset source '{0}'")]
    InvalidSource(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("model file is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
