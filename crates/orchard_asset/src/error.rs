//! Asset load errors

use std::path::PathBuf;
use thiserror::Error;

/// Why a prototype could not be produced
#[derive(Debug, Error)]
pub enum LoadError {
    /// No asset exists under the identifier
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The asset exists but could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a valid glTF/GLB document
    #[error("failed to parse {identifier}: {reason}")]
    Parse { identifier: String, reason: String },

    /// The document decoded but carries no meshes
    #[error("asset {0} has no mesh geometry")]
    Empty(String),

    /// The gateway refused the request
    #[error("request for {identifier} rejected: {reason}")]
    Rejected { identifier: String, reason: String },
}
