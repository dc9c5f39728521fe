use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or loading model values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A fragment document did not deserialize.
    #[error("malformed fragment {origin}: {source}")]
    MalformedFragment {
        /// Source unit or file the document came from.
        origin: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A type graph referenced an unregistered type.
    #[error("no descriptor registered for type {id}")]
    UnknownType {
        /// Missing type identity.
        id: String,
    },

    /// Reading or writing a fragment file failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
