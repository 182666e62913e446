//! Error types for descriptor document operations.

use std::path::PathBuf;

/// Errors that can occur while loading or locating descriptor documents.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// I/O error reading a descriptor document.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// The document being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML.
    #[error("malformed descriptor document {}: {detail}", path.display())]
    MalformedDocument {
        /// The offending document.
        path: PathBuf,
        /// Parser diagnostic.
        detail: String,
    },

    /// No document under the tree declares the requested SKU.
    #[error("could not locate a descriptor for SKU '{sku}' under {}", root.display())]
    NotFound {
        /// The SKU identifier as requested.
        sku: String,
        /// The tree root that was searched.
        root: PathBuf,
    },
}

/// Result type for descriptor operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;
