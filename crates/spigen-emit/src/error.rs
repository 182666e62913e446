//! Error types for artifact emission.

use std::path::PathBuf;

/// Errors that can occur while rendering or writing an artifact.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// A BAR field resolved to text that is not a number.
    #[error("{sku}: BAR field '{field}' has non-numeric value '{raw}'")]
    NonNumericField {
        /// Platform SKU code.
        sku: String,
        /// BAR field name.
        field: &'static str,
        /// The unparsed attribute text.
        raw: String,
    },

    /// Multi-platform rendering was asked for zero platforms.
    #[error("no platforms to emit")]
    NoPlatforms,

    /// Platforms in one artifact must share a register layout.
    #[error("{sku}: register set differs from the first platform's")]
    RegisterLayoutMismatch {
        /// The platform whose registers differ.
        sku: String,
    },

    /// Writing the artifact failed.
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for emission operations.
pub type Result<T> = std::result::Result<T, EmitError>;
