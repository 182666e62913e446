//! Error types for platform resolution.

use std::path::PathBuf;

use spigen_descriptor::DescriptorError;

/// Errors that can occur while resolving a platform.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Locating, reading or parsing a descriptor document failed.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// A register element carries an offset that is not an integer.
    #[error("register {register} in {} has non-numeric offset '{raw}'", path.display())]
    InvalidOffset {
        /// Document holding the register.
        path: PathBuf,
        /// Register name (upper case).
        register: String,
        /// The offending attribute text.
        raw: String,
    },

    /// Mandatory registers are still unresolved after the shared-document
    /// fallback.
    #[error("missing required SPI register offsets in {}: {}", path.display(), missing.join(", "))]
    MissingRequiredRegister {
        /// The SKU document that was resolved.
        path: PathBuf,
        /// Unresolved mandatory registers, in vocabulary order.
        missing: Vec<String>,
    },

    /// A multi-platform run resolved nothing.
    #[error("no platforms resolved from [{}]; nothing to emit", requested.join(", "))]
    NoPlatformsResolved {
        /// Identifiers that were requested.
        requested: Vec<String>,
    },

    /// The external hardware-constants table could not be loaded.
    #[error("constants source {}: {detail}", path.display())]
    ConstantSource {
        /// The table file.
        path: PathBuf,
        /// What went wrong.
        detail: String,
    },
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
