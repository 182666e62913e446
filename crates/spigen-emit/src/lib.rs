//! Artifact emission for spigen.
//!
//! Renders resolved platforms as a C header of statically initialised
//! tables for the SPI flash reader kernel module, and writes it out.

pub mod error;
pub mod header;

use std::path::Path;

pub use error::{EmitError, Result};
pub use header::{render_multi, render_single, Layout};

/// Write `text` to `path`, creating the parent directory if needed.
pub fn write_artifact(path: &Path, text: &str) -> Result<()> {
    let io_err = |source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, text).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("include").join("gen_pch_spi_offsets.h");
        write_artifact(&path, "/* x */\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "/* x */\n");
    }
}
