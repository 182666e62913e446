//! `spigen.toml` project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spigen_descriptor::TreeLayout;

/// File name searched for by [`SpigenConfig::find_and_load`].
pub const CONFIG_FILE: &str = "spigen.toml";

/// Descriptor root used when neither the command line nor the config names
/// one.
pub const DEFAULT_CFG_ROOT: &str = "chipsec/chipsec/cfg";

/// The top-level configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpigenConfig {
    /// Descriptor tree location and layout.
    #[serde(default)]
    pub descriptors: DescriptorsConfig,
    /// Hardware constants table.
    #[serde(default)]
    pub constants: ConstantsConfig,
}

/// `[descriptors]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorsConfig {
    /// Root of the descriptor tree.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Vendor directory searched before the whole tree.
    #[serde(default)]
    pub vendor: Option<String>,
    /// File name of the shared register document.
    #[serde(default)]
    pub common: Option<String>,
    /// Descriptor file extension, without the dot.
    #[serde(default)]
    pub extension: Option<String>,
}

/// `[constants]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstantsConfig {
    /// TOML table of `NAME = integer` constant overrides.
    #[serde(default)]
    pub source: Option<PathBuf>,
}

impl SpigenConfig {
    /// Search upward from `start_dir` for a `spigen.toml` file, parse it and
    /// return it along with the directory it was found in. Relative paths in
    /// the file are resolved against that directory.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: SpigenConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config.relative_to(&dir), dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing spigen.toml")
    }

    fn relative_to(mut self, dir: &Path) -> Self {
        let anchor = |p: PathBuf| if p.is_relative() { dir.join(p) } else { p };
        self.descriptors.root = self.descriptors.root.map(anchor);
        self.constants.source = self.constants.source.map(anchor);
        self
    }

    /// Descriptor root: the command-line value, then the config, then
    /// [`DEFAULT_CFG_ROOT`].
    pub fn cfg_root(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.descriptors.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CFG_ROOT))
    }

    /// Constants table: the command-line value, then the config.
    pub fn constants_source(&self, flag: Option<&Path>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.constants.source.clone())
    }

    /// Tree layout with configured overrides applied to the defaults.
    pub fn tree_layout(&self) -> TreeLayout {
        let mut layout = TreeLayout::default();
        if let Some(vendor) = &self.descriptors.vendor {
            layout.vendor_dir = vendor.clone();
        }
        if let Some(common) = &self.descriptors.common {
            layout.common_document = common.clone();
        }
        if let Some(ext) = &self.descriptors.extension {
            layout.extension = ext.trim_start_matches('.').to_string();
        }
        layout
    }
}
