//! CLI command implementations.

pub mod describe;
pub mod multi;
pub mod single;

use std::path::Path;

use anyhow::{Context, Result};
use spigen_descriptor::DocumentLocator;
use spigen_resolve::{
    ConstantSource, NoConstantSource, PlatformResolver, RegisterVocabulary, TomlConstantSource,
};
use tracing::debug;

use crate::config::SpigenConfig;

/// Descriptor tree and constants table shared by every command.
pub struct Inputs {
    locator: DocumentLocator,
    constants: Box<dyn ConstantSource>,
}

impl Inputs {
    pub fn new(locator: DocumentLocator, constants: Box<dyn ConstantSource>) -> Self {
        Self { locator, constants }
    }

    /// Build inputs from the configuration and command-line overrides.
    pub fn load(
        config: &SpigenConfig,
        cfg_root: Option<&Path>,
        constants: Option<&Path>,
    ) -> Result<Self> {
        let root = config.cfg_root(cfg_root);
        let locator = DocumentLocator::with_layout(root, config.tree_layout());
        let constants: Box<dyn ConstantSource> = match config.constants_source(constants) {
            Some(path) => {
                debug!(path = %path.display(), "loading constants table");
                let table = TomlConstantSource::load(&path)
                    .with_context(|| format!("loading constants from {}", path.display()))?;
                Box::new(table)
            }
            None => Box::new(NoConstantSource),
        };
        Ok(Self::new(locator, constants))
    }

    pub fn resolver(&self, vocabulary: RegisterVocabulary) -> PlatformResolver<'_> {
        PlatformResolver::new(&self.locator, vocabulary, self.constants.as_ref())
    }
}
