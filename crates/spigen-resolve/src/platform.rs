//! Resolving one SKU into a complete platform record.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use spigen_descriptor::{parse_int, DescriptorDocument, DocumentLocator, SkuIdentifier};
use tracing::{info, warn};

use crate::bar::{resolve_bar, BarDescriptor};
use crate::constants::{ConstantSource, HardwareConstants};
use crate::error::Result;
use crate::registers::{resolve_registers, RegisterSet, RegisterVocabulary};

/// Everything the driver needs for one chipset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformRecord {
    /// SKU code in prefixed form (`PCH_Q170`).
    pub sku: String,
    /// Descriptor document the platform was resolved from.
    pub document: PathBuf,
    /// SPIBAR location.
    pub bar: BarDescriptor,
    /// SPI register offsets.
    pub registers: RegisterSet,
    /// Status/control constants.
    pub constants: HardwareConstants,
    /// PCI device IDs of the SKUs in the document, sorted and de-duplicated.
    pub device_ids: Vec<u16>,
}

/// PCI device IDs declared by the `sku` elements of `doc`, sorted ascending
/// without duplicates.
pub fn collect_device_ids(doc: &DescriptorDocument) -> Vec<u16> {
    let mut ids = BTreeSet::new();
    for sku in doc.elements("sku") {
        let Some(raw) = sku.attr("did") else { continue };
        let Some(value) = parse_int(raw) else { continue };
        match u16::try_from(value) {
            Ok(id) => {
                ids.insert(id);
            }
            Err(_) => warn!(path = %doc.path().display(), "device ID {raw} exceeds 16 bits; skipped"),
        }
    }
    ids.into_iter().collect()
}

/// Resolves SKUs against one descriptor tree.
pub struct PlatformResolver<'a> {
    locator: &'a DocumentLocator,
    vocabulary: RegisterVocabulary,
    constants: &'a dyn ConstantSource,
}

impl<'a> PlatformResolver<'a> {
    /// A resolver for `vocabulary` reading constants from `constants`.
    pub fn new(
        locator: &'a DocumentLocator,
        vocabulary: RegisterVocabulary,
        constants: &'a dyn ConstantSource,
    ) -> Self {
        Self {
            locator,
            vocabulary,
            constants,
        }
    }

    /// The locator in use.
    pub fn locator(&self) -> &DocumentLocator {
        self.locator
    }

    /// Locate and resolve `sku`. Fails with a not-found error when no
    /// document declares it.
    pub fn resolve(&self, sku: &SkuIdentifier) -> Result<PlatformRecord> {
        let path = self.locator.locate_required(sku)?;
        self.resolve_document(sku, &path)
    }

    /// Resolve `sku` from an already located document.
    pub fn resolve_document(&self, sku: &SkuIdentifier, path: &Path) -> Result<PlatformRecord> {
        let doc = DescriptorDocument::load(path)?;
        let bar = resolve_bar(&doc);
        let registers = resolve_registers(&doc, &self.vocabulary, self.locator.layout())?;
        let record = PlatformRecord {
            sku: sku.prefixed(),
            document: path.to_path_buf(),
            bar,
            registers,
            constants: HardwareConstants::resolve(self.constants),
            device_ids: collect_device_ids(&doc),
        };
        info!(
            sku = %record.sku,
            path = %path.display(),
            device_ids = record.device_ids.len(),
            "resolved platform"
        );
        Ok(record)
    }
}
