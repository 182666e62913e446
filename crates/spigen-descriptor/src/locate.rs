//! Locating the descriptor document that declares a SKU.
//!
//! The document tree is organised by vendor subdirectory (`<root>/8086/...`).
//! The vendor subdirectory is searched when it exists, otherwise the whole
//! tree. Traversal order is fixed: inside each directory, files are visited
//! before subdirectories and each group is sorted by name.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::document::DescriptorDocument;
use crate::error::{DescriptorError, Result};
use crate::sku::SkuIdentifier;

/// Default vendor subdirectory (Intel's PCI vendor ID).
pub const DEFAULT_VENDOR_DIR: &str = "8086";
/// Default descriptor document extension.
pub const DEFAULT_EXTENSION: &str = "xml";
/// Default name of the vendor-level shared document.
pub const DEFAULT_COMMON_DOCUMENT: &str = "common.xml";

/// Layout of a descriptor tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    /// Vendor subdirectory searched first and used as the anchor for shared
    /// definitions.
    pub vendor_dir: String,
    /// File extension (without the dot) of descriptor documents.
    pub extension: String,
    /// File name of the shared document in the vendor directory.
    pub common_document: String,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self {
            vendor_dir: DEFAULT_VENDOR_DIR.into(),
            extension: DEFAULT_EXTENSION.into(),
            common_document: DEFAULT_COMMON_DOCUMENT.into(),
        }
    }
}

/// Finds SKU documents under a descriptor tree root.
#[derive(Debug, Clone)]
pub struct DocumentLocator {
    root: PathBuf,
    layout: TreeLayout,
}

impl DocumentLocator {
    /// Locator over `root` with the default layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_layout(root, TreeLayout::default())
    }

    /// Locator over `root` with an explicit layout.
    pub fn with_layout(root: impl Into<PathBuf>, layout: TreeLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    /// Tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tree layout.
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Directory actually walked: the vendor subdirectory if it exists,
    /// otherwise the root.
    pub fn search_dir(&self) -> PathBuf {
        let vendor = self.root.join(&self.layout.vendor_dir);
        if vendor.is_dir() {
            vendor
        } else {
            self.root.clone()
        }
    }

    /// Path of the first document declaring `sku`, or `None`.
    ///
    /// Documents that cannot be read or parsed are skipped.
    pub fn locate(&self, sku: &SkuIdentifier) -> Option<PathBuf> {
        let search_dir = self.search_dir();
        debug!(sku = %sku, dir = %search_dir.display(), "searching descriptor tree");

        for path in self.documents(&search_dir) {
            let doc = match DescriptorDocument::load(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("skipping unreadable descriptor: {e}");
                    continue;
                }
            };
            if declares_sku(&doc, sku) {
                debug!(sku = %sku, path = %path.display(), "matched descriptor");
                return Some(path);
            }
        }
        None
    }

    /// Like [`locate`](Self::locate) but fails with
    /// [`DescriptorError::NotFound`].
    pub fn locate_required(&self, sku: &SkuIdentifier) -> Result<PathBuf> {
        self.locate(sku).ok_or_else(|| DescriptorError::NotFound {
            sku: sku.to_string(),
            root: self.root.clone(),
        })
    }

    /// Descriptor documents under `dir` in traversal order.
    fn documents(&self, dir: &Path) -> Vec<PathBuf> {
        let ext = OsStr::new(&self.layout.extension);
        WalkDir::new(dir)
            .sort_by(files_first)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.path().is_file())
            .map(DirEntry::into_path)
            .filter(|path| path.extension() == Some(ext))
            .collect()
    }
}

/// Sibling order: files before directories, then by file name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Whether any `sku` element of `doc` denotes `sku`.
pub fn declares_sku(doc: &DescriptorDocument, sku: &SkuIdentifier) -> bool {
    doc.elements("sku")
        .any(|e| sku.matches(e.attr("code"), e.attr("name")))
}

/// Nearest directory at or above `start` whose final component is `name`.
///
/// Operates on path components only; nothing is read from disk.
pub fn nearest_ancestor_named(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.file_name() == Some(OsStr::new(name)))
        .map(Path::to_path_buf)
}

/// Path of the shared document that applies to `document`, if the document
/// sits below a directory named `layout.vendor_dir`.
pub fn common_document_for(document: &Path, layout: &TreeLayout) -> Option<PathBuf> {
    let dir = document.parent()?;
    nearest_ancestor_named(dir, &layout.vendor_dir).map(|v| v.join(&layout.common_document))
}
