//! Hardware descriptor documents for spigen.
//!
//! ## Modules
//!
//! - [`document`]: owned XML element tree and base-aware integer parsing
//! - [`sku`]: SKU identifier normalisation and matching
//! - [`locate`]: finding the document that declares a SKU, and the shared
//!   vendor document next to it

pub mod document;
pub mod error;
pub mod locate;
pub mod sku;

pub use document::{parse_int, DescriptorDocument, Element};
pub use error::{DescriptorError, Result};
pub use locate::{
    common_document_for, declares_sku, nearest_ancestor_named, DocumentLocator, TreeLayout,
};
pub use sku::SkuIdentifier;
