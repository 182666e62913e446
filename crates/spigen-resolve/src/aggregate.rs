//! Combining several SKUs into one ordered platform list.

use std::collections::HashSet;

use spigen_descriptor::SkuIdentifier;
use tracing::warn;

use crate::error::{ResolveError, Result};
use crate::platform::{PlatformRecord, PlatformResolver};

/// Outcome of a multi-SKU resolution.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Resolved platforms, in request order.
    pub platforms: Vec<PlatformRecord>,
    /// Requested SKUs with no descriptor document.
    pub skipped: Vec<SkuIdentifier>,
}

impl Aggregation {
    /// Whether every requested SKU resolved.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Resolve every SKU in `skus`, in order.
///
/// SKUs with no descriptor are skipped with a warning. A SKU requested twice
/// (in either form) is resolved once. Any other resolution failure aborts.
/// Fails with [`ResolveError::NoPlatformsResolved`] if nothing resolved.
pub fn aggregate(resolver: &PlatformResolver<'_>, skus: &[SkuIdentifier]) -> Result<Aggregation> {
    let mut platforms = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();

    for sku in skus {
        if !seen.insert(sku.prefixed()) {
            warn!(sku = %sku, "SKU requested more than once; keeping the first");
            continue;
        }
        let Some(path) = resolver.locator().locate(sku) else {
            warn!(
                "could not locate a descriptor for {sku} under {}; skipping",
                resolver.locator().root().display()
            );
            skipped.push(sku.clone());
            continue;
        };
        platforms.push(resolver.resolve_document(sku, &path)?);
    }

    if platforms.is_empty() {
        return Err(ResolveError::NoPlatformsResolved {
            requested: skus.iter().map(ToString::to_string).collect(),
        });
    }
    Ok(Aggregation { platforms, skipped })
}
