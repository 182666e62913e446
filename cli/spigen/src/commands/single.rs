//! `spigen single`: header for one platform.

use std::path::Path;

use anyhow::{bail, Result};
use spigen_descriptor::SkuIdentifier;
use spigen_emit::{render_single, write_artifact};
use spigen_resolve::RegisterVocabulary;

use super::Inputs;

pub fn run(inputs: &Inputs, pch: &str, out: &Path) -> Result<()> {
    let sku = SkuIdentifier::new(pch);
    if sku.as_str().is_empty() {
        bail!("--pch must name a SKU");
    }

    let record = inputs.resolver(RegisterVocabulary::single()).resolve(&sku)?;
    let text = render_single(&record)?;
    write_artifact(out, &text)?;

    println!("Generated {} from {}", out.display(), record.document.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use spigen_descriptor::DescriptorError;
    use spigen_resolve::ResolveError;

    #[test]
    fn writes_header() {
        let dir = fixtures::tree();
        let out = dir.path().join("out").join("gen_pch_spi_offsets.h");
        run(&fixtures::inputs(dir.path()), "Q170", &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("g_spi_sku[] = \"PCH_Q170\";"));
        assert!(text.contains(".mask = 0xFFFFF000ULL"));
        assert!(text.contains("    .bios_ptinx = 0x0,\n"));
    }

    #[test]
    fn unknown_sku_is_not_found() {
        let dir = fixtures::tree();
        let out = dir.path().join("x.h");
        let err = run(&fixtures::inputs(dir.path()), "BOGUS", &out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::Descriptor(DescriptorError::NotFound { .. }))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn blank_sku_rejected() {
        let dir = fixtures::tree();
        assert!(run(&fixtures::inputs(dir.path()), "  ", &dir.path().join("x.h")).is_err());
    }
}
