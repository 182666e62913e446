//! `spigen multi`: one header covering several platforms.

use std::path::Path;

use anyhow::{bail, Result};
use spigen_descriptor::SkuIdentifier;
use spigen_emit::{render_multi, write_artifact};
use spigen_resolve::{aggregate, RegisterVocabulary};

use super::Inputs;

pub fn run(inputs: &Inputs, pchs: &str, out: &Path) -> Result<()> {
    let skus = SkuIdentifier::parse_list(pchs);
    if skus.is_empty() {
        bail!("--pchs must name at least one SKU");
    }

    let resolver = inputs.resolver(RegisterVocabulary::multi());
    let result = aggregate(&resolver, &skus)?;
    let text = render_multi(&result.platforms)?;
    write_artifact(out, &text)?;

    println!(
        "Generated {} for {} platform(s)",
        out.display(),
        result.platforms.len()
    );
    Ok(())
}
