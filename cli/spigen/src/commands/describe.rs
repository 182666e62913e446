//! `spigen describe`: show what a SKU resolves to without emitting.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use spigen_descriptor::SkuIdentifier;
use spigen_resolve::{BarField, BarValue, HardwareConstants, PlatformRecord, RegisterVocabulary};

use super::Inputs;

/// Output format for `describe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

pub fn run(inputs: &Inputs, pch: &str, format: Format) -> Result<()> {
    let sku = SkuIdentifier::new(pch);
    if sku.as_str().is_empty() {
        bail!("--pch must name a SKU");
    }
    let record = inputs.resolver(RegisterVocabulary::single()).resolve(&sku)?;
    match format {
        Format::Text => print!("{}", render_text(&record)),
        Format::Json => {
            let json = serde_json::to_string_pretty(&record).context("serializing platform")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn render_text(record: &PlatformRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Platform: {} ===\n", record.sku));
    out.push_str(&format!("Document: {}\n", record.document.display()));
    let dids: Vec<String> = record
        .device_ids
        .iter()
        .map(|id| format!("0x{id:04X}"))
        .collect();
    if dids.is_empty() {
        out.push_str("Device IDs: (none)\n");
    } else {
        out.push_str(&format!("Device IDs: {}\n", dids.join(", ")));
    }
    out.push('\n');

    out.push_str("--- SPIBAR ---\n");
    for field in BarField::ALL {
        let value = match record.bar.get(field) {
            None => "(default)".to_string(),
            Some(BarValue::Int(v)) if field.is_coordinate() => v.to_string(),
            Some(BarValue::Int(v)) => format!("0x{v:X}"),
            Some(BarValue::Raw(raw)) => format!("'{raw}' (not numeric)"),
        };
        out.push_str(&format!("  {:<14} {value}\n", field.attr_name()));
    }
    out.push('\n');

    out.push_str("--- Registers ---\n");
    for (name, offset) in record.registers.iter() {
        match offset {
            Some(v) => out.push_str(&format!("  {name:<12} 0x{v:02X}\n")),
            None => out.push_str(&format!("  {name:<12} (unresolved)\n")),
        }
    }
    out.push('\n');

    out.push_str("--- Constants ---\n");
    let c = &record.constants;
    let names = HardwareConstants::source_names();
    let values = [
        ("hsfsts_clear", u64::from(c.hsfsts_clear)),
        ("hsfsts_scip", u64::from(c.hsfsts_scip)),
        ("hsfsts_fdone", u64::from(c.hsfsts_fdone)),
        ("hsfsts_fcerr", u64::from(c.hsfsts_fcerr)),
        ("hsfsts_ael", u64::from(c.hsfsts_ael)),
        ("faddr_mask", u64::from(c.faddr_mask)),
        ("hsfctl_read_cycle", u64::from(c.hsfctl_read_cycle)),
    ];
    for (field, value) in values {
        let source = names.get(field).copied().unwrap_or("");
        out.push_str(&format!("  {field:<18} 0x{value:X}  ({source})\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    fn q170() -> PlatformRecord {
        let dir = fixtures::tree();
        fixtures::inputs(dir.path())
            .resolver(RegisterVocabulary::single())
            .resolve(&SkuIdentifier::new("Q170"))
            .unwrap()
    }

    #[test]
    fn text_lists_every_section() {
        let text = render_text(&q170());
        assert!(text.starts_with("=== Platform: PCH_Q170 ===\n"));
        assert!(text.contains("Device IDs: 0xA144, 0xA146\n"));
        assert!(text.contains("  dev            31\n"));
        assert!(text.contains("  mask           0xFFFFF000\n"));
        assert!(text.contains("  width          (default)\n"));
        assert!(text.contains("  HSFS         0x04\n"));
        assert!(text.contains("  BIOS_PTINX   (unresolved)\n"));
        assert!(text.contains("  faddr_mask         0x7FFFFFF  (PCH_RCBA_SPI_FADDR_MASK)\n"));
    }

    #[test]
    fn json_round_trips_through_serde() {
        let json = serde_json::to_value(q170()).unwrap();
        assert_eq!(json["sku"], "PCH_Q170");
        assert_eq!(json["registers"]["hsfs"], 4);
        assert_eq!(json["bar"]["dev"], 31);
        assert_eq!(json["constants"]["hsfctl_read_cycle"], 1);
    }

    #[test]
    fn unknown_sku_fails() {
        let dir = fixtures::tree();
        assert!(run(&fixtures::inputs(dir.path()), "BOGUS", Format::Json).is_err());
    }
}
