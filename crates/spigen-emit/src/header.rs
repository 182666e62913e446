//! C header rendering.
//!
//! The header is consumed by a Linux kernel module, so everything is emitted
//! as `static const ... __ro_after_init` data using kernel integer types.
//! Output depends only on the records passed in: rendering the same records
//! twice yields identical text.

use spigen_resolve::{BarDescriptor, BarField, BarValue, HardwareConstants, PlatformRecord};

use crate::error::{EmitError, Result};

const BANNER: &str = "/* Auto-generated: DO NOT EDIT. */\n#pragma once\n#include <linux/types.h>\n";

/// Which header layout to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One platform, fixed symbol names (`g_spi_regs`, ...).
    Single,
    /// Indexed per-platform symbols plus a `g_spi_platforms` table.
    Multi,
}

impl Layout {
    /// Value written for a BAR field the descriptor left unresolved.
    pub fn bar_default(self, field: BarField) -> u64 {
        match (self, field) {
            (Layout::Single, BarField::Width) => 4,
            (Layout::Single, BarField::Mask) => 0xFFFF_FFFF,
            (Layout::Single, BarField::Size) => 0x1000,
            _ => 0,
        }
    }
}

/// Integer value of a BAR field, with the layout default for unresolved
/// fields.
fn bar_value(layout: Layout, sku: &str, bar: &BarDescriptor, field: BarField) -> Result<u64> {
    match bar.get(field) {
        None => Ok(layout.bar_default(field)),
        Some(BarValue::Int(v)) => Ok(*v),
        Some(BarValue::Raw(raw)) => Err(EmitError::NonNumericField {
            sku: sku.to_string(),
            field: field.attr_name(),
            raw: raw.clone(),
        }),
    }
}

/// `.name = value` with the radix of the field's class.
fn bar_initializer(layout: Layout, record: &PlatformRecord, field: BarField) -> Result<String> {
    let v = bar_value(layout, &record.sku, &record.bar, field)?;
    let name = field.attr_name();
    Ok(if field.is_coordinate() {
        format!(".{name} = {v}")
    } else {
        format!(".{name} = 0x{v:X}ULL")
    })
}

fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                // Octal escapes stop after three digits, so a following
                // character is never absorbed.
                for b in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\{b:03o}"));
                }
            }
        }
    }
    out.push('"');
    out
}

fn device_id_list(ids: &[u16]) -> String {
    let list: Vec<String> = ids.iter().map(|id| format!("0x{id:04X}")).collect();
    format!("{{ {} }}", list.join(", "))
}

fn register_fields(record: &PlatformRecord) -> Vec<String> {
    record
        .registers
        .iter()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect()
}

fn constants_block(out: &mut String, symbol: &str, c: &HardwareConstants) {
    out.push_str(&format!(
        "static const struct spi_consts __ro_after_init {symbol} = {{\n"
    ));
    out.push_str(&format!("    .hsfsts_clear = 0x{:X},\n", c.hsfsts_clear));
    out.push_str(&format!(
        "    .hsfsts_scip = 0x{:X}, .hsfsts_fdone = 0x{:X}, .hsfsts_fcerr = 0x{:X}, .hsfsts_ael = 0x{:X},\n",
        c.hsfsts_scip, c.hsfsts_fdone, c.hsfsts_fcerr, c.hsfsts_ael
    ));
    out.push_str(&format!("    .faddr_mask = 0x{:X},\n", c.faddr_mask));
    out.push_str(&format!("    .hsfctl_read_cycle = 0x{:X},\n", c.hsfctl_read_cycle));
    out.push_str("};\n");
}

fn registers_block(out: &mut String, symbol: &str, record: &PlatformRecord) {
    out.push_str(&format!(
        "static const struct spi_regs __ro_after_init {symbol} = {{\n"
    ));
    for (name, offset) in record.registers.iter() {
        out.push_str(&format!(
            "    .{} = 0x{:X},\n",
            name.to_ascii_lowercase(),
            offset.unwrap_or(0)
        ));
    }
    out.push_str("};\n");
}

/// Render the single-platform header.
pub fn render_single(record: &PlatformRecord) -> Result<String> {
    let layout = Layout::Single;
    let mut out = String::from(BANNER);
    out.push('\n');

    out.push_str("struct spibar_meta {\n");
    out.push_str("    u16 bus; u16 dev; u16 fun; u16 reg;\n");
    out.push_str("    u8 width; u64 mask; u64 size; u64 fixed_address; u64 offset;\n");
    out.push_str("};\n\n");

    out.push_str("struct spi_regs {\n");
    for field in register_fields(record) {
        out.push_str(&format!("    u32 {field};\n"));
    }
    out.push_str("};\n\n");

    out.push_str("struct spi_consts {\n");
    out.push_str("    u32 hsfsts_clear;\n");
    out.push_str("    u32 hsfsts_scip; u32 hsfsts_fdone; u32 hsfsts_fcerr; u32 hsfsts_ael;\n");
    out.push_str("    u32 faddr_mask;\n");
    out.push_str("    u8 hsfctl_read_cycle;\n");
    out.push_str("};\n\n");

    let init = |field| bar_initializer(layout, record, field);
    out.push_str("static const struct spibar_meta __ro_after_init g_spibar_meta = {\n");
    out.push_str(&format!(
        "    {}, {}, {}, {},\n",
        init(BarField::Bus)?,
        init(BarField::Dev)?,
        init(BarField::Fun)?,
        init(BarField::Reg)?
    ));
    out.push_str(&format!(
        "    {}, {}, {}, {}, {},\n",
        init(BarField::Width)?,
        init(BarField::Mask)?,
        init(BarField::Size)?,
        init(BarField::FixedAddress)?,
        init(BarField::Offset)?
    ));
    out.push_str("};\n\n");

    registers_block(&mut out, "g_spi_regs", record);
    out.push('\n');
    constants_block(&mut out, "g_spi_consts", &record.constants);
    out.push('\n');

    out.push_str(&format!(
        "static const u16 __ro_after_init g_spi_dids[] = {};\n",
        device_id_list(&record.device_ids)
    ));
    out.push_str(
        "static const u32 __ro_after_init g_spi_did_count = (u32)(sizeof(g_spi_dids)/sizeof(g_spi_dids[0]));\n",
    );
    out.push_str(&format!(
        "static const char __ro_after_init g_spi_sku[] = {};\n",
        c_string(&record.sku)
    ));
    Ok(out)
}

/// Render the multi-platform header with a platform table indexed by
/// position in `records`.
pub fn render_multi(records: &[PlatformRecord]) -> Result<String> {
    let layout = Layout::Multi;
    let first = records.first().ok_or(EmitError::NoPlatforms)?;
    let fields = register_fields(first);
    for record in &records[1..] {
        if register_fields(record) != fields {
            return Err(EmitError::RegisterLayoutMismatch {
                sku: record.sku.clone(),
            });
        }
    }

    let mut out = String::from(BANNER);
    out.push('\n');
    out.push_str("struct spibar_meta { u16 bus; u16 dev; u16 fun; u16 reg; u8 width; u64 mask; u64 size; u64 fixed_address; u64 offset; };\n");
    let reg_members: Vec<String> = fields.iter().map(|f| format!("u32 {f};")).collect();
    out.push_str(&format!("struct spi_regs {{ {} }};\n", reg_members.join(" ")));
    out.push_str("struct spi_consts { u32 hsfsts_clear; u32 hsfsts_scip; u32 hsfsts_fdone; u32 hsfsts_fcerr; u32 hsfsts_ael; u32 faddr_mask; u8 hsfctl_read_cycle; };\n");
    out.push_str("struct spi_platform { const struct spibar_meta *bar; const struct spi_regs *regs; const struct spi_consts *c; const char *sku; const u16 *dids; u32 did_count; };\n");
    out.push('\n');

    for (idx, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "static const struct spibar_meta __ro_after_init g_spibar_meta_{idx} = {{\n"
        ));
        for field in BarField::ALL {
            out.push_str(&format!("    {},\n", bar_initializer(layout, record, field)?));
        }
        out.push_str("};\n");
        registers_block(&mut out, &format!("g_spi_regs_{idx}"), record);
        constants_block(&mut out, &format!("g_spi_consts_{idx}"), &record.constants);
        out.push_str(&format!(
            "static const u16 __ro_after_init g_spi_dids_{idx}[] = {};\n",
            device_id_list(&record.device_ids)
        ));
        out.push_str(&format!(
            "static const char __ro_after_init g_spi_sku_{idx}[] = {};\n",
            c_string(&record.sku)
        ));
        out.push('\n');
    }

    out.push_str("static const struct spi_platform __ro_after_init g_spi_platforms[] = {\n");
    for idx in 0..records.len() {
        out.push_str(&format!(
            "    {{ .bar = &g_spibar_meta_{idx}, .regs = &g_spi_regs_{idx}, .c = &g_spi_consts_{idx}, .sku = g_spi_sku_{idx}, .dids = g_spi_dids_{idx}, .did_count = (u32)(sizeof(g_spi_dids_{idx})/sizeof(g_spi_dids_{idx}[0])) }} ,\n"
        ));
    }
    out.push_str("};\n");
    out.push_str("static const u32 __ro_after_init g_spi_platforms_count = (u32)(sizeof(g_spi_platforms)/sizeof(g_spi_platforms[0]));\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spigen_resolve::{RegisterSet, RegisterVocabulary};
    use std::path::PathBuf;

    fn record(sku: &str, vocab: &RegisterVocabulary) -> PlatformRecord {
        let mut bar = BarDescriptor::default();
        bar.set(BarField::Bus, BarValue::Int(0));
        bar.set(BarField::Dev, BarValue::Int(31));
        bar.set(BarField::Fun, BarValue::Int(5));
        bar.set(BarField::Reg, BarValue::Int(0x10));
        bar.set(BarField::Width, BarValue::Int(4));
        bar.set(BarField::Mask, BarValue::Int(0xFFFF_FFFF_FFFF_F000));
        bar.set(BarField::Size, BarValue::Int(0x1000));
        PlatformRecord {
            sku: sku.into(),
            document: PathBuf::from("/cfg/8086/pch_1xx.xml"),
            bar,
            registers: RegisterSet::new(vocab),
            constants: HardwareConstants::default(),
            device_ids: vec![0x9D83, 0x9D84],
        }
    }

    #[test]
    fn single_layout_blocks() {
        let text = render_single(&record("PCH_Q170", &RegisterVocabulary::single())).unwrap();
        assert!(text.starts_with("/* Auto-generated: DO NOT EDIT. */\n#pragma once\n"));
        assert!(text.contains("    .bus = 0, .dev = 31, .fun = 5, .reg = 16,\n"));
        assert!(text.contains(".mask = 0xFFFFFFFFFFFFF000ULL, .size = 0x1000ULL, .fixed_address = 0x0ULL, .offset = 0x0ULL,"));
        assert!(text.contains("    u32 bios_ptdata;\n"));
        assert!(text.contains("    .fdata15 = 0x0,\n"));
        assert!(text.contains("    .faddr_mask = 0x7FFFFFF,\n"));
        assert!(text.contains("g_spi_dids[] = { 0x9D83, 0x9D84 };"));
        assert!(text.ends_with("static const char __ro_after_init g_spi_sku[] = \"PCH_Q170\";\n"));
    }

    #[test]
    fn single_layout_defaults() {
        let mut r = record("PCH_Q170", &RegisterVocabulary::single());
        r.bar = BarDescriptor::default();
        let text = render_single(&r).unwrap();
        assert!(text.contains(".width = 4, .mask = 0xFFFFFFFFULL, .size = 0x1000ULL,"));
    }

    #[test]
    fn multi_layout_defaults_are_zero() {
        let mut r = record("PCH_Q170", &RegisterVocabulary::multi());
        r.bar = BarDescriptor::default();
        let text = render_multi(&[r]).unwrap();
        assert!(text.contains("    .width = 0,\n    .mask = 0x0ULL,\n    .size = 0x0ULL,\n"));
    }

    #[test]
    fn multi_layout_table() {
        let vocab = RegisterVocabulary::multi();
        let mut second = record("PCH_C620", &vocab);
        second.device_ids.clear();
        let text = render_multi(&[record("PCH_Q170", &vocab), second]).unwrap();
        assert!(text.contains("struct spi_regs { u32 hsfs; u32 hsfc; u32 faddr; u32 fdata0;"));
        assert!(!text.contains("bios_ptinx"));
        assert!(text.contains("g_spibar_meta_1 = {\n    .bus = 0,\n    .dev = 31,\n"));
        assert!(text.contains("g_spi_dids_0[] = { 0x9D83, 0x9D84 };"));
        assert!(text.contains("g_spi_dids_1[] = {  };"));
        assert!(text.contains("g_spi_sku_1[] = \"PCH_C620\";"));
        assert!(text.contains("{ .bar = &g_spibar_meta_1, .regs = &g_spi_regs_1, .c = &g_spi_consts_1, .sku = g_spi_sku_1, .dids = g_spi_dids_1,"));
        assert!(text.ends_with("g_spi_platforms_count = (u32)(sizeof(g_spi_platforms)/sizeof(g_spi_platforms[0]));\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let r = record("PCH_Q170", &RegisterVocabulary::multi());
        assert_eq!(render_multi(&[r.clone()]).unwrap(), render_multi(&[r.clone()]).unwrap());
        assert_eq!(render_single(&r).unwrap(), render_single(&r).unwrap());
    }

    #[test]
    fn raw_bar_value_fails() {
        let mut r = record("PCH_Q170", &RegisterVocabulary::multi());
        r.bar.set(BarField::Size, BarValue::Raw("MMIO_SIZE".into()));
        let err = render_multi(&[r]).unwrap_err();
        assert!(matches!(err, EmitError::NonNumericField { field: "size", .. }));
    }

    #[test]
    fn empty_and_mismatched_inputs() {
        assert!(matches!(render_multi(&[]), Err(EmitError::NoPlatforms)));
        let a = record("PCH_A", &RegisterVocabulary::multi());
        let b = record("PCH_B", &RegisterVocabulary::single());
        assert!(matches!(
            render_multi(&[a, b]),
            Err(EmitError::RegisterLayoutMismatch { .. })
        ));
    }

    #[test]
    fn sku_string_is_escaped() {
        assert_eq!(c_string("PCH_Q170"), "\"PCH_Q170\"");
        assert_eq!(c_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(c_string("PCH_\u{e9}1"), "\"PCH_\\303\\2511\"");
    }
}
