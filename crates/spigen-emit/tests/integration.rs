//! End-to-end: descriptor tree -> resolved platforms -> header text.

use std::path::Path;

use spigen_descriptor::{DocumentLocator, SkuIdentifier};
use spigen_emit::{render_multi, render_single, write_artifact};
use spigen_resolve::{aggregate, PlatformResolver, RegisterVocabulary, TomlConstantSource};

const PCH_1XX: &str = r#"<?xml version="1.0"?>
<configuration platform="SKL">
  <info family="pch">
    <sku did="0xA143" name="H110" code="PCH_H110" />
    <sku did="0xA148" name="Q170" code="PCH_Q170" />
    <sku did="0xA146" name="Q170" code="PCH_Q170" />
  </info>
  <pci>
    <device name="SPI" bus="0" dev="0x1F" fun="5" />
  </pci>
  <mmio>
    <bar name="SPIBAR" register="BIOS_SPI_BAR0" base_field="MEMBAR" size="0x1000" />
  </mmio>
  <registers>
    <register name="BIOS_SPI_BAR0" type="pcicfg" bus="0" device="0x1F" function="5" offset="0x10" size="4">
      <field name="MEMBAR" bit="12" size="20" />
    </register>
    <register name="HSFS" type="mmio" bar="SPIBAR" offset="0x04" size="2" />
    <register name="HSFC" type="mmio" bar="SPIBAR" offset="0x06" size="2" />
    <register name="FADDR" type="mmio" bar="SPIBAR" offset="0x08" size="4" />
  </registers>
</configuration>
"#;

const COMMON: &str = r#"<?xml version="1.0"?>
<configuration>
  <registers>
    <register name="FADDR" offset="0x5C" />
    <register name="FDATA0" offset="0x10" />
    <register name="FDATA1" offset="0x14" />
    <register name="BIOS_PTINX" offset="0xCC" />
    <register name="BIOS_PTDATA" offset="0xD0" />
  </registers>
</configuration>
"#;

fn descriptor_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let vendor = dir.path().join("chipsec").join("cfg").join("8086");
    std::fs::create_dir_all(&vendor).unwrap();
    std::fs::write(vendor.join("common.xml"), COMMON).unwrap();
    std::fs::write(vendor.join("pch_1xx.xml"), PCH_1XX).unwrap();
    std::fs::write(vendor.join("notes.txt"), "<sku code=\"PCH_BOGUS\"/>").unwrap();
    dir
}

fn cfg_root(dir: &Path) -> std::path::PathBuf {
    dir.join("chipsec").join("cfg")
}

#[test]
fn multi_header_skips_unknown_sku() {
    let dir = descriptor_tree();
    let locator = DocumentLocator::new(cfg_root(dir.path()));
    let constants = TomlConstantSource::default();
    let resolver = PlatformResolver::new(&locator, RegisterVocabulary::multi(), &constants);

    let result = aggregate(&resolver, &SkuIdentifier::parse_list("Q170,BOGUS")).unwrap();
    assert_eq!(result.skipped, vec![SkuIdentifier::new("BOGUS")]);

    let text = render_multi(&result.platforms).unwrap();
    assert!(text.contains("g_spi_sku_0[] = \"PCH_Q170\";"));
    assert!(!text.contains("g_spi_sku_1"));
    assert!(text.contains("g_spi_dids_0[] = { 0xA143, 0xA146, 0xA148 };"));
    assert!(text.contains("    .dev = 31,\n    .fun = 5,\n    .reg = 16,\n    .width = 4,\n"));
    assert!(text.contains("    .mask = 0xFFFFFFFFFFFFF000ULL,\n    .size = 0x1000ULL,\n"));
    // SKU document wins over the shared one; gaps come from the shared one.
    assert!(text.contains("    .faddr = 0x8,\n    .fdata0 = 0x10,\n    .fdata1 = 0x14,\n    .fdata2 = 0x0,\n"));
    assert!(text.ends_with("(u32)(sizeof(g_spi_platforms)/sizeof(g_spi_platforms[0]));\n"));

    let out = dir.path().join("include").join("gen_multi_spi_offsets.h");
    write_artifact(&out, &text).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), text);
}

#[test]
fn single_header_with_constant_overrides() {
    let dir = descriptor_tree();
    let locator = DocumentLocator::new(cfg_root(dir.path()));
    let constants =
        TomlConstantSource::parse("HSFSTS_CLEAR = 0\nPCH_RCBA_SPI_HSFSTS_AEL = 0x40\n").unwrap();
    let resolver = PlatformResolver::new(&locator, RegisterVocabulary::single(), &constants);

    let record = resolver.resolve(&SkuIdentifier::new("PCH_Q170")).unwrap();
    let text = render_single(&record).unwrap();
    assert!(text.contains("    .hsfsts_clear = 0x7,\n"));
    assert!(text.contains(".hsfsts_ael = 0x40,"));
    assert!(text.contains("    .bios_ptinx = 0xCC,\n    .bios_ptdata = 0xD0,\n"));
    assert!(text.contains("g_spi_sku[] = \"PCH_Q170\";"));

    // Identical inputs produce identical bytes.
    let again = resolver.resolve(&SkuIdentifier::new("Q170")).unwrap();
    assert_eq!(render_single(&again).unwrap(), text);
}
