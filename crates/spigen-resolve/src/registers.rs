//! SPI controller register offsets.
//!
//! Offsets are looked up by register name in the SKU document first. Names
//! still missing afterwards are looked up in the vendor-level shared document
//! (`<vendor>/common.xml`), which only fills gaps: a definition in the SKU
//! document always wins.

use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use spigen_descriptor::{common_document_for, parse_int, DescriptorDocument, TreeLayout};
use tracing::{debug, warn};

use crate::error::{ResolveError, Result};

/// Hardware sequencing status, control, flash address and data registers.
const HWSEQ_REGISTERS: [&str; 19] = [
    "HSFS", "HSFC", "FADDR", "FDATA0", "FDATA1", "FDATA2", "FDATA3", "FDATA4", "FDATA5", "FDATA6",
    "FDATA7", "FDATA8", "FDATA9", "FDATA10", "FDATA11", "FDATA12", "FDATA13", "FDATA14", "FDATA15",
];

/// BIOS-mapped index/data pair used by the single-platform secondary access
/// path.
const BIOS_INDEX_REGISTERS: [&str; 2] = ["BIOS_PTINX", "BIOS_PTDATA"];

/// Registers without which no read cycle can be issued.
const MINIMUM_REGISTERS: [&str; 4] = ["HSFS", "HSFC", "FADDR", "FDATA0"];

/// The set of register names to resolve, and which of them are mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterVocabulary {
    names: Vec<String>,
    required: Vec<String>,
}

impl RegisterVocabulary {
    /// Build a vocabulary. Names are matched case-insensitively and stored
    /// upper case; required names not in `names` are added to it.
    pub fn new<I, J, S, T>(names: I, required: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_ascii_uppercase())
            .collect();
        let required: Vec<String> = required
            .into_iter()
            .map(|n| n.as_ref().to_ascii_uppercase())
            .collect();
        for r in &required {
            if !names.contains(r) {
                names.push(r.clone());
            }
        }
        Self { names, required }
    }

    /// Registers emitted by the single-platform header, including the BIOS
    /// index/data pair.
    pub fn single() -> Self {
        Self::new(
            HWSEQ_REGISTERS.iter().chain(BIOS_INDEX_REGISTERS.iter()),
            MINIMUM_REGISTERS,
        )
    }

    /// Registers emitted per platform by the multi-platform header.
    pub fn multi() -> Self {
        Self::new(HWSEQ_REGISTERS, MINIMUM_REGISTERS)
    }

    /// All names, in emission order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Mandatory names.
    pub fn required(&self) -> &[String] {
        &self.required
    }
}

/// Resolved offsets, one slot per vocabulary name, in vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSet {
    entries: Vec<(String, Option<u64>)>,
}

impl RegisterSet {
    /// An all-unresolved set for `vocabulary`.
    pub fn new(vocabulary: &RegisterVocabulary) -> Self {
        Self {
            entries: vocabulary.names().iter().map(|n| (n.clone(), None)).collect(),
        }
    }

    /// Offset of `name` (case-insensitive), if resolved.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| *v)
    }

    /// `(name, offset)` pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<u64>)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Names still unresolved, in vocabulary order.
    pub fn unresolved(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, v)| v.is_none())
            .map(|(n, _)| n)
            .collect()
    }

    /// Empty slot for an upper-case name, if the name is in the vocabulary
    /// and not yet resolved.
    fn open_slot(&mut self, upper: &str) -> Option<&mut Option<u64>> {
        self.entries
            .iter_mut()
            .find(|(n, v)| n == upper && v.is_none())
            .map(|(_, v)| v)
    }
}

impl Serialize for RegisterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, offset) in &self.entries {
            map.serialize_entry(&name.to_ascii_lowercase(), offset)?;
        }
        map.end()
    }
}

/// A register element whose offset attribute is not an integer.
struct InvalidOffset {
    register: String,
    raw: String,
}

/// Fill open slots of `regs` from `doc`. Returns the number of slots filled
/// and every malformed offset met along the way.
fn scan(doc: &DescriptorDocument, regs: &mut RegisterSet) -> (usize, Vec<InvalidOffset>) {
    let mut filled = 0;
    let mut invalid = Vec::new();
    for reg in doc.elements("register") {
        let Some(name) = reg.attr("name") else { continue };
        let upper = name.to_ascii_uppercase();
        let Some(raw) = reg.attr("offset") else { continue };
        let Some(slot) = regs.open_slot(&upper) else { continue };
        match parse_int(raw) {
            Some(offset) => {
                *slot = Some(offset);
                filled += 1;
            }
            None => invalid.push(InvalidOffset {
                register: upper,
                raw: raw.to_string(),
            }),
        }
    }
    (filled, invalid)
}

/// Resolve the offsets of `vocabulary` for the SKU document `doc`.
///
/// Fails if the SKU document has a malformed offset for a wanted register, or
/// if a required register is unresolved after the shared-document fallback.
pub fn resolve_registers(
    doc: &DescriptorDocument,
    vocabulary: &RegisterVocabulary,
    layout: &TreeLayout,
) -> Result<RegisterSet> {
    let mut regs = RegisterSet::new(vocabulary);

    let (_, invalid) = scan(doc, &mut regs);
    if let Some(bad) = invalid.into_iter().next() {
        return Err(ResolveError::InvalidOffset {
            path: doc.path().to_path_buf(),
            register: bad.register,
            raw: bad.raw,
        });
    }

    let unresolved = regs.unresolved();
    if !unresolved.is_empty() {
        debug!(path = %doc.path().display(), missing = ?unresolved, "consulting shared register document");
        if let Some(common) = common_document_for(doc.path(), layout) {
            fill_from_shared(&common, &mut regs);
        }
    }

    let missing: Vec<String> = vocabulary
        .required()
        .iter()
        .filter(|name| regs.get(name).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ResolveError::MissingRequiredRegister {
            path: doc.path().to_path_buf(),
            missing,
        });
    }

    Ok(regs)
}

/// Fill gaps from the shared document. Problems with the shared document are
/// logged and otherwise ignored.
fn fill_from_shared(common: &Path, regs: &mut RegisterSet) {
    if !common.is_file() {
        debug!(path = %common.display(), "no shared register document");
        return;
    }
    let doc = match DescriptorDocument::load(common) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("ignoring shared register document: {e}");
            return;
        }
    };
    let (filled, invalid) = scan(&doc, regs);
    for bad in invalid {
        warn!(
            path = %common.display(),
            "register {} has non-numeric offset '{}'; ignored",
            bad.register,
            bad.raw
        );
    }
    debug!(path = %common.display(), filled, "filled registers from shared document");
}
