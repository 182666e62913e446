//! Hardware sequencing constants.
//!
//! The status bits, address mask and read-cycle opcode the driver programs
//! into the controller. Values can be supplied by an external
//! hardware-abstraction table; anything it does not provide (or provides with
//! the wrong type) falls back to the documented defaults below.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{ResolveError, Result};

/// A lookup-by-name source of integer constants.
pub trait ConstantSource {
    /// Value of `name`, or `None` if the source does not define it as a
    /// non-negative integer.
    fn lookup(&self, name: &str) -> Option<u64>;
}

/// The absent source: every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstantSource;

impl ConstantSource for NoConstantSource {
    fn lookup(&self, _name: &str) -> Option<u64> {
        None
    }
}

/// Constants read from a TOML table of `NAME = integer` entries.
///
/// ```toml
/// HSFSTS_CLEAR = 0x07
/// PCH_RCBA_SPI_FADDR_MASK = 0x07FFFFFF
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TomlConstantSource {
    table: toml::Table,
}

impl TomlConstantSource {
    /// Load a table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ResolveError::ConstantSource {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::parse(&text).map_err(|e| ResolveError::ConstantSource {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Parse a table from TOML text.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        Ok(Self {
            table: text.parse()?,
        })
    }
}

impl ConstantSource for TomlConstantSource {
    fn lookup(&self, name: &str) -> Option<u64> {
        match self.table.get(name)? {
            toml::Value::Integer(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl<T: ConstantSource + ?Sized> ConstantSource for Box<T> {
    fn lookup(&self, name: &str) -> Option<u64> {
        (**self).lookup(name)
    }
}

/// One constant: where to look it up and what to use otherwise.
struct ConstantSpec {
    name: &'static str,
    default: u64,
    /// Zero is not a usable value; treat it as missing.
    zero_is_absent: bool,
}

const HSFSTS_CLEAR: ConstantSpec = ConstantSpec {
    name: "HSFSTS_CLEAR",
    default: 0x07,
    zero_is_absent: true,
};
const HSFSTS_SCIP: ConstantSpec = ConstantSpec {
    name: "PCH_RCBA_SPI_HSFSTS_SCIP",
    default: 0x01,
    zero_is_absent: false,
};
const HSFSTS_FDONE: ConstantSpec = ConstantSpec {
    name: "PCH_RCBA_SPI_HSFSTS_FDONE",
    default: 0x02,
    zero_is_absent: false,
};
const HSFSTS_FCERR: ConstantSpec = ConstantSpec {
    name: "PCH_RCBA_SPI_HSFSTS_FCERR",
    default: 0x04,
    zero_is_absent: false,
};
const HSFSTS_AEL: ConstantSpec = ConstantSpec {
    name: "PCH_RCBA_SPI_HSFSTS_AEL",
    default: 0x20,
    zero_is_absent: false,
};
const FADDR_MASK: ConstantSpec = ConstantSpec {
    name: "PCH_RCBA_SPI_FADDR_MASK",
    default: 0x07FF_FFFF,
    zero_is_absent: true,
};
const HSFCTL_READ_CYCLE: ConstantSpec = ConstantSpec {
    name: "HSFCTL_READ_CYCLE",
    default: 0x01,
    zero_is_absent: false,
};

impl ConstantSpec {
    /// Resolve to a value of at most `max`.
    fn resolve(&self, source: &dyn ConstantSource, max: u64) -> u64 {
        let value = source
            .lookup(self.name)
            .filter(|&v| v <= max)
            .filter(|&v| !(self.zero_is_absent && v == 0));
        match value {
            Some(v) => {
                debug!(name = self.name, value = v, "constant from external source");
                v
            }
            None => self.default,
        }
    }

    fn resolve_u32(&self, source: &dyn ConstantSource) -> u32 {
        self.resolve(source, u64::from(u32::MAX)) as u32
    }
}

/// Status/control values the driver needs alongside the register offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HardwareConstants {
    /// Write-1-to-clear mask for FDONE | FCERR | AEL.
    pub hsfsts_clear: u32,
    /// SPI cycle in progress.
    pub hsfsts_scip: u32,
    /// Flash cycle done.
    pub hsfsts_fdone: u32,
    /// Flash cycle error.
    pub hsfsts_fcerr: u32,
    /// Access error log.
    pub hsfsts_ael: u32,
    /// Valid bits of the flash linear address.
    pub faddr_mask: u32,
    /// HSFC value starting a read cycle (cycle type READ with GO set).
    pub hsfctl_read_cycle: u8,
}

impl Default for HardwareConstants {
    fn default() -> Self {
        Self::resolve(&NoConstantSource)
    }
}

impl HardwareConstants {
    /// Resolve every constant against `source`.
    pub fn resolve(source: &dyn ConstantSource) -> Self {
        Self {
            hsfsts_clear: HSFSTS_CLEAR.resolve_u32(source),
            hsfsts_scip: HSFSTS_SCIP.resolve_u32(source),
            hsfsts_fdone: HSFSTS_FDONE.resolve_u32(source),
            hsfsts_fcerr: HSFSTS_FCERR.resolve_u32(source),
            hsfsts_ael: HSFSTS_AEL.resolve_u32(source),
            faddr_mask: FADDR_MASK.resolve_u32(source),
            hsfctl_read_cycle: HSFCTL_READ_CYCLE.resolve(source, u64::from(u8::MAX)) as u8,
        }
    }

    /// External names, for diagnostics.
    pub fn source_names() -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("hsfsts_clear", HSFSTS_CLEAR.name),
            ("hsfsts_scip", HSFSTS_SCIP.name),
            ("hsfsts_fdone", HSFSTS_FDONE.name),
            ("hsfsts_fcerr", HSFSTS_FCERR.name),
            ("hsfsts_ael", HSFSTS_AEL.name),
            ("faddr_mask", FADDR_MASK.name),
            ("hsfctl_read_cycle", HSFCTL_READ_CYCLE.name),
        ])
    }
}
