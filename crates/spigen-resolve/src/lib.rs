//! SPIBAR and SPI register resolution for spigen.
//!
//! Turns a SKU identifier into a [`PlatformRecord`]: where the SPI controller
//! BAR lives, the offsets of the hardware sequencing registers inside it, the
//! status/control constants, and the PCI device IDs the record applies to.
//!
//! ## Modules
//!
//! - [`bar`]: direct and register-derived BAR location
//! - [`registers`]: register offsets with shared-document fallback
//! - [`constants`]: hardware constants with documented defaults
//! - [`platform`]: per-SKU resolution and device IDs
//! - [`aggregate`]: multi-SKU aggregation

pub mod aggregate;
pub mod bar;
pub mod constants;
pub mod error;
pub mod platform;
pub mod registers;

pub use aggregate::{aggregate, Aggregation};
pub use bar::{resolve_bar, BarDescriptor, BarField, BarValue};
pub use constants::{ConstantSource, HardwareConstants, NoConstantSource, TomlConstantSource};
pub use error::{ResolveError, Result};
pub use platform::{collect_device_ids, PlatformRecord, PlatformResolver};
pub use registers::{resolve_registers, RegisterSet, RegisterVocabulary};
