//! SPIBAR location resolution.
//!
//! A `bar` element either spells out the PCI location of the BAR directly, or
//! points at a configuration register (`register="SBASE"`) and the bit-field
//! in it that holds the base address (`base_field="Base"`). In the latter
//! case the PCI coordinates come from the register and the address mask is
//! derived from the field's starting bit.

use serde::Serialize;
use spigen_descriptor::{parse_int, DescriptorDocument, Element};
use tracing::{debug, warn};

/// Name of the SPI controller BAR in descriptor documents.
pub const SPIBAR_NAME: &str = "SPIBAR";

/// Width assumed for a referenced configuration register without a size.
pub const DEFAULT_REGISTER_WIDTH: u64 = 4;

/// A BAR attribute value: an integer, or the raw text when the attribute is
/// not an integer literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BarValue {
    Int(u64),
    Raw(String),
}

impl BarValue {
    /// Parse attribute text, keeping it verbatim if it is not an integer.
    ///
    /// A string of plain digits is decimal even with leading zeros
    /// (`dev="031"` is 31).
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        let value = if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            text.parse::<u64>().ok()
        } else {
            parse_int(text)
        };
        match value {
            Some(v) => BarValue::Int(v),
            None => BarValue::Raw(raw.to_string()),
        }
    }

    /// Integer value, if any.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            BarValue::Int(v) => Some(*v),
            BarValue::Raw(_) => None,
        }
    }
}

/// The BAR attributes the driver needs, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarField {
    Bus,
    Dev,
    Fun,
    Reg,
    Width,
    Mask,
    Size,
    FixedAddress,
    Offset,
}

impl BarField {
    /// Every field, in emission order.
    pub const ALL: [BarField; 9] = [
        BarField::Bus,
        BarField::Dev,
        BarField::Fun,
        BarField::Reg,
        BarField::Width,
        BarField::Mask,
        BarField::Size,
        BarField::FixedAddress,
        BarField::Offset,
    ];

    /// Attribute name on the `bar` element, also the C struct member name.
    pub fn attr_name(self) -> &'static str {
        match self {
            BarField::Bus => "bus",
            BarField::Dev => "dev",
            BarField::Fun => "fun",
            BarField::Reg => "reg",
            BarField::Width => "width",
            BarField::Mask => "mask",
            BarField::Size => "size",
            BarField::FixedAddress => "fixed_address",
            BarField::Offset => "offset",
        }
    }

    /// PCI coordinates and register width are small decimal quantities;
    /// the rest are addresses or masks.
    pub fn is_coordinate(self) -> bool {
        matches!(
            self,
            BarField::Bus | BarField::Dev | BarField::Fun | BarField::Reg | BarField::Width
        )
    }
}

/// Resolved BAR location. Fields the document does not provide stay `None`;
/// defaults are applied only when the artifact is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BarDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fun: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_address: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<BarValue>,
}

impl BarDescriptor {
    /// Value of `field`, if resolved.
    pub fn get(&self, field: BarField) -> Option<&BarValue> {
        match field {
            BarField::Bus => self.bus.as_ref(),
            BarField::Dev => self.dev.as_ref(),
            BarField::Fun => self.fun.as_ref(),
            BarField::Reg => self.reg.as_ref(),
            BarField::Width => self.width.as_ref(),
            BarField::Mask => self.mask.as_ref(),
            BarField::Size => self.size.as_ref(),
            BarField::FixedAddress => self.fixed_address.as_ref(),
            BarField::Offset => self.offset.as_ref(),
        }
    }

    /// Integer value of `field`, if resolved to an integer.
    pub fn int(&self, field: BarField) -> Option<u64> {
        self.get(field).and_then(BarValue::as_int)
    }

    /// Set `field`, replacing any previous value.
    pub fn set(&mut self, field: BarField, value: BarValue) {
        *self.slot(field) = Some(value);
    }

    /// Whether no field was resolved.
    pub fn is_empty(&self) -> bool {
        BarField::ALL.iter().all(|&f| self.get(f).is_none())
    }

    fn slot(&mut self, field: BarField) -> &mut Option<BarValue> {
        match field {
            BarField::Bus => &mut self.bus,
            BarField::Dev => &mut self.dev,
            BarField::Fun => &mut self.fun,
            BarField::Reg => &mut self.reg,
            BarField::Width => &mut self.width,
            BarField::Mask => &mut self.mask,
            BarField::Size => &mut self.size,
            BarField::FixedAddress => &mut self.fixed_address,
            BarField::Offset => &mut self.offset,
        }
    }
}

/// Resolve the SPIBAR of `doc`.
pub fn resolve_bar(doc: &DescriptorDocument) -> BarDescriptor {
    resolve_named_bar(doc, SPIBAR_NAME)
}

/// Resolve the first `bar` element named `bar_name` (case-insensitive).
pub fn resolve_named_bar(doc: &DescriptorDocument, bar_name: &str) -> BarDescriptor {
    let mut bar = BarDescriptor::default();

    let Some(elem) = doc
        .elements("bar")
        .find(|e| e.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(bar_name)))
    else {
        warn!(path = %doc.path().display(), "no {bar_name} bar element; BAR metadata left at defaults");
        return bar;
    };

    for field in BarField::ALL {
        if let Some(raw) = elem.attr(field.attr_name()) {
            bar.set(field, BarValue::parse(raw));
        }
    }

    let register = elem.attr("register").filter(|s| !s.is_empty());
    if let Some(register) = register {
        if bar.bus.is_none() || bar.reg.is_none() {
            let base_field = elem
                .attr("base_field")
                .filter(|s| !s.is_empty())
                .or_else(|| elem.attr("base"))
                .unwrap_or("");
            apply_register_reference(doc, &mut bar, register, base_field);
        }
    }

    bar
}

/// Fill BAR location from the configuration register it references.
fn apply_register_reference(
    doc: &DescriptorDocument,
    bar: &mut BarDescriptor,
    register: &str,
    base_field: &str,
) {
    let Some(reg) = doc
        .elements("register")
        .find(|r| r.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(register)))
    else {
        warn!(path = %doc.path().display(), "BAR references unknown register {register}");
        return;
    };
    debug!(register, base_field, "deriving BAR location from register");

    let coordinates = [
        (BarField::Bus, reg.attr_int("bus")),
        (BarField::Dev, synonym_int(reg, "dev", "device")),
        (BarField::Fun, synonym_int(reg, "fun", "function")),
        (BarField::Reg, reg.attr_int("offset")),
    ];
    for (field, value) in coordinates {
        if let Some(v) = value {
            bar.set(field, BarValue::Int(v));
        }
    }

    if bar.width.is_none() {
        let width = reg
            .attr_int("size")
            .filter(|&w| w != 0)
            .unwrap_or(DEFAULT_REGISTER_WIDTH);
        bar.set(BarField::Width, BarValue::Int(width));
    }

    if bar.mask.is_none() && !base_field.is_empty() {
        if let Some(field) = reg
            .descendants("field")
            .find(|f| f.attr("name") == Some(base_field))
        {
            let bit = field.attr_int("bit").unwrap_or(0);
            match derive_base_mask(bit) {
                Some(mask) => bar.set(BarField::Mask, BarValue::Int(mask)),
                None if bit >= 64 => {
                    warn!(register, base_field, bit, "base field starts beyond bit 63; no mask derived")
                }
                None => {}
            }
        }
    }
}

fn synonym_int(elem: &Element, name: &str, alt: &str) -> Option<u64> {
    elem.attr_int(name).or_else(|| elem.attr_int(alt))
}

/// Address mask for a base-address field starting at `bit`: every bit from
/// `bit` upward set, every bit below cleared.
///
/// Bit 0 means the address occupies the whole register, so no mask applies.
pub fn derive_base_mask(bit: u64) -> Option<u64> {
    match bit {
        0 => None,
        1..=63 => Some(u64::MAX << bit),
        _ => None,
    }
}
