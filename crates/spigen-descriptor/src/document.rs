//! Owned, immutable descriptor document tree.
//!
//! Descriptor documents are XML files made of `sku`, `bar`, `register` and
//! `field` elements carrying string attributes. The XML is parsed with
//! `roxmltree` and copied into an owned [`Element`] tree so a document can be
//! held independently of its source text.

use std::path::{Path, PathBuf};

use crate::error::{DescriptorError, Result};

/// One element of a descriptor document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local tag name (`sku`, `bar`, `register`, `field`, ...).
    pub tag: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Raw attribute value, trimmed. Returns `None` when absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.trim())
    }

    /// Attribute value parsed with [`parse_int`].
    pub fn attr_int(&self, name: &str) -> Option<u64> {
        self.attr(name).and_then(parse_int)
    }

    /// All descendants (not including `self`) with the given tag, in
    /// document order.
    pub fn descendants<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
        .filter(move |e| e.tag == tag)
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(|c| c.is_element())
                .map(Element::from_node)
                .collect(),
        }
    }
}

/// Pre-order walk over an element subtree.
struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// A parsed descriptor document together with the path it came from.
#[derive(Debug, Clone)]
pub struct DescriptorDocument {
    path: PathBuf,
    root: Element,
}

impl DescriptorDocument {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse a document from text. `path` is recorded for diagnostics and
    /// for locating sibling documents.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text).map_err(|e| {
            DescriptorError::MalformedDocument {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            root: Element::from_node(doc.root_element()),
        })
    }

    /// Path the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document's root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Shorthand for `root().descendants(tag)`.
    pub fn elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.root.descendants(tag)
    }
}

/// Parse an integer literal the way descriptor attributes write them.
///
/// Accepts decimal, `0x`/`0o`/`0b` prefixed forms (any case), an optional
/// leading `+`, and `_` separators between digits. Decimal literals with a
/// leading zero are rejected unless every digit is zero. Negative numbers are
/// not valid offsets and are rejected.
pub fn parse_int(text: &str) -> Option<u64> {
    let s = text.trim();
    let s = s.strip_prefix('+').unwrap_or(s);

    let (radix, digits) = match s.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => (16, &s[2..]),
        Some("0o") => (8, &s[2..]),
        Some("0b") => (2, &s[2..]),
        _ => (10, s),
    };
    // Radix-prefixed literals may put one separator right after the prefix.
    let digits = if radix != 10 {
        digits.strip_prefix('_').unwrap_or(digits)
    } else {
        digits
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__")
    {
        return None;
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if !cleaned.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    if radix == 10 && cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.bytes().any(|b| b != b'0')
    {
        return None;
    }
    u64::from_str_radix(&cleaned, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<configuration platform="SKL">
  <info family="pch">
    <sku did="0xA143" name="Q170" code="PCH_Q170" />
    <sku did="0xA144" name="H170" code="PCH_H170" />
  </info>
  <mmio>
    <bar name="SPIBAR" register="SBASE" base_field="Base" size="0x1000" />
  </mmio>
  <registers>
    <register name="SBASE" type="pcicfg" bus="0" dev="0x1F" fun="5" offset="0x10" size="4">
      <field name="Base" bit="12" size="20" />
    </register>
  </registers>
</configuration>
"#;

    #[test]
    fn parse_sample_document() {
        let doc = DescriptorDocument::parse(Path::new("sample.xml"), SAMPLE).unwrap();
        assert_eq!(doc.root().tag, "configuration");
        assert_eq!(doc.root().attr("platform"), Some("SKL"));
        assert_eq!(doc.path(), Path::new("sample.xml"));
    }

    #[test]
    fn descendants_in_document_order() {
        let doc = DescriptorDocument::parse(Path::new("sample.xml"), SAMPLE).unwrap();
        let names: Vec<_> = doc.elements("sku").filter_map(|e| e.attr("name")).collect();
        assert_eq!(names, vec!["Q170", "H170"]);

        let all: Vec<_> = doc.root().descendants("field").collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].attr_int("bit"), Some(12));
    }

    #[test]
    fn descendants_exclude_self() {
        let doc = DescriptorDocument::parse(Path::new("sample.xml"), SAMPLE).unwrap();
        assert_eq!(doc.elements("configuration").count(), 0);
    }

    #[test]
    fn attribute_values_are_trimmed() {
        let doc =
            DescriptorDocument::parse(Path::new("t.xml"), r#"<a><sku code="  PCH_X  "/></a>"#)
                .unwrap();
        let sku = doc.elements("sku").next().unwrap();
        assert_eq!(sku.attr("code"), Some("PCH_X"));
        assert_eq!(sku.attr("name"), None);
    }

    #[test]
    fn malformed_document_is_reported() {
        let err = DescriptorDocument::parse(Path::new("bad.xml"), "<a><b></a>").unwrap_err();
        assert!(matches!(err, DescriptorError::MalformedDocument { .. }));
        assert!(err.to_string().contains("bad.xml"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = DescriptorDocument::load(Path::new("/nonexistent/doc.xml")).unwrap_err();
        assert!(matches!(err, DescriptorError::Io { .. }));
    }

    #[test]
    fn parse_int_forms() {
        assert_eq!(parse_int("16"), Some(16));
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("0X1f"), Some(31));
        assert_eq!(parse_int("0o20"), Some(16));
        assert_eq!(parse_int("0b1010"), Some(10));
        assert_eq!(parse_int(" +7 "), Some(7));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("000"), Some(0));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0x_FF"), Some(255));
    }

    #[test]
    fn parse_int_rejects() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("010"), None);
        assert_eq!(parse_int("-1"), None);
        assert_eq!(parse_int("1__0"), None);
        assert_eq!(parse_int("_1"), None);
        assert_eq!(parse_int("MMIO"), None);
        assert_eq!(parse_int("0x1G"), None);
        assert_eq!(parse_int("++1"), None);
    }
}
