//! Chipset SKU identifiers.

use std::fmt;

/// Prefix carried by the canonical code form of a PCH SKU.
pub const SKU_PREFIX: &str = "PCH_";

/// A chipset SKU identifier as requested by the user (`Q170` or `PCH_Q170`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SkuIdentifier(String);

impl SkuIdentifier {
    /// Build an identifier from user input. Surrounding whitespace is dropped.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// Split a comma-separated list, dropping empty entries.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
            .collect()
    }

    /// The identifier exactly as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Code form with the `PCH_` prefix.
    pub fn prefixed(&self) -> String {
        if self.0.starts_with(SKU_PREFIX) {
            self.0.clone()
        } else {
            format!("{SKU_PREFIX}{}", self.0)
        }
    }

    /// Code form without the `PCH_` prefix.
    pub fn bare(&self) -> &str {
        self.0.strip_prefix(SKU_PREFIX).unwrap_or(&self.0)
    }

    /// Whether a `sku` element's `code` / `name` attributes denote this SKU.
    pub fn matches(&self, code: Option<&str>, name: Option<&str>) -> bool {
        let bare = self.bare();
        if let Some(code) = code {
            if code == bare || code == self.prefixed() {
                return true;
            }
        }
        name == Some(bare)
    }
}

impl fmt::Display for SkuIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_forms() {
        let bare = SkuIdentifier::new("Q170");
        assert_eq!(bare.prefixed(), "PCH_Q170");
        assert_eq!(bare.bare(), "Q170");

        let prefixed = SkuIdentifier::new(" PCH_Q170 ");
        assert_eq!(prefixed.as_str(), "PCH_Q170");
        assert_eq!(prefixed.prefixed(), "PCH_Q170");
        assert_eq!(prefixed.bare(), "Q170");
    }

    #[test]
    fn matches_code_or_name() {
        let sku = SkuIdentifier::new("Q170");
        assert!(sku.matches(Some("PCH_Q170"), None));
        assert!(sku.matches(Some("Q170"), None));
        assert!(sku.matches(None, Some("Q170")));
        assert!(sku.matches(Some("PCH_H170"), Some("Q170")));
        assert!(!sku.matches(Some("PCH_H170"), Some("H170")));
        assert!(!sku.matches(None, Some("PCH_Q170")));
        assert!(!sku.matches(None, None));
    }

    #[test]
    fn parse_list_drops_empties() {
        let list = SkuIdentifier::parse_list("Q170, AVN,, ,PCH_H170");
        let names: Vec<_> = list.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["Q170", "AVN", "PCH_H170"]);
        assert!(SkuIdentifier::parse_list(" , ").is_empty());
    }
}
