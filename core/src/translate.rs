//! Name translation for pattern-style option names.
//!
//! Some manual pages document one pattern (`IPFW_DEFAULT_TO_(ACCEPT|DENY)`)
//! that stands for several concrete option symbols. The translator maps such
//! a pattern to the names it expands to so the pattern itself never becomes a
//! registry key.

use std::collections::BTreeMap;

/// Lookup table from documented pattern-name to concrete option names.
///
/// # Examples
///
/// ```
/// use kernel_options_core::NameTranslator;
///
/// let translator = NameTranslator::builtin();
/// let names = translator.translate("IPFW_DEFAULT_TO_(ACCEPT|DENY)").unwrap();
/// assert_eq!(names, ["IPFW_DEFAULT_TO_ACCEPT", "IPFW_DEFAULT_TO_DENY"]);
/// assert!(translator.translate("INET").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTranslator {
    table: BTreeMap<String, Vec<String>>,
}

impl NameTranslator {
    /// An empty translator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of known pattern names.
    pub fn builtin() -> Self {
        Self::new()
            .with_entry(
                "IPFW_DEFAULT_TO_(ACCEPT|DENY)",
                ["IPFW_DEFAULT_TO_ACCEPT", "IPFW_DEFAULT_TO_DENY"],
            )
            .with_entry("geom_map", ["GEOM_MAP"])
    }

    /// Adds or replaces the expansion of `pattern`.
    pub fn with_entry<I, S>(mut self, pattern: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(pattern, names);
        self
    }

    pub fn insert<I, S>(&mut self, pattern: impl Into<String>, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table
            .insert(pattern.into(), names.into_iter().map(Into::into).collect());
    }

    /// Returns the concrete names `name` expands to, or `None` if it is not
    /// a known pattern.
    pub fn translate(&self, name: &str) -> Option<&[String]> {
        self.table.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
