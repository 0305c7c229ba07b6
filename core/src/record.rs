//! Option record data model.
//!
//! An [`OptionRecord`] aggregates everything known about one option name:
//! the architectures it was observed on, the source file each architecture's
//! definition file associates with it, which notes files mention it, its
//! documented default and the manual pages that cite it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Arch, ArchTag, NotesMarker, Scope};

/// Manual-page citation, displayed as `name(section)`.
///
/// # Examples
///
/// ```
/// use kernel_options_core::ManPageRef;
///
/// let cite = ManPageRef::new("ipfw", "4");
/// assert_eq!(cite.to_string(), "ipfw(4)");
/// assert_eq!("ipfw(4)".parse::<ManPageRef>().unwrap(), cite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ManPageRef {
    pub name: String,
    pub section: String,
}

impl ManPageRef {
    pub fn new(name: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
        }
    }
}

impl fmt::Display for ManPageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.section)
    }
}

/// Error returned when a citation string is not of the form `name(section)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid manual page citation: {0}")]
pub struct ParseManPageRefError(pub String);

impl FromStr for ManPageRef {
    type Err = ParseManPageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseManPageRefError(s.to_string());
        let body = s.strip_suffix(')').ok_or_else(err)?;
        let (name, section) = body.rsplit_once('(').ok_or_else(err)?;
        if name.is_empty() || section.is_empty() {
            return Err(err());
        }
        Ok(Self::new(name, section))
    }
}

impl From<ManPageRef> for String {
    fn from(cite: ManPageRef) -> Self {
        cite.to_string()
    }
}

impl TryFrom<String> for ManPageRef {
    type Error = ParseManPageRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Everything known about a single option.
///
/// Created the first time any ingestion stage encounters the name and mutated
/// in place afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    /// Case-sensitive option name.
    pub name: String,
    /// Architectures the option was observed on, in first-seen order,
    /// without repeats.
    pub architectures: Vec<ArchTag>,
    /// Definition-file source path per scope. An empty string means the
    /// definition file listed the option without a file token.
    pub files: BTreeMap<Scope, String>,
    /// Notes files that mention the option.
    pub in_notes: BTreeSet<NotesMarker>,
    /// Documented default; the last source to supply one wins.
    pub default: Option<String>,
    /// Manual pages citing the option.
    pub man_entries: BTreeSet<ManPageRef>,
}

impl OptionRecord {
    /// Creates a record first observed on `arch`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kernel_options_core::{Arch, ArchTag, OptionRecord};
    ///
    /// let record = OptionRecord::new("INET", ArchTag::Arch(Arch::Amd64));
    /// assert_eq!(record.architectures, vec![ArchTag::Arch(Arch::Amd64)]);
    /// assert!(record.files.is_empty());
    /// assert!(record.default.is_none());
    /// ```
    pub fn new(name: impl Into<String>, arch: ArchTag) -> Self {
        Self {
            name: name.into(),
            architectures: vec![arch],
            files: BTreeMap::new(),
            in_notes: BTreeSet::new(),
            default: None,
            man_entries: BTreeSet::new(),
        }
    }

    /// Records an observation on `arch`. Returns `false` if it was already
    /// observed there.
    pub fn observe(&mut self, arch: ArchTag) -> bool {
        if self.architectures.contains(&arch) {
            return false;
        }
        self.architectures.push(arch);
        true
    }

    /// Returns `true` once the file attribution has been collapsed into a
    /// single `all` entry.
    pub fn is_collapsed(&self) -> bool {
        self.files.len() == 1
            && self.files.contains_key(&Scope::All)
            && self.architectures.len() > 1
    }

    /// Rewrites per-architecture file attributions into a single
    /// `{all: file}` entry when they agree everywhere.
    ///
    /// All of the following must hold:
    ///
    /// - at least two file attributions exist;
    /// - there are as many attributions as observed architectures;
    /// - the attribution keys equal the observed architecture keys;
    /// - every attribution names the same file;
    /// - the record was observed on every architecture in `scanned`.
    ///
    /// Returns `true` if the record was rewritten. Running it again on a
    /// collapsed record does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use kernel_options_core::{Arch, ArchTag, OptionRecord, Scope};
    ///
    /// let mut record = OptionRecord::new("FOO", ArchTag::Arch(Arch::Amd64));
    /// record.observe(ArchTag::Arch(Arch::I386));
    /// record.files.insert(Scope::Arch(Arch::Amd64), "bar.c".into());
    /// record.files.insert(Scope::Arch(Arch::I386), "bar.c".into());
    ///
    /// let scanned: BTreeSet<Arch> = [Arch::Amd64, Arch::I386].into();
    /// assert!(record.collapse(&scanned));
    /// assert_eq!(record.files.get(&Scope::All).map(String::as_str), Some("bar.c"));
    /// assert!(!record.collapse(&scanned));
    /// ```
    pub fn collapse(&mut self, scanned: &BTreeSet<Arch>) -> bool {
        if self.files.len() < 2 || self.files.len() != self.architectures.len() {
            return false;
        }

        let file_keys: BTreeSet<&str> = self.files.keys().map(|scope| scope.key()).collect();
        let arch_keys: BTreeSet<&str> = self.architectures.iter().map(|tag| tag.key()).collect();
        if file_keys != arch_keys {
            return false;
        }

        let observed: BTreeSet<Arch> = self
            .architectures
            .iter()
            .filter_map(|tag| tag.arch())
            .collect();
        if !scanned.is_subset(&observed) {
            return false;
        }

        let mut values = self.files.values();
        let Some(first) = values.next().cloned() else {
            return false;
        };
        if values.any(|value| *value != first) {
            return false;
        }

        self.files = BTreeMap::from([(Scope::All, first)]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_on(name: &str, entries: &[(Arch, &str)]) -> OptionRecord {
        let mut iter = entries.iter();
        let (first, file) = iter.next().unwrap();
        let mut record = OptionRecord::new(name, ArchTag::Arch(*first));
        record.files.insert(Scope::Arch(*first), file.to_string());
        for (arch, file) in iter {
            record.observe(ArchTag::Arch(*arch));
            record.files.insert(Scope::Arch(*arch), file.to_string());
        }
        record
    }

    fn scanned(arches: &[Arch]) -> BTreeSet<Arch> {
        arches.iter().copied().collect()
    }

    #[test]
    fn test_collapse_identical_files_everywhere() {
        let mut record = record_on("FOO", &[(Arch::Amd64, "bar.c"), (Arch::I386, "bar.c")]);
        assert!(record.collapse(&scanned(&[Arch::Amd64, Arch::I386])));
        assert_eq!(
            record.files,
            BTreeMap::from([(Scope::All, "bar.c".to_string())])
        );
        assert!(record.is_collapsed());
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let mut record = record_on("FOO", &[(Arch::Amd64, "bar.c"), (Arch::I386, "bar.c")]);
        let arches = scanned(&[Arch::Amd64, Arch::I386]);
        assert!(record.collapse(&arches));
        let after_first = record.clone();
        assert!(!record.collapse(&arches));
        assert_eq!(record, after_first);
    }

    #[test]
    fn test_no_collapse_with_single_attribution() {
        let mut record = record_on("FOO", &[(Arch::Amd64, "bar.c")]);
        let before = record.clone();
        assert!(!record.collapse(&scanned(&[Arch::Amd64])));
        assert_eq!(record, before);
    }

    #[test]
    fn test_no_collapse_when_files_differ() {
        let mut record = record_on("FOO", &[(Arch::Amd64, "a.c"), (Arch::I386, "b.c")]);
        let before = record.clone();
        assert!(!record.collapse(&scanned(&[Arch::Amd64, Arch::I386])));
        assert_eq!(record, before);
    }

    #[test]
    fn test_no_collapse_when_observation_lacks_attribution() {
        let mut record = record_on("FOO", &[(Arch::Amd64, "bar.c"), (Arch::I386, "bar.c")]);
        record.observe(ArchTag::Unknown);
        let before = record.clone();
        assert!(!record.collapse(&scanned(&[Arch::Amd64, Arch::I386])));
        assert_eq!(record, before);
    }

    #[test]
    fn test_no_collapse_when_attribution_keys_differ_from_observations() {
        let mut record = OptionRecord::new("FOO", ArchTag::Arch(Arch::Amd64));
        record.observe(ArchTag::Arch(Arch::Arm));
        record.files.insert(Scope::Arch(Arch::Amd64), "bar.c".into());
        record.files.insert(Scope::Arch(Arch::I386), "bar.c".into());
        assert_eq!(record.files.len(), record.architectures.len());

        let before = record.clone();
        assert!(!record.collapse(&BTreeSet::new()));
        assert_eq!(record, before);
    }

    #[test]
    fn test_no_collapse_when_scanned_arch_never_defines_option() {
        let mut record = record_on("FOO", &[(Arch::Amd64, "bar.c"), (Arch::I386, "bar.c")]);
        let before = record.clone();
        assert!(!record.collapse(&scanned(&[Arch::Amd64, Arch::I386, Arch::Arm])));
        assert_eq!(record, before);
    }

    #[test]
    fn test_collapse_includes_global_attribution() {
        let mut record = OptionRecord::new("BAR", ArchTag::All);
        record.files.insert(Scope::All, "x.c".into());
        record.observe(ArchTag::Arch(Arch::Amd64));
        record.files.insert(Scope::Arch(Arch::Amd64), "x.c".into());
        assert!(record.collapse(&scanned(&[Arch::Amd64])));
        assert_eq!(record.files.len(), 1);
    }

    #[test]
    fn test_observe_skips_repeats() {
        let mut record = OptionRecord::new("FOO", ArchTag::Arch(Arch::Amd64));
        assert!(!record.observe(ArchTag::Arch(Arch::Amd64)));
        assert!(record.observe(ArchTag::Arch(Arch::Arm)));
        assert_eq!(record.architectures.len(), 2);
    }

    #[test]
    fn test_man_page_ref_rejects_garbage() {
        assert!("ipfw".parse::<ManPageRef>().is_err());
        assert!("(4)".parse::<ManPageRef>().is_err());
        assert_eq!(
            "pf(4)".parse::<ManPageRef>().unwrap(),
            ManPageRef::new("pf", "4")
        );
    }
}
