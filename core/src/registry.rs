//! The shared option registry.
//!
//! Every ingestion stage writes through [`Registry`]: definition files via
//! [`Registry::observe_definition`], notes files and manual pages via
//! [`Registry::merge`] with an [`OptionPatch`]. Re-encountering a name always
//! merges into the existing record.
//!
//! # Example
//!
//! ```
//! use kernel_options_core::*;
//!
//! let mut registry = Registry::new();
//! registry.observe_definition("INET", Scope::Arch(Arch::Amd64), "netinet/in.c");
//! registry.mark_scanned(Arch::Amd64);
//!
//! let outcome = registry.merge(
//!     "INET",
//!     ArchTag::All,
//!     OptionPatch::new().with_notes(NotesMarker::Global).with_default("1"),
//! );
//! assert_eq!(outcome, MergeOutcome::Updated);
//! assert_eq!(registry.get("INET").unwrap().default.as_deref(), Some("1"));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::{Arch, ArchTag, ManPageRef, NotesMarker, OptionRecord, Scope};

/// Whether a merge created a new record or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Updated,
}

/// Partial update applied by the augmentation stages.
///
/// `None` fields leave the record untouched; a `Some` default overwrites
/// whatever was there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionPatch {
    pub notes: Option<NotesMarker>,
    pub default: Option<String>,
    pub man_entry: Option<ManPageRef>,
}

impl OptionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(mut self, marker: NotesMarker) -> Self {
        self.notes = Some(marker);
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the default only when `value` is present.
    pub fn with_optional_default(mut self, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.default = Some(value.into());
        }
        self
    }

    pub fn with_man_entry(mut self, cite: ManPageRef) -> Self {
        self.man_entry = Some(cite);
        self
    }

    fn apply(self, record: &mut OptionRecord) {
        if let Some(marker) = self.notes {
            record.in_notes.insert(marker);
        }
        if let Some(value) = self.default {
            record.default = Some(value);
        }
        if let Some(cite) = self.man_entry {
            record.man_entries.insert(cite);
        }
    }
}

/// Name-keyed collection of [`OptionRecord`]s plus the set of architectures
/// whose definition files were read.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: BTreeMap<String, OptionRecord>,
    scanned: BTreeSet<Arch>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `name`, creating it attributed to `arch` if
    /// absent. The flag is `true` when the record was created.
    ///
    /// An existing record is returned as is; `arch` is not added to its
    /// observations.
    pub fn get_or_create(&mut self, name: &str, arch: ArchTag) -> (&mut OptionRecord, bool) {
        let created = !self.records.contains_key(name);
        let record = self
            .records
            .entry(name.to_string())
            .or_insert_with(|| OptionRecord::new(name, arch));
        (record, created)
    }

    /// Applies `patch` to the record for `name`, creating it attributed to
    /// `origin` first if needed.
    pub fn merge(&mut self, name: &str, origin: ArchTag, patch: OptionPatch) -> MergeOutcome {
        let (record, created) = self.get_or_create(name, origin);
        patch.apply(record);
        if created {
            MergeOutcome::Created
        } else {
            MergeOutcome::Updated
        }
    }

    /// Records that the definition file for `scope` lists `name` with the
    /// given source file (empty when the line had no file token).
    ///
    /// The attribution for `scope` is overwritten.
    pub fn observe_definition(&mut self, name: &str, scope: Scope, file: &str) -> MergeOutcome {
        let tag = ArchTag::from(scope);
        let (record, created) = self.get_or_create(name, tag);
        if !created {
            record.observe(tag);
        }
        record.files.insert(scope, file.to_string());
        if created {
            MergeOutcome::Created
        } else {
            MergeOutcome::Updated
        }
    }

    /// Marks `arch` as scanned: its definition file was read.
    pub fn mark_scanned(&mut self, arch: Arch) {
        self.scanned.insert(arch);
    }

    /// Architectures whose definition files were read.
    pub fn scanned(&self) -> &BTreeSet<Arch> {
        &self.scanned
    }

    pub fn get(&self, name: &str) -> Option<&OptionRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by option name.
    pub fn iter(&self) -> impl Iterator<Item = &OptionRecord> {
        self.records.values()
    }

    /// Runs the collapse pass over every record. Returns how many records
    /// were rewritten.
    pub fn collapse_all(&mut self) -> usize {
        let scanned = &self.scanned;
        self.records
            .values_mut()
            .map(|record| record.collapse(scanned))
            .filter(|collapsed| *collapsed)
            .count()
    }
}
