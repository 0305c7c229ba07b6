use serde::{Deserialize, Serialize};

use crate::{OptionRecord, Registry};

/// Revision metadata for one scanned source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTreeInfo {
    /// Path of the source tree root as given on the command line.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Serializable view of a finished registry.
///
/// Carries the records sorted by name together with the release label and
/// the source trees that fed them.
///
/// # Examples
///
/// ```
/// use kernel_options_core::*;
///
/// let mut registry = Registry::new();
/// registry.observe_definition("INET", Scope::All, "netinet/in.c");
///
/// let snapshot = RegistrySnapshot::from_registry(&registry, "11.2", "2024-01-15T10:30:00Z");
/// assert_eq!(snapshot.option_count(), 1);
/// assert_eq!(snapshot.release, "11.2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Snapshot format version (from
    /// [`SNAPSHOT_CONTRACT_VERSION`](crate::SNAPSHOT_CONTRACT_VERSION)).
    pub contract_version: String,
    /// Release label the registry was built for.
    pub release: String,
    /// ISO-8601 timestamp of snapshot creation.
    pub generated_at: String,
    /// Source trees scanned, in scan order.
    pub trees: Vec<SourceTreeInfo>,
    /// Option records sorted by name.
    pub options: Vec<OptionRecord>,
}

impl RegistrySnapshot {
    pub fn new(release: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            contract_version: crate::SNAPSHOT_CONTRACT_VERSION.to_string(),
            release: release.into(),
            generated_at: generated_at.into(),
            trees: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Copies every record of `registry` into a new snapshot.
    pub fn from_registry(
        registry: &Registry,
        release: impl Into<String>,
        generated_at: impl Into<String>,
    ) -> Self {
        let mut snapshot = Self::new(release, generated_at);
        snapshot.options = registry.iter().cloned().collect();
        snapshot
    }

    pub fn with_trees(mut self, trees: Vec<SourceTreeInfo>) -> Self {
        self.trees = trees;
        self
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}
