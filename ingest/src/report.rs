//! Structured reporting for a registry build.

use kernel_options_core::{Scope, SourceTreeInfo};
use serde::{Deserialize, Serialize};

/// Kind of source consulted during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Definitions,
    Notes,
    ManPages,
    Metadata,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definitions => write!(f, "definitions"),
            Self::Notes => write!(f, "notes"),
            Self::ManPages => write!(f, "man_pages"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}

/// Outcome of reading one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Read,
    Missing,
}

/// One consulted source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub path: String,
    pub status: SourceStatus,
    /// Relevant lines applied from this source.
    pub lines: usize,
    /// Records this source created.
    pub created: usize,
}

/// Sources consulted for one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeReport {
    pub tree: SourceTreeInfo,
    pub sources: Vec<SourceReport>,
}

/// Report for a whole registry build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub trees: Vec<TreeReport>,
    /// Manual page lines that could not be parsed, verbatim.
    pub malformed_man_lines: Vec<String>,
    /// Records admitted from notes files.
    pub created_from_notes: usize,
    /// Records admitted from manual pages.
    pub created_from_man: usize,
}

impl BuildReport {
    /// Sources that could not be read.
    pub fn missing(&self) -> impl Iterator<Item = &SourceReport> {
        self.trees
            .iter()
            .flat_map(|tree| tree.sources.iter())
            .filter(|source| source.status == SourceStatus::Missing)
    }

    /// Human-readable summary, one line per fact.
    ///
    /// # Examples
    ///
    /// ```
    /// use kernel_options_ingest::report::BuildReport;
    ///
    /// let report = BuildReport::default();
    /// assert_eq!(report.summary_lines()[0], "0 source tree(s) scanned");
    /// ```
    pub fn summary_lines(&self) -> Vec<String> {
        let read = self
            .trees
            .iter()
            .flat_map(|tree| tree.sources.iter())
            .filter(|source| source.status == SourceStatus::Read)
            .count();
        let missing = self.missing().count();

        let mut lines = vec![
            format!("{} source tree(s) scanned", self.trees.len()),
            format!("{read} source(s) read, {missing} missing"),
        ];
        if self.created_from_notes > 0 {
            lines.push(format!(
                "{} option(s) found only in notes files",
                self.created_from_notes
            ));
        }
        if self.created_from_man > 0 {
            lines.push(format!(
                "{} option(s) found only in manual pages",
                self.created_from_man
            ));
        }
        if !self.malformed_man_lines.is_empty() {
            lines.push(format!(
                "{} malformed manual page line(s) skipped",
                self.malformed_man_lines.len()
            ));
        }
        lines
    }
}
