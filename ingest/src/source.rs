//! Source-tree revision metadata.
//!
//! The tree's version script assigns `REVISION="..."` and `BRANCH="..."` on
//! lines of their own. Only the first assignment of each is used.

use std::path::Path;

use kernel_options_core::SourceTreeInfo;

use crate::error::{IngestError, Result};

/// Revision and branch labels of a source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRevision {
    pub revision: Option<String>,
    pub branch: Option<String>,
}

impl SourceRevision {
    /// `<revision>-<branch>` with `?` for missing parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use kernel_options_ingest::source::parse_revision;
    ///
    /// let rev = parse_revision("TYPE=\"FreeBSD\"\nREVISION=\"11.2\"\nBRANCH=\"RELEASE-p4\"\n");
    /// assert_eq!(rev.label(), "11.2-RELEASE-p4");
    /// ```
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.revision.as_deref().unwrap_or("?"),
            self.branch.as_deref().unwrap_or("?")
        )
    }

    pub fn into_tree_info(self, path: &Path) -> SourceTreeInfo {
        SourceTreeInfo {
            path: path.display().to_string(),
            revision: self.revision,
            branch: self.branch,
        }
    }
}

/// Extracts `REVISION` and `BRANCH` from script text.
pub fn parse_revision(text: &str) -> SourceRevision {
    let mut revision = None;
    let mut branch = None;

    for line in text.lines() {
        let line = line.trim();
        if revision.is_none() {
            revision = assignment(line, "REVISION=");
        }
        if branch.is_none() {
            branch = assignment(line, "BRANCH=");
        }
        if revision.is_some() && branch.is_some() {
            break;
        }
    }

    SourceRevision { revision, branch }
}

fn assignment(line: &str, prefix: &str) -> Option<String> {
    line.strip_prefix(prefix)
        .map(|value| value.replace('"', "").trim().to_string())
}

/// Reads revision metadata from the script at `path`.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the script cannot be read.
pub fn read_revision(path: &Path) -> Result<SourceRevision> {
    let bytes = std::fs::read(path).map_err(|err| IngestError::io(path, err))?;
    Ok(parse_revision(&String::from_utf8_lossy(&bytes)))
}
