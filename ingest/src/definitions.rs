//! Option definition file ingestion.
//!
//! A definition file lists one option per line as `<name> [<file>]`.
//! Comment lines (`#`), blank lines and lines starting with a tab are
//! skipped.

use std::path::Path;

use kernel_options_core::{MergeOutcome, Registry, Scope};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Counts from one definition file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefinitionStats {
    /// Option lines processed.
    pub lines: usize,
    /// Records created by this file.
    pub created: usize,
}

/// Ingests definition-file text for `scope` into `registry`.
///
/// # Examples
///
/// ```
/// use kernel_options_core::{Arch, Registry, Scope};
/// use kernel_options_ingest::definitions::ingest_definitions_str;
///
/// let text = "# comment\nINET\tnetinet/in.c\n\tcontinued\nCOMPAT_43\n";
/// let mut registry = Registry::new();
/// let stats = ingest_definitions_str(text, Scope::Arch(Arch::Amd64), &mut registry);
///
/// assert_eq!(stats.lines, 2);
/// let inet = registry.get("INET").unwrap();
/// assert_eq!(inet.files[&Scope::Arch(Arch::Amd64)], "netinet/in.c");
/// assert_eq!(registry.get("COMPAT_43").unwrap().files[&Scope::Arch(Arch::Amd64)], "");
/// ```
pub fn ingest_definitions_str(
    text: &str,
    scope: Scope,
    registry: &mut Registry,
) -> DefinitionStats {
    let mut stats = DefinitionStats::default();

    for line in text.lines() {
        if line.starts_with('#') || line.starts_with('\t') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            continue;
        };
        let file = tokens.next().unwrap_or("");

        stats.lines += 1;
        if registry.observe_definition(name, scope, file) == MergeOutcome::Created {
            stats.created += 1;
        }
    }

    stats
}

/// Reads the definition file at `path` and ingests it for `scope`.
///
/// Concrete architectures are marked as scanned once their file was read.
/// The file is read completely before the registry is touched, so a failed
/// read leaves the registry unchanged.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read. Callers treat
/// this as "architecture not present in this tree".
pub fn ingest_definition_file(
    path: &Path,
    scope: Scope,
    registry: &mut Registry,
) -> Result<DefinitionStats> {
    let bytes = std::fs::read(path).map_err(|err| IngestError::io(path, err))?;
    info!(path = %path.display(), "Processing options file");

    let stats = ingest_definitions_str(&String::from_utf8_lossy(&bytes), scope, registry);
    if let Scope::Arch(arch) = scope {
        registry.mark_scanned(arch);
    }
    debug!(
        path = %path.display(),
        lines = stats.lines,
        created = stats.created,
        "Ingested options file"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use kernel_options_core::{Arch, ArchTag};

    use super::*;

    #[test]
    fn test_skips_comments_tabs_and_blank_lines() {
        let text = "#FOO a.c\n\n\tBAR b.c\n   \nBAZ c.c\n";
        let mut registry = Registry::new();
        let stats = ingest_definitions_str(text, Scope::All, &mut registry);
        assert_eq!(stats.lines, 1);
        assert!(registry.contains("BAZ"));
        assert!(!registry.contains("FOO"));
        assert!(!registry.contains("BAR"));
    }

    #[test]
    fn test_extra_tokens_are_ignored() {
        let mut registry = Registry::new();
        ingest_definitions_str("OPT opt_foo.h extra\n", Scope::All, &mut registry);
        assert_eq!(registry.get("OPT").unwrap().files[&Scope::All], "opt_foo.h");
    }

    #[test]
    fn test_same_line_twice_is_one_record() {
        let mut registry = Registry::new();
        let scope = Scope::Arch(Arch::I386);
        ingest_definitions_str("FOO bar.c\n", scope, &mut registry);
        let stats = ingest_definitions_str("FOO bar.c\n", scope, &mut registry);
        assert_eq!(stats.created, 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("FOO").unwrap().architectures,
            vec![ArchTag::Arch(Arch::I386)]
        );
    }

    #[test]
    fn test_second_architecture_appends_observation() {
        let mut registry = Registry::new();
        ingest_definitions_str("FOO bar.c\n", Scope::Arch(Arch::Amd64), &mut registry);
        ingest_definitions_str("FOO\n", Scope::Arch(Arch::Arm), &mut registry);
        let foo = registry.get("FOO").unwrap();
        assert_eq!(
            foo.architectures,
            vec![ArchTag::Arch(Arch::Amd64), ArchTag::Arch(Arch::Arm)]
        );
        assert_eq!(foo.files[&Scope::Arch(Arch::Arm)], "");
    }

    #[test]
    fn test_missing_file_leaves_registry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = Registry::new();
        registry.observe_definition("KEEP", Scope::All, "keep.c");

        let result = ingest_definition_file(
            &dir.path().join("options.mips"),
            Scope::Arch(Arch::Mips),
            &mut registry,
        );
        assert!(matches!(result, Err(IngestError::Io { .. })));
        assert_eq!(registry.len(), 1);
        assert!(registry.scanned().is_empty());
    }

    #[test]
    fn test_read_file_marks_architecture_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.amd64");
        std::fs::write(&path, "FOO bar.c\n").unwrap();

        let mut registry = Registry::new();
        let stats = ingest_definition_file(&path, Scope::Arch(Arch::Amd64), &mut registry).unwrap();
        assert_eq!(stats.created, 1);
        assert!(registry.scanned().contains(&Arch::Amd64));
    }
}
