//! Registry orchestration across source trees.
//!
//! For each tree, in order: the architecture-independent definition file,
//! the global notes file, one definition file per configured architecture,
//! each architecture's notes file, and one manual-page pass. Missing sources are
//! logged and skipped; nothing here fails a build.

use std::path::{Path, PathBuf};

use kernel_options_core::{Arch, NameTranslator, Registry, Scope};
use tracing::{info, warn};

use crate::config::RegistryConfig;
use crate::corpus::ManCorpus;
use crate::definitions::ingest_definition_file;
use crate::manpages::augment_man_lines;
use crate::notes::augment_notes_file;
use crate::report::{BuildReport, SourceKind, SourceReport, SourceStatus, TreeReport};
use crate::source::{SourceRevision, read_revision};

/// Merged registry plus the report of how it was built.
///
/// The registry has not been collapsed yet.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub registry: Registry,
    pub report: BuildReport,
}

/// Drives ingestion of one or more source trees into a shared registry.
pub struct RegistryBuilder<'a> {
    config: &'a RegistryConfig,
    corpus: &'a dyn ManCorpus,
    translator: NameTranslator,
    architectures: Vec<Arch>,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(config: &'a RegistryConfig, corpus: &'a dyn ManCorpus) -> Self {
        Self {
            config,
            corpus,
            translator: config.translator(),
            architectures: config.scan_architectures(),
        }
    }

    /// Builds the registry from `trees`, in the given order.
    pub fn build<P: AsRef<Path>>(&self, trees: &[P]) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();
        for tree in trees {
            let tree_report = self.ingest_tree(tree.as_ref(), &mut outcome);
            outcome.report.trees.push(tree_report);
        }
        info!(options = outcome.registry.len(), "Registry built");
        outcome
    }

    fn ingest_tree(&self, tree: &Path, outcome: &mut BuildOutcome) -> TreeReport {
        let layout = &self.config.layout;
        let mut sources = Vec::new();

        let newvers = layout.newvers_path(tree);
        let revision = match read_revision(&newvers) {
            Ok(revision) => {
                sources.push(source_report(
                    SourceKind::Metadata,
                    None,
                    &newvers,
                    SourceStatus::Read,
                ));
                revision
            }
            Err(err) => {
                warn!(error = %err, "Cannot read source tree revision");
                sources.push(source_report(
                    SourceKind::Metadata,
                    None,
                    &newvers,
                    SourceStatus::Missing,
                ));
                SourceRevision::default()
            }
        };
        info!(
            "Processing {} in source tree {}",
            revision.label(),
            tree.display()
        );

        self.ingest_definitions(tree, Scope::All, outcome, &mut sources);
        self.ingest_notes(tree, Scope::All, outcome, &mut sources);
        for arch in &self.architectures {
            self.ingest_definitions(tree, Scope::Arch(*arch), outcome, &mut sources);
        }
        for arch in &self.architectures {
            self.ingest_notes(tree, Scope::Arch(*arch), outcome, &mut sources);
        }

        let corpus_name = PathBuf::from(self.corpus.describe());
        let mut entry =
            source_report(SourceKind::ManPages, None, &corpus_name, SourceStatus::Read);
        match self.corpus.scan() {
            Ok(lines) => {
                let stats = augment_man_lines(&lines, &self.translator, &mut outcome.registry);
                entry.lines = stats.lines;
                entry.created = stats.created;
                outcome.report.created_from_man += stats.created;
                outcome.report.malformed_man_lines.extend(stats.malformed);
            }
            Err(err) => {
                warn!(error = %err, "Skipping manual pages");
                entry.status = SourceStatus::Missing;
            }
        }
        sources.push(entry);

        TreeReport {
            tree: revision.into_tree_info(tree),
            sources,
        }
    }

    fn ingest_definitions(
        &self,
        tree: &Path,
        scope: Scope,
        outcome: &mut BuildOutcome,
        sources: &mut Vec<SourceReport>,
    ) {
        let path = self.config.layout.definitions_path(tree, scope);
        let mut entry =
            source_report(SourceKind::Definitions, Some(scope), &path, SourceStatus::Read);
        match ingest_definition_file(&path, scope, &mut outcome.registry) {
            Ok(stats) => {
                entry.lines = stats.lines;
                entry.created = stats.created;
            }
            Err(err) => {
                warn!(
                    arch = %scope,
                    error = %err,
                    "Could not find options file. Architecture removed?"
                );
                entry.status = SourceStatus::Missing;
            }
        }
        sources.push(entry);
    }

    fn ingest_notes(
        &self,
        tree: &Path,
        scope: Scope,
        outcome: &mut BuildOutcome,
        sources: &mut Vec<SourceReport>,
    ) {
        let layout = &self.config.layout;
        let path = match scope {
            Scope::All => layout.global_notes_path(tree),
            Scope::Arch(arch) => layout.arch_notes_path(tree, arch),
        };
        let mut entry =
            source_report(SourceKind::Notes, Some(scope), &path, SourceStatus::Read);
        match augment_notes_file(&path, scope, &mut outcome.registry) {
            Some(stats) => {
                entry.lines = stats.lines;
                entry.created = stats.created;
                outcome.report.created_from_notes += stats.created;
            }
            None => entry.status = SourceStatus::Missing,
        }
        sources.push(entry);
    }
}

fn source_report(
    kind: SourceKind,
    scope: Option<Scope>,
    path: &Path,
    status: SourceStatus,
) -> SourceReport {
    SourceReport {
        kind,
        scope,
        path: path.display().to_string(),
        status,
        lines: 0,
        created: 0,
    }
}

/// Builds the registry for `trees` with `config` and `corpus`.
///
/// # Examples
///
/// ```
/// use kernel_options_ingest::config::RegistryConfig;
/// use kernel_options_ingest::corpus::NoCorpus;
/// use kernel_options_ingest::orchestrate::build_registry;
///
/// let outcome = build_registry(&["/nonexistent/src"], &RegistryConfig::default(), &NoCorpus);
/// assert!(outcome.registry.is_empty());
/// assert!(outcome.report.missing().count() > 0);
/// ```
pub fn build_registry<P: AsRef<Path>>(
    trees: &[P],
    config: &RegistryConfig,
    corpus: &dyn ManCorpus,
) -> BuildOutcome {
    RegistryBuilder::new(config, corpus).build(trees)
}
