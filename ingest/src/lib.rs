//! Ingestion of kernel option sources into a [`Registry`].
//!
//! Three independently maintained sources describe kernel options:
//!
//! - definition files (`sys/conf/options`, `sys/conf/options.<arch>`),
//!   see [`definitions`];
//! - notes files (`sys/conf/NOTES`, `sys/<arch>/conf/NOTES`), see
//!   [`notes`];
//! - manual pages carrying `.Cd "options ..."` lines, see [`manpages`] and
//!   [`corpus`].
//!
//! [`orchestrate::build_registry`] runs all of them over one or more source
//! trees. The resulting registry is not yet collapsed; call
//! [`Registry::collapse_all`] before reporting.
//!
//! # Example
//!
//! ```
//! use kernel_options_ingest::config::RegistryConfig;
//! use kernel_options_ingest::corpus::StaticCorpus;
//! use kernel_options_ingest::orchestrate::build_registry;
//! use kernel_options_ingest::output::{OutputFormat, format_snapshot};
//!
//! let corpus = StaticCorpus::new(["/man/man4/inet.4.gz:.Cd \"options INET\""]);
//! let mut outcome = build_registry(&["/nonexistent"], &RegistryConfig::default(), &corpus);
//! outcome.registry.collapse_all();
//!
//! let snapshot = kernel_options_ingest::snapshot(&outcome, "11.2");
//! let tsv = format_snapshot(&snapshot, OutputFormat::Tsv).unwrap();
//! assert_eq!(tsv, "INET\t{}\t{}\t[UNKNOWN]\tNone\t{inet(4)}\n");
//! ```
//!
//! [`Registry`]: kernel_options_core::Registry
//! [`Registry::collapse_all`]: kernel_options_core::Registry::collapse_all

pub mod config;
pub mod corpus;
pub mod definitions;
pub mod error;
pub mod manpages;
pub mod notes;
pub mod orchestrate;
pub mod output;
pub mod report;
pub mod source;

use chrono::Utc;
use kernel_options_core::RegistrySnapshot;

pub use error::{IngestError, Result};
use orchestrate::BuildOutcome;

/// Snapshots the outcome's registry, stamped with the current time and the
/// scanned trees' metadata.
pub fn snapshot(outcome: &BuildOutcome, release: &str) -> RegistrySnapshot {
    RegistrySnapshot::from_registry(&outcome.registry, release, Utc::now().to_rfc3339())
        .with_trees(
            outcome
                .report
                .trees
                .iter()
                .map(|tree| tree.tree.clone())
                .collect(),
        )
}
