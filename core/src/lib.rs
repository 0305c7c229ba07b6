//! Core types for a merged registry of kernel configuration options.
//!
//! This crate defines the data model that the ingestion stages write into:
//!
//! - [`Arch`], [`ArchTag`], [`Scope`], [`NotesMarker`]: the closed set of
//!   target architectures and the sentinel tags around it.
//! - [`OptionRecord`]: everything known about one option, including the
//!   collapse pass that folds identical per-architecture attributions into
//!   one `all` entry.
//! - [`Registry`]: the name-keyed table every stage merges into.
//! - [`NameTranslator`]: expansion of pattern names documented in manual
//!   pages.
//! - [`RegistrySnapshot`]: a serializable view of a finished registry.
//!
//! Validation ([`validate_registry`]) catches structurally impossible
//! records.
//!
//! # Example
//!
//! ```
//! use kernel_options_core::*;
//!
//! let mut registry = Registry::new();
//! for arch in [Arch::Amd64, Arch::I386] {
//!     registry.observe_definition("FOO", Scope::Arch(arch), "bar.c");
//!     registry.mark_scanned(arch);
//! }
//! registry.merge(
//!     "FOO",
//!     ArchTag::All,
//!     OptionPatch::new().with_notes(NotesMarker::Global).with_default("1"),
//! );
//!
//! assert_eq!(registry.collapse_all(), 1);
//! let foo = registry.get("FOO").unwrap();
//! assert_eq!(foo.files.get(&Scope::All).map(String::as_str), Some("bar.c"));
//! assert!(validate_registry(&registry).is_empty());
//! ```

mod arch;
mod record;
mod registry;
mod snapshot;
mod translate;
mod validate;

pub use arch::{Arch, ArchTag, NotesMarker, ParseArchError, Scope};
pub use record::{ManPageRef, OptionRecord, ParseManPageRefError};
pub use registry::{MergeOutcome, OptionPatch, Registry};
pub use snapshot::{RegistrySnapshot, SourceTreeInfo};
pub use translate::NameTranslator;
pub use validate::{ValidationError, validate_record, validate_registry};

/// Version of the snapshot contract (semver).
pub const SNAPSHOT_CONTRACT_VERSION: &str = "1.0.0";
