//! Structural validation of a finished registry.
//!
//! These checks catch records that no ingestion path should be able to
//! produce. They say nothing about whether an option is meaningful.
//!
//! # Examples
//!
//! ```
//! use kernel_options_core::*;
//!
//! let mut registry = Registry::new();
//! registry.observe_definition("INET", Scope::Arch(Arch::Amd64), "netinet/in.c");
//! assert!(validate_registry(&registry).is_empty());
//! ```

use thiserror::Error;

use crate::{ArchTag, OptionRecord, Registry, Scope};

/// Registry validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Option name is empty.
    #[error("option name cannot be empty")]
    EmptyName,
    /// Option name contains whitespace, so it could not have come from a
    /// tokenized line.
    #[error("option name contains whitespace: {0:?}")]
    WhitespaceInName(String),
    /// A file attribution names an architecture the option was never
    /// observed on.
    #[error("option {option} has a file attribution for unobserved architecture {scope}")]
    UnobservedAttribution { option: String, scope: Scope },
    /// A collapsed `all` attribution sits next to per-architecture ones.
    #[error("option {0} mixes a collapsed attribution with per-architecture entries")]
    MixedCollapse(String),
}

/// Validates every record of `registry`.
pub fn validate_registry(registry: &Registry) -> Vec<ValidationError> {
    registry.iter().flat_map(validate_record).collect()
}

/// Validates one record.
///
/// # Examples
///
/// ```
/// use kernel_options_core::*;
///
/// let mut record = OptionRecord::new("FOO", ArchTag::Arch(Arch::Amd64));
/// record.files.insert(Scope::Arch(Arch::I386), "foo.c".into());
/// let errors = validate_record(&record);
/// assert!(matches!(errors[0], ValidationError::UnobservedAttribution { .. }));
/// ```
pub fn validate_record(record: &OptionRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if record.name.is_empty() {
        errors.push(ValidationError::EmptyName);
    } else if record.name.chars().any(char::is_whitespace) {
        errors.push(ValidationError::WhitespaceInName(record.name.clone()));
    }

    if record.is_collapsed() {
        return errors;
    }

    for scope in record.files.keys() {
        if !record.architectures.contains(&ArchTag::from(*scope)) {
            errors.push(ValidationError::UnobservedAttribution {
                option: record.name.clone(),
                scope: *scope,
            });
        }
    }

    if record.files.contains_key(&Scope::All)
        && !record.architectures.contains(&ArchTag::All)
        && record.files.len() > 1
    {
        errors.push(ValidationError::MixedCollapse(record.name.clone()));
    }

    errors
}
