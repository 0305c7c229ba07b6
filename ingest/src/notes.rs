//! Notes file augmentation.
//!
//! Notes files are annotated example kernel configurations. Only lines whose
//! first token is `options` (enabled) or `#options` (documented but
//! disabled) matter; their second token is `<name>[=<default>]`.

use std::path::Path;

use kernel_options_core::{ArchTag, MergeOutcome, NotesMarker, OptionPatch, Registry, Scope};
use tracing::{debug, info};

/// Counts from one notes file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotesStats {
    /// `options` lines applied.
    pub lines: usize,
    /// Options that no definition file had listed.
    pub created: usize,
}

/// Splits the option token of a notes line into name and default.
///
/// # Examples
///
/// ```
/// use kernel_options_ingest::notes::parse_notes_line;
///
/// assert_eq!(parse_notes_line("options \tMAXUSERS=64 # comment"), Some(("MAXUSERS", Some("64"))));
/// assert_eq!(parse_notes_line("#options \tINVARIANTS"), Some(("INVARIANTS", None)));
/// assert_eq!(parse_notes_line("device\tether"), None);
/// ```
pub fn parse_notes_line(line: &str) -> Option<(&str, Option<&str>)> {
    let mut tokens = line.split_whitespace();
    match tokens.next()? {
        "options" | "#options" => {}
        _ => return None,
    }
    let spec = tokens.next()?;
    let (name, default) = match spec.split_once('=') {
        Some((name, rest)) => {
            let default = rest.split_once('=').map_or(rest, |(value, _)| value);
            (name, Some(default))
        }
        None => (spec, None),
    };
    if name.is_empty() {
        return None;
    }
    Some((name, default))
}

/// Applies notes-file text for `scope` to `registry`.
///
/// Names no definition file listed are admitted, attributed to the scope's
/// architecture.
///
/// # Examples
///
/// ```
/// use kernel_options_core::{ArchTag, NotesMarker, Registry, Scope};
/// use kernel_options_ingest::notes::augment_notes_str;
///
/// let mut registry = Registry::new();
/// augment_notes_str("options \tHZ=1000\n", Scope::All, &mut registry);
///
/// let hz = registry.get("HZ").unwrap();
/// assert_eq!(hz.default.as_deref(), Some("1000"));
/// assert!(hz.in_notes.contains(&NotesMarker::Global));
/// assert_eq!(hz.architectures, vec![ArchTag::All]);
/// ```
pub fn augment_notes_str(text: &str, scope: Scope, registry: &mut Registry) -> NotesStats {
    let mut stats = NotesStats::default();
    let marker = NotesMarker::from(scope);

    for line in text.lines() {
        let Some((name, default)) = parse_notes_line(line) else {
            continue;
        };

        let patch = OptionPatch::new()
            .with_notes(marker)
            .with_optional_default(default);
        stats.lines += 1;
        if registry.merge(name, ArchTag::from(scope), patch) == MergeOutcome::Created {
            info!(option = name, notes = %marker, "New option not in options files");
            stats.created += 1;
        }
    }

    stats
}

/// Reads the notes file at `path` and applies it for `scope`.
///
/// Any read failure is a no-op: the registry is left as is and `None` is
/// returned, whether the file was absent or unreadable.
pub fn augment_notes_file(
    path: &Path,
    scope: Scope,
    registry: &mut Registry,
) -> Option<NotesStats> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Skipping notes file");
            return None;
        }
    };
    info!(path = %path.display(), "Processing notes file");
    Some(augment_notes_str(
        &String::from_utf8_lossy(&bytes),
        scope,
        registry,
    ))
}

#[cfg(test)]
mod tests {
    use kernel_options_core::Arch;

    use super::*;

    #[test]
    fn test_only_options_lines_are_relevant() {
        let text = "\
ident\tLINT
device\tpci
options \tINET
#options \tINET6
# options \tSPACED_COMMENT
makeoptions\tDEBUG=-g
";
        let mut registry = Registry::new();
        let stats = augment_notes_str(text, Scope::All, &mut registry);
        assert_eq!(stats.lines, 2);
        assert!(registry.contains("INET"));
        assert!(registry.contains("INET6"));
        assert!(!registry.contains("SPACED_COMMENT"));
        assert!(!registry.contains("DEBUG"));
    }

    #[test]
    fn test_arch_notes_marks_architecture() {
        let mut registry = Registry::new();
        registry.observe_definition("SMP", Scope::All, "");
        augment_notes_str("options SMP\n", Scope::Arch(Arch::Amd64), &mut registry);
        let smp = registry.get("SMP").unwrap();
        assert!(smp.in_notes.contains(&NotesMarker::Arch(Arch::Amd64)));
        assert_eq!(smp.architectures, vec![ArchTag::All]);
    }

    #[test]
    fn test_notes_only_option_is_admitted_with_scope_arch() {
        let mut registry = Registry::new();
        let stats = augment_notes_str(
            "#options \tPC98_ONLY=1\n",
            Scope::Arch(Arch::Pc98),
            &mut registry,
        );
        assert_eq!(stats.created, 1);
        let record = registry.get("PC98_ONLY").unwrap();
        assert_eq!(record.architectures, vec![ArchTag::Arch(Arch::Pc98)]);
        assert!(record.files.is_empty());
    }

    #[test]
    fn test_later_default_wins_and_bare_line_keeps_it() {
        let mut registry = Registry::new();
        augment_notes_str("options HZ=100\n", Scope::All, &mut registry);
        augment_notes_str("options HZ=1000\n", Scope::Arch(Arch::Arm), &mut registry);
        augment_notes_str("options HZ\n", Scope::Arch(Arch::I386), &mut registry);
        assert_eq!(registry.get("HZ").unwrap().default.as_deref(), Some("1000"));
    }

    #[test]
    fn test_quoted_default_is_kept_verbatim() {
        assert_eq!(
            parse_notes_line("options \tKTR_ENTRIES=\"1024\""),
            Some(("KTR_ENTRIES", Some("\"1024\"")))
        );
    }

    #[test]
    fn test_default_stops_at_second_equals() {
        assert_eq!(parse_notes_line("options \tA=B=C"), Some(("A", Some("B"))));
        assert_eq!(parse_notes_line("options \tA="), Some(("A", Some(""))));
    }

    #[test]
    fn test_options_without_name_is_skipped() {
        assert_eq!(parse_notes_line("options"), None);
        assert_eq!(parse_notes_line("options =1"), None);
    }

    #[test]
    fn test_missing_file_is_silent_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = Registry::new();
        assert!(augment_notes_file(&dir.path().join("NOTES"), Scope::All, &mut registry).is_none());
        assert!(registry.is_empty());
    }
}
