//! Manual-page augmentation.
//!
//! Corpus lines have the form `<path>:<directive-text>`, where the directive
//! is an mdoc configuration line such as `.Cd "options IPFIREWALL"` or
//! `.Cd "options KTR_ENTRIES=1024"`. Each valid line adds a `name(section)`
//! citation, and possibly a default, to the option it names.

use std::sync::LazyLock;

use kernel_options_core::{
    ArchTag, ManPageRef, MergeOutcome, NameTranslator, OptionPatch, Registry,
};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<entry>.+)\.(?P<section>[0-9])(?:\.(?:gz|bz2|xz|zst))?$")
        .expect("static regex must compile")
});

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\.Cd\s+"?options\s+(?P<option>[A-Za-z0-9_()|]+)(?:=(?P<default>[A-Za-z0-9<>_]+))?"?"#,
    )
    .expect("static regex must compile")
});

/// Why a corpus line could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManLineError {
    /// No `:` between path and directive.
    #[error("missing path separator")]
    MissingSeparator,
    /// The file name is not `<name>.<section>[.<compression>]`.
    #[error("unrecognized manual page file name: {0}")]
    PageName(String),
    /// The directive text is not an options configuration line.
    #[error("no options directive in: {0}")]
    Directive(String),
}

/// One parsed corpus line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManDirective {
    pub cite: ManPageRef,
    /// Option token as written; may be a pattern such as `A_(B|C)`.
    pub option: String,
    pub default: Option<String>,
}

/// Parses one `<path>:<directive-text>` corpus line.
///
/// # Examples
///
/// ```
/// use kernel_options_ingest::manpages::parse_corpus_line;
///
/// let line = "/usr/share/man/man4/ipfw.4.gz:.Cd \"options IPFIREWALL_VERBOSE_LIMIT=100\"";
/// let directive = parse_corpus_line(line).unwrap();
/// assert_eq!(directive.cite.to_string(), "ipfw(4)");
/// assert_eq!(directive.option, "IPFIREWALL_VERBOSE_LIMIT");
/// assert_eq!(directive.default.as_deref(), Some("100"));
/// ```
pub fn parse_corpus_line(line: &str) -> Result<ManDirective, ManLineError> {
    // Paths may contain ':', so prefer the boundary before the macro.
    let (path, directive) = match line.find(":.Cd") {
        Some(at) => (&line[..at], &line[at + 1..]),
        None => line.split_once(':').ok_or(ManLineError::MissingSeparator)?,
    };

    let base = path.rsplit('/').next().unwrap_or(path);
    let page = PAGE_RE
        .captures(base)
        .ok_or_else(|| ManLineError::PageName(base.to_string()))?;
    let cite = ManPageRef::new(&page["entry"], &page["section"]);

    let caps = DIRECTIVE_RE
        .captures(directive)
        .ok_or_else(|| ManLineError::Directive(directive.trim().to_string()))?;

    Ok(ManDirective {
        cite,
        option: caps["option"].to_string(),
        default: caps.name("default").map(|m| m.as_str().to_string()),
    })
}

/// Counts from one manual-page augmentation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManStats {
    /// Lines that parsed.
    pub lines: usize,
    /// Directives naming a translatable pattern.
    pub translated: usize,
    /// Options that no definition or notes file had listed.
    pub created: usize,
    /// Lines that failed to parse, verbatim.
    pub malformed: Vec<String>,
}

/// Applies corpus lines to `registry`.
///
/// A pattern name known to `translator` never becomes a key itself; each
/// concrete name it expands to receives the citation instead. Names new to
/// the registry are attributed to [`ArchTag::Unknown`]. Malformed lines are
/// logged and skipped.
///
/// # Examples
///
/// ```
/// use kernel_options_core::{NameTranslator, Registry};
/// use kernel_options_ingest::manpages::augment_man_lines;
///
/// let lines = ["/man4/ipfw.4.gz:.Cd \"options IPFW_DEFAULT_TO_(ACCEPT|DENY)\""];
/// let mut registry = Registry::new();
/// augment_man_lines(lines, &NameTranslator::builtin(), &mut registry);
///
/// assert!(!registry.contains("IPFW_DEFAULT_TO_(ACCEPT|DENY)"));
/// assert!(registry.contains("IPFW_DEFAULT_TO_ACCEPT"));
/// assert!(registry.contains("IPFW_DEFAULT_TO_DENY"));
/// ```
pub fn augment_man_lines<I, S>(
    lines: I,
    translator: &NameTranslator,
    registry: &mut Registry,
) -> ManStats
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stats = ManStats::default();

    for line in lines {
        let line = line.as_ref();
        let directive = match parse_corpus_line(line) {
            Ok(directive) => directive,
            Err(err) => {
                warn!(line, error = %err, "Skipping malformed manual page line");
                stats.malformed.push(line.to_string());
                continue;
            }
        };
        stats.lines += 1;

        match translator.translate(&directive.option) {
            Some(names) => {
                stats.translated += 1;
                for name in names {
                    if apply(name, &directive, registry) == MergeOutcome::Created {
                        info!(
                            option = %name,
                            page = %directive.cite,
                            "New option from man entries"
                        );
                        stats.created += 1;
                    }
                }
            }
            None => {
                if apply(&directive.option, &directive, registry) == MergeOutcome::Created {
                    debug!(
                        option = %directive.option,
                        page = %directive.cite,
                        "Option only in man entries"
                    );
                    stats.created += 1;
                }
            }
        }
    }

    stats
}

fn apply(name: &str, directive: &ManDirective, registry: &mut Registry) -> MergeOutcome {
    let patch = OptionPatch::new()
        .with_man_entry(directive.cite.clone())
        .with_optional_default(directive.default.clone());
    registry.merge(name, ArchTag::Unknown, patch)
}

#[cfg(test)]
mod tests {
    use kernel_options_core::{Arch, Scope};

    use super::*;

    #[test]
    fn test_parse_unquoted_directive() {
        let d = parse_corpus_line("/usr/share/man/man4/mem.4.gz:.Cd options DEV_MEM").unwrap();
        assert_eq!(d.option, "DEV_MEM");
        assert!(d.default.is_none());
        assert_eq!(d.cite, ManPageRef::new("mem", "4"));
    }

    #[test]
    fn test_parse_uncompressed_and_dotted_page_names() {
        let d = parse_corpus_line("man9/bus_space.9:.Cd \"options BUS_SPACE_X\"").unwrap();
        assert_eq!(d.cite.to_string(), "bus_space(9)");
        let d = parse_corpus_line("man4/if_re.x.4.gz:.Cd \"options RE_X\"").unwrap();
        assert_eq!(d.cite.to_string(), "if_re.x(4)");
    }

    #[test]
    fn test_parse_path_containing_colon() {
        let line = "/usr/share/man/a:b/man4/ipfw.4.gz:.Cd \"options IPFIREWALL=1\"";
        let d = parse_corpus_line(line).unwrap();
        assert_eq!(d.cite, ManPageRef::new("ipfw", "4"));
        assert_eq!(d.option, "IPFIREWALL");
        assert_eq!(d.default.as_deref(), Some("1"));
    }

    #[test]
    fn test_parse_default_with_angle_brackets() {
        let d = parse_corpus_line("ktr.4.gz:.Cd \"options KTR_MASK=<mask>\"").unwrap();
        assert_eq!(d.default.as_deref(), Some("<mask>"));
    }

    #[test]
    fn test_malformed_lines_are_classified() {
        assert_eq!(
            parse_corpus_line("no separator here"),
            Err(ManLineError::MissingSeparator)
        );
        assert!(matches!(
            parse_corpus_line("README:.Cd \"options FOO\""),
            Err(ManLineError::PageName(_))
        ));
        assert!(matches!(
            parse_corpus_line("foo.4.gz:.Cd \"device foo\""),
            Err(ManLineError::Directive(_))
        ));
    }

    #[test]
    fn test_malformed_line_does_not_abort_pass() {
        let lines = [
            "garbage",
            "ipfw.4.gz:.Cd \"options IPFIREWALL\"",
            "README:.Cd \"options NOPE\"",
            "pf.4.gz:.Cd \"options PF_DEFAULT\"",
        ];
        let mut registry = Registry::new();
        let stats = augment_man_lines(lines, &NameTranslator::builtin(), &mut registry);
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.malformed.len(), 2);
        assert!(registry.contains("IPFIREWALL"));
        assert!(registry.contains("PF_DEFAULT"));
        assert!(!registry.contains("NOPE"));
    }

    #[test]
    fn test_translated_names_get_citation_and_default() {
        let mut registry = Registry::new();
        registry.observe_definition("IPFW_DEFAULT_TO_ACCEPT", Scope::All, "opt_ipfw.h");
        let lines = ["ipfw.4.gz:.Cd \"options IPFW_DEFAULT_TO_(ACCEPT|DENY)\""];
        let stats = augment_man_lines(lines, &NameTranslator::builtin(), &mut registry);

        assert_eq!(stats.translated, 1);
        assert_eq!(stats.created, 1);
        assert!(!registry.contains("IPFW_DEFAULT_TO_(ACCEPT|DENY)"));
        for name in ["IPFW_DEFAULT_TO_ACCEPT", "IPFW_DEFAULT_TO_DENY"] {
            let record = registry.get(name).unwrap();
            assert!(record.man_entries.contains(&ManPageRef::new("ipfw", "4")));
        }
        assert_eq!(
            registry.get("IPFW_DEFAULT_TO_ACCEPT").unwrap().architectures,
            vec![ArchTag::All]
        );
        assert_eq!(
            registry.get("IPFW_DEFAULT_TO_DENY").unwrap().architectures,
            vec![ArchTag::Unknown]
        );
    }

    #[test]
    fn test_unknown_name_is_created_attributed_to_unknown() {
        let mut registry = Registry::new();
        augment_man_lines(
            ["ng_x.4.gz:.Cd \"options NETGRAPH_X=2\""],
            &NameTranslator::builtin(),
            &mut registry,
        );
        let record = registry.get("NETGRAPH_X").unwrap();
        assert_eq!(record.architectures, vec![ArchTag::Unknown]);
        assert_eq!(record.default.as_deref(), Some("2"));
    }

    #[test]
    fn test_man_default_overrides_notes_default() {
        let mut registry = Registry::new();
        crate::notes::augment_notes_str("options SC_HISTORY_SIZE=X\n", Scope::All, &mut registry);
        augment_man_lines(
            ["syscons.4.gz:.Cd \"options SC_HISTORY_SIZE=Y\""],
            &NameTranslator::builtin(),
            &mut registry,
        );
        assert_eq!(
            registry.get("SC_HISTORY_SIZE").unwrap().default.as_deref(),
            Some("Y")
        );
    }

    #[test]
    fn test_repeated_citation_is_deduplicated() {
        let mut registry = Registry::new();
        registry.observe_definition("INET", Scope::Arch(Arch::Amd64), "");
        let line = "inet.4.gz:.Cd \"options INET\"";
        augment_man_lines([line, line], &NameTranslator::builtin(), &mut registry);
        assert_eq!(registry.get("INET").unwrap().man_entries.len(), 1);
    }
}
