//! Output formatting for registry snapshots.

use kernel_options_core::{OptionRecord, RegistrySnapshot};

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// One tab-separated line per option.
    #[default]
    Tsv,
    Json,
    Yaml,
    Markdown,
}

/// Formats a snapshot in the requested output format.
pub fn format_snapshot(
    snapshot: &RegistrySnapshot,
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Tsv => Ok(snapshot_to_tsv(snapshot)),
        OutputFormat::Json => serde_json::to_string_pretty(snapshot)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(snapshot).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(snapshot_to_markdown(snapshot)),
    }
}

/// Tab-separated row: name, notes, files, architectures, default, man pages.
///
/// # Examples
///
/// ```
/// use kernel_options_core::{ArchTag, OptionRecord, Scope};
/// use kernel_options_ingest::output::record_to_tsv;
///
/// let mut record = OptionRecord::new("INET", ArchTag::All);
/// record.files.insert(Scope::All, "opt_inet.h".into());
/// assert_eq!(record_to_tsv(&record), "INET\t{}\t{all: opt_inet.h}\t[ALL]\tNone\t{}");
/// ```
pub fn record_to_tsv(record: &OptionRecord) -> String {
    let notes: Vec<String> = record.in_notes.iter().map(ToString::to_string).collect();
    let files: Vec<String> = record
        .files
        .iter()
        .map(|(scope, file)| format!("{scope}: {file}"))
        .collect();
    let arches: Vec<String> = record.architectures.iter().map(ToString::to_string).collect();
    let man: Vec<String> = record.man_entries.iter().map(ToString::to_string).collect();

    format!(
        "{}\t{{{}}}\t{{{}}}\t[{}]\t{}\t{{{}}}",
        record.name,
        notes.join(", "),
        files.join(", "),
        arches.join(", "),
        record.default.as_deref().unwrap_or("None"),
        man.join(", ")
    )
}

fn snapshot_to_tsv(snapshot: &RegistrySnapshot) -> String {
    let mut out = String::new();
    for record in &snapshot.options {
        out.push_str(&record_to_tsv(record));
        out.push('\n');
    }
    out
}

fn snapshot_to_markdown(snapshot: &RegistrySnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Kernel options ({})\n\n", snapshot.release));

    if !snapshot.trees.is_empty() {
        out.push_str("## Source trees\n\n");
        for tree in &snapshot.trees {
            out.push_str(&format!(
                "- `{}` {}-{}\n",
                tree.path,
                tree.revision.as_deref().unwrap_or("?"),
                tree.branch.as_deref().unwrap_or("?")
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("## Options ({})\n\n", snapshot.option_count()));
    out.push_str("| Option | Architectures | Files | Default | Manual pages |\n");
    out.push_str("|--------|---------------|-------|---------|--------------|\n");
    for record in &snapshot.options {
        let arches: Vec<String> = record.architectures.iter().map(ToString::to_string).collect();
        let files: Vec<String> = record
            .files
            .iter()
            .map(|(scope, file)| {
                if file.is_empty() {
                    scope.to_string()
                } else {
                    format!("{scope}: `{file}`")
                }
            })
            .collect();
        let man: Vec<String> = record.man_entries.iter().map(ToString::to_string).collect();
        out.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            record.name,
            arches.join(", "),
            files.join("<br>"),
            record.default.as_deref().unwrap_or(""),
            man.join(", ")
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use kernel_options_core::{Arch, ManPageRef, NotesMarker, Registry, Scope};

    use super::*;

    fn sample_snapshot() -> RegistrySnapshot {
        let mut registry = Registry::new();
        registry.observe_definition("ZED", Scope::Arch(Arch::Amd64), "zed.c");
        registry.observe_definition("ALPHA", Scope::Arch(Arch::I386), "");
        let (record, _) = registry.get_or_create("ALPHA", kernel_options_core::ArchTag::Unknown);
        record.in_notes.insert(NotesMarker::Global);
        record.in_notes.insert(NotesMarker::Arch(Arch::I386));
        record.default = Some("3".into());
        record.man_entries.insert(ManPageRef::new("alpha", "4"));
        RegistrySnapshot::from_registry(&registry, "11.2", "2024-01-01T00:00:00Z")
    }

    #[test]
    fn test_tsv_is_sorted_by_name() {
        let out = format_snapshot(&sample_snapshot(), OutputFormat::Tsv).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "ALPHA\t{global, i386}\t{i386: }\t[I386]\t3\t{alpha(4)}"
        );
        assert!(lines[1].starts_with("ZED\t{}\t{amd64: zed.c}"));
    }

    #[test]
    fn test_tsv_has_six_columns() {
        let out = format_snapshot(&sample_snapshot(), OutputFormat::Tsv).unwrap();
        for line in out.lines() {
            assert_eq!(line.split('\t').count(), 6);
        }
    }

    #[test]
    fn test_json_output_parses() {
        let out = format_snapshot(&sample_snapshot(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["release"], "11.2");
        assert_eq!(value["options"][1]["name"], "ZED");
    }

    #[test]
    fn test_markdown_lists_every_option() {
        let out = format_snapshot(&sample_snapshot(), OutputFormat::Markdown).unwrap();
        assert!(out.contains("## Options (2)"));
        assert!(out.contains("| `ZED` | AMD64 | amd64: `zed.c` |"));
    }
}
