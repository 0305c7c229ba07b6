//! Manual-page corpus sources.
//!
//! A [`ManCorpus`] yields `<path>:<directive-text>` lines for every manual
//! page line that documents a kernel option with `.Cd "options ..."`.
//! [`DirectoryCorpus`] scans an installed manual tree; [`StaticCorpus`]
//! serves lines that were captured elsewhere.

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{IngestError, Result};

/// Source of manual-page directive lines.
pub trait ManCorpus {
    /// Returns every matching `<path>:<directive-text>` line.
    ///
    /// # Errors
    ///
    /// Returns an error when the corpus as a whole is unavailable. Individual
    /// unreadable pages are skipped.
    fn scan(&self) -> Result<Vec<String>>;

    /// Short description used in logs and reports.
    fn describe(&self) -> String {
        "manual pages".to_string()
    }
}

/// Returns `true` if a manual page source line is an options directive.
///
/// # Examples
///
/// ```
/// use kernel_options_ingest::corpus::is_options_directive;
///
/// assert!(is_options_directive(".Cd \"options IPSEC\""));
/// assert!(is_options_directive(".Cd options IPSEC"));
/// assert!(!is_options_directive(".Cd \"device pf\""));
/// assert!(!is_options_directive(".Nm options"));
/// ```
pub fn is_options_directive(line: &str) -> bool {
    line.strip_prefix(".Cd")
        .map(|rest| rest.trim_start().trim_start_matches('"').starts_with("options"))
        .unwrap_or(false)
}

/// Extracts directive lines from one page's text, prefixed with `path`.
pub fn directive_lines(path: &Path, text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| is_options_directive(line))
        .map(|line| format!("{}:{}", path.display(), line))
        .collect()
}

/// Scans a manual page directory tree.
///
/// Gzip-compressed pages are decompressed; other compressed formats are
/// skipped. Pages are read in parallel and lines come back ordered by path.
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    root: PathBuf,
}

impl DirectoryCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ManCorpus for DirectoryCorpus {
    fn scan(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(IngestError::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "manual directory not found"),
            ));
        }

        let pages: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "Skipping unreadable manual directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();

        info!(root = %self.root.display(), pages = pages.len(), "Scanning manual pages");

        let per_page: Vec<Vec<String>> = pages
            .par_iter()
            .map(|path| match read_page(path) {
                Some(text) => directive_lines(path, &text),
                None => Vec::new(),
            })
            .collect();

        Ok(per_page.into_iter().flatten().collect())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

fn read_page(path: &Path) -> Option<String> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let bytes = match extension {
        "gz" => {
            let file = match std::fs::File::open(path) {
                Ok(file) => file,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Cannot open manual page");
                    return None;
                }
            };
            let mut decoded = Vec::new();
            if let Err(err) = GzDecoder::new(file).read_to_end(&mut decoded) {
                warn!(path = %path.display(), error = %err, "Cannot decompress manual page");
                return None;
            }
            decoded
        }
        "bz2" | "xz" | "zst" => {
            debug!(path = %path.display(), "Skipping unsupported compression");
            return None;
        }
        _ => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Cannot read manual page");
                return None;
            }
        },
    };
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fixed list of corpus lines.
#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    lines: Vec<String>,
}

impl StaticCorpus {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl ManCorpus for StaticCorpus {
    fn scan(&self) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}

/// Corpus that yields nothing, for runs that skip manual pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorpus;

impl ManCorpus for NoCorpus {
    fn scan(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn write_gz(path: &Path, text: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_directory_corpus_reads_gzip_and_plain_pages() {
        let dir = tempfile::tempdir().unwrap();
        let man4 = dir.path().join("man4");
        std::fs::create_dir_all(&man4).unwrap();
        write_gz(
            &man4.join("ipfw.4.gz"),
            ".Dd May 1\n.Sh SYNOPSIS\n.Cd \"options IPFIREWALL\"\n.Cd \"device ipfw\"\n",
        );
        std::fs::write(man4.join("pf.4"), ".Cd \"options PF_X\"\n").unwrap();
        std::fs::write(man4.join("skip.4.xz"), "not really xz").unwrap();

        let lines = DirectoryCorpus::new(dir.path()).scan().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("ipfw.4.gz:.Cd \"options IPFIREWALL\""));
        assert!(lines[1].ends_with("pf.4:.Cd \"options PF_X\""));
    }

    #[test]
    fn test_directory_corpus_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = DirectoryCorpus::new(dir.path().join("absent"));
        assert!(matches!(corpus.scan(), Err(IngestError::Io { .. })));
    }

    #[test]
    fn test_directory_lines_parse_as_corpus_lines() {
        let lines = directive_lines(Path::new("/man/man4/ktr.4.gz"), ".Cd \"options KTR=1\"\n");
        let directive = crate::manpages::parse_corpus_line(&lines[0]).unwrap();
        assert_eq!(directive.cite.to_string(), "ktr(4)");
    }

    #[test]
    fn test_static_and_empty_corpus() {
        let corpus = StaticCorpus::new(["a.4.gz:.Cd options A"]);
        assert_eq!(corpus.scan().unwrap().len(), 1);
        assert!(NoCorpus.scan().unwrap().is_empty());
    }
}
