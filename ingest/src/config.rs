//! Registry build configuration.
//!
//! Controls which architectures are scanned, where each source lives inside
//! a source tree, where the manual pages are, and which extra pattern names
//! the translator knows. Every field has a default, so an empty file is a
//! valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! release: "11.2"
//! architectures: [amd64, i386]
//! man_dir: /usr/share/man
//! layout:
//!   definitions: sys/conf/options
//!   global_notes: sys/conf/NOTES
//!   arch_notes: "sys/{arch}/conf/NOTES"
//!   newvers: sys/conf/newvers.sh
//! translations:
//!   "IPFW_DEFAULT_TO_(ACCEPT|DENY)": [IPFW_DEFAULT_TO_ACCEPT, IPFW_DEFAULT_TO_DENY]
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use kernel_options_core::{Arch, NameTranslator, Scope};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Placeholder replaced by the lower-case architecture tag in
/// [`SourceLayout::arch_notes`].
pub const ARCH_PLACEHOLDER: &str = "{arch}";

/// Default source tree scanned when none is given.
pub const DEFAULT_SOURCE_TREE: &str = "/usr/src";

/// Default manual page directory.
pub const DEFAULT_MAN_DIR: &str = "/usr/share/man";

/// Default release label.
pub const DEFAULT_RELEASE: &str = "11.2";

/// Relative locations of each source inside a source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    /// Base definition file; concrete architectures append `.<arch>`.
    pub definitions: PathBuf,
    /// Architecture-independent notes file.
    pub global_notes: PathBuf,
    /// Per-architecture notes file template containing `{arch}`.
    pub arch_notes: String,
    /// Version-control metadata script holding `REVISION=` and `BRANCH=`.
    pub newvers: PathBuf,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            definitions: PathBuf::from("sys/conf/options"),
            global_notes: PathBuf::from("sys/conf/NOTES"),
            arch_notes: "sys/{arch}/conf/NOTES".to_string(),
            newvers: PathBuf::from("sys/conf/newvers.sh"),
        }
    }
}

impl SourceLayout {
    /// Definition file for `scope` under `tree`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use kernel_options_core::{Arch, Scope};
    /// use kernel_options_ingest::config::SourceLayout;
    ///
    /// let layout = SourceLayout::default();
    /// assert_eq!(
    ///     layout.definitions_path(Path::new("/usr/src"), Scope::Arch(Arch::Amd64)),
    ///     Path::new("/usr/src/sys/conf/options.amd64"),
    /// );
    /// assert_eq!(
    ///     layout.definitions_path(Path::new("/usr/src"), Scope::All),
    ///     Path::new("/usr/src/sys/conf/options"),
    /// );
    /// ```
    pub fn definitions_path(&self, tree: &Path, scope: Scope) -> PathBuf {
        let base = tree.join(&self.definitions);
        match scope {
            Scope::All => base,
            Scope::Arch(arch) => {
                let mut name = base.into_os_string();
                name.push(".");
                name.push(arch.key());
                PathBuf::from(name)
            }
        }
    }

    /// Architecture-independent notes file under `tree`.
    pub fn global_notes_path(&self, tree: &Path) -> PathBuf {
        tree.join(&self.global_notes)
    }

    /// Notes file for `arch` under `tree`.
    pub fn arch_notes_path(&self, tree: &Path, arch: Arch) -> PathBuf {
        tree.join(self.arch_notes.replace(ARCH_PLACEHOLDER, arch.key()))
    }

    /// Metadata script under `tree`.
    pub fn newvers_path(&self, tree: &Path) -> PathBuf {
        tree.join(&self.newvers)
    }
}

/// Top-level registry build configuration.
///
/// # Examples
///
/// ```
/// use kernel_options_ingest::config::RegistryConfig;
///
/// let config: RegistryConfig = serde_yaml::from_str("architectures: [amd64]").unwrap();
/// assert_eq!(config.architectures.len(), 1);
/// assert_eq!(config.release, "11.2");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Release label reported alongside the registry.
    pub release: String,
    /// Concrete architectures to scan, in scan order.
    pub architectures: Vec<Arch>,
    /// Manual page root directory.
    pub man_dir: PathBuf,
    /// Source locations inside each tree.
    pub layout: SourceLayout,
    /// Additional pattern-name expansions, merged over the built-in table.
    pub translations: BTreeMap<String, Vec<String>>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            release: DEFAULT_RELEASE.to_string(),
            architectures: Arch::ALL.to_vec(),
            man_dir: PathBuf::from(DEFAULT_MAN_DIR),
            layout: SourceLayout::default(),
            translations: BTreeMap::new(),
        }
    }
}

impl RegistryConfig {
    /// Loads configuration from a YAML file and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] if the file cannot be read,
    /// [`IngestError::Yaml`] if parsing fails (including unrecognized
    /// architecture names), or [`IngestError::InvalidConfig`] if validation
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| IngestError::io(path, err))?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|err| IngestError::io(path, err))?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.layout.arch_notes.contains(ARCH_PLACEHOLDER) {
            return Err(IngestError::InvalidConfig(format!(
                "layout.arch_notes must contain {ARCH_PLACEHOLDER}: {}",
                self.layout.arch_notes
            )));
        }
        if let Some((pattern, _)) = self.translations.iter().find(|(_, names)| names.is_empty()) {
            return Err(IngestError::InvalidConfig(format!(
                "translation for {pattern} expands to no names"
            )));
        }
        Ok(())
    }

    /// Built-in name translator with configured entries layered on top.
    pub fn translator(&self) -> NameTranslator {
        let mut translator = NameTranslator::builtin();
        for (pattern, names) in &self.translations {
            translator.insert(pattern.clone(), names.iter().cloned());
        }
        translator
    }

    /// Configured architectures with repeats removed, keeping first-seen
    /// order.
    pub fn scan_architectures(&self) -> Vec<Arch> {
        let mut seen = Vec::with_capacity(self.architectures.len());
        for arch in &self.architectures {
            if !seen.contains(arch) {
                seen.push(*arch);
            }
        }
        seen
    }
}
