//! Architecture enumeration.
//!
//! The set of target architectures is closed: [`Arch`] names every platform
//! the kernel source tree carries configuration for. Two sentinels sit next
//! to it in [`ArchTag`]: [`ArchTag::All`] for options that apply everywhere
//! and [`ArchTag::Unknown`] for options whose platform was never determined.
//!
//! Narrower views exist where a sentinel would be meaningless:
//! [`Scope`] keys per-architecture file attributions and can never be
//! `Unknown`, and [`NotesMarker`] records where a notes file mentioned an
//! option.
//!
//! # Examples
//!
//! ```
//! use kernel_options_core::{Arch, ArchTag, Scope};
//!
//! let arch: Arch = "amd64".parse().unwrap();
//! assert_eq!(arch, Arch::Amd64);
//! assert_eq!(ArchTag::from(Scope::Arch(arch)).key(), "amd64");
//! assert_eq!(ArchTag::All.to_string(), "ALL");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string does not name a recognized architecture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized architecture: {0}")]
pub struct ParseArchError(pub String);

/// A concrete target architecture.
///
/// Ordering follows declaration order, which is also the order the
/// orchestrator scans architectures in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm,
    I386,
    Mips,
    Pc98,
    Powerpc,
    Riscv,
    Sparc64,
}

impl Arch {
    /// Every recognized architecture, in scan order.
    pub const ALL: [Arch; 8] = [
        Arch::Amd64,
        Arch::Arm,
        Arch::I386,
        Arch::Mips,
        Arch::Pc98,
        Arch::Powerpc,
        Arch::Riscv,
        Arch::Sparc64,
    ];

    /// Lower-case tag used in file names and attribution keys.
    pub fn key(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm => "arm",
            Arch::I386 => "i386",
            Arch::Mips => "mips",
            Arch::Pc98 => "pc98",
            Arch::Powerpc => "powerpc",
            Arch::Riscv => "riscv",
            Arch::Sparc64 => "sparc64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Arch {
    type Err = ParseArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Arch::ALL
            .into_iter()
            .find(|arch| arch.key() == lowered)
            .ok_or_else(|| ParseArchError(s.to_string()))
    }
}

/// Architecture tag recorded on an option observation.
///
/// Displays in upper case (`AMD64`, `ALL`, `UNKNOWN`); [`key`](Self::key)
/// gives the lower-case form used for comparisons against file attribution
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ArchTag {
    /// Applies to every architecture.
    All,
    /// A single concrete architecture.
    Arch(Arch),
    /// Architecture was never determined (e.g. found only in manual pages).
    Unknown,
}

impl ArchTag {
    /// Lower-case key for this tag.
    pub fn key(self) -> &'static str {
        match self {
            ArchTag::All => "all",
            ArchTag::Arch(arch) => arch.key(),
            ArchTag::Unknown => "unknown",
        }
    }

    /// Returns the concrete architecture, if this tag names one.
    pub fn arch(self) -> Option<Arch> {
        match self {
            ArchTag::Arch(arch) => Some(arch),
            _ => None,
        }
    }
}

impl From<Arch> for ArchTag {
    fn from(arch: Arch) -> Self {
        ArchTag::Arch(arch)
    }
}

impl From<Scope> for ArchTag {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::All => ArchTag::All,
            Scope::Arch(arch) => ArchTag::Arch(arch),
        }
    }
}

impl fmt::Display for ArchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().to_ascii_uppercase())
    }
}

impl FromStr for ArchTag {
    type Err = ParseArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ArchTag::All),
            "unknown" => Ok(ArchTag::Unknown),
            _ => s.parse().map(ArchTag::Arch),
        }
    }
}

impl From<ArchTag> for String {
    fn from(tag: ArchTag) -> Self {
        tag.to_string()
    }
}

impl TryFrom<String> for ArchTag {
    type Error = ParseArchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Scope of a definition or notes file: the architecture-independent file
/// or one architecture's own file.
///
/// Used as the key of per-architecture file attributions. It has no
/// `Unknown` variant, so an attribution can never be keyed by the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Scope {
    All,
    Arch(Arch),
}

impl Scope {
    /// Lower-case key (`all` or the architecture tag).
    pub fn key(self) -> &'static str {
        ArchTag::from(self).key()
    }
}

impl From<Arch> for Scope {
    fn from(arch: Arch) -> Self {
        Scope::Arch(arch)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Scope {
    type Err = ParseArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ArchTag>()? {
            ArchTag::All => Ok(Scope::All),
            ArchTag::Arch(arch) => Ok(Scope::Arch(arch)),
            ArchTag::Unknown => Err(ParseArchError(s.to_string())),
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}

impl TryFrom<String> for Scope {
    type Error = ParseArchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where a notes file mentioned an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NotesMarker {
    /// The architecture-independent notes file.
    Global,
    /// An architecture's own notes file.
    Arch(Arch),
}

impl From<Scope> for NotesMarker {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::All => NotesMarker::Global,
            Scope::Arch(arch) => NotesMarker::Arch(arch),
        }
    }
}

impl fmt::Display for NotesMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotesMarker::Global => f.write_str("global"),
            NotesMarker::Arch(arch) => f.write_str(arch.key()),
        }
    }
}

impl FromStr for NotesMarker {
    type Err = ParseArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("global") {
            return Ok(NotesMarker::Global);
        }
        s.parse().map(NotesMarker::Arch)
    }
}

impl From<NotesMarker> for String {
    fn from(marker: NotesMarker) -> Self {
        marker.to_string()
    }
}

impl TryFrom<String> for NotesMarker {
    type Error = ParseArchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_parse_is_case_insensitive() {
        assert_eq!("AMD64".parse::<Arch>(), Ok(Arch::Amd64));
        assert_eq!(" sparc64 ".parse::<Arch>(), Ok(Arch::Sparc64));
        assert!("vax".parse::<Arch>().is_err());
    }

    #[test]
    fn test_arch_tag_display_and_key() {
        assert_eq!(ArchTag::Arch(Arch::I386).to_string(), "I386");
        assert_eq!(ArchTag::Arch(Arch::I386).key(), "i386");
        assert_eq!(ArchTag::Unknown.to_string(), "UNKNOWN");
        assert_eq!("unknown".parse::<ArchTag>(), Ok(ArchTag::Unknown));
    }

    #[test]
    fn test_scope_rejects_unknown_sentinel() {
        assert!("unknown".parse::<Scope>().is_err());
        assert_eq!("all".parse::<Scope>(), Ok(Scope::All));
        assert_eq!("riscv".parse::<Scope>(), Ok(Scope::Arch(Arch::Riscv)));
    }

    #[test]
    fn test_notes_marker_from_scope() {
        assert_eq!(NotesMarker::from(Scope::All).to_string(), "global");
        assert_eq!(NotesMarker::from(Scope::Arch(Arch::Arm)).to_string(), "arm");
    }

    #[test]
    fn test_serde_uses_string_forms() {
        let json = serde_json::to_string(&ArchTag::Arch(Arch::Powerpc)).unwrap();
        assert_eq!(json, "\"POWERPC\"");
        let scope: Scope = serde_json::from_str("\"pc98\"").unwrap();
        assert_eq!(scope, Scope::Arch(Arch::Pc98));
        let arch: Arch = serde_json::from_str("\"mips\"").unwrap();
        assert_eq!(arch, Arch::Mips);
    }
}
