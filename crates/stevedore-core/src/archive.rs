//! Job archive inspection.
//!
//! A job archive is a zip container. Compiled units are entries with the
//! `.unit` suffix whose entry path encodes a dotted qualified name
//! (`com/acme/Driver.unit` ⇔ `com.acme.Driver`). An optional
//! `META-INF/MANIFEST.MF` entry of `Key: Value` lines may name the primary
//! entry point via the `Main-Class` attribute.
//!
//! No persistent handle is kept: every query re-opens the archive, so the
//! same archive may be inspected concurrently by independent resolutions.

use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::Result;

/// Fixed suffix identifying compiled-unit entries.
pub const UNIT_SUFFIX: &str = ".unit";

/// Archive entry holding manifest metadata.
pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Manifest attribute naming the primary entry point.
pub const MAIN_ATTRIBUTE: &str = "Main-Class";

/// Dotted qualified name of a compiled unit inside an archive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitName(String);

impl UnitName {
    /// Build from a caller- or manifest-supplied hint, normalizing
    /// path-style separators to dots.
    pub fn from_hint(hint: &str) -> Self {
        Self(hint.trim().replace('/', "."))
    }

    /// Build from an archive entry path such as `com/acme/Driver.unit`.
    ///
    /// Returns `None` for entries without the unit suffix.
    pub fn from_entry_path(entry: &str) -> Option<Self> {
        let stem = entry.strip_suffix(UNIT_SUFFIX)?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(stem.replace('/', ".")))
    }

    /// The archive entry path for this unit.
    pub fn entry_path(&self) -> String {
        format!("{}{}", self.0.replace('.', "/"), UNIT_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An addressable job archive on the local filesystem.
#[derive(Debug, Clone)]
pub struct JobArchive {
    path: PathBuf,
}

impl JobArchive {
    /// Reference an archive by path. The file is not opened until queried.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<ZipArchive<File>> {
        let file = File::open(&self.path)?;
        Ok(ZipArchive::new(file)?)
    }

    /// Enumerate every compiled-unit entry in the archive.
    ///
    /// The archive is re-opened on each call, so the listing is restartable
    /// and reflects the file as it is on disk right now.
    pub fn list_units(&self) -> Result<Vec<UnitName>> {
        let archive = self.open()?;
        Ok(archive
            .file_names()
            .filter_map(UnitName::from_entry_path)
            .collect())
    }

    /// Read the primary-entry attribute from the manifest, if any.
    ///
    /// Returns `Ok(None)` when the archive has no manifest entry or the
    /// manifest carries no `Main-Class` attribute. A manifest that exists but
    /// cannot be read is an error.
    pub fn manifest_hint(&self) -> Result<Option<UnitName>> {
        let mut archive = self.open()?;
        let mut entry = match archive.by_name(MANIFEST_ENTRY) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut manifest = String::new();
        entry.read_to_string(&mut manifest)?;
        Ok(parse_main_attribute(&manifest))
    }

    /// Materialize one unit entry under `dest`, preserving its entry path.
    ///
    /// Returns `Ok(None)` when the archive has no entry for the unit.
    pub fn extract_unit(&self, unit: &UnitName, dest: &Path) -> Result<Option<PathBuf>> {
        let mut archive = self.open()?;
        let mut entry = match archive.by_name(&unit.entry_path()) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let target = dest.join(unit.entry_path());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        Ok(Some(target))
    }
}

/// Extract the `Main-Class` value from manifest text.
///
/// Keys match ASCII-case-insensitively; the first match wins.
fn parse_main_attribute(manifest: &str) -> Option<UnitName> {
    for line in manifest.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case(MAIN_ATTRIBUTE) {
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            return Some(UnitName::from_hint(value));
        }
    }
    None
}
