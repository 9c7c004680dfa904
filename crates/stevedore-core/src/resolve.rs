//! Driver entry-point resolution.
//!
//! Policy order is fixed: an explicit caller hint wins, then the manifest's
//! `Main-Class` attribute, then an archive-wide scan for units exposing the
//! entry signature. Ambiguity is always terminal; no candidate is ever
//! auto-picked.

use std::path::PathBuf;

use libloading::Library;
use tempfile::TempDir;

use crate::archive::{JobArchive, UnitName};
use crate::boundary::{self, ResolvedEntryPoint};
use crate::cluster::SiteConfigSource;
use crate::error::{Error, Result};
use crate::execute::ffi;

/// Non-authoritative description of an archive's runnable contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobArchiveInfo {
    /// Units exposing the entry signature, in archive order.
    pub runnable_units: Vec<String>,
    /// Manifest main unit, present only when it loads cleanly.
    pub main_unit: Option<String>,
}

/// Scan the archive for units exposing the entry signature.
///
/// Each unit is extracted into a disposable staging directory and loaded in
/// isolation. Units that fail to load are expected noise (malformed or
/// non-loadable entries) and are skipped.
pub fn scan_candidates(archive: &JobArchive) -> Result<Vec<UnitName>> {
    let staging = TempDir::with_prefix("stevedore-scan-")?;
    let mut candidates = Vec::new();
    for unit in archive.list_units()? {
        let Some(path) = archive.extract_unit(&unit, staging.path())? else {
            continue;
        };
        // Safety: scanning means loading; a unit that cannot be loaded is
        // simply not a candidate.
        match unsafe { Library::new(&path) } {
            Ok(library) => {
                if ffi::has_entry_signature(&library) {
                    candidates.push(unit);
                }
            }
            Err(e) => {
                tracing::debug!(unit = %unit, error = %e, "skipping unit that failed to load");
            }
        }
    }
    Ok(candidates)
}

/// Resolve the driver entry point for `archive`.
///
/// `explicit` is the caller's driver name; empty counts as absent. With
/// `include_config` set, cluster site files are staged into the resolved
/// entry point's isolation boundary.
pub fn resolve(
    archive: &JobArchive,
    explicit: Option<&str>,
    config: &dyn SiteConfigSource,
    base_locations: &[PathBuf],
    include_config: bool,
) -> Result<ResolvedEntryPoint> {
    let config = include_config.then_some(config);
    let load = |name: &UnitName| boundary::load_entry_point(name, archive, config, base_locations);

    if let Some(explicit) = explicit.filter(|name| !name.is_empty()) {
        let name = UnitName::from_hint(explicit);
        tracing::debug!(unit = %name, "resolving explicitly named driver");
        return load(&name).map_err(|e| Error::ExplicitNotFound {
            name: name.to_string(),
            reason: e.to_string(),
        });
    }

    if let Some(name) = archive.manifest_hint()? {
        tracing::debug!(unit = %name, "resolving driver from manifest");
        return load(&name).map_err(|e| Error::ManifestLoadFailed {
            name: name.to_string(),
            reason: e.to_string(),
        });
    }

    let mut candidates = scan_candidates(archive)?;
    match candidates.len() {
        1 => {
            let name = candidates.remove(0);
            tracing::debug!(unit = %name, "resolved sole scanned candidate");
            load(&name)
        }
        0 => Err(Error::NoDriverSpecified),
        count => Err(Error::MultipleDriverCandidates { count }),
    }
}

/// Best-effort archive introspection.
///
/// Unlike [`resolve`], a manifest hint that fails to load is not an error
/// here: callers only want a listing, so the main unit is reported absent
/// instead. Site files are never staged for introspection.
pub fn archive_info(archive: &JobArchive, base_locations: &[PathBuf]) -> Result<JobArchiveInfo> {
    let runnable_units = scan_candidates(archive)?
        .into_iter()
        .map(|unit| unit.to_string())
        .collect();

    let main_unit = match archive.manifest_hint() {
        Ok(Some(name)) => boundary::load_entry_point(&name, archive, None, base_locations)
            .ok()
            .map(|resolved| resolved.name().to_string()),
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable manifest during introspection");
            None
        }
    };

    Ok(JobArchiveInfo {
        runnable_units,
        main_unit,
    })
}
