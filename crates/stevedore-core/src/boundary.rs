//! Isolation boundary construction and entry-point loading.
//!
//! Each resolution call gets its own boundary: a fresh uniquely-named
//! staging directory, the staged cluster site files, the archive itself, and
//! an optional parent scope built from caller-supplied base locations. The
//! boundary is owned by the [`ResolvedEntryPoint`] it loaded, so staged
//! files and the loaded library are released together when the resolved
//! entry point is dropped — normally when its job handle completes.

use std::fs;
use std::path::{Path, PathBuf};

use libloading::Library;
use tempfile::TempDir;

use crate::archive::{JobArchive, UnitName};
use crate::cluster::SiteConfigSource;
use crate::error::{Error, Result};
use crate::execute::ffi;
use crate::scope::{Location, ScopeArena, ScopeId};

const CONF_DIR: &str = "conf";
const UNITS_DIR: &str = "units";

/// Scoped set of loadable locations for one resolution call.
///
/// Never shared across resolutions: the staging directory is created fresh
/// per boundary and removed when the boundary is dropped.
#[derive(Debug)]
pub struct IsolationBoundary {
    arena: ScopeArena,
    scope: ScopeId,
    staging: TempDir,
}

impl IsolationBoundary {
    /// Build a boundary for `archive`.
    ///
    /// When a config source is given, every site file with non-empty
    /// contents is staged under the boundary's `conf` directory and the
    /// parent directory of each staged file becomes a loadable location.
    /// The archive location is always appended, deduplicated against the
    /// staged set. `base_locations` become the parent scope consulted first
    /// during lookup.
    pub fn build(
        archive: &JobArchive,
        config: Option<&dyn SiteConfigSource>,
        base_locations: &[PathBuf],
    ) -> Result<Self> {
        let staging = TempDir::with_prefix("stevedore-scope-")?;
        let mut locations = Vec::new();

        if let Some(source) = config {
            let conf_dir = staging.path().join(CONF_DIR);
            fs::create_dir_all(&conf_dir)?;
            for file in source.site_files() {
                if file.contents.is_empty() {
                    continue;
                }
                // Keep only the final path component; site file names come
                // from outside this process.
                let Some(name) = Path::new(&file.name).file_name() else {
                    tracing::warn!(name = %file.name, "skipping site file without a usable name");
                    continue;
                };
                let dest = conf_dir.join(name);
                fs::write(&dest, &file.contents)?;
                if let Some(parent) = dest.parent() {
                    let location = Location::Directory(parent.to_path_buf());
                    if !locations.contains(&location) {
                        locations.push(location);
                    }
                }
            }
        }

        let archive_location = Location::Archive(archive.path().to_path_buf());
        if !locations.contains(&archive_location) {
            locations.push(archive_location);
        }

        let mut arena = ScopeArena::new();
        let parent = if base_locations.is_empty() {
            None
        } else {
            let base = base_locations
                .iter()
                .cloned()
                .map(Location::Directory)
                .collect();
            Some(arena.insert(base, None))
        };
        let scope = arena.insert(locations, parent);

        Ok(Self {
            arena,
            scope,
            staging,
        })
    }

    /// Ordered locations of the call scope (parent scope excluded).
    pub fn locations(&self) -> &[Location] {
        self.arena.locations(self.scope)
    }

    /// The boundary's private staging directory.
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Load `unit` through this boundary.
    fn load(&self, unit: &UnitName) -> Result<Library> {
        let extract_dir = self.staging.path().join(UNITS_DIR);
        fs::create_dir_all(&extract_dir)?;
        let path = self
            .arena
            .locate(self.scope, unit, &extract_dir)?
            .ok_or_else(|| Error::UnitNotFound(unit.to_string()))?;
        tracing::debug!(unit = %unit, path = %path.display(), "loading unit");
        // Safety: units are opaque caller-supplied libraries; loading them is
        // the whole point of this boundary.
        Ok(unsafe { Library::new(&path) }?)
    }
}

/// A driver entry point loaded through its own isolation boundary.
///
/// The library is declared before the boundary so it is dropped first,
/// while the files it was loaded from still exist.
#[derive(Debug)]
pub struct ResolvedEntryPoint {
    name: UnitName,
    library: Library,
    boundary: IsolationBoundary,
}

impl ResolvedEntryPoint {
    /// Qualified name of the loaded unit.
    pub fn name(&self) -> &UnitName {
        &self.name
    }

    /// The boundary the unit was loaded through.
    pub fn boundary(&self) -> &IsolationBoundary {
        &self.boundary
    }

    /// Whether the loaded unit exposes the driver entry signature.
    pub fn has_entry_signature(&self) -> bool {
        ffi::has_entry_signature(&self.library)
    }

    /// Run the driver entry point on the calling thread.
    pub fn invoke(&self, args: &[String]) -> Result<()> {
        ffi::invoke(&self.library, self.name.as_str(), args)
    }
}

/// Build a boundary for `archive` and load `name` through it.
///
/// Loading failure is fatal here; callers attach hint-specific context.
pub fn load_entry_point(
    name: &UnitName,
    archive: &JobArchive,
    config: Option<&dyn SiteConfigSource>,
    base_locations: &[PathBuf],
) -> Result<ResolvedEntryPoint> {
    let boundary = IsolationBoundary::build(archive, config, base_locations)?;
    let library = boundary.load(name)?;
    Ok(ResolvedEntryPoint {
        name: name.clone(),
        library,
        boundary,
    })
}

/// [`load_entry_point`] variant tolerating an absent candidate name.
///
/// Introspection callers that only have an optional manifest hint get
/// `Ok(None)` instead of an error when there is nothing to load.
pub fn build_and_load(
    name: Option<&UnitName>,
    archive: &JobArchive,
    config: Option<&dyn SiteConfigSource>,
    base_locations: &[PathBuf],
) -> Result<Option<ResolvedEntryPoint>> {
    match name {
        Some(name) => load_entry_point(name, archive, config, base_locations).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;
    use std::io::Write;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use crate::cluster::{SiteFile, StaticSiteFiles};

    fn empty_archive(dir: &Path) -> JobArchive {
        let path = dir.join("job.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("placeholder.txt", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"x").unwrap();
        zip.finish().unwrap();
        JobArchive::new(path)
    }

    #[test]
    fn test_empty_site_files_are_not_staged() {
        let dir = TempDir::new().unwrap();
        let archive = empty_archive(dir.path());
        let config = StaticSiteFiles::new(vec![
            SiteFile::new("core-site.xml", "<configuration/>"),
            SiteFile::new("absent-site.xml", ""),
        ]);

        let boundary = IsolationBoundary::build(&archive, Some(&config), &[]).unwrap();
        let conf_dir = boundary.staging_dir().join(CONF_DIR);
        assert!(conf_dir.join("core-site.xml").is_file());
        assert!(!conf_dir.join("absent-site.xml").exists());
    }

    #[test]
    fn test_site_file_names_are_sanitized() {
        let dir = TempDir::new().unwrap();
        let archive = empty_archive(dir.path());
        let config = StaticSiteFiles::new(vec![SiteFile::new(
            "../escape/core-site.xml",
            "<configuration/>",
        )]);

        let boundary = IsolationBoundary::build(&archive, Some(&config), &[]).unwrap();
        assert!(
            boundary
                .staging_dir()
                .join(CONF_DIR)
                .join("core-site.xml")
                .is_file()
        );
        assert!(!dir.path().join("escape").exists());
    }

    #[test]
    fn test_staged_directories_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let archive = empty_archive(dir.path());
        let config = StaticSiteFiles::new(vec![
            SiteFile::new("core-site.xml", "a"),
            SiteFile::new("hdfs-site.xml", "b"),
        ]);

        let boundary = IsolationBoundary::build(&archive, Some(&config), &[]).unwrap();
        // Both files share one conf directory; plus the archive itself.
        assert_eq!(boundary.locations().len(), 2);
        assert!(matches!(boundary.locations()[1], Location::Archive(_)));
    }

    #[test]
    fn test_concurrent_boundaries_use_distinct_staging() {
        let dir = TempDir::new().unwrap();
        let archive = empty_archive(dir.path());
        let first_config = StaticSiteFiles::new(vec![SiteFile::new("core-site.xml", "first")]);
        let second_config = StaticSiteFiles::new(vec![SiteFile::new("yarn-site.xml", "second")]);

        let first = IsolationBoundary::build(&archive, Some(&first_config), &[]).unwrap();
        let second = IsolationBoundary::build(&archive, Some(&second_config), &[]).unwrap();

        assert_ne!(first.staging_dir(), second.staging_dir());
        assert!(!second.staging_dir().join(CONF_DIR).join("core-site.xml").exists());
        assert!(!first.staging_dir().join(CONF_DIR).join("yarn-site.xml").exists());
    }

    #[test]
    fn test_staging_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let archive = empty_archive(dir.path());
        let config = StaticSiteFiles::new(vec![SiteFile::new("core-site.xml", "x")]);

        let boundary = IsolationBoundary::build(&archive, Some(&config), &[]).unwrap();
        let staging = boundary.staging_dir().to_path_buf();
        assert!(staging.exists());
        drop(boundary);
        assert!(!staging.exists());
    }

    #[test]
    fn test_load_missing_unit_is_unit_not_found() {
        let dir = TempDir::new().unwrap();
        let archive = empty_archive(dir.path());
        let name = UnitName::from_hint("com.acme.Nope");

        let err = load_entry_point(&name, &archive, None, &[]).unwrap_err();
        assert!(matches!(err, Error::UnitNotFound(_)));
    }

    #[test]
    fn test_build_and_load_without_candidate() {
        let dir = TempDir::new().unwrap();
        let archive = empty_archive(dir.path());
        assert!(build_and_load(None, &archive, None, &[]).unwrap().is_none());
    }
}
