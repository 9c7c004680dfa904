//! Named-cluster configuration collaborator.
//!
//! The surrounding system owns cluster configuration; this core only needs a
//! way to ask a named cluster for its site files so they can be staged into
//! an isolation boundary.

/// One cluster configuration artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFile {
    /// Filename the artifact is staged under.
    pub name: String,
    /// File contents. Empty contents means the artifact is absent.
    pub contents: String,
}

impl SiteFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Source of site files for a named cluster.
pub trait SiteConfigSource: Send + Sync {
    /// List the cluster's site files, content included.
    fn site_files(&self) -> Vec<SiteFile>;
}

/// Config source for clusters without site files.
#[derive(Debug, Default)]
pub struct NoSiteFiles;

impl SiteConfigSource for NoSiteFiles {
    fn site_files(&self) -> Vec<SiteFile> {
        Vec::new()
    }
}

/// Fixed in-memory site file set, handy for tests and embedded callers.
#[derive(Debug, Default)]
pub struct StaticSiteFiles {
    files: Vec<SiteFile>,
}

impl StaticSiteFiles {
    pub fn new(files: Vec<SiteFile>) -> Self {
        Self { files }
    }
}

impl SiteConfigSource for StaticSiteFiles {
    fn site_files(&self) -> Vec<SiteFile> {
        self.files.clone()
    }
}
