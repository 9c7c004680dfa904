//! Job service facade.
//!
//! Ties the inspector, resolver, isolation boundary, and execution wrapper
//! together behind the two operations the outer system calls: run a job
//! archive, and describe one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::JobArchive;
use crate::cluster::SiteConfigSource;
use crate::error::Result;
use crate::execute::{self, JobHandle};
use crate::resolve::{self, JobArchiveInfo};

/// Entry-point resolution and isolated execution for job archives.
///
/// Collaborators are process-wide, read-mostly references: the service holds
/// no per-job state, so one instance may serve concurrent submissions.
pub struct JobService {
    config: Arc<dyn SiteConfigSource>,
    runtime: tokio::runtime::Handle,
    base_locations: Vec<PathBuf>,
}

impl JobService {
    /// Create a service bound to a cluster config source and an executor.
    pub fn new(config: Arc<dyn SiteConfigSource>, runtime: tokio::runtime::Handle) -> Self {
        Self {
            config,
            runtime,
            base_locations: Vec::new(),
        }
    }

    /// Directories of caller-provided dependencies, consulted before the
    /// archive when units are looked up.
    pub fn with_base_locations(mut self, base_locations: Vec<PathBuf>) -> Self {
        self.base_locations = base_locations;
        self
    }

    /// Resolve the driver in `archive_path` and submit it for execution.
    ///
    /// `driver` overrides manifest and scanning when given; `args` is split
    /// with shell-like rules before invocation. Resolution runs on the
    /// calling thread; the returned handle covers only the invocation.
    pub fn execute_simple(
        &self,
        archive_path: impl AsRef<Path>,
        driver: Option<&str>,
        args: &str,
    ) -> Result<JobHandle> {
        let archive = JobArchive::new(archive_path.as_ref());
        let resolved = resolve::resolve(
            &archive,
            driver,
            self.config.as_ref(),
            &self.base_locations,
            true,
        )?;
        tracing::info!(
            unit = %resolved.name(),
            archive = %archive.path().display(),
            "submitting job"
        );
        execute::submit(&self.runtime, resolved, args)
    }

    /// Describe the runnable contents of `archive_path` without executing.
    pub fn archive_info(&self, archive_path: impl AsRef<Path>) -> Result<JobArchiveInfo> {
        let archive = JobArchive::new(archive_path.as_ref());
        resolve::archive_info(&archive, &self.base_locations)
    }
}
