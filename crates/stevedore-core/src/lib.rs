//! Driver resolution and isolated execution for zip job archives.
//!
//! This crate provides:
//! - Archive inspection (unit listing, manifest hints)
//! - Entry-point resolution with a fixed precedence policy
//! - Per-call isolation boundaries with layered scope delegation
//! - Asynchronous, cancellable driver invocation

pub mod archive;
pub mod boundary;
pub mod cluster;
pub mod error;
pub mod execute;
pub mod resolve;
pub mod scope;
pub mod service;

pub use archive::{JobArchive, UnitName};
pub use boundary::{IsolationBoundary, ResolvedEntryPoint};
pub use cluster::{NoSiteFiles, SiteConfigSource, SiteFile, StaticSiteFiles};
pub use error::{Error, Result};
pub use execute::{ENTRY_SYMBOL, JobHandle, WaitOutcome, split_args, submit};
pub use resolve::{JobArchiveInfo, archive_info, resolve, scan_candidates};
pub use service::JobService;
