//! Loading scope arena.
//!
//! An isolation boundary is modeled as an explicit value rather than an
//! implicit loader hierarchy: each scope is an ordered list of loadable
//! locations plus an optional parent scope, and scopes live in an arena
//! keyed by [`ScopeId`]. Lookup delegates to the parent first, falling back
//! to the scope's own locations only for units the parent cannot supply.

use std::path::{Path, PathBuf};

use crate::archive::{JobArchive, UnitName};
use crate::error::Result;

/// A loadable location inside a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Directory searched for unit files by their entry path.
    Directory(PathBuf),
    /// Job archive whose unit entries are extracted on demand.
    Archive(PathBuf),
}

/// Handle to a scope in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

/// One node of the delegation chain.
#[derive(Debug)]
struct Scope {
    locations: Vec<Location>,
    parent: Option<ScopeId>,
}

/// Arena of loading scopes.
///
/// Scopes are append-only; a scope may only name an already-inserted scope
/// as its parent, so the delegation chain is acyclic by construction.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scope and return its handle.
    pub fn insert(&mut self, locations: Vec<Location>, parent: Option<ScopeId>) -> ScopeId {
        debug_assert!(parent.is_none_or(|p| p.0 < self.scopes.len()));
        self.scopes.push(Scope { locations, parent });
        ScopeId(self.scopes.len() - 1)
    }

    /// Ordered locations of one scope, excluding its parents.
    pub fn locations(&self, id: ScopeId) -> &[Location] {
        &self.scopes[id.0].locations
    }

    /// Find the file backing `unit`, delegating parent-first.
    ///
    /// Archive locations extract the matching entry under `extract_dir`
    /// before returning it. Returns `Ok(None)` when no location in the chain
    /// carries the unit.
    pub fn locate(
        &self,
        id: ScopeId,
        unit: &UnitName,
        extract_dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let scope = &self.scopes[id.0];
        if let Some(parent) = scope.parent {
            if let Some(found) = self.locate(parent, unit, extract_dir)? {
                return Ok(Some(found));
            }
        }
        for location in &scope.locations {
            match location {
                Location::Directory(dir) => {
                    let candidate = dir.join(unit.entry_path());
                    if candidate.is_file() {
                        return Ok(Some(candidate));
                    }
                }
                Location::Archive(path) => {
                    if let Some(extracted) =
                        JobArchive::new(path).extract_unit(unit, extract_dir)?
                    {
                        return Ok(Some(extracted));
                    }
                }
            }
        }
        Ok(None)
    }
}
