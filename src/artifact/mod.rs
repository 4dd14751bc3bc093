//! Cacheable artifacts
//!
//! An artifact is a named file that may or may not be materialized in the
//! cache yet. Two kinds exist:
//!
//! - [`RemoteArtifact`]: downloaded verbatim from a URL (vanilla builds, patch containers)
//! - [`PatchedArtifact`]: produced by applying a patch container to the base build it names
//!
//! Handles are cheap and carry no state besides their inputs; the cache path
//! is the identity. Two handles for the same path observe the same entry.

mod patched;
mod remote;

pub use patched::PatchedArtifact;
pub use remote::RemoteArtifact;

use crate::error::{FlangeError, FlangeResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Something that can be materialized at a cache path
pub trait CacheableArtifact {
    /// Artifact name (a version identifier)
    fn name(&self) -> &str;

    /// Where the artifact lives once materialized
    fn target_path(&self) -> &Path;

    /// Whether the artifact is present in the cache.
    ///
    /// Only the existence of the target file is checked.
    fn is_cached(&self) -> bool {
        self.target_path().exists()
    }

    /// Path of the materialized artifact.
    ///
    /// Fails with [`FlangeError::NotCached`] until [`populate`](Self::populate) succeeded.
    fn cache_path(&self) -> FlangeResult<&Path> {
        if !self.is_cached() {
            return Err(FlangeError::NotCached {
                name: self.name().to_string(),
                path: self.target_path().to_path_buf(),
            });
        }
        Ok(self.target_path())
    }

    /// Materialize the artifact; a no-op when already cached
    fn populate(&self) -> FlangeResult<()>;

    /// Materialize the artifact and return its path
    fn resolve(&self) -> FlangeResult<PathBuf> {
        self.populate()?;
        self.cache_path().map(Path::to_path_buf)
    }
}

/// Any artifact handed out by the version cache
#[derive(Clone)]
pub enum Artifact {
    Remote(RemoteArtifact),
    Patched(PatchedArtifact),
}

impl CacheableArtifact for Artifact {
    fn name(&self) -> &str {
        match self {
            Self::Remote(a) => a.name(),
            Self::Patched(a) => a.name(),
        }
    }

    fn target_path(&self) -> &Path {
        match self {
            Self::Remote(a) => a.target_path(),
            Self::Patched(a) => a.target_path(),
        }
    }

    fn populate(&self) -> FlangeResult<()> {
        match self {
            Self::Remote(a) => a.populate(),
            Self::Patched(a) => a.populate(),
        }
    }
}

impl From<RemoteArtifact> for Artifact {
    fn from(artifact: RemoteArtifact) -> Self {
        Self::Remote(artifact)
    }
}

impl From<PatchedArtifact> for Artifact {
    fn from(artifact: PatchedArtifact) -> Self {
        Self::Patched(artifact)
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(a) => a.fmt(f),
            Self::Patched(a) => a.fmt(f),
        }
    }
}
