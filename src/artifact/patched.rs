//! Artifacts rebuilt locally from a patch container and its base build

use super::{Artifact, CacheableArtifact};
use crate::cache::StagedFile;
use crate::container::PatchContainer;
use crate::error::{FlangeError, FlangeResult};
use crate::version::VersionCache;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A build produced by applying a diff artifact's patch to the base version it names
#[derive(Clone)]
pub struct PatchedArtifact {
    name: String,
    diff: Box<Artifact>,
    cache: VersionCache,
    cache_path: PathBuf,
}

impl PatchedArtifact {
    pub fn new(
        name: impl Into<String>,
        diff: Artifact,
        cache: VersionCache,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            diff: Box::new(diff),
            cache,
            cache_path: cache_path.into(),
        }
    }

    /// Attach this artifact's identity to a failure in one of its inputs
    fn wrap(&self, source: FlangeError) -> FlangeError {
        FlangeError::dependency(&self.name, &self.cache_path, source)
    }

    /// Read and decode the diff artifact, which must already be cached
    fn read_container(&self) -> FlangeResult<PatchContainer> {
        let path = self.diff.cache_path()?;
        let bytes = fs::read(path)
            .map_err(|e| FlangeError::io(format!("reading patch {}", path.display()), e))?;

        PatchContainer::decode(&bytes).map_err(|source| FlangeError::MalformedPatch {
            name: self.diff.name().to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

impl CacheableArtifact for PatchedArtifact {
    fn name(&self) -> &str {
        &self.name
    }

    fn target_path(&self) -> &Path {
        &self.cache_path
    }

    fn populate(&self) -> FlangeResult<()> {
        if self.is_cached() {
            debug!("{} already cached at {}", self.name, self.cache_path.display());
            return Ok(());
        }

        self.diff.populate().map_err(|e| self.wrap(e))?;

        let container = self.read_container().map_err(|e| self.wrap(e))?;
        debug!(
            "Patch {} targets base version {} ({} patch bytes)",
            self.diff.name(),
            container.base_version,
            container.patch.len()
        );

        let base = self
            .cache
            .base_artifact(&container.base_version)
            .map_err(|e| self.wrap(e))?;
        let base_bytes = base
            .resolve()
            .and_then(|path| {
                fs::read(&path)
                    .map_err(|e| FlangeError::io(format!("reading base {}", path.display()), e))
            })
            .map_err(|e| self.wrap(e))?;

        let output = self
            .cache
            .patcher()
            .apply(&base_bytes, &container.patch)
            .map_err(|source| FlangeError::PatchApplication {
                name: self.name.clone(),
                path: self.cache_path.clone(),
                patch: self.diff.name().to_string(),
                base: container.base_version.clone(),
                source,
            })?;

        let mut staged = StagedFile::create(&self.cache_path)?;
        staged
            .write_all(&output)
            .map_err(|e| FlangeError::io(format!("writing {}", self.cache_path.display()), e))?;
        staged.commit()?;

        info!(
            "Built {} from {} + {} ({} bytes)",
            self.name,
            container.base_version,
            self.diff.name(),
            output.len()
        );
        Ok(())
    }
}

impl fmt::Debug for PatchedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchedArtifact")
            .field("name", &self.name)
            .field("diff", &self.diff)
            .field("cache_path", &self.cache_path)
            .field("cached", &self.is_cached())
            .finish()
    }
}
