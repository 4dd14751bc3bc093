//! CLI command implementations

pub mod cache;
pub mod config;
pub mod fetch;
pub mod inspect;
pub mod pack;
pub mod resolve;

pub use cache::execute as cache;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use inspect::execute as inspect;
pub use pack::execute as pack;
pub use resolve::execute as resolve;

use crate::artifact::{Artifact, CacheableArtifact};
use crate::error::{FlangeError, FlangeResult};
use std::path::PathBuf;

/// Populate an artifact on the blocking pool and return its cache path
pub(crate) async fn resolve_blocking(artifact: Artifact) -> FlangeResult<PathBuf> {
    tokio::task::spawn_blocking(move || artifact.resolve())
        .await
        .map_err(|e| FlangeError::Internal(format!("populate task failed: {}", e)))?
}
