//! Flange - local cache for vanilla and patched server builds
//!
//! Vanilla builds and patch containers are downloaded once into a local
//! cache. Patched builds are rebuilt by applying a container's binary diff
//! to the vanilla build it names, then cached alongside them.

pub mod artifact;
pub mod cache;
pub mod cli;
pub mod config;
pub mod container;
pub mod error;
pub mod patch;
pub mod remote;
pub mod ui;
pub mod version;

pub use artifact::{Artifact, CacheableArtifact};
pub use container::PatchContainer;
pub use error::{FlangeError, FlangeResult};
pub use version::VersionCache;
