//! Version cache facade
//!
//! Hands out artifact handles for vanilla builds, patch containers, and
//! patched builds below one cache root. The facade keeps no mutable state;
//! cloning it shares the same collaborators.

use crate::artifact::{Artifact, PatchedArtifact, RemoteArtifact};
use crate::cache::{CacheLayout, Category};
use crate::config::Config;
use crate::error::{FlangeError, FlangeResult};
use crate::patch::{Bsdiff, PatchPrimitive};
use crate::remote::{
    ChainLocator, HttpClient, RemoteLocator, StaticLocator, TemplateLocator, UreqClient,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

struct Inner {
    layout: CacheLayout,
    base_locator: Box<dyn RemoteLocator>,
    client: Arc<dyn HttpClient>,
    patcher: Arc<dyn PatchPrimitive>,
}

/// Factory for cache-backed artifact handles
#[derive(Clone)]
pub struct VersionCache {
    inner: Arc<Inner>,
}

impl VersionCache {
    /// Start building a cache rooted at `root`
    pub fn builder(root: impl Into<PathBuf>) -> VersionCacheBuilder {
        VersionCacheBuilder {
            root: root.into(),
            base_locator: None,
            client: None,
            patcher: None,
        }
    }

    /// Cache wired from configuration: ureq downloads, bsdiff patches,
    /// vanilla builds located through `remote.vanilla_url`.
    pub fn from_config(config: &Config, root: impl Into<PathBuf>) -> Self {
        Self::builder(root)
            .locator(TemplateLocator::new(&config.remote.vanilla_url))
            .client(Arc::new(UreqClient::new(Duration::from_secs(
                config.remote.timeout_secs,
            ))))
            .build()
    }

    pub fn root(&self) -> &Path {
        self.inner.layout.root()
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.inner.layout
    }

    pub(crate) fn patcher(&self) -> &dyn PatchPrimitive {
        self.inner.patcher.as_ref()
    }

    /// Handle for an upstream build, located through the base locator
    pub fn base_artifact(&self, version: &str) -> FlangeResult<Artifact> {
        let location = self
            .inner
            .base_locator
            .locate(version)?
            .ok_or_else(|| FlangeError::VersionNotFound(version.to_string()))?;

        let path = self.inner.layout.resolve(Category::Vanilla, &location.identifier)?;
        debug!("Base artifact {} -> {}", version, location.url);
        Ok(RemoteArtifact::new(
            location.identifier,
            path,
            location.url,
            Arc::clone(&self.inner.client),
        )
        .into())
    }

    /// Handle for a patch container downloaded from `url`
    pub fn patch_artifact(&self, version: &str, url: Url) -> FlangeResult<Artifact> {
        let path = self.inner.layout.resolve(Category::Patch, version)?;
        Ok(RemoteArtifact::new(version, path, url, Arc::clone(&self.inner.client)).into())
    }

    /// Handle for the build produced by applying `diff` to the base version it names
    pub fn patched_artifact(&self, version: &str, diff: Artifact) -> FlangeResult<Artifact> {
        let path = self.inner.layout.resolve(Category::Modded, version)?;
        Ok(PatchedArtifact::new(version, diff, self.clone(), path).into())
    }
}

impl fmt::Debug for VersionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionCache")
            .field("root", &self.root())
            .finish()
    }
}

/// Builder for [`VersionCache`]; unset collaborators fall back to defaults
pub struct VersionCacheBuilder {
    root: PathBuf,
    base_locator: Option<Box<dyn RemoteLocator>>,
    client: Option<Arc<dyn HttpClient>>,
    patcher: Option<Arc<dyn PatchPrimitive>>,
}

impl VersionCacheBuilder {
    /// Locator used to find vanilla builds
    pub fn locator(mut self, locator: impl RemoteLocator + 'static) -> Self {
        self.base_locator = Some(Box::new(locator));
        self
    }

    pub fn client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn patcher(mut self, patcher: Arc<dyn PatchPrimitive>) -> Self {
        self.patcher = Some(patcher);
        self
    }

    pub fn build(self) -> VersionCache {
        let base_locator = self.base_locator.unwrap_or_else(|| {
            Box::new(TemplateLocator::new(crate::config::schema::DEFAULT_VANILLA_URL))
        });

        VersionCache {
            inner: Arc::new(Inner {
                layout: CacheLayout::new(self.root),
                base_locator,
                client: self
                    .client
                    .unwrap_or_else(|| Arc::new(UreqClient::default())),
                patcher: self.patcher.unwrap_or_else(|| Arc::new(Bsdiff)),
            }),
        }
    }
}

/// Locator for patch containers: the `[remote.patches]` table, then `remote.patch_url`
pub fn patch_locator(config: &Config) -> FlangeResult<ChainLocator> {
    let mut chain = ChainLocator::new().with(StaticLocator::from_entries(&config.remote.patches)?);
    if let Some(template) = &config.remote.patch_url {
        chain = chain.with(TemplateLocator::new(template));
    }
    Ok(chain)
}
