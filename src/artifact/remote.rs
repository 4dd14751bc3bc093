//! Artifacts downloaded verbatim from a URL

use super::CacheableArtifact;
use crate::cache::StagedFile;
use crate::error::{FetchFailure, FlangeError, FlangeResult};
use crate::remote::HttpClient;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// A file fetched from a remote location into the cache
#[derive(Clone)]
pub struct RemoteArtifact {
    name: String,
    cache_path: PathBuf,
    url: Url,
    client: Arc<dyn HttpClient>,
}

impl RemoteArtifact {
    pub fn new(
        name: impl Into<String>,
        cache_path: impl Into<PathBuf>,
        url: Url,
        client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            name: name.into(),
            cache_path: cache_path.into(),
            url,
            client,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RemoteArtifact {
    fn fetch_error(&self, failure: FetchFailure) -> FlangeError {
        FlangeError::RemoteFetch {
            name: self.name.clone(),
            url: self.url.to_string(),
            failure,
        }
    }
}

/// Response body that remembers whether reading from the connection failed
struct Body {
    inner: Box<dyn Read>,
    failed: bool,
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|e| {
            if e.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
        })
    }
}

impl CacheableArtifact for RemoteArtifact {
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

        info!("Downloading {} from {}", self.name, self.url);
        let body = self
            .client
            .open(&self.url)
            .map_err(|failure| self.fetch_error(failure))?;

        let mut staged = StagedFile::create(&self.cache_path)?;
        let mut body = Body {
            inner: body,
            failed: false,
        };
        if let Err(e) = staged.copy_from(&mut body) {
            return Err(if body.failed {
                self.fetch_error(FetchFailure::Transport(e.to_string()))
            } else {
                FlangeError::io(format!("writing {}", self.cache_path.display()), e)
            });
        }
        let size = staged.written();
        staged.commit()?;

        info!("Cached {} ({} bytes)", self.name, size);
        Ok(())
    }
}

impl fmt::Debug for RemoteArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteArtifact")
            .field("name", &self.name)
            .field("cache_path", &self.cache_path)
            .field("url", &self.url.as_str())
            .field("cached", &self.is_cached())
            .finish()
    }
}
