//! Remote collaborators
//!
//! [`HttpClient`] opens a byte stream for a URL; [`RemoteLocator`] turns an
//! artifact name into the URL to fetch it from. Neither caches anything.

use crate::error::{FetchFailure, FlangeError, FlangeResult};
use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Placeholder substituted by [`TemplateLocator`]
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Status code a download must answer with
pub const EXPECTED_STATUS: u16 = 200;

/// Blocking transport for artifact downloads
pub trait HttpClient: Send + Sync {
    /// Open the body of `url` for reading.
    ///
    /// Anything but an exact 200 response is a [`FetchFailure::Status`].
    fn open(&self, url: &Url) -> Result<Box<dyn Read>, FetchFailure>;
}

/// [`HttpClient`] backed by a `ureq` agent
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl HttpClient for UreqClient {
    fn open(&self, url: &Url) -> Result<Box<dyn Read>, FetchFailure> {
        debug!("GET {}", url);
        let response = match self.agent.get(url.as_str()).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(actual)) => {
                return Err(FetchFailure::Status {
                    expected: EXPECTED_STATUS,
                    actual,
                })
            }
            Err(e) => return Err(FetchFailure::Transport(e.to_string())),
        };

        let actual = response.status().as_u16();
        if actual != EXPECTED_STATUS {
            return Err(FetchFailure::Status {
                expected: EXPECTED_STATUS,
                actual,
            });
        }

        Ok(Box::new(response.into_body().into_reader()))
    }
}

/// Where an artifact can be downloaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocation {
    /// Stable identifier of the artifact (used as its cache name)
    pub identifier: String,
    /// Download location
    pub url: Url,
}

/// Maps artifact names to remote locations
pub trait RemoteLocator: Send + Sync {
    /// Look up `name`, returning `None` when the locator does not know it
    fn locate(&self, name: &str) -> FlangeResult<Option<RemoteLocation>>;
}

fn parse_url(raw: &str) -> FlangeResult<Url> {
    Url::parse(raw).map_err(|e| FlangeError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Builds URLs by substituting the name into a `{version}` template
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    template: String,
}

impl TemplateLocator {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl RemoteLocator for TemplateLocator {
    fn locate(&self, name: &str) -> FlangeResult<Option<RemoteLocation>> {
        let url = parse_url(&self.template.replace(VERSION_PLACEHOLDER, name))?;
        Ok(Some(RemoteLocation {
            identifier: name.to_string(),
            url,
        }))
    }
}

/// Fixed table of known artifacts
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    entries: HashMap<String, Url>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw name/URL pairs, rejecting unparsable URLs
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> FlangeResult<Self> {
        let mut locator = Self::new();
        for (name, raw) in entries {
            locator.insert(name.clone(), parse_url(raw)?);
        }
        Ok(locator)
    }

    pub fn insert(&mut self, name: impl Into<String>, url: Url) {
        self.entries.insert(name.into(), url);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RemoteLocator for StaticLocator {
    fn locate(&self, name: &str) -> FlangeResult<Option<RemoteLocation>> {
        Ok(self.entries.get(name).map(|url| RemoteLocation {
            identifier: name.to_string(),
            url: url.clone(),
        }))
    }
}

/// Asks each locator in order; the first hit wins
#[derive(Default)]
pub struct ChainLocator {
    locators: Vec<Box<dyn RemoteLocator>>,
}

impl ChainLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: impl RemoteLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }
}

impl RemoteLocator for ChainLocator {
    fn locate(&self, name: &str) -> FlangeResult<Option<RemoteLocation>> {
        for locator in &self.locators {
            if let Some(location) = locator.locate(name)? {
                return Ok(Some(location));
            }
        }
        Ok(None)
    }
}
