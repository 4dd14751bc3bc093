//! Error types for Flange
//!
//! All modules use `FlangeResult<T>` as their return type.

use crate::container::ContainerError;
use crate::patch::PatchError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Flange operations
pub type FlangeResult<T> = Result<T, FlangeError>;

/// Why a remote artifact could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with something other than the expected status
    Status { expected: u16, actual: u16 },
    /// The request never produced a response (DNS, TLS, connection reset, ...)
    Transport(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { expected, actual } => {
                write!(f, "expected response code {} but got {}", expected, actual)
            }
            Self::Transport(reason) => write!(f, "transport error: {}", reason),
        }
    }
}

/// All errors that can occur in Flange
#[derive(Error, Debug)]
pub enum FlangeError {
    // Cache errors
    #[error("Artifact {name} is not available from cache: {path}")]
    NotCached { name: String, path: PathBuf },

    #[error("Cache directory {path} is not accessible: {source}")]
    CacheUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache entry {path} was written concurrently by another process")]
    CacheConflict { path: PathBuf },

    #[error("{count} cached artifact(s) do not match their recorded digest")]
    CacheCorrupted { count: usize },

    #[error("Invalid artifact name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    // Remote errors
    #[error("Could not retrieve {name} from {url}: {failure}")]
    RemoteFetch {
        name: String,
        url: String,
        failure: FetchFailure,
    },

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Invalid remote location {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // Patch errors
    #[error("Invalid or corrupted patch {name} ({path}): {source}")]
    MalformedPatch {
        name: String,
        path: PathBuf,
        #[source]
        source: ContainerError,
    },

    #[error("Could not build {name} ({path}) from patch {patch} and base version {base}: {source}")]
    PatchApplication {
        name: String,
        path: PathBuf,
        patch: String,
        base: String,
        #[source]
        source: PatchError,
    },

    #[error("Could not resolve {name} ({path}): {source}")]
    Dependency {
        name: String,
        path: PathBuf,
        #[source]
        source: Box<FlangeError>,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl FlangeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a failure of a dependency with the identity of the artifact that needed it
    pub fn dependency(name: impl Into<String>, path: impl Into<PathBuf>, source: Self) -> Self {
        Self::Dependency {
            name: name.into(),
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping identity wrappers added along a resolution chain
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Dependency { source, .. } = current {
            current = source;
        }
        current
    }

    /// Check if a caller may reasonably retry the failed operation.
    ///
    /// Nothing inside Flange retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self.root_cause() {
            Self::RemoteFetch { failure, .. } => match failure {
                FetchFailure::Transport(_) => true,
                FetchFailure::Status { actual, .. } => *actual >= 500,
            },
            Self::CacheConflict { .. } => true,
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        // A wrapped lookup failure means a patch named the missing version
        let from_patch = matches!(self, Self::Dependency { .. });
        match self.root_cause() {
            Self::VersionNotFound(_) if from_patch => {
                Some("The patch targets a base version that remote.vanilla_url cannot locate")
            }
            Self::CacheUnavailable { .. } => {
                Some("Check permissions of the cache root or pass --cache-dir")
            }
            Self::CacheConflict { .. } => Some("Another process populated this entry; run again"),
            Self::CacheCorrupted { .. } => {
                Some("Remove them with: flange cache clear --category <category>")
            }
            Self::VersionNotFound(_) => {
                Some("Pass --diff-url or add the version to [remote.patches] in the config")
            }
            Self::MalformedPatch { .. } => Some("Run: flange cache clear --category patch"),
            _ => None,
        }
    }
}
