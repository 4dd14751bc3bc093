//! On-disk layout of the version cache
//!
//! Every artifact lives at `{root}/{category}/{name}.{ext}`.

use crate::error::{FlangeError, FlangeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifact classes kept in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Unmodified upstream builds
    Vanilla,
    /// Patch containers
    Patch,
    /// Builds produced by applying a patch to a vanilla build
    Modded,
}

impl Category {
    /// Directory name under the cache root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::Patch => "patch",
            Self::Modded => "modded",
        }
    }

    /// File extension of entries in this category
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Vanilla | Self::Modded => "jar",
            Self::Patch => "fldiff",
        }
    }

    /// All categories in layout order
    pub fn all() -> &'static [Self] {
        &[Self::Vanilla, Self::Patch, Self::Modded]
    }

    /// Parse from a directory name
    pub fn from_dir_name(s: &str) -> Option<Self> {
        match s {
            "vanilla" => Some(Self::Vanilla),
            "patch" => Some(Self::Patch),
            "modded" => Some(Self::Modded),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Maps `(category, name)` to cache paths below a root directory
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all entries of `category`
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    /// Path of an entry, without touching the filesystem
    pub fn entry_path(&self, category: Category, name: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", name, category.extension()))
    }

    /// Path of an entry, creating its category directory if needed
    pub fn resolve(&self, category: Category, name: &str) -> FlangeResult<PathBuf> {
        validate_name(name)?;

        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).map_err(|e| FlangeError::CacheUnavailable {
            path: dir.clone(),
            source: e,
        })?;

        let path = self.entry_path(category, name);
        debug!("Resolved {} {} to {}", category, name, path.display());
        Ok(path)
    }
}

/// Reject names that would escape their category directory
fn validate_name(name: &str) -> FlangeResult<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.contains('/') || name.contains('\\') || name.contains('\0') {
        Some("must not contain path separators")
    } else if name == "." || name == ".." {
        Some("must not be a relative directory reference")
    } else if name.starts_with(".partial-") {
        Some("is reserved for in-progress downloads")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(FlangeError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
