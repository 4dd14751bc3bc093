//! Cache inspection and cleanup
//!
//! Listing committed entries, sweeping abandoned `.partial-*` files, and
//! clearing categories. None of this runs during resolution.

use crate::cache::integrity::{self, DIGEST_EXTENSION};
use crate::cache::layout::{CacheLayout, Category};
use crate::cache::staging::is_partial;
use crate::error::{FlangeError, FlangeResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// A committed cache entry
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub category: Category,
    /// Artifact name (file stem)
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

/// Result of a partial-file sweep
#[derive(Debug, Default)]
pub struct GcReport {
    /// Files removed (or that would be removed in a dry run)
    pub removed: Vec<PathBuf>,
    /// Bytes those files occupied
    pub reclaimed_bytes: u64,
}

impl CacheLayout {
    /// List committed entries, optionally restricted to one category
    pub fn entries(&self, category: Option<Category>) -> FlangeResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();

        for category in selected(category) {
            for path in read_dir_files(&self.category_dir(*category))? {
                let Some(name) = entry_name(&path, *category) else {
                    continue;
                };
                let metadata = fs::metadata(&path)
                    .map_err(|e| FlangeError::io(format!("reading {}", path.display()), e))?;
                let modified = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());

                entries.push(CacheEntry {
                    category: *category,
                    name,
                    path,
                    size_bytes: metadata.len(),
                    modified,
                });
            }
        }

        entries.sort_by(|a, b| (a.category.dir_name(), &a.name).cmp(&(b.category.dir_name(), &b.name)));
        Ok(entries)
    }

    /// Check each entry against its recorded digest
    pub fn verify_entries(
        &self,
        category: Option<Category>,
    ) -> FlangeResult<Vec<(CacheEntry, integrity::Integrity)>> {
        self.entries(category)?
            .into_iter()
            .map(|entry| {
                let status = integrity::verify(&entry.path)?;
                Ok((entry, status))
            })
            .collect()
    }

    /// Remove `.partial-*` files last modified more than `max_age` ago.
    ///
    /// Younger partial files may belong to a download still in progress and are kept.
    pub fn collect_partials(&self, max_age: Duration, dry_run: bool) -> FlangeResult<GcReport> {
        let now = SystemTime::now();
        let mut report = GcReport::default();

        for category in Category::all() {
            for path in read_dir_files(&self.category_dir(*category))? {
                let is_partial_file = path
                    .file_name()
                    .map(|n| is_partial(&n.to_string_lossy()))
                    .unwrap_or(false);
                if !is_partial_file {
                    continue;
                }

                let metadata = match fs::metadata(&path) {
                    Ok(m) => m,
                    // Finished or removed by its writer since the listing
                    Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                    Err(e) => {
                        return Err(FlangeError::io(format!("reading {}", path.display()), e))
                    }
                };
                let age = metadata
                    .modified()
                    .ok()
                    .and_then(|m| now.duration_since(m).ok())
                    .unwrap_or_default();
                if age < max_age {
                    debug!("Keeping recent partial file {}", path.display());
                    continue;
                }

                if !dry_run {
                    remove_file(&path)?;
                }
                report.reclaimed_bytes += metadata.len();
                report.removed.push(path);
            }
        }

        info!(
            "Partial sweep: {} file(s), {}",
            report.removed.len(),
            format_bytes(report.reclaimed_bytes)
        );
        Ok(report)
    }

    /// Delete committed entries and their digests; returns the number of entries removed
    pub fn clear(&self, category: Option<Category>) -> FlangeResult<usize> {
        let entries = self.entries(category)?;
        for entry in &entries {
            remove_file(&entry.path)?;
            remove_file(&integrity::digest_path(&entry.path))?;
        }
        info!("Removed {} cache entries", entries.len());
        Ok(entries.len())
    }
}

fn selected(category: Option<Category>) -> &'static [Category] {
    match category {
        Some(Category::Vanilla) => &[Category::Vanilla],
        Some(Category::Patch) => &[Category::Patch],
        Some(Category::Modded) => &[Category::Modded],
        None => Category::all(),
    }
}

/// Artifact name for a committed entry, `None` for partials and sidecars
fn entry_name(path: &Path, category: Category) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    if is_partial(&file_name) || file_name.ends_with(&format!(".{}", DIGEST_EXTENSION)) {
        return None;
    }
    file_name
        .strip_suffix(&format!(".{}", category.extension()))
        .map(str::to_string)
}

/// Regular files in `dir`; a missing directory is empty
fn read_dir_files(dir: &Path) -> FlangeResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(FlangeError::io(format!("listing {}", dir.display()), e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FlangeError::io(format!("listing {}", dir.display()), e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn remove_file(path: &Path) -> FlangeResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FlangeError::io(format!("removing {}", path.display()), e)),
    }
}
