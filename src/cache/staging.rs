//! Write-then-rename staging for cache entries
//!
//! Bytes are written to a `.partial-*` file next to the target and only moved
//! into place once complete, so an existing entry is always a whole one. The
//! final move refuses to replace an existing file.

use crate::cache::integrity;
use crate::error::{FlangeError, FlangeResult};
use sha2::{Digest, Sha256};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Prefix of in-progress files inside a category directory
pub const PARTIAL_PREFIX: &str = ".partial-";

/// An entry being written; dropped without [`StagedFile::commit`] it is deleted
pub struct StagedFile {
    file: NamedTempFile,
    hasher: Sha256,
    written: u64,
    target: PathBuf,
}

impl StagedFile {
    /// Start staging bytes for `target`
    pub fn create(target: &Path) -> FlangeResult<Self> {
        let dir = target
            .parent()
            .ok_or_else(|| FlangeError::Internal(format!("{} has no parent", target.display())))?;

        let file = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| FlangeError::CacheUnavailable {
                path: dir.to_path_buf(),
                source: e,
            })?;

        debug!("Staging {} at {}", target.display(), file.path().display());
        Ok(Self {
            file,
            hasher: Sha256::new(),
            written: 0,
            target: target.to_path_buf(),
        })
    }

    /// Stream all of `reader` into the staged file
    pub fn copy_from(&mut self, reader: &mut dyn io::Read) -> io::Result<u64> {
        io::copy(reader, self)
    }

    /// Bytes staged so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Move the staged bytes into place.
    ///
    /// Fails with [`FlangeError::CacheConflict`] if the target appeared in the
    /// meantime; the existing file is left untouched.
    pub fn commit(mut self) -> FlangeResult<PathBuf> {
        self.file
            .flush()
            .and_then(|_| self.file.as_file().sync_all())
            .map_err(|e| {
                FlangeError::io(format!("flushing {}", self.file.path().display()), e)
            })?;

        let digest = hex::encode(self.hasher.finalize());
        let target = self.target;

        match self.file.persist_noclobber(&target) {
            Ok(_) => {}
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                return Err(FlangeError::CacheConflict { path: target });
            }
            Err(e) => {
                return Err(FlangeError::io(
                    format!("moving staged file to {}", target.display()),
                    e.error,
                ));
            }
        }

        // The entry is complete at this point; a missing digest only weakens `verify`.
        if let Err(e) = integrity::record(&target, &digest) {
            warn!("Could not record digest for {}: {}", target.display(), e);
        }

        debug!("Committed {} ({} bytes)", target.display(), self.written);
        Ok(target)
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Check whether a file name belongs to an in-progress write
pub fn is_partial(file_name: &str) -> bool {
    file_name.starts_with(PARTIAL_PREFIX)
}
