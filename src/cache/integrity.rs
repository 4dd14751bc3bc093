//! Content digests for cache entries
//!
//! Each committed entry gets a `<file>.sha256` sidecar holding the hex SHA-256
//! of its contents. Cache hits never consult it; it exists so that `verify`
//! can detect entries damaged after they were written.

use crate::error::{FlangeError, FlangeResult};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Extension appended to an entry's file name for its digest sidecar
pub const DIGEST_EXTENSION: &str = "sha256";

/// Outcome of checking an entry against its recorded digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    /// Contents match the recorded digest
    Intact,
    /// Contents changed since the digest was recorded
    Corrupted { expected: String, actual: String },
    /// No digest was recorded for this entry
    Unrecorded,
}

/// Sidecar path for `entry`
pub fn digest_path(entry: &Path) -> PathBuf {
    let mut name = entry.as_os_str().to_owned();
    name.push(".");
    name.push(DIGEST_EXTENSION);
    PathBuf::from(name)
}

/// Persist `digest` next to `entry`
pub fn record(entry: &Path, digest: &str) -> FlangeResult<()> {
    let path = digest_path(entry);
    fs::write(&path, format!("{}\n", digest))
        .map_err(|e| FlangeError::io(format!("writing digest {}", path.display()), e))
}

/// Hex SHA-256 of a file's contents
pub fn hash_file(path: &Path) -> FlangeResult<String> {
    let mut file =
        File::open(path).map_err(|e| FlangeError::io(format!("opening {}", path.display()), e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| FlangeError::io(format!("hashing {}", path.display()), e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compare an entry against its sidecar
pub fn verify(entry: &Path) -> FlangeResult<Integrity> {
    let sidecar = digest_path(entry);
    let expected = match fs::read_to_string(&sidecar) {
        Ok(content) => content.trim().to_string(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Integrity::Unrecorded),
        Err(e) => {
            return Err(FlangeError::io(
                format!("reading digest {}", sidecar.display()),
                e,
            ))
        }
    };

    let actual = hash_file(entry)?;
    if actual == expected {
        Ok(Integrity::Intact)
    } else {
        Ok(Integrity::Corrupted { expected, actual })
    }
}
