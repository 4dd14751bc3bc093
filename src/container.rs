//! Patch container codec
//!
//! A patch container binds raw patch bytes to the base version they apply to.
//! All integers are big-endian:
//!
//! | Offset  | Size | Field                          |
//! |---------|------|--------------------------------|
//! | 0       | 4    | magic `DE FE C8 ED`            |
//! | 4       | 4    | i32 base version length (N)    |
//! | 8       | N    | UTF-8 base version             |
//! | 8 + N   | 4    | i32 patch length (M)           |
//! | 12 + N  | M    | raw patch bytes                |
//!
//! The container carries no checksum or compression of its own.

use std::fmt;
use thiserror::Error;

/// Leading bytes of every patch container
pub const MAGIC: [u8; 4] = [0xDE, 0xFE, 0xC8, 0xED];

/// Which length-prefixed field a decode error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Magic,
    BaseVersion,
    Patch,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Magic => write!(f, "magic number"),
            Self::BaseVersion => write!(f, "base version"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

/// Reasons a byte buffer is not a valid patch container
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("magic number mismatch (found {found:02X?})")]
    BadMagic { found: Vec<u8> },

    #[error("negative {field} length {length}")]
    NegativeLength { field: Field, length: i32 },

    #[error("truncated {field}: needs {needed} bytes but only {remaining} remain")]
    Truncated {
        field: Field,
        needed: usize,
        remaining: usize,
    },

    #[error("base version is not valid UTF-8")]
    InvalidUtf8,

    #[error("{count} unexpected bytes after the patch")]
    TrailingBytes { count: usize },

    #[error("{field} of {length} bytes exceeds the container limit")]
    TooLarge { field: Field, length: usize },
}

/// A decoded patch container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchContainer {
    /// Identifier of the base build the patch applies to
    pub base_version: String,
    /// Patch stream understood by the patch primitive
    pub patch: Vec<u8>,
}

impl PatchContainer {
    pub fn new(base_version: impl Into<String>, patch: Vec<u8>) -> Self {
        Self {
            base_version: base_version.into(),
            patch,
        }
    }

    /// Decode a container, rejecting anything that does not match the layout exactly
    pub fn decode(bytes: &[u8]) -> Result<Self, ContainerError> {
        let mut reader = Reader { bytes };

        let magic = reader.take(Field::Magic, MAGIC.len())?;
        if magic != MAGIC {
            return Err(ContainerError::BadMagic {
                found: magic.to_vec(),
            });
        }

        let version = reader.length_prefixed(Field::BaseVersion)?;
        let base_version = std::str::from_utf8(version)
            .map_err(|_| ContainerError::InvalidUtf8)?
            .to_string();

        let patch = reader.length_prefixed(Field::Patch)?.to_vec();

        if !reader.bytes.is_empty() {
            return Err(ContainerError::TrailingBytes {
                count: reader.bytes.len(),
            });
        }

        Ok(Self {
            base_version,
            patch,
        })
    }

    /// Encode into the container layout
    pub fn encode(&self) -> Result<Vec<u8>, ContainerError> {
        let version = self.base_version.as_bytes();
        let version_len = encode_length(Field::BaseVersion, version.len())?;
        let patch_len = encode_length(Field::Patch, self.patch.len())?;

        let mut out = Vec::with_capacity(MAGIC.len() + 8 + version.len() + self.patch.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&version_len);
        out.extend_from_slice(version);
        out.extend_from_slice(&patch_len);
        out.extend_from_slice(&self.patch);
        Ok(out)
    }
}

fn encode_length(field: Field, length: usize) -> Result<[u8; 4], ContainerError> {
    i32::try_from(length)
        .map(i32::to_be_bytes)
        .map_err(|_| ContainerError::TooLarge { field, length })
}

/// Bounds-checked cursor over the container bytes
struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, field: Field, needed: usize) -> Result<&'a [u8], ContainerError> {
        if needed > self.bytes.len() {
            return Err(ContainerError::Truncated {
                field,
                needed,
                remaining: self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(needed);
        self.bytes = tail;
        Ok(head)
    }

    fn length_prefixed(&mut self, field: Field) -> Result<&'a [u8], ContainerError> {
        let raw = self.take(field, 4)?;
        let length = i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let length = usize::try_from(length)
            .map_err(|_| ContainerError::NegativeLength { field, length })?;
        self.take(field, length)
    }
}
