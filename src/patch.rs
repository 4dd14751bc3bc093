//! Patch application primitive
//!
//! The container only transports patch bytes; turning base bytes plus patch
//! bytes into a new build is delegated to a [`PatchPrimitive`]. The default
//! [`Bsdiff`] understands BSDIFF40 streams with bzip2 compressed blocks.

use std::io::{self, Cursor};
use thiserror::Error;

/// Failures reported by a patch primitive
#[derive(Error, Debug)]
pub enum PatchError {
    /// The patch stream is structurally invalid (bad header, corrupt control block)
    #[error("malformed binary patch: {0}")]
    Malformed(String),

    /// The patch uses a compression or encoding the primitive cannot read
    #[error("unsupported patch encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("patch IO failure: {0}")]
    Io(#[source] io::Error),
}

/// Applies a patch stream to base bytes
pub trait PatchPrimitive: Send + Sync {
    /// Produce the patched output for `base`
    fn apply(&self, base: &[u8], patch: &[u8]) -> Result<Vec<u8>, PatchError>;
}

/// Header of the only stream format `Bsdiff` accepts
const BSDIFF_MAGIC: &[u8; 8] = b"BSDIFF40";

/// Magic plus control block size, diff block size, and target size
const BSDIFF_HEADER_LEN: usize = 32;

/// bsdiff 4.x patches with bzip2 compressed control, diff, and extra blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct Bsdiff;

/// Sizes declared by a BSDIFF40 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BsdiffHeader {
    control_len: u64,
    diff_len: u64,
    target_len: u64,
}

impl BsdiffHeader {
    /// Validate the header against the patch it belongs to
    fn parse(patch: &[u8]) -> Result<Self, PatchError> {
        if patch.len() < BSDIFF_MAGIC.len() {
            return Err(PatchError::Malformed(format!(
                "patch is {} bytes, shorter than its header",
                patch.len()
            )));
        }
        if &patch[..BSDIFF_MAGIC.len()] != BSDIFF_MAGIC {
            return Err(PatchError::UnsupportedEncoding(format!(
                "unknown header {:02X?}",
                &patch[..BSDIFF_MAGIC.len()]
            )));
        }
        if patch.len() < BSDIFF_HEADER_LEN {
            return Err(PatchError::Malformed(format!(
                "patch is {} bytes, shorter than its header",
                patch.len()
            )));
        }

        let header = Self {
            control_len: read_size(patch, 8, "control block")?,
            diff_len: read_size(patch, 16, "diff block")?,
            target_len: read_size(patch, 24, "target")?,
        };

        let blocks_end = (BSDIFF_HEADER_LEN as u64)
            .checked_add(header.control_len)
            .and_then(|n| n.checked_add(header.diff_len));
        match blocks_end {
            Some(end) if end <= patch.len() as u64 => Ok(header),
            _ => Err(PatchError::Malformed(format!(
                "control and diff blocks ({} + {} bytes) exceed the {} byte patch",
                header.control_len,
                header.diff_len,
                patch.len()
            ))),
        }
    }
}

/// Sign-magnitude little-endian size at `offset`; negative sizes are rejected
fn read_size(patch: &[u8], offset: usize, what: &str) -> Result<u64, PatchError> {
    const SIGN: u64 = 1 << 63;

    let mut raw = [0u8; 8];
    raw.copy_from_slice(&patch[offset..offset + 8]);
    let value = u64::from_le_bytes(raw);
    let magnitude = value & !SIGN;
    if value & SIGN != 0 && magnitude != 0 {
        return Err(PatchError::Malformed(format!(
            "negative {} size -{}",
            what, magnitude
        )));
    }
    Ok(magnitude)
}

impl PatchPrimitive for Bsdiff {
    fn apply(&self, base: &[u8], patch: &[u8]) -> Result<Vec<u8>, PatchError> {
        let header = BsdiffHeader::parse(patch)?;

        let patcher = qbsdiff::Bspatch::new(patch).map_err(classify)?;
        // The declared target size is untrusted
        let reserve = header
            .target_len
            .min((base.len() as u64).saturating_add(patch.len() as u64));
        let mut target = Vec::with_capacity(reserve as usize);
        patcher
            .apply(base, Cursor::new(&mut target))
            .map_err(classify)?;

        if target.len() as u64 != header.target_len {
            return Err(PatchError::Malformed(format!(
                "patch produced {} bytes but declares {}",
                target.len(),
                header.target_len
            )));
        }
        Ok(target)
    }
}

fn classify(err: io::Error) -> PatchError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            PatchError::Malformed(err.to_string())
        }
        _ => PatchError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(source: &[u8], target: &[u8]) -> Vec<u8> {
        let mut patch = Vec::new();
        qbsdiff::Bsdiff::new(source, target)
            .compare(Cursor::new(&mut patch))
            .unwrap();
        patch
    }

    #[test]
    fn bsdiff_applies_generated_patch() {
        let base = b"minecraft_server 1.8 with some padding to diff against".to_vec();
        let target = b"minecraft_server 1.8 with some padding patched by flange".to_vec();

        let patch = diff(&base, &target);
        assert_eq!(Bsdiff.apply(&base, &patch).unwrap(), target);
    }

    #[test]
    fn bsdiff_rejects_unknown_header() {
        let err = Bsdiff.apply(b"HELLO", b"NOTBSDIFF-stream").unwrap_err();
        assert!(matches!(err, PatchError::UnsupportedEncoding(_)));
    }

    #[test]
    fn bsdiff_rejects_short_patch() {
        let err = Bsdiff.apply(b"HELLO", b"BSD").unwrap_err();
        assert!(matches!(err, PatchError::Malformed(_)));
    }

    fn header(control: u64, diff: u64, target: u64) -> Vec<u8> {
        let mut patch = BSDIFF_MAGIC.to_vec();
        patch.extend_from_slice(&control.to_le_bytes());
        patch.extend_from_slice(&diff.to_le_bytes());
        patch.extend_from_slice(&target.to_le_bytes());
        patch
    }

    #[test]
    fn bsdiff_rejects_truncated_header() {
        let mut patch = BSDIFF_MAGIC.to_vec();
        patch.extend_from_slice(&[0; 10]);
        let err = Bsdiff.apply(b"HELLO", &patch).unwrap_err();
        assert!(matches!(err, PatchError::Malformed(_)));
    }

    #[test]
    fn bsdiff_rejects_huge_target_size() {
        let patch = header(0, 0, i64::MAX as u64);
        assert!(Bsdiff.apply(b"HELLO", &patch).is_err());
    }

    #[test]
    fn bsdiff_rejects_negative_sizes() {
        let negative = (1u64 << 63) | 1;
        for patch in [header(negative, 0, 5), header(0, negative, 5), header(0, 0, negative)] {
            let err = Bsdiff.apply(b"HELLO", &patch).unwrap_err();
            assert!(matches!(err, PatchError::Malformed(ref m) if m.contains("negative")));
        }
    }

    #[test]
    fn bsdiff_rejects_blocks_past_end() {
        let err = Bsdiff.apply(b"HELLO", &header(u64::MAX >> 1, u64::MAX >> 1, 5)).unwrap_err();
        assert!(matches!(err, PatchError::Malformed(ref m) if m.contains("exceed")));

        let err = Bsdiff.apply(b"HELLO", &header(16, 0, 5)).unwrap_err();
        assert!(matches!(err, PatchError::Malformed(_)));
    }

    #[test]
    fn header_of_generated_patch_is_accepted() {
        let base = b"minecraft_server 1.8 with some padding to diff against".to_vec();
        let target = b"minecraft_server 1.8 with some padding patched by flange".to_vec();

        let parsed = BsdiffHeader::parse(&diff(&base, &target)).unwrap();
        assert_eq!(parsed.target_len, target.len() as u64);
    }

    #[test]
    fn bsdiff_rejects_corrupt_body() {
        let mut patch = BSDIFF_MAGIC.to_vec();
        patch.extend_from_slice(&[0xFF; 24]);
        assert!(Bsdiff.apply(b"HELLO", &patch).is_err());
    }
}
