//! On-disk version cache
//!
//! Artifacts are stored by category under a single root:
//!
//! | Directory  | Contents                                  |
//! |------------|-------------------------------------------|
//! | `vanilla/` | upstream builds, `<version>.jar`          |
//! | `patch/`   | patch containers, `<version>.fldiff`      |
//! | `modded/`  | patched builds, `<version>.jar`           |
//!
//! An entry exists only once it is complete: writes are staged in a
//! `.partial-*` file and renamed into place without replacing anything.
//! A file's presence is the cache-hit signal; the `.sha256` sidecars are
//! only read by explicit verification.

pub mod integrity;
pub mod layout;
pub mod maintenance;
pub mod staging;

pub use integrity::Integrity;
pub use layout::{CacheLayout, Category};
pub use maintenance::{format_bytes, CacheEntry, GcReport};
pub use staging::StagedFile;
