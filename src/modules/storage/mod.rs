//! Disk-backed blob store
//!
//! Uploaded file bytes live on local disk, addressed by a generated unique
//! filename distinct from the user-visible original name. The relational
//! store remains authoritative; disk cleanup is best-effort.

mod disk;

pub use disk::DiskStorage;
