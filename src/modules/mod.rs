//! Modules layer - Infrastructure components
//!
//! Contains the disk-backed blob store and the zip archive builder.

pub mod archive;
pub mod storage;
