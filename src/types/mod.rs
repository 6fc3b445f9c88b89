//! Core type definitions for zcp

mod entry;
mod error;

pub use entry::{EntryKind, FileEntry};
pub use error::CopyError;
