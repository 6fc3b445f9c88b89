//! # zcp - Chunked File Copier
//!
//! Copies files and directory trees in bounded chunks, using the kernel's
//! zero-copy path where available and a memory-mapped fallback elsewhere.
//! Chunk sizes can self-tune toward a target progress-update rate, and a
//! termination signal aborts the run without leaving partial files behind.

// Module declarations
pub mod cancel;
pub mod commands;
pub mod config;
pub mod executor;
pub mod scanner;
pub mod speed;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use executor::{CopyStats, TransferSession};
pub use types::{CopyError, EntryKind, FileEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
