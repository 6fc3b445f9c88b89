//! Sequential source-tree walker

use crate::types::{EntryKind, FileEntry};
use std::path::Path;

/// Enumerate every node under `root`, depth-first pre-order.
///
/// Entries that cannot be read (permission denied while listing, vanished
/// mid-walk, broken symlinks) are skipped with a warning on stderr; they
/// never abort the walk. The root itself is not returned - it maps onto the
/// destination root directly.
///
/// Symlinks are not followed during traversal, but each entry is classified
/// by what it resolves to, so a link to a regular file copies as a file.
pub fn scan_source(root: &Path) -> Vec<FileEntry> {
    let mut entries = Vec::new();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Warning: skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        let metadata = match std::fs::metadata(entry.path()) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Warning: cannot stat {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        // Files the invoking user cannot read are an enumeration-time skip;
        // an open failure later, mid-copy, is fatal to the whole run.
        if kind == EntryKind::File {
            if let Err(e) = std::fs::File::open(entry.path()) {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    eprintln!(
                        "Warning: cannot read {}, skipping: {}",
                        entry.path().display(),
                        e
                    );
                    continue;
                }
            }
        }

        let relative_path = match entry.path().strip_prefix(root) {
            Ok(p) => p.to_path_buf(),
            Err(_) => {
                eprintln!(
                    "Warning: {} is outside the source root, skipping",
                    entry.path().display()
                );
                continue;
            }
        };

        entries.push(FileEntry::new(
            entry.path().to_path_buf(),
            relative_path,
            kind,
            file_mode(&metadata),
            metadata.len(),
        ));
    }

    entries
}

/// Extract Unix permission bits (platform-specific)
#[cfg(unix)]
pub(crate) fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
pub(crate) fn file_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}
