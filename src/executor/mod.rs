//! Per-file copy execution

pub mod transfer;

use crate::cancel;
use crate::config::Config;
use crate::speed::SpeedCalibrator;
use crate::types::CopyError;
use crate::ui::ProgressReporter;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use transfer::ChunkTransfer;

/// Aggregate counters for a whole copy invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Regular files fully copied.
    pub files_copied: usize,
    /// Files skipped (no-clobber hits and non-regular nodes).
    pub files_skipped: usize,
    /// Destination directories created (or confirmed existing).
    pub dirs_created: usize,
    /// Bytes moved across all files.
    pub bytes_copied: u64,
}

/// Mutable per-process transfer state, consulted by the cancellation path.
///
/// `current_destination` and `copy_in_progress` are updated immediately
/// before and after each file's transfer, so a poll of the termination flag
/// always observes a consistent snapshot.
#[derive(Debug, Default)]
pub struct TransferSession {
    current_destination: Option<PathBuf>,
    copy_in_progress: bool,
    total_bytes_copied: u64,
}

impl TransferSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes moved so far across the whole run. Monotonic.
    pub fn total_bytes_copied(&self) -> u64 {
        self.total_bytes_copied
    }

    /// True only while bytes are actively being transferred.
    pub fn is_copy_in_progress(&self) -> bool {
        self.copy_in_progress
    }

    /// The file currently being written, if a transfer is mid-flight.
    pub fn current_destination(&self) -> Option<&Path> {
        self.current_destination.as_deref()
    }

    fn begin(&mut self, destination: PathBuf) {
        self.current_destination = Some(destination);
        self.copy_in_progress = true;
    }

    fn finish(&mut self) {
        self.copy_in_progress = false;
    }

    fn add_copied(&mut self, bytes: u64) {
        self.total_bytes_copied += bytes;
    }

    fn take_destination(&mut self) -> Option<PathBuf> {
        self.current_destination.take()
    }
}

/// Copy one regular file from `source_path` to `destination_path`.
///
/// The destination is created without truncation and receives the source's
/// permission bits before any byte moves, so a run killed mid-copy always
/// leaves an artifact the invoking user can remove. Zero-length sources
/// skip the transfer loop entirely; the mapping and sendfile primitives
/// both reject zero-length regions.
///
/// Open, stat, and transfer failures are fatal to the whole run. On
/// cancellation mid-transfer both descriptors are closed and the partial
/// destination file is deleted before `CopyError::Interrupted` propagates.
pub fn copy_file(
    source_path: &Path,
    destination_path: &Path,
    permissions: u32,
    config: &Config,
    session: &mut TransferSession,
    calibrator: &mut SpeedCalibrator,
    reporter: &ProgressReporter,
) -> Result<u64, CopyError> {
    reporter.begin_file(source_path, destination_path);

    let source = File::open(source_path).map_err(|e| source_open(source_path, e))?;
    let len = source
        .metadata()
        .map_err(|e| source_open(source_path, e))?
        .len();

    let destination = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(destination_path)
        .map_err(|e| destination_open(destination_path, e))?;

    if config.preserve_permissions {
        apply_permissions(destination_path, permissions)
            .map_err(|e| destination_open(destination_path, e))?;
    }

    if len == 0 {
        destination
            .set_len(0)
            .map_err(|e| destination_open(destination_path, e))?;
    } else {
        let mut strategy = transfer::open_transfer(&source, &destination, len)
            .map_err(|e| transfer_failed(destination_path, e))?;

        session.begin(destination_path.to_path_buf());
        let result = transfer_loop(
            &mut strategy,
            len,
            destination_path,
            session,
            calibrator,
            |copied, total, chunk_size, run_total| {
                reporter.chunk_progress(destination_path, copied, total, chunk_size, run_total);
            },
        );
        session.finish();
        drop(strategy);

        if let Err(err) = result {
            if err.is_interrupted() {
                // Close both descriptors, then drop the partial file.
                drop(source);
                drop(destination);
                if let Some(partial) = session.take_destination() {
                    let _ = fs::remove_file(partial);
                }
            }
            return Err(err);
        }
    }

    // A signal that landed after the last chunk (or during the zero-length
    // fast path) aborts the run, but the file here is complete: no deletion.
    if cancel::is_terminated() {
        return Err(CopyError::Interrupted);
    }

    Ok(len)
}

/// The shared chunk loop: runs once per chunk until `copied == total`.
///
/// Each iteration transfers `min(remaining, chunk_size)` bytes, records the
/// actual advance in the speed window, lets the calibrator retune the next
/// chunk, notifies `on_chunk`, and polls the termination flag.
fn transfer_loop<T: ChunkTransfer>(
    strategy: &mut T,
    total: u64,
    destination_path: &Path,
    session: &mut TransferSession,
    calibrator: &mut SpeedCalibrator,
    mut on_chunk: impl FnMut(u64, u64, u64, u64),
) -> Result<u64, CopyError> {
    let mut copied = 0u64;
    while copied < total {
        let started = Instant::now();
        let want = (total - copied).min(calibrator.chunk_size());
        let new_offset = strategy
            .transfer_chunk(want)
            .map_err(|e| transfer_failed(destination_path, e))?;

        let advanced = new_offset.saturating_sub(copied);
        if advanced == 0 {
            return Err(transfer_failed(
                destination_path,
                io::Error::new(io::ErrorKind::WriteZero, "transfer made no progress"),
            ));
        }
        copied = new_offset;

        session.add_copied(advanced);
        calibrator.record_chunk(advanced, started.elapsed());
        on_chunk(copied, total, calibrator.chunk_size(), session.total_bytes_copied());

        if cancel::is_terminated() {
            return Err(CopyError::Interrupted);
        }
    }
    Ok(copied)
}

/// Apply Unix permission bits to `path` (no-op elsewhere)
#[cfg(unix)]
pub(crate) fn apply_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub(crate) fn apply_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

fn source_open(path: &Path, source: io::Error) -> CopyError {
    CopyError::SourceOpen {
        path: path.to_path_buf(),
        source,
    }
}

fn destination_open(path: &Path, source: io::Error) -> CopyError {
    CopyError::DestinationOpen {
        path: path.to_path_buf(),
        source,
    }
}

fn transfer_failed(path: &Path, source: io::Error) -> CopyError {
    CopyError::Transfer {
        path: path.to_path_buf(),
        source,
    }
}
