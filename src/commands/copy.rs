//! Top-level copy command

use crate::config::Config;
use crate::executor::{self, CopyStats, TransferSession};
use crate::scanner;
use crate::speed::SpeedCalibrator;
use crate::types::{CopyError, EntryKind};
use crate::ui::ProgressReporter;
use std::fs;
use std::path::{Path, PathBuf};

/// Run a whole copy invocation: a single file or a recursive tree.
///
/// Files are copied strictly sequentially. A fatal error or a termination
/// signal aborts the run with the first failure; per-entry skip conditions
/// (unreadable entries, no-clobber hits) only show up in the returned stats.
pub fn run(config: &Config) -> Result<CopyStats, CopyError> {
    let mut session = TransferSession::new();
    let mut calibrator = SpeedCalibrator::new(
        config.chunk_size,
        config.update_interval,
        config.calibrate_speed,
    );
    let reporter = ProgressReporter::new(config.report_progress, config.calibrate_speed);

    reporter.session_start();

    let mut stats = CopyStats::default();
    if config.source.is_dir() {
        copy_tree(
            config,
            &mut session,
            &mut calibrator,
            &reporter,
            &mut stats,
        )?;
    } else if config.source.is_file() {
        let destination = resolve_file_destination(&config.source, &config.destination);
        let permissions = source_mode(&config.source)?;
        let bytes = executor::copy_file(
            &config.source,
            &destination,
            permissions,
            config,
            &mut session,
            &mut calibrator,
            &reporter,
        )?;
        stats.files_copied += 1;
        stats.bytes_copied += bytes;
    } else {
        return Err(CopyError::Config(format!(
            "source '{}' is neither a regular file nor a directory",
            config.source.display()
        )));
    }

    reporter.finish(&stats);
    Ok(stats)
}

/// Reproduce the source tree under the destination root.
fn copy_tree(
    config: &Config,
    session: &mut TransferSession,
    calibrator: &mut SpeedCalibrator,
    reporter: &ProgressReporter,
    stats: &mut CopyStats,
) -> Result<(), CopyError> {
    for entry in scanner::scan_source(&config.source) {
        let destination = config.destination.join(&entry.relative_path);

        match entry.kind {
            EntryKind::Directory => {
                fs::create_dir_all(&destination)?;
                if config.preserve_permissions {
                    executor::apply_permissions(&destination, entry.permissions)
                        .map_err(CopyError::Io)?;
                }
                stats.dirs_created += 1;
            }
            EntryKind::File => {
                if !config.overwrite_existing && destination.exists() {
                    stats.files_skipped += 1;
                    continue;
                }
                let bytes = executor::copy_file(
                    &entry.source_path,
                    &destination,
                    entry.permissions,
                    config,
                    session,
                    calibrator,
                    reporter,
                )?;
                stats.files_copied += 1;
                stats.bytes_copied += bytes;
            }
            EntryKind::Other => {
                stats.files_skipped += 1;
            }
        }
    }
    Ok(())
}

/// A single-file copy writes to `destination` itself, unless that is an
/// existing directory - then the source file name is joined onto it.
fn resolve_file_destination(source: &Path, destination: &Path) -> PathBuf {
    if destination.is_dir() {
        match source.file_name() {
            Some(name) => destination.join(name),
            None => destination.to_path_buf(),
        }
    } else {
        destination.to_path_buf()
    }
}

fn source_mode(path: &Path) -> Result<u32, CopyError> {
    let metadata = fs::metadata(path).map_err(|e| CopyError::SourceOpen {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(scanner::file_mode(&metadata))
}
