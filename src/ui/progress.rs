//! Progress reporting

use crate::executor::CopyStats;
use console::Term;
use indicatif::HumanBytes;
use std::path::Path;

/// Renders the per-file banner and the single, cursor-repositioning status
/// line redrawn after every chunk.
///
/// All output goes through one terminal handle. When reporting is disabled
/// or stdout is not a terminal, every method is a no-op.
pub struct ProgressReporter {
    term: Term,
    enabled: bool,
    show_chunk_size: bool,
}

impl ProgressReporter {
    /// Create a reporter. `show_chunk_size` adds the live chunk size to the
    /// status line, which is only informative while calibration is on.
    pub fn new(report_progress: bool, show_chunk_size: bool) -> Self {
        let term = Term::stdout();
        let enabled = report_progress && term.is_term();
        Self {
            term,
            enabled,
            show_chunk_size,
        }
    }

    /// Print the session header once, before the first file.
    pub fn session_start(&self) {
        if !self.enabled {
            return;
        }
        let _ = self.term.write_line("Currently working on:");
    }

    /// Announce the file being copied, replacing any stale status line.
    pub fn begin_file(&self, source: &Path, destination: &Path) {
        if !self.enabled {
            return;
        }
        let _ = self.term.clear_line();
        let _ = self
            .term
            .write_line(&format!("{} -> {}", source.display(), destination.display()));
    }

    /// Redraw the status line after a chunk.
    pub fn chunk_progress(
        &self,
        destination: &Path,
        copied: u64,
        total: u64,
        chunk_size: u64,
        run_total: u64,
    ) {
        if !self.enabled {
            return;
        }

        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| destination.display().to_string());
        let percent = copied as f64 / total as f64 * 100.0;

        let mut line = format!("{} {:8.3}%", name, percent);
        if self.show_chunk_size {
            line.push_str(&format!(" cs={}", HumanBytes(chunk_size)));
        }
        line.push_str(&format!(" copied {}", HumanBytes(run_total)));

        let _ = self.term.clear_line();
        let _ = self.term.write_str(&line);
    }

    /// Print the final summary once the whole run is done.
    pub fn finish(&self, stats: &CopyStats) {
        if !self.enabled {
            return;
        }
        let _ = self.term.clear_line();
        let _ = self.term.write_line(&format!(
            "Copied {} file(s), skipped {}, {} total",
            stats.files_copied,
            stats.files_skipped,
            HumanBytes(stats.bytes_copied)
        ));
    }
}
