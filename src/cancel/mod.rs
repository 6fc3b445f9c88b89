//! Termination signal handling.
//!
//! A single process-wide flag, flipped by the signal handler and polled
//! cooperatively by the transfer loop after every chunk. The transition is
//! one-way: once set, the flag is never cleared for the lifetime of the
//! process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

static TERMINATED: AtomicBool = AtomicBool::new(false);
static HANDLER_SET: OnceLock<()> = OnceLock::new();

/// Install the SIGINT/SIGTERM handler. Safe to call more than once.
///
/// The handler only flips the flag; all cleanup (closing descriptors,
/// deleting the in-progress destination file) happens on the copying thread
/// at the next poll point.
pub fn install_termination_handler() -> anyhow::Result<()> {
    if HANDLER_SET.get().is_some() {
        return Ok(());
    }

    ctrlc::set_handler(request_termination)?;

    let _ = HANDLER_SET.set(());
    Ok(())
}

/// Flip the process-wide termination flag.
pub fn request_termination() {
    TERMINATED.store(true, Ordering::SeqCst);
}

/// True once a termination signal has been observed.
pub fn is_terminated() -> bool {
    TERMINATED.load(Ordering::SeqCst)
}
