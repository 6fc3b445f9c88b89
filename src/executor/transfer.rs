//! Chunked transfer strategies.
//!
//! Two interchangeable primitives sit behind [`ChunkTransfer`]: a kernel
//! zero-copy path built on `sendfile(2)` (Linux) and a memory-mapped byte
//! copy (everywhere else, and always available for testing). Which one real
//! copies use is a compile-time decision; see [`PlatformTransfer`].

use std::fs::File;
use std::io;

use memmap2::{Mmap, MmapMut};

/// One chunk-granular file-to-file transfer mechanism.
///
/// A call moves up to `len` bytes and returns the new copied offset. Short
/// transfers are allowed; the caller loops until the offset reaches the
/// file length.
pub trait ChunkTransfer {
    fn transfer_chunk(&mut self, len: u64) -> io::Result<u64>;
}

/// The strategy used for real copies on this platform.
#[cfg(target_os = "linux")]
pub type PlatformTransfer<'f> = SendfileTransfer<'f>;

/// The strategy used for real copies on this platform.
#[cfg(not(target_os = "linux"))]
pub type PlatformTransfer<'f> = MmapTransfer;

/// Open the platform transfer for one whole file of `len` bytes.
#[cfg(target_os = "linux")]
pub fn open_transfer<'f>(
    source: &'f File,
    destination: &'f File,
    len: u64,
) -> io::Result<PlatformTransfer<'f>> {
    SendfileTransfer::new(source, destination, len)
}

/// Open the platform transfer for one whole file of `len` bytes.
#[cfg(not(target_os = "linux"))]
pub fn open_transfer<'f>(
    source: &'f File,
    destination: &'f File,
    len: u64,
) -> io::Result<PlatformTransfer<'f>> {
    MmapTransfer::new(source, destination, len)
}

/// Kernel zero-copy transfer via `sendfile(2)`.
///
/// The destination is pre-allocated to the full length up front; the kernel
/// advances the offset counter itself. A short count (for example after a
/// caught signal) is normal and handled by the caller's loop.
#[cfg(target_os = "linux")]
pub struct SendfileTransfer<'f> {
    source: &'f File,
    destination: &'f File,
    offset: libc::off_t,
}

#[cfg(target_os = "linux")]
impl<'f> SendfileTransfer<'f> {
    pub fn new(source: &'f File, destination: &'f File, len: u64) -> io::Result<Self> {
        destination.set_len(len)?;
        Ok(Self {
            source,
            destination,
            offset: 0,
        })
    }
}

#[cfg(target_os = "linux")]
impl ChunkTransfer for SendfileTransfer<'_> {
    fn transfer_chunk(&mut self, len: u64) -> io::Result<u64> {
        use std::os::unix::io::AsRawFd;

        let sent = unsafe {
            libc::sendfile(
                self.destination.as_raw_fd(),
                self.source.as_raw_fd(),
                &mut self.offset,
                len as usize,
            )
        };
        if sent < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(self.offset as u64)
    }
}

/// Memory-mapped byte copy.
///
/// Both files are mapped whole and chunks become bounds-checked slice
/// copies. `Drop` unmaps both regions on every exit path, error or not.
pub struct MmapTransfer {
    source_map: Mmap,
    destination_map: MmapMut,
    offset: u64,
}

impl MmapTransfer {
    pub fn new(source: &File, destination: &File, len: u64) -> io::Result<Self> {
        destination.set_len(len)?;

        // SAFETY: both files stay open for the lifetime of the maps and the
        // source file is never written through this process.
        let source_map = unsafe { Mmap::map(source)? };
        let destination_map = unsafe { MmapMut::map_mut(destination)? };

        if source_map.len() as u64 != len || destination_map.len() as u64 != len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "mapped region length does not match file length",
            ));
        }

        Ok(Self {
            source_map,
            destination_map,
            offset: 0,
        })
    }
}

impl ChunkTransfer for MmapTransfer {
    fn transfer_chunk(&mut self, len: u64) -> io::Result<u64> {
        let start = self.offset as usize;
        let end = start
            .checked_add(len as usize)
            .filter(|&end| end <= self.source_map.len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "chunk extends past the end of the mapping",
                )
            })?;

        self.destination_map[start..end].copy_from_slice(&self.source_map[start..end]);
        self.offset = end as u64;
        Ok(self.offset)
    }
}
