// CLASSIFICATION: COMMUNITY
// Filename: mmio.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Physical memory windows mapped through `/dev/mem`.
#![allow(unsafe_code)]

use log::debug;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

use super::{check_range, HalError, Window, WindowError};

/// Read-only handle on the privileged physical-memory device.
#[derive(Debug)]
pub struct PhysMem {
    file: File,
    path: PathBuf,
}

impl PhysMem {
    /// Open `path` read-only. Usually requires root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HalError> {
        let path = path.as_ref().to_path_buf();
        match File::open(&path) {
            Ok(file) => Ok(Self { file, path }),
            Err(source) => Err(HalError::Open { path, source }),
        }
    }

    /// Path the handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maps `size` bytes of physical memory starting at `base`.
    ///
    /// `base` need not be page aligned; the mapping starts at the page
    /// below it and offset 0 of the returned window is exactly `base`.
    pub fn map(&self, base: u64, size: usize) -> Result<MmioWindow, HalError> {
        if base == 0 {
            return Err(HalError::Invalid("physical base must be non-zero"));
        }
        if size == 0 {
            return Err(HalError::Invalid("window size must be non-zero"));
        }

        let page_mask = page_size() as u64 - 1;
        let aligned_base = base & !page_mask;
        let delta = (base - aligned_base) as usize;
        let map_len = delta
            .checked_add(size)
            .ok_or(HalError::Invalid("window size overflow"))?;
        let offset = libc::off_t::try_from(aligned_base)
            .map_err(|_| HalError::Invalid("physical base exceeds off_t"))?;

        // SAFETY: requests a fresh mapping chosen by the kernel; no existing
        // memory is aliased and the fd outlives the call.
        let raw = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                self.file.as_raw_fd(),
                offset,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(HalError::Map {
                base,
                size,
                source: io::Error::last_os_error(),
            });
        }
        let map_base = NonNull::new(raw.cast::<u8>()).ok_or(HalError::Map {
            base,
            size,
            source: io::Error::from(io::ErrorKind::AddrNotAvailable),
        })?;

        debug!(
            "mmio: mapped {} bytes at {:#x} (page {:#x}, delta {:#x}) from {}",
            size,
            base,
            aligned_base,
            delta,
            self.path.display()
        );

        Ok(MmioWindow {
            paddr: base,
            map_base,
            map_len,
            delta,
            len: size,
        })
    }
}

fn page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        4096
    }
}

/// A read-only mapping of device memory.
#[derive(Debug)]
pub struct MmioWindow {
    paddr: u64,
    map_base: NonNull<u8>,
    map_len: usize,
    delta: usize,
    len: usize,
}

impl MmioWindow {
    /// Returns the physical base address of the window.
    pub const fn paddr(&self) -> u64 {
        self.paddr
    }

    /// Returns the virtual address of window offset 0.
    pub fn as_ptr(&self) -> *const u8 {
        // SAFETY: delta < page size <= map_len, so the result stays inside
        // the mapping.
        unsafe { self.map_base.as_ptr().add(self.delta) }
    }
}

impl Window for MmioWindow {
    fn len(&self) -> usize {
        self.len
    }

    fn read8(&self, offset: usize) -> Result<u8, WindowError> {
        check_range(offset, 1, self.len)?;
        // SAFETY: offset is inside [0, len) and the mapping is readable.
        Ok(unsafe { ptr::read_volatile(self.as_ptr().add(offset)) })
    }

    fn read32(&self, offset: usize) -> Result<u32, WindowError> {
        check_range(offset, 4, self.len)?;
        let ptr = self.as_ptr().wrapping_add(offset);
        if (ptr as usize) % 4 != 0 {
            return Err(WindowError::Misaligned { offset, width: 4 });
        }
        // SAFETY: in bounds, 4-byte aligned and readable.
        Ok(unsafe { ptr::read_volatile(ptr.cast::<u32>()) })
    }
}

impl Drop for MmioWindow {
    fn drop(&mut self) {
        // SAFETY: map_base/map_len came from a successful mmap and are
        // unmapped exactly once.
        unsafe {
            libc::munmap(self.map_base.as_ptr().cast(), self.map_len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::FileExt;
    use tempfile::NamedTempFile;

    fn backing(pages: usize) -> (NamedTempFile, usize) {
        let page = page_size();
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len((page * pages) as u64).unwrap();
        (file, page)
    }

    #[test]
    fn open_reports_path() {
        let err = PhysMem::open("/nonexistent/micboot/mem").unwrap_err();
        assert!(matches!(err, HalError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/micboot/mem"));
    }

    #[test]
    fn rejects_zero_request() {
        let (file, page) = backing(2);
        let mem = PhysMem::open(file.path()).unwrap();
        assert!(matches!(mem.map(0, page), Err(HalError::Invalid(_))));
        assert!(matches!(mem.map(page as u64, 0), Err(HalError::Invalid(_))));
    }

    #[test]
    fn reads_through_unaligned_base() {
        let (file, page) = backing(3);
        file.as_file()
            .write_at(&0xdead_beef_u32.to_ne_bytes(), (page + 16) as u64)
            .unwrap();
        let mem = PhysMem::open(file.path()).unwrap();
        let win = mem.map(page as u64 + 16, 64).unwrap();
        assert_eq!(win.paddr(), page as u64 + 16);
        assert_eq!(win.len(), 64);
        assert_eq!(win.read32(0).unwrap(), 0xdead_beef);
        assert_eq!(win.read8(0).unwrap(), 0xdead_beef_u32.to_ne_bytes()[0]);
    }

    #[test]
    fn sees_later_writes() {
        let (file, page) = backing(2);
        let mem = PhysMem::open(file.path()).unwrap();
        let win = mem.map(page as u64, page).unwrap();
        assert_eq!(win.read32(8).unwrap(), 0);
        file.as_file()
            .write_at(&0xfeed_feed_u32.to_ne_bytes(), (page + 8) as u64)
            .unwrap();
        assert_eq!(win.read32(8).unwrap(), 0xfeed_feed);
    }

    #[test]
    fn bounds_and_alignment() {
        let (file, page) = backing(2);
        let mem = PhysMem::open(file.path()).unwrap();
        let win = mem.map(page as u64, 32).unwrap();
        assert!(matches!(win.read32(30), Err(WindowError::OutOfBounds { .. })));
        assert!(matches!(win.read8(32), Err(WindowError::OutOfBounds { .. })));
        assert_eq!(
            win.read32(2),
            Err(WindowError::Misaligned { offset: 2, width: 4 })
        );
        let mut buf = [0xffu8; 16];
        win.read_into(16, &mut buf).unwrap();
        assert_eq!(buf, [0u8; 16]);
        assert!(win.read_into(24, &mut buf).is_err());
    }

    #[test]
    fn map_of_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mem = PhysMem::open(dir.path()).unwrap();
        let err = mem.map(page_size() as u64, 4096).unwrap_err();
        assert!(matches!(err, HalError::Map { .. }));
    }
}
