//! Acquisition of the backing region from the operating system.

use std::{io, ptr::NonNull};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, O_RDWR, PROT_READ, PROT_WRITE};

/// Fallback when `sysconf` cannot report a page size.
const DEFAULT_PAGE_SIZE: usize = 4096;

/// Returns the system page size.
pub fn page_size() -> usize {
  let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

  if size > 0 && (size as usize).is_power_of_two() {
    size as usize
  } else {
    DEFAULT_PAGE_SIZE
  }
}

/// A zero-filled, read/write range of memory owned exclusively by one allocator.
///
/// Regions are never returned to the operating system.
#[derive(Debug)]
pub struct Region {
  base: NonNull<u8>,
  len: usize,
}

impl Region {
  /// # Safety
  ///
  /// `base` must point to `len` zeroed, readable and writable bytes that
  /// stay valid for the rest of the process and that nothing else uses.
  pub unsafe fn from_raw_parts(
    base: NonNull<u8>,
    len: usize,
  ) -> Self {
    Self { base, len }
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Whether `addr` falls inside the region.
  pub fn contains(
    &self,
    addr: usize,
  ) -> bool {
    let start = self.base.as_ptr() as usize;
    addr >= start && addr - start < self.len
  }
}

/// Supplies the arena. Called once, with a page-rounded length.
pub trait RegionSource {
  fn acquire(
    &self,
    len: usize,
  ) -> io::Result<Region>;
}

/// Where the arena's pages come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backing {
  /// Private anonymous mapping.
  #[default]
  Anonymous,
  /// Private mapping of `/dev/zero`.
  ZeroDevice,
}

impl RegionSource for Backing {
  fn acquire(
    &self,
    len: usize,
  ) -> io::Result<Region> {
    match self {
      Self::Anonymous => map(len, MAP_PRIVATE | MAP_ANONYMOUS, -1),
      Self::ZeroDevice => {
        let fd = unsafe { libc::open(c"/dev/zero".as_ptr(), O_RDWR) };
        if fd == -1 {
          return Err(io::Error::last_os_error());
        }

        let region = map(len, MAP_PRIVATE, fd);
        unsafe { libc::close(fd) };
        region
      }
    }
  }
}

fn map(
  len: usize,
  flags: libc::c_int,
  fd: libc::c_int,
) -> io::Result<Region> {
  let address = unsafe {
    libc::mmap(
      std::ptr::null_mut(),
      len,
      PROT_READ | PROT_WRITE,
      flags,
      fd,
      0,
    )
  };

  if address == MAP_FAILED {
    return Err(io::Error::last_os_error());
  }

  let base = NonNull::new(address as *mut u8).ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;

  Ok(unsafe { Region::from_raw_parts(base, len) })
}

/// Unmaps a region acquired through [`Backing`]. Only tests give memory back.
#[cfg(test)]
pub(crate) unsafe fn unmap(
  region: &Region,
) {
  unsafe { libc::munmap(region.base.as_ptr() as *mut libc::c_void, region.len) };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_size_is_power_of_two() {
    assert!(page_size().is_power_of_two());
  }

  #[test]
  fn test_backings_hand_out_zeroed_writable_pages() {
    for backing in [Backing::Anonymous, Backing::ZeroDevice] {
      let len = 2 * page_size();
      let region = backing.acquire(len).unwrap();

      assert_eq!(region.len(), len);
      assert!(!region.is_empty());
      assert_eq!(region.base().as_ptr() as usize % page_size(), 0);

      unsafe {
        let bytes = std::slice::from_raw_parts_mut(region.base().as_ptr(), len);
        assert!(bytes.iter().all(|&b| b == 0));

        bytes[len - 1] = 0xAB;
        assert_eq!(bytes[len - 1], 0xAB);

        unmap(&region);
      }
    }
  }

  #[test]
  fn test_contains() {
    let region = Backing::Anonymous.acquire(page_size()).unwrap();
    let start = region.base().as_ptr() as usize;

    assert!(region.contains(start));
    assert!(region.contains(start + page_size() - 1));
    assert!(!region.contains(start + page_size()));
    assert!(!region.contains(start - 1));

    unsafe { unmap(&region) };
  }
}
