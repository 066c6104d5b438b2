//! Process-wide allocator.
//!
//! One [`BestFitAllocator`] shared by the whole process. Every call holds a
//! single lock for its full duration, so the chain is never observed
//! mid-update even if several threads call in.

use std::ptr::NonNull;

use parking_lot::{Mutex, const_mutex};

use crate::{BestFitAllocator, Dump, error::AllocError};

static ALLOCATOR: Mutex<BestFitAllocator> = const_mutex(BestFitAllocator::new());

/// Maps the process arena. Succeeds at most once per process.
pub fn init(
  region_size: usize,
) -> Result<(), AllocError> {
  ALLOCATOR.lock().initialize(region_size)
}

pub fn alloc(
  size: usize,
) -> Result<NonNull<u8>, AllocError> {
  ALLOCATOR.lock().allocate(size)
}

pub fn free(
  ptr: *mut u8,
) -> Result<(), AllocError> {
  ALLOCATOR.lock().release(ptr)
}

pub fn dump() -> Dump {
  ALLOCATOR.lock().dump()
}
