use std::ptr::NonNull;

use tracing::{debug, trace, warn};

use crate::{
  align::{PAYLOAD_ALIGN, align_up},
  block::{Block, BlockStatus, Chain, HEADER_SIZE},
  config::ArenaConfig,
  dump::{BlockReport, Dump},
  error::AllocError,
  region::{Region, RegionSource, page_size},
};

/// Smallest leftover that is carved into a block of its own.
const MIN_SPLIT: usize = HEADER_SIZE + PAYLOAD_ALIGN;

/// Best-fit allocator over a single fixed arena.
///
/// The arena is partitioned into blocks chained in address order. A fresh
/// arena is one free block; allocation splits blocks, release merges a
/// freed block with free neighbours so no two adjacent blocks are ever free.
pub struct BestFitAllocator {
  head: Option<Block>,
  region: Option<Region>,
}

// The allocator is the sole owner of its region and every header in it.
unsafe impl Send for BestFitAllocator {}

impl BestFitAllocator {
  pub const fn new() -> Self {
    Self {
      head: None,
      region: None,
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.region.is_some()
  }

  /// The arena, once initialized.
  pub fn region(&self) -> Option<&Region> {
    self.region.as_ref()
  }

  /// Maps `region_size` bytes, rounded up to whole pages, of anonymous memory.
  pub fn initialize(
    &mut self,
    region_size: usize,
  ) -> Result<(), AllocError> {
    self.initialize_with(&ArenaConfig::new(region_size))
  }

  pub fn initialize_with(
    &mut self,
    config: &ArenaConfig,
  ) -> Result<(), AllocError> {
    self.initialize_from(config.region_size, &config.backing)
  }

  /// Takes the arena from `source`.
  ///
  /// Only a successful call consumes the one-shot guard: after any error
  /// the allocator is still uninitialized and may be initialized again.
  pub fn initialize_from<S: RegionSource + ?Sized>(
    &mut self,
    region_size: usize,
    source: &S,
  ) -> Result<(), AllocError> {
    if self.is_initialized() {
      warn!(region_size, "arena already initialized");
      return Err(AllocError::AlreadyInitialized);
    }

    let len = match align_up(region_size, page_size()) {
      Some(len) if region_size > 0 => len,
      _ => return Err(AllocError::InvalidRegionSize { size: region_size }),
    };

    let region = source
      .acquire(len)
      .map_err(|source| AllocError::RegionAcquisitionFailed { len, source })?;

    if region.is_empty() || region.len() < len || region.base().as_ptr() as usize % PAYLOAD_ALIGN != 0 {
      return Err(AllocError::RegionAcquisitionFailed {
        len,
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, "region too small or misaligned"),
      });
    }

    // The arena is exactly `len` bytes even when the source hands back more.
    // SAFETY: the first `len` bytes of the acquired region are ours.
    let region = unsafe { Region::from_raw_parts(region.base(), len) };

    // SAFETY: the region is ours, writable, aligned and exactly `len` bytes long.
    let head = unsafe { Block::write(region.base(), len - HEADER_SIZE, BlockStatus::Free, None) };

    debug!(base = ?region.base(), len, "arena initialized");

    self.head = Some(head);
    self.region = Some(region);

    Ok(())
  }

  fn chain(&self) -> Chain {
    Chain::new(self.head)
  }

  /// Smallest free block holding `size` bytes; the first exact fit wins outright.
  fn find_best_fit(
    &self,
    size: usize,
  ) -> Option<Block> {
    let mut best: Option<Block> = None;

    for block in self.chain() {
      if !block.is_free() || block.size() < size {
        continue;
      }

      if block.size() == size {
        return Some(block);
      }

      match best {
        Some(kept) if kept.size() <= block.size() => {}
        _ => best = Some(block),
      }
    }

    best
  }

  /// Hands out a payload of at least `size` bytes, rounded up to a multiple of 4.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if !self.is_initialized() {
      return Err(AllocError::NotInitialized);
    }
    if size == 0 {
      return Err(AllocError::InvalidRequestSize);
    }

    let rounded = align_up(size, PAYLOAD_ALIGN).ok_or(AllocError::OutOfMemory { requested: size })?;

    let Some(candidate) = self.find_best_fit(rounded) else {
      debug!(requested = size, "no free block large enough");
      return Err(AllocError::OutOfMemory { requested: size });
    };

    let leftover = candidate.size() - rounded;

    if leftover >= MIN_SPLIT {
      // SAFETY: the tail starts `rounded` bytes into the candidate's payload,
      // on a 4-byte boundary, and `leftover` bytes remain after that point.
      let tail = unsafe {
        Block::write(
          candidate.payload().add(rounded),
          leftover - HEADER_SIZE,
          BlockStatus::Free,
          candidate.next(),
        )
      };
      candidate.set_next(Some(tail));
      candidate.set(rounded, BlockStatus::Busy);

      debug!(block = candidate.addr(), size = rounded, tail = tail.addr(), "split block");
    } else {
      candidate.set_status(BlockStatus::Busy);
    }

    trace!(requested = size, payload = ?candidate.payload(), size = candidate.size(), "allocated");

    Ok(candidate.payload())
  }

  /// Returns a payload obtained from [`allocate`](Self::allocate) to the arena.
  pub fn release(
    &mut self,
    ptr: *mut u8,
  ) -> Result<(), AllocError> {
    let addr = ptr as usize;

    let Some(region) = self.region.as_ref() else {
      return Err(AllocError::NotInitialized);
    };
    let Some(ptr) = NonNull::new(ptr) else {
      return Err(AllocError::InvalidPointer { addr });
    };
    if !region.contains(addr) {
      return Err(AllocError::InvalidPointer { addr });
    }

    let mut prev: Option<Block> = None;
    let mut found: Option<Block> = None;

    for block in self.chain() {
      if block.payload() == ptr {
        found = Some(block);
        break;
      }
      prev = Some(block);
    }

    let Some(block) = found else {
      return Err(AllocError::InvalidPointer { addr });
    };

    if block.is_free() {
      warn!(addr, "double release rejected");
      return Err(AllocError::DoubleRelease { addr });
    }

    block.set_status(BlockStatus::Free);

    // Right first, so the left neighbour absorbs the merged size once.
    if let Some(right) = block.next().filter(|next| next.is_free()) {
      block.set(block.size() + right.total_size(), BlockStatus::Free);
      block.set_next(right.next());

      debug!(block = block.addr(), absorbed = right.addr(), "coalesced right");
    }

    if let Some(left) = prev.filter(|prev| prev.is_free()) {
      left.set(left.size() + block.total_size(), BlockStatus::Free);
      left.set_next(block.next());

      debug!(block = left.addr(), absorbed = block.addr(), "coalesced left");
    }

    trace!(addr, "released");

    Ok(())
  }

  /// Snapshot of every block. Never mutates the chain.
  pub fn dump(&self) -> Dump {
    self
      .chain()
      .enumerate()
      .map(|(i, block)| {
        let begin = block.payload().as_ptr() as usize;

        BlockReport {
          index: i + 1,
          status: block.status(),
          begin,
          end: begin + block.size().saturating_sub(1),
          size: block.size(),
          total_size: block.total_size(),
          header: block.addr(),
        }
      })
      .collect()
  }
}

impl Default for BestFitAllocator {
  fn default() -> Self {
    Self::new()
  }
}
