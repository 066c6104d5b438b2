use std::{mem, ptr::NonNull};

use crate::align::PAYLOAD_ALIGN;

/// Low bit of `size_and_tag`, set while a block is handed out.
const BUSY_TAG: usize = 1;

/// Allocation status of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockStatus {
  Free,
  Busy,
}

impl BlockStatus {
  fn from_tagged(
    size_and_tag: usize,
  ) -> Self {
    if size_and_tag & BUSY_TAG == 0 {
      Self::Free
    } else {
      Self::Busy
    }
  }

  fn tag(self) -> usize {
    match self {
      Self::Free => 0,
      Self::Busy => BUSY_TAG,
    }
  }
}

/// In-arena block header. Headers sit on 4-byte boundaries, hence the packing.
#[repr(C, packed(4))]
pub(crate) struct BlockHeader {
  next: *mut BlockHeader,
  size_and_tag: usize,
}

/// Bytes between the start of a block and the start of its payload.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

const _: () = assert!(HEADER_SIZE % PAYLOAD_ALIGN == 0);

/// Handle to a header living inside the arena.
///
/// A `Block` can only be obtained through [`Block::write`] or by following
/// the `next` link of another block, so every handle points at a header
/// the owning allocator wrote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Block(NonNull<BlockHeader>);

impl Block {
  /// Writes a fresh header at `at` and returns a handle to it.
  ///
  /// # Safety
  ///
  /// `at` must be 4-byte aligned and followed by at least
  /// `HEADER_SIZE + size` bytes of writable memory owned by the arena.
  pub(crate) unsafe fn write(
    at: NonNull<u8>,
    size: usize,
    status: BlockStatus,
    next: Option<Block>,
  ) -> Self {
    debug_assert_eq!(at.as_ptr() as usize % PAYLOAD_ALIGN, 0);
    debug_assert_eq!(size % PAYLOAD_ALIGN, 0);

    let header = at.cast::<BlockHeader>();
    unsafe {
      (*header.as_ptr()).next = next.map_or(std::ptr::null_mut(), |block| block.0.as_ptr());
      (*header.as_ptr()).size_and_tag = size | status.tag();
    }

    Self(header)
  }

  fn size_and_tag(self) -> usize {
    unsafe { (*self.0.as_ptr()).size_and_tag }
  }

  pub(crate) fn next(self) -> Option<Block> {
    NonNull::new(unsafe { (*self.0.as_ptr()).next }).map(Block)
  }

  pub(crate) fn set_next(
    self,
    next: Option<Block>,
  ) {
    unsafe {
      (*self.0.as_ptr()).next = next.map_or(std::ptr::null_mut(), |block| block.0.as_ptr());
    }
  }

  /// Payload size with the status tag masked off.
  pub(crate) fn size(self) -> usize {
    self.size_and_tag() & !BUSY_TAG
  }

  pub(crate) fn status(self) -> BlockStatus {
    BlockStatus::from_tagged(self.size_and_tag())
  }

  pub(crate) fn is_free(self) -> bool {
    self.status() == BlockStatus::Free
  }

  pub(crate) fn set(
    self,
    size: usize,
    status: BlockStatus,
  ) {
    debug_assert_eq!(size % PAYLOAD_ALIGN, 0);
    unsafe {
      (*self.0.as_ptr()).size_and_tag = size | status.tag();
    }
  }

  pub(crate) fn set_status(
    self,
    status: BlockStatus,
  ) {
    self.set(self.size(), status);
  }

  /// Header plus payload.
  pub(crate) fn total_size(self) -> usize {
    HEADER_SIZE + self.size()
  }

  pub(crate) fn addr(self) -> usize {
    self.0.as_ptr() as usize
  }

  /// First payload byte, always exactly `HEADER_SIZE` past the header.
  pub(crate) fn payload(self) -> NonNull<u8> {
    unsafe { self.0.cast::<u8>().add(HEADER_SIZE) }
  }
}

/// Walks a block chain in address order.
pub(crate) struct Chain {
  next: Option<Block>,
}

impl Chain {
  pub(crate) fn new(
    head: Option<Block>,
  ) -> Self {
    Self { next: head }
  }
}

impl Iterator for Chain {
  type Item = Block;

  fn next(&mut self) -> Option<Block> {
    let current = self.next?;
    self.next = current.next();
    Some(current)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[repr(C, align(8))]
  struct Scratch([u8; 128]);

  fn base(
    scratch: &mut Scratch,
  ) -> NonNull<u8> {
    NonNull::new(scratch.0.as_mut_ptr()).unwrap()
  }

  #[test]
  fn test_status_round_trips_through_tag() {
    let mut scratch = Scratch([0; 128]);

    unsafe {
      let block = Block::write(base(&mut scratch), 24, BlockStatus::Busy, None);

      assert_eq!(block.size(), 24);
      assert_eq!(block.status(), BlockStatus::Busy);
      assert_eq!(block.size_and_tag(), 25);

      block.set_status(BlockStatus::Free);

      assert_eq!(block.size(), 24);
      assert!(block.is_free());
      assert_eq!(block.size_and_tag(), 24);
    }
  }

  #[test]
  fn test_payload_is_one_header_past_block() {
    let mut scratch = Scratch([0; 128]);

    unsafe {
      let block = Block::write(base(&mut scratch), 32, BlockStatus::Free, None);

      assert_eq!(block.payload().as_ptr() as usize, block.addr() + HEADER_SIZE);
      assert_eq!(block.total_size(), HEADER_SIZE + 32);
    }
  }

  #[test]
  fn test_headers_on_four_byte_boundaries() {
    let mut scratch = Scratch([0; 128]);

    let base = base(&mut scratch);

    unsafe {
      let second = Block::write(base.add(44), 8, BlockStatus::Busy, None);
      let first = Block::write(base.add(4), 20, BlockStatus::Free, Some(second));

      assert_eq!(first.next(), Some(second));
      assert_eq!(second.size(), 8);
      assert_eq!(second.next(), None);

      let walked: Vec<usize> = Chain::new(Some(first)).map(Block::size).collect();
      assert_eq!(walked, vec![20, 8]);

      first.set_next(None);
      assert_eq!(Chain::new(Some(first)).count(), 1);
    }
  }
}
