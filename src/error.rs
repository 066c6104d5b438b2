//! Allocator error types.

use std::io;

use thiserror::Error;

/// Errors returned by the allocator. None of them leaves the block chain in
/// a different state than before the failing call.
#[derive(Debug, Error)]
pub enum AllocError {
  /// The allocator already owns an arena.
  #[error("allocator has already been initialized")]
  AlreadyInitialized,

  /// The region size is zero, or rounding it to whole pages overflows.
  #[error("invalid region size {size}")]
  InvalidRegionSize { size: usize },

  /// The operating system could not supply the arena.
  #[error("cannot acquire a {len}-byte region: {source}")]
  RegionAcquisitionFailed {
    len: usize,
    #[source]
    source: io::Error,
  },

  /// Allocate or release was called before a successful initialize.
  #[error("allocator has not been initialized")]
  NotInitialized,

  /// Allocate was asked for zero bytes.
  #[error("requested size must be positive")]
  InvalidRequestSize,

  /// No free block can hold the request.
  #[error("out of memory: no free block can hold {requested} bytes")]
  OutOfMemory { requested: usize },

  /// The pointer is null or is not the payload start of any block.
  #[error("{addr:#x} is not the payload of any block")]
  InvalidPointer { addr: usize },

  /// The pointer's block is already free.
  #[error("{addr:#x} has already been released")]
  DoubleRelease { addr: usize },
}
