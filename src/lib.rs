//! # bestfit - A Best-Fit Arena Allocator
//!
//! This crate provides a **best-fit allocator** that manages one fixed region of
//! memory, mapped once from the operating system with `mmap(2)`, and serves
//! every allocation and release from that region without going back to the OS.
//!
//! ## Overview
//!
//! The arena is always covered, end to end, by a chain of blocks kept in
//! address order. Each block is a small header followed by its payload:
//!
//! ```text
//!   Arena Layout:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA                                   │
//!   │                                                                      │
//!   │   ┌───┬──────┬───┬───────────┬───┬────┬───┬──────────────────────┐   │
//!   │   │ H │ Busy │ H │   Free    │ H │Busy│ H │        Free          │   │
//!   │   └───┴──────┴───┴───────────┴───┴────┴───┴──────────────────────┘   │
//!   │   ▲ │        ▲ │             ▲ │        ▲                            │
//!   │   │ └────────┘ └─────────────┘ └────────┘        next links          │
//!   │  base                                                                │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   No gaps, no overlaps, never two free blocks side by side.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   bestfit
//!   ├── align      - Checked round-up helpers
//!   ├── block      - In-arena block header (internal)
//!   ├── best_fit   - BestFitAllocator implementation
//!   ├── config     - ArenaConfig
//!   ├── dump       - Read-only block list report
//!   ├── error      - AllocError
//!   ├── global     - Process-wide allocator
//!   └── region     - Backing region acquisition
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use bestfit::BestFitAllocator;
//!
//! let mut allocator = BestFitAllocator::new();
//! allocator.initialize(4096).unwrap();
//!
//! let ptr = allocator.allocate(24).unwrap();
//!
//! unsafe {
//!     ptr.as_ptr().write_bytes(0x2A, 24);
//! }
//!
//! allocator.release(ptr.as_ptr()).unwrap();
//! println!("{}", allocator.dump());
//! ```
//!
//! ## How It Works
//!
//! Allocation rounds the request up to a multiple of 4 and scans the whole
//! chain for the smallest free block that fits. An exact fit ends the scan.
//! When the chosen block has room to spare for another header plus 4 bytes,
//! the tail is carved off as a new free block:
//!
//! ```text
//!   Split:
//!
//!   Before  ┌───┬─────────────────────────────────────────┐
//!           │ H │                 Free                    │
//!           └───┴─────────────────────────────────────────┘
//!
//!   After   ┌───┬───────────┬───┬─────────────────────────┐
//!           │ H │   Busy    │ H │          Free           │
//!           └───┴───────────┴───┴─────────────────────────┘
//!               ▲
//!               └── Pointer returned to user
//! ```
//!
//! Release marks the block free and merges it with a free right neighbour,
//! then with a free left neighbour:
//!
//! ```text
//!   Coalesce:
//!
//!   Before  ┌───┬────────┬───┬────────┬───┬────────┐
//!           │ H │  Free  │ H │ Busy→  │ H │  Free  │
//!           └───┴────────┴───┴────────┴───┴────────┘
//!
//!   After   ┌───┬────────────────────────────────────┐
//!           │ H │               Free                 │
//!           └───┴────────────────────────────────────┘
//! ```
//!
//! Each header packs the payload size and a busy bit into one word:
//!
//! ```text
//!   Block Header:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ next: ptr/null  │  │  ┌──────────────────────────┐  │
//!   │  │ size | busy bit │  │  │   size bytes (x4)        │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   │      16 bytes         │                                │
//!   └───────────────────────┴────────────────────────────────┘
//! ```
//!
//! ## Limitations
//!
//! - **Fixed arena**: never grows, shrinks or goes back to the OS
//! - **Linear search**: allocate and release walk the chain
//! - **4-byte alignment**: payloads are not aligned beyond that
//! - **Unix-only**: requires `libc` and `mmap`
//!
//! ## Safety
//!
//! Payload pointers are plain addresses into the arena. Reading or writing
//! through them, and keeping them alive across a release, is up to the
//! caller.

pub mod align;
mod best_fit;
mod block;
pub mod config;
pub mod dump;
pub mod error;
pub mod global;
pub mod region;

pub use best_fit::BestFitAllocator;
pub use block::{BlockStatus, HEADER_SIZE};
pub use config::ArenaConfig;
pub use dump::{BlockReport, Dump};
pub use error::AllocError;
pub use region::{Backing, Region, RegionSource, page_size};
