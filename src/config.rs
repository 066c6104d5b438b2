//! Arena configuration.

use crate::region::Backing;

/// What to ask the operating system for when the allocator is initialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
  /// Requested arena size in bytes, rounded up to whole pages on initialize.
  pub region_size: usize,

  /// How the pages are mapped.
  pub backing: Backing,
}

impl ArenaConfig {
  /// One 4 KiB page.
  pub const DEFAULT_REGION_SIZE: usize = 4096;

  /// Config for `region_size` bytes of anonymous memory.
  pub fn new(
    region_size: usize,
  ) -> Self {
    Self {
      region_size,
      backing: Backing::default(),
    }
  }

  pub fn with_backing(
    mut self,
    backing: Backing,
  ) -> Self {
    self.backing = backing;
    self
  }
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::new(Self::DEFAULT_REGION_SIZE)
  }
}
