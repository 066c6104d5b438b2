//! Read-only snapshot of the block chain.

use std::fmt;

use crate::block::BlockStatus;

/// One block as seen by [`Dump`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockReport {
  /// Position in the chain, starting at 1.
  pub index: usize,
  pub status: BlockStatus,
  /// Address of the first payload byte.
  pub begin: usize,
  /// Address of the last payload byte.
  pub end: usize,
  /// Payload size, excluding the header.
  pub size: usize,
  /// Header plus payload.
  pub total_size: usize,
  /// Address of the header, i.e. where the block starts.
  pub header: usize,
}

/// Every block of the arena in address order, with byte totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dump {
  pub blocks: Vec<BlockReport>,
  /// Header plus payload bytes of busy blocks.
  pub busy_bytes: usize,
  /// Header plus payload bytes of free blocks.
  pub free_bytes: usize,
}

impl Dump {
  pub fn total_bytes(&self) -> usize {
    self.busy_bytes + self.free_bytes
  }

  pub fn free_blocks(&self) -> impl Iterator<Item = &BlockReport> {
    self.blocks.iter().filter(|block| block.status == BlockStatus::Free)
  }

  pub fn busy_blocks(&self) -> impl Iterator<Item = &BlockReport> {
    self.blocks.iter().filter(|block| block.status == BlockStatus::Busy)
  }
}

impl FromIterator<BlockReport> for Dump {
  fn from_iter<I: IntoIterator<Item = BlockReport>>(
    iter: I,
  ) -> Self {
    let mut dump = Dump::default();

    for block in iter {
      match block.status {
        BlockStatus::Busy => dump.busy_bytes += block.total_size,
        BlockStatus::Free => dump.free_bytes += block.total_size,
      }
      dump.blocks.push(block);
    }

    dump
  }
}

const RULE: &str = "---------------------------------------------------------------------------------";
const STARS: &str = "*********************************************************************************";

impl fmt::Display for Dump {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "************************************Block list***********************************")?;
    writeln!(f, "No.\tStatus\tBegin\t\tEnd\t\tSize\tt_Size\tt_Begin")?;
    writeln!(f, "{RULE}")?;

    for block in &self.blocks {
      let status = match block.status {
        BlockStatus::Free => "Free",
        BlockStatus::Busy => "Busy",
      };
      writeln!(
        f,
        "{}\t{}\t{:#010x}\t{:#010x}\t{}\t{}\t{:#010x}",
        block.index, status, block.begin, block.end, block.size, block.total_size, block.header
      )?;
    }

    writeln!(f, "{RULE}")?;
    writeln!(f, "{STARS}")?;
    writeln!(f, "Total busy size = {}", self.busy_bytes)?;
    writeln!(f, "Total free size = {}", self.free_bytes)?;
    writeln!(f, "Total size = {}", self.total_bytes())?;
    writeln!(f, "{STARS}")
  }
}
