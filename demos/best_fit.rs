use std::ptr;

use bestfit::{AllocError, BestFitAllocator};
use tracing_subscriber::EnvFilter;

/// Prints the block list so each step's effect on the chain is visible.
fn print_blocks(
  label: &str,
  allocator: &BestFitAllocator,
) {
  println!("\n[{label}]");
  print!("{}", allocator.dump());
}

fn main() -> Result<(), AllocError> {
  // RUST_LOG=bestfit=debug shows splits and merges as they happen.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let mut allocator = BestFitAllocator::new();

  // --------------------------------------------------------------------
  // 1) Map one page. The whole arena starts out as a single free block.
  // --------------------------------------------------------------------
  allocator.initialize(4096)?;
  print_blocks("1: initialized", &allocator);

  // --------------------------------------------------------------------
  // 2) Small allocations, each split off the front of the free tail.
  //    13 bytes is rounded up to 16. The last one keeps the third block
  //    from merging into the tail once it is released.
  // --------------------------------------------------------------------
  let first = allocator.allocate(40)?;
  let second = allocator.allocate(13)?;
  let third = allocator.allocate(48)?;
  let fence = allocator.allocate(4)?;

  unsafe {
    ptr::write_bytes(first.as_ptr(), 0xAB, 40);
    second.as_ptr().cast::<u32>().write_unaligned(0xDEADBEEF);
    println!(
      "\n[2] second block holds 0x{:X}",
      second.as_ptr().cast::<u32>().read_unaligned()
    );
  }
  print_blocks("2: four allocations", &allocator);

  // --------------------------------------------------------------------
  // 3) Free the first and third blocks: two holes, 40 and 48 bytes.
  // --------------------------------------------------------------------
  allocator.release(first.as_ptr())?;
  allocator.release(third.as_ptr())?;
  print_blocks("3: holes at 40 and 48 bytes", &allocator);

  // --------------------------------------------------------------------
  // 4) Ask for 32 bytes. Best fit picks the 40-byte hole; the 8 spare
  //    bytes are too small for a header and stay inside the block.
  // --------------------------------------------------------------------
  let fourth = allocator.allocate(32)?;
  println!("\n[4] reused the first hole? {}", fourth == first);
  print_blocks("4: best fit", &allocator);

  // --------------------------------------------------------------------
  // 5) Bad releases are rejected without touching the chain.
  // --------------------------------------------------------------------
  if let Err(err) = allocator.release(third.as_ptr()) {
    println!("\n[5] {err}");
  }
  if let Err(err) = allocator.release(unsafe { second.as_ptr().add(1) }) {
    println!("[5] {err}");
  }

  // --------------------------------------------------------------------
  // 6) Release everything: the merges leave one free block again.
  // --------------------------------------------------------------------
  allocator.release(second.as_ptr())?;
  allocator.release(fourth.as_ptr())?;
  allocator.release(fence.as_ptr())?;
  print_blocks("6: everything released", &allocator);

  Ok(())
}
