/// Every payload size, and therefore every block boundary, is a multiple of this.
pub const PAYLOAD_ALIGN: usize = 4;

/// Rounds `value` up to the next multiple of `align`, which must be a power of two.
///
/// Returns `None` when the rounded value does not fit in a `usize`.
///
/// # Examples
///
/// ```rust
/// use bestfit::align::align_up;
///
/// assert_eq!(align_up(13, 4), Some(16));
/// assert_eq!(align_up(16, 4), Some(16));
/// assert_eq!(align_up(1, 4096), Some(4096));
/// assert_eq!(align_up(usize::MAX, 4), None);
/// ```
pub const fn align_up(
  value: usize,
  align: usize,
) -> Option<usize> {
  debug_assert!(align.is_power_of_two());
  match value.checked_add(align - 1) {
    Some(bumped) => Some(bumped & !(align - 1)),
    None => None,
  }
}
