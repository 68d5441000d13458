//! Byte-level reads and writes of record fields.
//!
//! Every reinterpretation of record bytes as a number goes through the
//! functions in this module. Values use the platform's native byte order,
//! matching the packed records pagers and importers write.

use bytemuck::Pod;

/// The `len` bytes at `offset`.
///
/// # Panics
///
/// Panics if the range lies outside `data`.
#[inline]
pub(crate) fn field(data: &[u8], offset: usize, len: usize) -> &[u8] {
    &data[offset..offset + len]
}

/// Mutable form of [`field`].
#[inline]
pub(crate) fn field_mut(data: &mut [u8], offset: usize, len: usize) -> &mut [u8] {
    &mut data[offset..offset + len]
}

/// Read a `T` from the start of `bytes`, which need not be aligned.
///
/// # Panics
///
/// Panics if `bytes` is shorter than `T`.
#[inline]
pub(crate) fn read<T: Pod>(bytes: &[u8]) -> T {
    bytemuck::pod_read_unaligned(&bytes[..std::mem::size_of::<T>()])
}

/// Write `value` to the start of `bytes`.
///
/// # Panics
///
/// Panics if `bytes` is shorter than `T`.
#[inline]
pub(crate) fn write<T: Pod>(bytes: &mut [u8], value: T) {
    bytes[..std::mem::size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
}
