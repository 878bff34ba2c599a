use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{allocation_error, layout_error, Result};

/// Alignment of every matrix buffer, in bytes.
///
/// One AVX2 register holds 32 bytes (4 × f64), so rows of a matrix whose
/// dimension is a multiple of four start on a register boundary.
pub const BUFFER_ALIGNMENT: usize = 32;

/// A heap buffer of `f64` aligned to [`BUFFER_ALIGNMENT`].
///
/// Unlike `Vec<f64>`, construction never calls the global allocation error
/// handler: a failed allocation comes back as
/// [`GemmError::AllocationError`](crate::error::GemmError::AllocationError).
/// The memory is released exactly once, when the buffer is dropped.
///
/// # Memory Safety
///
/// - Uses `std::alloc::alloc_zeroed()` for allocation and `std::alloc::dealloc()`
///   for cleanup with the same `Layout`
/// - Every element is initialised (all-zero bits are `0.0f64`) before the
///   buffer is handed out, so the slice views never expose uninitialised memory
/// - Zero-length buffers use a dangling pointer and never touch the allocator
pub struct AlignedBuf {
    ptr: NonNull<f64>,
    len: usize,
    layout: Option<Layout>,
}

// SAFETY: `AlignedBuf` uniquely owns its allocation, exactly like `Vec<f64>`.
unsafe impl Send for AlignedBuf {}
// SAFETY: shared access only hands out `&[f64]`.
unsafe impl Sync for AlignedBuf {}

impl AlignedBuf {
    /// Allocates `len` zero-initialised elements.
    ///
    /// # Errors
    ///
    /// - `AllocationError` if `len * size_of::<f64>()` overflows or the
    ///   allocator returns null
    /// - `LayoutError` if the byte size exceeds `isize::MAX` once rounded up to
    ///   the alignment
    pub fn try_zeroed(len: usize) -> Result<Self> {
        if len == 0 {
            return Ok(AlignedBuf {
                ptr: NonNull::dangling(),
                len: 0,
                layout: None,
            });
        }

        let size = len.checked_mul(mem::size_of::<f64>()).ok_or_else(|| {
            allocation_error(
                usize::MAX,
                BUFFER_ALIGNMENT,
                format!("size of {len} f64 elements overflows usize"),
            )
        })?;

        let layout = Layout::from_size_align(size, BUFFER_ALIGNMENT)
            .map_err(|e| layout_error(size, BUFFER_ALIGNMENT, e.to_string()))?;

        #[cfg(test)]
        if alloc_track::should_fail() {
            return Err(allocation_error(
                size,
                BUFFER_ALIGNMENT,
                "allocation failure injected by test",
            ));
        }

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) } as *mut f64;

        let ptr = NonNull::new(raw).ok_or_else(|| {
            allocation_error(size, BUFFER_ALIGNMENT, "allocator returned null")
        })?;

        #[cfg(test)]
        alloc_track::record_alloc();

        Ok(AlignedBuf {
            ptr,
            len,
            layout: Some(layout),
        })
    }

    /// Allocates `len` elements, all set to `value`.
    pub fn try_filled(len: usize, value: f64) -> Result<Self> {
        let mut buf = Self::try_zeroed(len)?;
        // `alloc_zeroed` already produced +0.0 everywhere.
        if value.to_bits() != 0 {
            buf.fill(value);
        }
        Ok(buf)
    }

    /// Number of elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        if let Some(layout) = self.layout {
            // SAFETY: `ptr` was returned by `alloc_zeroed(layout)` and is freed once.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };

            #[cfg(test)]
            alloc_track::record_dealloc();
        }
    }
}

impl Deref for AlignedBuf {
    type Target = [f64];

    #[inline(always)]
    fn deref(&self) -> &[f64] {
        // SAFETY: `ptr` is valid for `len` initialised elements (or dangling with len 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuf {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [f64] {
        // SAFETY: as in `deref`, and `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl fmt::Debug for AlignedBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuf")
            .field("len", &self.len)
            .field("ptr", &self.ptr)
            .finish()
    }
}
