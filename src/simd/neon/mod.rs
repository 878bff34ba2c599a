//! ARM NEON SIMD implementations for 128-bit vector operations.
//!
//! NEON is mandatory on AArch64, so the build script sets `cfg(neon)` for
//! every aarch64 target and no run-time check is needed.
//!
//! # Performance Characteristics
//!
//! - **Vector Width**: 128 bits (2 × f64)
//! - **Memory Alignment**: 16-byte alignment is implied by the 32-byte matrix buffers

pub mod f64x2;

use crate::simd::slice::dot_lanes;
use f64x2::F64x2;

/// NEON dot product.
///
/// # Safety
///
/// The target must be aarch64 (NEON is always present there).
#[inline]
pub unsafe fn dot(a: &[f64], b: &[f64]) -> f64 {
    dot_lanes::<F64x2>(a, b)
}
