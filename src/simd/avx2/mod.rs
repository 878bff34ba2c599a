//! AVX2 SIMD implementations for 256-bit vector operations.
//!
//! This module is only compiled when the build script detected AVX2 and FMA on
//! the host (`cfg(avx2)`) and the target is x86_64. The running CPU is checked
//! again with `is_x86_feature_detected!` before [`dot`] is called, see
//! [`SimdBackend::detect`](crate::simd::SimdBackend::detect).
//!
//! # Performance Characteristics
//!
//! - **Vector Width**: 256 bits (4 × f64)
//! - **Memory Alignment**: matrix rows are 32-byte aligned when `n % 4 == 0`;
//!   unaligned loads are used so any row offset is valid

pub mod f64x4;

use crate::simd::slice::dot_lanes;
use f64x4::F64x4;

/// AVX2 + FMA dot product.
///
/// # Safety
///
/// The CPU must support AVX2 and FMA.
#[target_feature(enable = "avx2,fma")]
pub unsafe fn dot(a: &[f64], b: &[f64]) -> f64 {
    dot_lanes::<F64x4>(a, b)
}
