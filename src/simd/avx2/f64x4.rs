//! AVX2 4-lane f64 register.
//!
//! `F64x4` wraps `__m256d` and implements [`SimdReduce`] with unaligned loads,
//! fused multiply-add accumulation and a 128-bit split horizontal sum.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: AVX2 and FMA (Intel Haswell / AMD Excavator and later)
//! - **Target Architecture**: x86_64
//! - **Dispatch**: only reached after `is_x86_feature_detected!` succeeds

use std::arch::x86_64::*;

use crate::simd::traits::SimdReduce;

/// Number of f64 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 4;

/// AVX2 SIMD vector containing 4 packed f64 values.
#[derive(Copy, Clone, Debug)]
pub struct F64x4 {
    pub elements: __m256d,
}

impl SimdReduce for F64x4 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F64x4 {
            elements: _mm256_setzero_pd(),
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> Self {
        F64x4 {
            elements: _mm256_loadu_pd(ptr),
        }
    }

    /// `self + a * b` with a single rounding per lane (`vfmadd231pd`).
    #[inline(always)]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        F64x4 {
            elements: _mm256_fmadd_pd(a.elements, b.elements, self.elements),
        }
    }

    /// Adds the high 128-bit half onto the low half, then the two remaining lanes.
    #[inline(always)]
    unsafe fn horizontal_sum(self) -> f64 {
        let low = _mm256_castpd256_pd128(self.elements);
        let high = _mm256_extractf128_pd::<1>(self.elements);
        let pair = _mm_add_pd(low, high);
        let swapped = _mm_unpackhi_pd(pair, pair);
        _mm_cvtsd_f64(_mm_add_sd(pair, swapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64x4_register_ops() {
        if !(is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")) {
            return;
        }

        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [0.5, 0.5, 2.0, -1.0];
        unsafe {
            let acc = F64x4::zero().mul_add(F64x4::load(a.as_ptr()), F64x4::load(b.as_ptr()));
            assert_eq!(acc.horizontal_sum(), 0.5 + 1.0 + 6.0 - 4.0);
        }
    }
}
