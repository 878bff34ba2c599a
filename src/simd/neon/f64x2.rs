use std::arch::aarch64::*;

use crate::simd::traits::SimdReduce;

/// Number of f64 elements that fit in a NEON 128-bit vector.
pub(crate) const LANE_COUNT: usize = 2;

/// NEON SIMD vector containing 2 packed f64 values.
#[derive(Copy, Clone, Debug)]
pub struct F64x2 {
    pub elements: float64x2_t,
}

impl SimdReduce for F64x2 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F64x2 {
            elements: vdupq_n_f64(0.0),
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> Self {
        F64x2 {
            elements: vld1q_f64(ptr),
        }
    }

    #[inline(always)]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        F64x2 {
            elements: vfmaq_f64(self.elements, a.elements, b.elements),
        }
    }

    #[inline(always)]
    unsafe fn horizontal_sum(self) -> f64 {
        vaddvq_f64(self.elements)
    }
}
