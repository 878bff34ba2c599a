//! Portable lane array used when no vector instruction set was detected.
//!
//! Four independent accumulators keep the same reduction shape as the AVX2
//! backend, and the compiler is free to map them onto whatever vector unit the
//! target has.

use super::traits::SimdReduce;

pub(crate) const LANE_COUNT: usize = 4;

#[derive(Copy, Clone, Debug)]
pub struct PortableF64x4 {
    pub elements: [f64; LANE_COUNT],
}

impl SimdReduce for PortableF64x4 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        PortableF64x4 {
            elements: [0.0; LANE_COUNT],
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> Self {
        PortableF64x4 {
            elements: std::ptr::read_unaligned(ptr as *const [f64; LANE_COUNT]),
        }
    }

    #[inline(always)]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        let mut elements = self.elements;
        for l in 0..LANE_COUNT {
            elements[l] += a.elements[l] * b.elements[l];
        }
        PortableF64x4 { elements }
    }

    #[inline(always)]
    unsafe fn horizontal_sum(self) -> f64 {
        let [e0, e1, e2, e3] = self.elements;
        (e0 + e1) + (e2 + e3)
    }
}
