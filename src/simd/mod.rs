//! Lane-parallel reductions for the vectorized kernel.
//!
//! Three backends implement [`SimdReduce`](traits::SimdReduce):
//!
//! | Backend  | Register   | Lanes | Compiled when                      |
//! |----------|------------|-------|------------------------------------|
//! | AVX2+FMA | `__m256d`  | 4     | `cfg(avx2)` on x86_64              |
//! | NEON     | `float64x2_t` | 2  | `cfg(neon)` on aarch64             |
//! | Portable | `[f64; 4]` | 4     | always                             |
//!
//! The `cfg` flags come from `build.rs`. [`SimdBackend::detect`] picks the best
//! backend that is both compiled in and supported by the running CPU.

#[cfg(all(avx2, target_arch = "x86_64"))]
pub mod avx2;

#[cfg(all(neon, target_arch = "aarch64"))]
pub mod neon;

pub mod fallback;
pub mod slice;
pub mod traits;

use std::fmt;

pub use slice::scalar_dot;

#[cfg(all(avx2, target_arch = "x86_64"))]
const AVX2_LANES: usize = avx2::f64x4::LANE_COUNT;
#[cfg(not(all(avx2, target_arch = "x86_64")))]
const AVX2_LANES: usize = 4;

#[cfg(all(neon, target_arch = "aarch64"))]
const NEON_LANES: usize = neon::f64x2::LANE_COUNT;
#[cfg(not(all(neon, target_arch = "aarch64")))]
const NEON_LANES: usize = 2;

/// The reduction backend chosen for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdBackend {
    Avx2,
    Neon,
    Portable,
}

impl SimdBackend {
    /// Best backend available on this CPU.
    #[allow(unreachable_code)]
    pub fn detect() -> Self {
        #[cfg(all(avx2, target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return SimdBackend::Avx2;
            }
            tracing::warn!("built with AVX2 support but the running CPU lacks AVX2/FMA");
        }

        #[cfg(all(neon, target_arch = "aarch64"))]
        {
            return SimdBackend::Neon;
        }

        SimdBackend::Portable
    }

    /// Number of partial sums accumulated in parallel.
    pub fn lanes(self) -> usize {
        match self {
            SimdBackend::Avx2 => AVX2_LANES,
            SimdBackend::Neon => NEON_LANES,
            SimdBackend::Portable => fallback::LANE_COUNT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SimdBackend::Avx2 => "avx2+fma",
            SimdBackend::Neon => "neon",
            SimdBackend::Portable => "portable",
        }
    }

    /// Dot product of two equal-length slices on this backend.
    ///
    /// A backend that is not compiled in, or not supported by the running CPU,
    /// falls back to the portable lanes.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    #[inline]
    pub fn dot(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            #[cfg(all(avx2, target_arch = "x86_64"))]
            // SAFETY: guarded by the run-time feature check (a cached atomic load).
            SimdBackend::Avx2
                if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") =>
            unsafe { avx2::dot(a, b) },
            #[cfg(all(neon, target_arch = "aarch64"))]
            // SAFETY: NEON is part of the aarch64 baseline.
            SimdBackend::Neon => unsafe { neon::dot(a, b) },
            // SAFETY: the portable backend uses no special instructions.
            _ => unsafe { slice::dot_lanes::<fallback::PortableF64x4>(a, b) },
        }
    }
}

impl fmt::Display for SimdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
