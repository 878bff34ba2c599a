/// A register of `LANES` packed `f64` values used for lane-parallel reductions.
///
/// Each backend (AVX2, NEON, portable) implements this for its register type;
/// [`dot_lanes`](super::slice::dot_lanes) is written once against it.
pub trait SimdReduce: Copy {
    /// Number of `f64` lanes in one register.
    const LANES: usize;

    /// A register with every lane set to `0.0`.
    ///
    /// # Safety
    ///
    /// The CPU must support the backend's instruction set.
    unsafe fn zero() -> Self;

    /// Loads `LANES` consecutive values starting at `ptr`. No alignment is required.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reading `LANES` values, and the CPU must support
    /// the backend's instruction set.
    unsafe fn load(ptr: *const f64) -> Self;

    /// Lane-wise `self + a * b`.
    ///
    /// # Safety
    ///
    /// The CPU must support the backend's instruction set.
    unsafe fn mul_add(self, a: Self, b: Self) -> Self;

    /// Sums all lanes into one scalar.
    ///
    /// # Safety
    ///
    /// The CPU must support the backend's instruction set.
    unsafe fn horizontal_sum(self) -> f64;
}
