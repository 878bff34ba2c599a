//! GEMM kernels: `C := alpha * A * B + beta * C` for square row-major matrices.
//!
//! Four strategies of increasing sophistication, all producing the same result
//! up to floating-point summation order:
//!
//! | [`Kernel`]               | B access          | Threads        | Reduction        |
//! |--------------------------|-------------------|----------------|------------------|
//! | `Naive`                  | strided (column)  | 1              | sequential       |
//! | `Transposed`             | contiguous (Bᵀ)   | 1              | sequential       |
//! | `Parallel`               | contiguous (Bᵀ)   | pool workers   | sequential       |
//! | `ParallelSimd`           | contiguous (Bᵀ)   | pool workers   | SIMD lanes       |
//!
//! [`Gemm`] owns the worker pool used by the parallel strategies and dispatches
//! any [`Kernel`] through one call signature.

pub mod naive;
pub mod parallel;
pub mod parallel_simd;
pub mod transposed;

use std::fmt;
use std::num::NonZeroUsize;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{invalid_argument, validation_error, GemmError, Result};
use crate::matrix::Matrix;

pub use naive::gemm_naive;
pub use parallel::{for_each_row_block, gemm_parallel, partition_rows};
pub use parallel_simd::gemm_parallel_simd;
pub use transposed::gemm_transposed;

/// The closed set of kernel strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Kernel {
    /// Triple loop walking B column-wise.
    Naive,
    /// Transpose B once, then walk both operands row-wise.
    Transposed,
    /// `Transposed` with the rows of C split across the worker pool.
    Parallel,
    /// `Parallel` with a SIMD lane reduction in the inner loop.
    ParallelSimd,
}

impl Kernel {
    /// Every strategy, in benchmark order.
    pub const ALL: [Kernel; 4] = [
        Kernel::Naive,
        Kernel::Transposed,
        Kernel::Parallel,
        Kernel::ParallelSimd,
    ];

    /// Label used in benchmark reports.
    pub fn label(self) -> &'static str {
        match self {
            Kernel::Naive => "Naive GEMM",
            Kernel::Transposed => "Transposed GEMM",
            Kernel::Parallel => "Parallel GEMM",
            Kernel::ParallelSimd => "Parallel SIMD GEMM",
        }
    }

    /// Whether the kernel runs on the context's worker pool.
    pub fn is_parallel(self) -> bool {
        matches!(self, Kernel::Parallel | Kernel::ParallelSimd)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Execution context for the kernels: a rayon pool with an explicit worker count.
///
/// The pool is built once and reused by every parallel call made through this
/// context. The sequential kernels never touch it.
pub struct Gemm {
    pool: ThreadPool,
    workers: usize,
}

impl Gemm {
    /// Builds a context with exactly `workers` pool threads.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `workers == 0`
    /// - `ThreadPoolError` if the operating system refuses to spawn the threads
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(invalid_argument("worker count must be at least 1"));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gemm-worker-{i}"))
            .build()
            .map_err(|e| GemmError::ThreadPoolError {
                message: e.to_string(),
            })?;

        debug!(workers, "built gemm worker pool");
        Ok(Gemm { pool, workers })
    }

    /// Builds a context sized to `std::thread::available_parallelism()`.
    pub fn with_available_parallelism() -> Result<Self> {
        Self::new(available_workers())
    }

    /// Number of workers the parallel kernels split rows across.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub(crate) fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    /// Computes `C := alpha * A * B + beta * C` with the chosen strategy.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if A, B and C do not share the same dimension
    /// - `AllocationError` if the transposed copy of B cannot be allocated
    ///   (C is left untouched in that case)
    pub fn run(
        &self,
        kernel: Kernel,
        c: &mut Matrix,
        a: &Matrix,
        b: &Matrix,
        alpha: f64,
        beta: f64,
    ) -> Result<()> {
        match kernel {
            Kernel::Naive => gemm_naive(c, a, b, alpha, beta),
            Kernel::Transposed => gemm_transposed(c, a, b, alpha, beta),
            Kernel::Parallel => gemm_parallel(self, c, a, b, alpha, beta),
            Kernel::ParallelSimd => gemm_parallel_simd(self, c, a, b, alpha, beta),
        }
    }
}

impl fmt::Debug for Gemm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemm").field("workers", &self.workers).finish()
    }
}

/// `std::thread::available_parallelism()`, or 1 when it cannot be determined.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Checks that A, B and C are all `n x n` for the same `n` and returns it.
pub(crate) fn check_operands(c: &Matrix, a: &Matrix, b: &Matrix) -> Result<usize> {
    let n = c.n();
    if a.n() != n || b.n() != n {
        return Err(validation_error(format!(
            "operand dimensions disagree: A is {0}x{0}, B is {1}x{1}, C is {2}x{2}",
            a.n(),
            b.n(),
            n
        )));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_labels_are_distinct() {
        let labels: Vec<_> = Kernel::ALL.iter().map(|k| k.label()).collect();
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(Kernel::ParallelSimd.to_string(), "Parallel SIMD GEMM");
    }

    #[test]
    fn test_kernel_command_line_names() {
        use clap::ValueEnum;

        let names: Vec<_> = Kernel::ALL
            .iter()
            .map(|k| k.to_possible_value().unwrap().get_name().to_string())
            .collect();
        assert_eq!(names, ["naive", "transposed", "parallel", "parallel-simd"]);
        assert_eq!(
            Kernel::from_str("parallel-simd", false).unwrap(),
            Kernel::ParallelSimd
        );
    }

    #[test]
    fn test_is_parallel() {
        assert!(!Kernel::Naive.is_parallel());
        assert!(!Kernel::Transposed.is_parallel());
        assert!(Kernel::Parallel.is_parallel());
        assert!(Kernel::ParallelSimd.is_parallel());
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let err = Gemm::new(0).unwrap_err();
        assert!(matches!(err, GemmError::InvalidArgument { .. }));
    }

    #[test]
    fn test_context_reports_workers() {
        let gemm = Gemm::new(3).unwrap();
        assert_eq!(gemm.workers(), 3);
        assert_eq!(gemm.pool().current_num_threads(), 3);
        assert!(Gemm::with_available_parallelism().unwrap().workers() >= 1);
    }

    #[test]
    fn test_mismatched_operands_are_rejected_by_every_kernel() {
        let gemm = Gemm::new(2).unwrap();
        let a = Matrix::try_filled(3, 1.0).unwrap();
        let b = Matrix::try_filled(4, 1.0).unwrap();
        let mut c = Matrix::try_filled(3, 1.0).unwrap();

        for kernel in Kernel::ALL {
            let err = gemm.run(kernel, &mut c, &a, &b, 1.0, 1.0).unwrap_err();
            assert!(matches!(err, GemmError::ValidationError { .. }), "{kernel}");
        }
        assert!(c.as_slice().iter().all(|&x| x == 1.0));
    }
}
