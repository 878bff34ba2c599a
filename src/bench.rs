//! Micro-benchmark harness.
//!
//! Each run allocates fresh operands, fills them, times exactly one kernel call
//! with the monotonic clock and drops the operands before returning, so one
//! kernel's in-place update of C can never leak into the next run.

use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

use crate::error::Result;
use crate::gemm::{Gemm, Kernel};
use crate::matrix::Matrix;

/// How the operands are initialised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    /// Every element of A, B and C set to the same value.
    ///
    /// With `Constant(1.0)` every output element equals `n * alpha + beta`.
    Constant(f64),
    /// A, B, then C drawn uniformly from `[-1, 1)` by one `StdRng` seeded with `seed`.
    Random { seed: u64 },
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Constant(1.0)
    }
}

/// Scalars and fill policy for one GEMM invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemmParams {
    pub alpha: f64,
    pub beta: f64,
    pub fill: Fill,
}

impl Default for GemmParams {
    fn default() -> Self {
        GemmParams {
            alpha: 1.0,
            beta: 1.0,
            fill: Fill::default(),
        }
    }
}

/// The three operands of one run, owned together.
#[derive(Debug)]
pub struct Operands {
    pub a: Matrix,
    pub b: Matrix,
    pub c: Matrix,
}

impl Operands {
    /// Allocates and fills A, B and C. Any allocation failure releases the
    /// matrices allocated so far and returns the error.
    pub fn try_new(n: usize, fill: Fill) -> Result<Self> {
        match fill {
            Fill::Constant(value) => Ok(Operands {
                a: Matrix::try_filled(n, value)?,
                b: Matrix::try_filled(n, value)?,
                c: Matrix::try_filled(n, value)?,
            }),
            Fill::Random { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                Ok(Operands {
                    a: Matrix::try_random(n, &mut rng)?,
                    b: Matrix::try_random(n, &mut rng)?,
                    c: Matrix::try_random(n, &mut rng)?,
                })
            }
        }
    }

    /// Runs `kernel` once, updating `c` in place.
    pub fn run(&mut self, gemm: &Gemm, kernel: Kernel, alpha: f64, beta: f64) -> Result<()> {
        gemm.run(kernel, &mut self.c, &self.a, &self.b, alpha, beta)
    }
}

/// Timing of one kernel invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    pub kernel: Kernel,
    pub n: usize,
    pub start: Instant,
    pub end: Instant,
}

impl BenchReport {
    pub fn label(&self) -> &'static str {
        self.kernel.label()
    }

    /// Wall time between the two timestamps.
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Throughput counting `2 * n³` floating-point operations. Zero when no
    /// measurable time elapsed.
    pub fn gflops(&self) -> f64 {
        let secs = self.seconds();
        if secs == 0.0 {
            return 0.0;
        }
        let n = self.n as f64;
        2.0 * n * n * n / secs / 1e9
    }
}

/// `"<label>: <seconds> seconds"` with six decimals.
impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.6} seconds", self.label(), self.seconds())
    }
}

/// Times one invocation of `kernel` on fresh `n x n` operands.
pub fn run_benchmark(
    gemm: &Gemm,
    kernel: Kernel,
    n: usize,
    params: &GemmParams,
) -> Result<BenchReport> {
    let mut operands = Operands::try_new(n, params.fill)?;
    debug!(kernel = kernel.label(), n, "benchmark run starting");

    let start = Instant::now();
    operands.run(gemm, kernel, params.alpha, params.beta)?;
    let end = Instant::now();

    drop(operands);

    let report = BenchReport {
        kernel,
        n,
        start,
        end,
    };
    debug!(
        kernel = report.label(),
        n,
        seconds = report.seconds(),
        gflops = report.gflops(),
        "benchmark run finished"
    );
    Ok(report)
}

/// Runs every kernel in [`Kernel::ALL`] order, each on its own fresh
/// operands, writing one report line per kernel to `out`.
///
/// Stops at the first failing run; the lines already written stay written.
pub fn run_all<W: Write>(
    gemm: &Gemm,
    n: usize,
    params: &GemmParams,
    out: &mut W,
) -> Result<Vec<BenchReport>> {
    let mut reports = Vec::with_capacity(Kernel::ALL.len());
    for kernel in Kernel::ALL {
        let report = run_benchmark(gemm, kernel, n, params)?;
        writeln!(out, "{report}")?;
        reports.push(report);
    }
    Ok(reports)
}
