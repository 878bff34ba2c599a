//! Square dense `f64` matrix multiply, `C := alpha * A * B + beta * C`, in four
//! strategies (naive, transposed, parallel, parallel SIMD) plus the harness
//! that times them.
//!
//! ```
//! use gemmly::{Gemm, Kernel, Matrix};
//!
//! let gemm = Gemm::new(2)?;
//! let a = Matrix::try_filled(3, 1.0)?;
//! let b = Matrix::try_filled(3, 1.0)?;
//! let mut c = Matrix::try_filled(3, 1.0)?;
//!
//! gemm.run(Kernel::ParallelSimd, &mut c, &a, &b, 2.0, 0.5)?;
//! assert!(c.as_slice().iter().all(|&x| x == 6.5));
//! # Ok::<(), gemmly::GemmError>(())
//! ```

pub mod bench;
pub mod cli;
pub mod error;
pub mod gemm;
pub mod matrix;
pub mod simd;
pub mod transpose;
pub mod utils;

pub use bench::{run_all, run_benchmark, BenchReport, Fill, GemmParams, Operands};
pub use error::{GemmError, Result};
pub use gemm::{Gemm, Kernel};
pub use matrix::Matrix;
pub use transpose::transpose;
