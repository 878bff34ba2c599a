use tracing::trace;

use crate::error::Result;
use crate::gemm::check_operands;
use crate::matrix::{at, Matrix};

/// Naive GEMM using i-j-k loop order.
///
/// This is the textbook triple loop. The innermost loop walks B with stride
/// `n` (column-wise), which costs a cache miss per iteration once a column no
/// longer fits in cache. It is the reference the other kernels are checked
/// against.
///
/// Computes `C[i, j] = alpha * sum_k A[i, k] * B[k, j] + beta * C[i, j]`.
pub fn gemm_naive(c: &mut Matrix, a: &Matrix, b: &Matrix, alpha: f64, beta: f64) -> Result<()> {
    let n = check_operands(c, a, b)?;
    trace!(n, "naive gemm");

    let (a, b, c) = (a.as_slice(), b.as_slice(), c.as_mut_slice());
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[at(i, k, n)] * b[at(k, j, n)];
            }
            c[at(i, j, n)] = alpha * sum + beta * c[at(i, j, n)];
        }
    }
    Ok(())
}
