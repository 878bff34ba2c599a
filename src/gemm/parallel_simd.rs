use tracing::trace;

use crate::error::Result;
use crate::gemm::{check_operands, parallel::for_each_row_block, transposed::update_rows, Gemm};
use crate::matrix::Matrix;
use crate::simd::SimdBackend;
use crate::transpose::transpose;

/// Parallel transposed GEMM with a SIMD inner reduction.
///
/// Rows are distributed exactly as in [`gemm_parallel`](super::gemm_parallel).
/// Inside each `(i, j)` the `n` products `A[i, k] * Bt[j, k]` are accumulated
/// in the lanes of a vector register (4 on AVX2, 2 on NEON), the lanes are
/// summed horizontally, and the `n % lanes` tail is added before the
/// `alpha`/`beta` update. The products are the same as in the sequential
/// kernels; the order of the additions (and, on AVX2/NEON, the fused
/// multiply-add rounding) differs, so results agree with the naive kernel
/// within a tolerance rather than bit for bit.
pub fn gemm_parallel_simd(
    gemm: &Gemm,
    c: &mut Matrix,
    a: &Matrix,
    b: &Matrix,
    alpha: f64,
    beta: f64,
) -> Result<()> {
    let n = check_operands(c, a, b)?;
    if n == 0 {
        return Ok(());
    }

    let backend = SimdBackend::detect();
    trace!(
        n,
        workers = gemm.workers(),
        %backend,
        lanes = backend.lanes(),
        "parallel simd gemm"
    );

    let bt = transpose(b)?;
    let (a, bt) = (a.as_slice(), bt.as_slice());

    for_each_row_block(gemm, c.as_mut_slice(), n, |rows, block| {
        update_rows(block, rows, a, bt, n, alpha, beta, |x, y| backend.dot(x, y));
    });
    Ok(())
}
