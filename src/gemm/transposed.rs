use std::ops::Range;

use tracing::trace;

use crate::error::Result;
use crate::gemm::check_operands;
use crate::matrix::Matrix;
use crate::simd::scalar_dot;
use crate::transpose::transpose;

/// GEMM with a pre-transposed B.
///
/// `Bt = transpose(B)` is computed once, after which row `i` of A and row `j`
/// of `Bt` are both contiguous, so the inner product streams through memory
/// instead of striding by `n`. The extra O(n²) copy pays for itself well before
/// B stops fitting in cache.
///
/// `Bt` is owned by this call and dropped before it returns. If it cannot be
/// allocated the error is returned and C is left untouched.
pub fn gemm_transposed(
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
    trace!(n, "transposed gemm");

    let bt = transpose(b)?;
    update_rows(
        c.as_mut_slice(),
        0..n,
        a.as_slice(),
        bt.as_slice(),
        n,
        alpha,
        beta,
        scalar_dot,
    );
    Ok(())
}

/// Updates the rows `rows` of C from A and `Bt`.
///
/// `c_rows` holds exactly those rows (`rows.len() * n` elements, starting at
/// row `rows.start`), which is what lets the parallel kernels hand each worker
/// its own disjoint block. `dot` is the inner reduction.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
pub(crate) fn update_rows<D>(
    c_rows: &mut [f64],
    rows: Range<usize>,
    a: &[f64],
    bt: &[f64],
    n: usize,
    alpha: f64,
    beta: f64,
    dot: D,
) where
    D: Fn(&[f64], &[f64]) -> f64,
{
    debug_assert_eq!(c_rows.len(), rows.len() * n);
    if n == 0 {
        return;
    }

    for (i, c_row) in rows.zip(c_rows.chunks_exact_mut(n)) {
        let a_row = &a[i * n..(i + 1) * n];
        for (j, c_ij) in c_row.iter_mut().enumerate() {
            let bt_row = &bt[j * n..(j + 1) * n];
            *c_ij = alpha * dot(a_row, bt_row) + beta * *c_ij;
        }
    }
}
