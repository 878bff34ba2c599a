//! Row-major transpose.
//!
//! The transposed kernels multiply `A` by `Bᵀ` stored row-major, which turns
//! the strided column walk of `B` into a contiguous row walk. Keeping the
//! layout change in its own step lets it be tested and timed separately.

use crate::error::Result;
use crate::matrix::{at, Matrix};

/// Returns a newly allocated `Mt` with `Mt[i, j] = M[j, i]`.
///
/// The output buffer is allocated before anything is written; on allocation
/// failure the error is returned and no partial matrix escapes.
///
/// # Example
///
/// ```
/// use gemmly::{transpose, Matrix};
///
/// let m = Matrix::try_from_slice(2, &[1.0, 2.0,
///                                     3.0, 4.0]).unwrap();
/// let mt = transpose(&m).unwrap();
///
/// assert_eq!(mt.as_slice(), &[1.0, 3.0,
///                             2.0, 4.0]);
/// ```
pub fn transpose(m: &Matrix) -> Result<Matrix> {
    let n = m.n();
    let mut mt = Matrix::try_zeroed(n)?;
    transpose_into(m.as_slice(), mt.as_mut_slice(), n);
    Ok(mt)
}

/// Writes the transpose of the row-major `n x n` matrix `src` into `dst`.
///
/// # Panics
///
/// Panics if either slice does not hold exactly `n * n` elements.
pub fn transpose_into(src: &[f64], dst: &mut [f64], n: usize) {
    assert_eq!(src.len(), n * n, "source is not {n}x{n}");
    assert_eq!(dst.len(), n * n, "destination is not {n}x{n}");

    for i in 0..n {
        for j in 0..n {
            dst[at(i, j, n)] = src[at(j, i, n)];
        }
    }
}
