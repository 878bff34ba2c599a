//! Square row-major matrices of `f64`.
//!
//! A [`Matrix`] owns one contiguous, 32-byte aligned buffer of `n * n`
//! elements; element `(i, j)` lives at offset `i * n + j` (see [`at`]).
//! Every constructor is fallible so that allocation failure surfaces as a
//! [`GemmError`](crate::error::GemmError) rather than an abort.

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;

use crate::error::{allocation_error, validation_error, Result};
use crate::utils::{AlignedBuf, BUFFER_ALIGNMENT};

/// Calculates the 1D index of element `(i, j)` in a row-major `n x n` matrix.
#[inline(always)]
pub fn at(i: usize, j: usize, n: usize) -> usize {
    i * n + j
}

/// An owned `n x n` matrix in row-major order.
pub struct Matrix {
    n: usize,
    data: AlignedBuf,
}

impl Matrix {
    /// Allocates an `n x n` matrix of zeros.
    pub fn try_zeroed(n: usize) -> Result<Self> {
        let data = AlignedBuf::try_zeroed(element_count(n)?)?;
        Ok(Matrix { n, data })
    }

    /// Allocates an `n x n` matrix with every element set to `value`.
    pub fn try_filled(n: usize, value: f64) -> Result<Self> {
        let data = AlignedBuf::try_filled(element_count(n)?, value)?;
        Ok(Matrix { n, data })
    }

    /// Allocates an `n x n` matrix whose element `(i, j)` is `f(i, j)`.
    pub fn try_from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Result<Self> {
        let mut m = Self::try_zeroed(n)?;
        for (i, row) in m.rows_mut().enumerate() {
            for (j, x) in row.iter_mut().enumerate() {
                *x = f(i, j);
            }
        }
        Ok(m)
    }

    /// Copies a row-major slice of exactly `n * n` elements into a new matrix.
    pub fn try_from_slice(n: usize, values: &[f64]) -> Result<Self> {
        let len = element_count(n)?;
        if values.len() != len {
            return Err(validation_error(format!(
                "expected {len} elements for a {n}x{n} matrix, got {}",
                values.len()
            )));
        }
        let mut m = Self::try_zeroed(n)?;
        m.as_mut_slice().copy_from_slice(values);
        Ok(m)
    }

    /// Allocates an `n x n` matrix with elements drawn uniformly from `[-1, 1)`.
    pub fn try_random<R: Rng>(n: usize, rng: &mut R) -> Result<Self> {
        let mut m = Self::try_zeroed(n)?;
        for x in m.as_mut_slice() {
            *x = rng.random_range(-1.0..1.0);
        }
        Ok(m)
    }

    /// Deep copy into a fresh allocation.
    pub fn try_clone(&self) -> Result<Self> {
        Self::try_from_slice(self.n, &self.data)
    }

    /// Dimension of the matrix.
    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of stored elements (`n * n`).
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Row `i` as a contiguous slice.
    #[inline(always)]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[at(i, 0, self.n)..at(i + 1, 0, self.n)]
    }

    /// Iterates over the rows. Yields nothing when `n == 0`.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `max(1)` keeps `chunks_exact` valid for the empty matrix.
        self.data.chunks_exact(self.n.max(1))
    }

    /// Iterates mutably over the rows. Yields nothing when `n == 0`.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        let n = self.n.max(1);
        self.data.chunks_exact_mut(n)
    }
}

/// `n * n`, or an allocation error when it does not fit in `usize`.
fn element_count(n: usize) -> Result<usize> {
    n.checked_mul(n).ok_or_else(|| {
        allocation_error(
            usize::MAX,
            BUFFER_ALIGNMENT,
            format!("a {n}x{n} matrix has more elements than fit in usize"),
        )
    })
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline(always)]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[at(i, j, self.n)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline(always)]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[at(i, j, self.n)]
    }
}

/// Console format: two decimals per element, a space after each, one line per
/// row, and a blank line after the matrix.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for x in row {
                write!(f, "{x:.2} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("n", &self.n)
            .field("data", &self.as_slice())
            .finish()
    }
}
