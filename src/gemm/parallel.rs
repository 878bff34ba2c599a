//! Fork-join row partitioning and the parallel transposed kernel.
//!
//! Parallelism strategy:
//! - The rows `[0, n)` of C are split once per call into at most `workers`
//!   contiguous ranges ([`partition_rows`]).
//! - C is cut with `split_at_mut` into the matching row blocks, so every task
//!   owns a disjoint `&mut` block and no two tasks can write the same element.
//! - A and `Bt` are shared as `&[f64]`; nothing is locked.
//! - `ThreadPool::install` returns only after every task has finished, and the
//!   tasks borrow `Bt`, so `Bt` cannot be dropped before the join.

use std::ops::Range;

use rayon::prelude::*;
use tracing::trace;

use crate::error::Result;
use crate::gemm::{check_operands, transposed::update_rows, Gemm};
use crate::matrix::Matrix;
use crate::simd::scalar_dot;
use crate::transpose::transpose;

/// Splits the rows `[0, n)` into at most `workers` contiguous, non-empty ranges.
///
/// Range sizes differ by at most one; the first `n % w` ranges get the extra
/// row (`w = min(workers, n)`). The ranges are in order, do not overlap and
/// cover `[0, n)` exactly. `n == 0` yields no ranges; `workers == 0` is treated
/// as one worker.
///
/// # Example
///
/// ```
/// use gemmly::gemm::partition_rows;
///
/// assert_eq!(partition_rows(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
/// assert_eq!(partition_rows(2, 8), vec![0..1, 1..2]);
/// ```
pub fn partition_rows(n: usize, workers: usize) -> Vec<Range<usize>> {
    let parts = workers.max(1).min(n);
    if parts == 0 {
        return Vec::new();
    }

    let base = n / parts;
    let extra = n % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for p in 0..parts {
        let len = base + usize::from(p < extra);
        ranges.push(start..start + len);
        start += len;
    }
    debug_assert_eq!(start, n);
    ranges
}

/// Runs `f(rows, block)` on the context's pool for every range of
/// [`partition_rows`]`(n, gemm.workers())`, where `block` is the mutable slice
/// of `c` holding exactly those rows. Returns after every call has finished.
///
/// # Panics
///
/// Panics if `c.len() != n * n`, or re-raises a panic from `f`.
pub fn for_each_row_block<F>(gemm: &Gemm, c: &mut [f64], n: usize, f: F)
where
    F: Fn(Range<usize>, &mut [f64]) + Sync + Send,
{
    assert_eq!(c.len(), n * n, "C is not {n}x{n}");

    let ranges = partition_rows(n, gemm.workers());
    trace!(n, blocks = ranges.len(), "row partition");

    let mut blocks = Vec::with_capacity(ranges.len());
    let mut rest = c;
    for rows in &ranges {
        let (block, tail) = std::mem::take(&mut rest).split_at_mut(rows.len() * n);
        blocks.push(block);
        rest = tail;
    }

    gemm.pool().install(|| {
        blocks
            .into_par_iter()
            .zip(ranges.into_par_iter())
            .for_each(|(block, rows)| f(rows, block));
    });
}

/// Transposed GEMM with the rows of C distributed across the worker pool.
///
/// Same arithmetic (and summation order) as
/// [`gemm_transposed`](super::gemm_transposed); only the outer row loop runs
/// concurrently.
pub fn gemm_parallel(
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
    trace!(n, workers = gemm.workers(), "parallel gemm");

    let bt = transpose(b)?;
    let (a, bt) = (a.as_slice(), bt.as_slice());

    for_each_row_block(gemm, c.as_mut_slice(), n, |rows, block| {
        update_rows(block, rows, a, bt, n, alpha, beta, scalar_dot);
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemm::gemm_transposed;
    use crate::utils::alloc_track;
    use rand::{rngs::StdRng, SeedableRng};

    fn assert_exact_cover(ranges: &[Range<usize>], n: usize, workers: usize) {
        let mut next = 0;
        for r in ranges {
            assert_eq!(r.start, next, "gap or overlap for n={n} workers={workers}");
            assert!(!r.is_empty(), "empty range for n={n} workers={workers}");
            next = r.end;
        }
        assert_eq!(next, n, "rows missing for n={n} workers={workers}");
    }

    #[test]
    fn test_partition_covers_all_rows() {
        for n in 0..=200 {
            for workers in 0..=9 {
                let ranges = partition_rows(n, workers);
                assert_exact_cover(&ranges, n, workers);
                assert!(ranges.len() <= workers.max(1));

                let min = ranges.iter().map(|r| r.len()).min().unwrap_or(0);
                let max = ranges.iter().map(|r| r.len()).max().unwrap_or(0);
                assert!(max - min <= 1, "unbalanced for n={n} workers={workers}");
            }
        }
    }

    #[test]
    fn test_partition_examples() {
        assert!(partition_rows(0, 4).is_empty());
        assert_eq!(partition_rows(5, 1), vec![0..5]);
        assert_eq!(partition_rows(7, 3), vec![0..3, 3..5, 5..7]);
    }

    #[test]
    fn test_row_blocks_match_their_ranges() {
        let gemm = Gemm::new(3).unwrap();
        let n = 7;
        let mut c = vec![0.0; n * n];

        for_each_row_block(&gemm, &mut c, n, |rows, block| {
            assert_eq!(block.len(), rows.len() * n);
            for (i, row) in rows.zip(block.chunks_exact_mut(n)) {
                row.fill(i as f64);
            }
        });

        for i in 0..n {
            assert!(c[i * n..(i + 1) * n].iter().all(|&x| x == i as f64));
        }
    }

    #[test]
    fn test_parallel_is_bit_identical_to_transposed() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = Matrix::try_random(37, &mut rng).unwrap();
        let b = Matrix::try_random(37, &mut rng).unwrap();
        let c0 = Matrix::try_random(37, &mut rng).unwrap();

        let mut expected = c0.try_clone().unwrap();
        gemm_transposed(&mut expected, &a, &b, 0.75, -1.25).unwrap();

        for workers in [1, 2, 5, 64] {
            let gemm = Gemm::new(workers).unwrap();
            let mut c = c0.try_clone().unwrap();
            gemm_parallel(&gemm, &mut c, &a, &b, 0.75, -1.25).unwrap();
            assert_eq!(c.as_slice(), expected.as_slice(), "workers={workers}");
        }
    }

    #[test]
    fn test_transpose_buffer_is_released_after_join() {
        let gemm = Gemm::new(4).unwrap();
        let a = Matrix::try_filled(16, 1.0).unwrap();
        let b = Matrix::try_filled(16, 1.0).unwrap();
        let mut c = Matrix::try_filled(16, 1.0).unwrap();
        let live = alloc_track::live();
        let (allocated, freed) = alloc_track::totals();

        gemm_parallel(&gemm, &mut c, &a, &b, 1.0, 1.0).unwrap();

        assert_eq!(alloc_track::live(), live);
        assert_eq!(alloc_track::totals(), (allocated + 1, freed + 1));
        assert!(c.as_slice().iter().all(|&x| x == 17.0));
    }

    #[test]
    fn test_failed_transpose_spawns_no_work() {
        let gemm = Gemm::new(2).unwrap();
        let a = Matrix::try_filled(5, 1.0).unwrap();
        let b = Matrix::try_filled(5, 1.0).unwrap();
        let mut c = Matrix::try_filled(5, 2.0).unwrap();
        let live = alloc_track::live();

        alloc_track::fail_nth(0);
        assert!(gemm_parallel(&gemm, &mut c, &a, &b, 1.0, 1.0).is_err());
        alloc_track::clear_failure();

        assert_eq!(alloc_track::live(), live);
        assert!(c.as_slice().iter().all(|&x| x == 2.0));
    }
}
