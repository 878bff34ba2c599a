use super::traits::SimdReduce;

/// Strictly sequential dot product: `((a0*b0 + a1*b1) + a2*b2) + ...`.
///
/// This is the reduction order of the naive and transposed kernels.
#[inline(always)]
pub fn scalar_dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must be the same length");

    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        sum += x * y;
    }
    sum
}

/// Lane-parallel dot product.
///
/// The first `len - len % V::LANES` products are accumulated in the lanes of one
/// register, the lanes are summed horizontally, and the remaining tail is
/// added serially. The set of products is the same as in [`scalar_dot`]; only
/// the order of the additions differs.
///
/// # Safety
///
/// The CPU must support `V`'s instruction set.
#[inline(always)]
pub unsafe fn dot_lanes<V: SimdReduce>(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Vectors must be the same length");

    let len = a.len();
    let body = len - len % V::LANES;
    let (pa, pb) = (a.as_ptr(), b.as_ptr());

    let mut acc = V::zero();
    let mut k = 0;
    while k < body {
        acc = acc.mul_add(V::load(pa.add(k)), V::load(pb.add(k)));
        k += V::LANES;
    }

    let mut sum = acc.horizontal_sum();
    for k in body..len {
        sum += a[k] * b[k];
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::fallback::PortableF64x4;

    #[test]
    fn test_scalar_dot() {
        assert_eq!(scalar_dot(&[], &[]), 0.0);
        assert_eq!(scalar_dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_dot_lanes_with_tail() {
        // 4 lanes + 3 tail elements.
        let a: Vec<f64> = (1..=7).map(f64::from).collect();
        let b = vec![2.0; 7];
        let got = unsafe { dot_lanes::<PortableF64x4>(&a, &b) };
        assert_eq!(got, 56.0);
    }

    #[test]
    fn test_dot_lanes_shorter_than_one_register() {
        let got = unsafe { dot_lanes::<PortableF64x4>(&[3.0, 4.0], &[0.5, 0.25]) };
        assert_eq!(got, 2.5);
    }
}
