//! Givens plane rotations
//!
//! A rotation is stored as the pair `(c, s)` of the matrix
//!
//! ```text
//! G = [ c  -s ]
//!     [ s   c ]
//! ```
//!
//! [`Givens::compute_rotation`] chooses `(c, s)` so that `G [a, b]^T = [r, 0]^T`
//! with `r >= 0`.

use crate::traits::RealField;
use ndarray::Array2;
use std::ops::Range;

/// 2x2 plane rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Givens<T: RealField> {
    cos: T,
    sin: T,
}

impl<T: RealField> Default for Givens<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: RealField> Givens<T> {
    /// Rotation from explicit cosine and sine
    pub fn new(cos: T, sin: T) -> Self {
        Self { cos, sin }
    }

    /// The identity rotation (`c = 1`, `s = 0`)
    pub fn identity() -> Self {
        Self {
            cos: T::one(),
            sin: T::zero(),
        }
    }

    /// Cosine of the rotation angle
    #[inline]
    pub fn cos(&self) -> T {
        self.cos
    }

    /// Sine of the rotation angle
    #[inline]
    pub fn sin(&self) -> T {
        self.sin
    }

    /// Rotation that annihilates `b` against `a`.
    ///
    /// On return `a` holds `r = sqrt(a^2 + b^2)` and `b` is zero. The branch
    /// is chosen on the larger magnitude so that the ratio never exceeds one,
    /// and exact zeros are handled without dividing.
    pub fn compute_rotation(&mut self, a: &mut T, b: &mut T) {
        let zero = T::zero();
        let one = T::one();
        if *b == zero {
            self.cos = a.signum_or_one();
            self.sin = zero;
            *a = a.abs();
        } else if *a == zero {
            self.cos = zero;
            self.sin = -b.signum_or_one();
            *a = b.abs();
            *b = zero;
        } else if b.abs() > a.abs() {
            let t = *a / *b;
            let u = b.signum_or_one() * (one + t * t).sqrt();
            self.sin = -one / u;
            self.cos = t / u;
            *a = u * *b;
            *b = zero;
        } else {
            let t = *b / *a;
            let u = a.signum_or_one() * (one + t * t).sqrt();
            self.cos = one / u;
            self.sin = -t / u;
            *a = u * *a;
            *b = zero;
        }
    }

    /// Apply the rotation to the pair `(a, b)`, returning `G [a, b]^T`
    #[inline]
    pub fn rotate(&self, a: T, b: T) -> (T, T) {
        (
            self.cos * a - self.sin * b,
            self.sin * a + self.cos * b,
        )
    }

    /// Apply the rotation to the pair `(a, b)`, returning `G^T [a, b]^T`
    #[inline]
    pub fn rotate_transpose(&self, a: T, b: T) -> (T, T) {
        (
            self.cos * a + self.sin * b,
            self.cos * b - self.sin * a,
        )
    }

    /// Replace rows `i` and `k` of `a` by `G` (or `G^T`) applied to them,
    /// over the given column range.
    pub fn pre_multiply(
        &self,
        a: &mut Array2<T>,
        i: usize,
        k: usize,
        columns: Range<usize>,
        transpose: bool,
    ) {
        for j in columns {
            let (x, y) = (a[[i, j]], a[[k, j]]);
            let (x, y) = if transpose {
                self.rotate_transpose(x, y)
            } else {
                self.rotate(x, y)
            };
            a[[i, j]] = x;
            a[[k, j]] = y;
        }
    }

    /// Replace columns `j` and `k` of `a` by the columns of `a G` (or
    /// `a G^T`), over the given row range.
    pub fn post_multiply(
        &self,
        a: &mut Array2<T>,
        j: usize,
        k: usize,
        rows: Range<usize>,
        transpose: bool,
    ) {
        // A G acts on each row as G^T acts on a column pair
        for i in rows {
            let (x, y) = (a[[i, j]], a[[i, k]]);
            let (x, y) = if transpose {
                self.rotate(x, y)
            } else {
                self.rotate_transpose(x, y)
            };
            a[[i, j]] = x;
            a[[i, k]] = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn check_annihilates(a0: f64, b0: f64) {
        let mut g = Givens::identity();
        let (mut a, mut b) = (a0, b0);
        g.compute_rotation(&mut a, &mut b);
        assert_eq!(b, 0.0);
        assert_relative_eq!(a, a0.hypot(b0), epsilon = 1e-14);
        assert_relative_eq!(g.cos() * g.cos() + g.sin() * g.sin(), 1.0, epsilon = 1e-14);

        let (r, zero) = g.rotate(a0, b0);
        assert_relative_eq!(r, a, epsilon = 1e-14);
        assert_relative_eq!(zero, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_compute_rotation_branches() {
        check_annihilates(3.0, 4.0);
        check_annihilates(4.0, -3.0);
        check_annihilates(-1.0, 1e-3);
        check_annihilates(-2.0, -7.0);
        check_annihilates(0.0, -5.0);
        check_annihilates(-6.0, 0.0);
        check_annihilates(0.0, 0.0);
    }

    #[test]
    fn test_transpose_inverts() {
        let mut g = Givens::identity();
        let (mut a, mut b) = (1.0_f64, 2.0);
        g.compute_rotation(&mut a, &mut b);
        let (x, y) = g.rotate(0.3, -0.7);
        let (x, y) = g.rotate_transpose(x, y);
        assert_relative_eq!(x, 0.3, epsilon = 1e-14);
        assert_relative_eq!(y, -0.7, epsilon = 1e-14);
    }

    #[test]
    fn test_pre_and_post_multiply() {
        let g = Givens::new(0.6_f64, 0.8);
        let rotation = array![[0.6_f64, -0.8], [0.8, 0.6]];
        let a = array![[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let mut pre = a.clone();
        g.pre_multiply(&mut pre, 0, 1, 0..3, false);
        let expected = rotation.dot(&a);
        for (x, y) in pre.iter().zip(expected.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-14);
        }

        let mut pre_t = a.clone();
        g.pre_multiply(&mut pre_t, 0, 1, 0..3, true);
        let expected = rotation.t().dot(&a);
        for (x, y) in pre_t.iter().zip(expected.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-14);
        }

        let b = a.t().to_owned();
        let mut post = b.clone();
        g.post_multiply(&mut post, 0, 1, 0..3, false);
        let expected = b.dot(&rotation);
        for (x, y) in post.iter().zip(expected.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-14);
        }

        let mut post_t = b.clone();
        g.post_multiply(&mut post_t, 0, 1, 0..3, true);
        let expected = b.dot(&rotation.t());
        for (x, y) in post_t.iter().zip(expected.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_partial_range() {
        let g = Givens::new(0.0_f64, 1.0);
        let mut a = array![[1.0_f64, 2.0], [3.0, 4.0]];
        g.pre_multiply(&mut a, 0, 1, 1..2, false);
        // column 0 untouched, column 1 rotated by 90 degrees
        assert_eq!(a, array![[1.0, -4.0], [3.0, 2.0]]);
    }
}
