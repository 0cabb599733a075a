use std::ops::{Add, Mul, Sub};

/// Integer arithmetic available inside a circuit body.
///
/// Comparisons return an indicator of the same type (`1` or `0`) instead of a
/// host `bool`, so selection has to be written arithmetically, e.g.
/// `acc + c * (x - acc)`. Every call contributes to the evaluated circuit
/// regardless of the values involved.
pub trait Integer: Clone + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> {
    /// The constant `value`, living in the same circuit as `self`.
    fn constant_like(&self, value: i64) -> Self;

    /// `1` if `self > rhs`, else `0`.
    fn is_gt(&self, rhs: &Self) -> Self;

    /// `1` if `self >= rhs`, else `0`.
    fn is_ge(&self, rhs: &Self) -> Self;

    /// `1` if `self < rhs`, else `0`.
    fn is_lt(&self, rhs: &Self) -> Self;
}

impl Integer for i64 {
    #[inline]
    fn constant_like(&self, value: i64) -> Self {
        value
    }

    #[inline]
    fn is_gt(&self, rhs: &Self) -> Self {
        (self > rhs) as i64
    }

    #[inline]
    fn is_ge(&self, rhs: &Self) -> Self {
        (self >= rhs) as i64
    }

    #[inline]
    fn is_lt(&self, rhs: &Self) -> Self {
        (self < rhs) as i64
    }
}
