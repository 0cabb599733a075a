use crate::layouts::{Base2K, Dnum};

/// Signed gadget decomposition of torus elements.
///
/// Keeps the top `base2k * dnum` bits of `x` (rounded) and splits them into
/// `dnum` digits in `[-2^(base2k-1), 2^(base2k-1))`, most significant first,
/// such that `x ~ sum_j d_j * 2^(64 - (j+1) * base2k)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Decomposer {
    base2k: u32,
    dnum: u32,
}

impl Decomposer {
    pub(crate) fn new(base2k: Base2K, dnum: Dnum) -> Self {
        debug_assert!(base2k.0 >= 1 && dnum.0 >= 1 && base2k.0 * dnum.0 < u64::BITS);
        Self {
            base2k: base2k.0,
            dnum: dnum.0,
        }
    }

    pub(crate) fn dnum(&self) -> usize {
        self.dnum as usize
    }

    /// Gadget factor of digit `j`.
    #[inline(always)]
    pub(crate) fn gadget(&self, j: usize) -> u64 {
        1u64 << (u64::BITS - (j as u32 + 1) * self.base2k)
    }

    #[inline(always)]
    pub(crate) fn decompose(&self, x: u64, digits: &mut [i64]) {
        debug_assert_eq!(digits.len(), self.dnum as usize);
        let shift: u32 = u64::BITS - self.base2k * self.dnum;
        let base: i64 = 1 << self.base2k;
        let half: i64 = base >> 1;
        let mask: u64 = (1u64 << self.base2k) - 1;

        let mut v: u64 = x.wrapping_add(1u64 << (shift - 1)) >> shift;
        for d in digits.iter_mut().rev() {
            let mut digit: i64 = (v & mask) as i64;
            v >>= self.base2k;
            if digit >= half {
                digit -= base;
                v += 1;
            }
            *d = digit;
        }
    }

    /// Decomposes every coefficient of `a`; `res[j]` receives digit `j`.
    pub(crate) fn decompose_poly(&self, a: &[u64], res: &mut [Vec<i64>]) {
        debug_assert_eq!(res.len(), self.dnum as usize);
        let mut digits: Vec<i64> = vec![0i64; self.dnum as usize];
        for (i, x) in a.iter().enumerate() {
            self.decompose(*x, &mut digits);
            for (row, d) in res.iter_mut().zip(digits.iter()) {
                row[i] = *d;
            }
        }
    }
}
