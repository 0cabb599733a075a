//! Negacyclic FFT over `Z[X]/(X^N + 1)` in the split re/im ("reim") layout.
//!
//! A polynomial `a` of degree `N = 2m` is folded into `m` complex values
//! `a[j] + i * a[j + m]`, stored as `re = data[..m]`, `im = data[m..]`. This
//! is `a` reduced modulo `X^m - i`; the transform evaluates it at the `m`
//! roots of `X^m = i`, so pointwise products are negacyclic products.

use std::f64::consts::PI;

const TWO_POW_64: f64 = 18446744073709551616.0;

/// Twiddle factors of the forward and backward transforms of size `m`.
///
/// Level `l` of the butterfly network has `2^l` blocks; the twiddle of block
/// `b` is stored as `(cos, sin)` at `omg[2 * (2^l - 1 + b)..]`.
pub(crate) struct ReimFFTTable {
    m: usize,
    omg: Vec<f64>,
}

impl ReimFFTTable {
    pub(crate) fn new(n: usize) -> Self {
        assert!(n >= 2 && n.is_power_of_two(), "n must be a power of two but is {n}");
        let m: usize = n >> 1;
        let mut omg: Vec<f64> = Vec::with_capacity(2 * m);
        // Roots are tracked as exponents in units of pi.
        let mut zetas: Vec<f64> = vec![0.5];
        while zetas.len() < m {
            let mut next: Vec<f64> = Vec::with_capacity(2 * zetas.len());
            for z in zetas.iter() {
                let r: f64 = z / 2.0;
                omg.push((PI * r).cos());
                omg.push((PI * r).sin());
                next.push(r);
                next.push(r + 1.0);
            }
            zetas = next;
        }
        Self { m, omg }
    }

    /// Ring degree `N`.
    pub(crate) fn n(&self) -> usize {
        self.m << 1
    }

    pub(crate) fn m(&self) -> usize {
        self.m
    }

    #[inline(always)]
    fn twiddle(&self, level_offset: usize, block: usize) -> (f64, f64) {
        let i: usize = 2 * (level_offset + block);
        (self.omg[i], self.omg[i + 1])
    }

    pub(crate) fn forward(&self, data: &mut [f64]) {
        debug_assert_eq!(data.len(), 2 * self.m);
        let (re, im) = data.split_at_mut(self.m);
        let mut blocks: usize = 1;
        while blocks < self.m {
            let half: usize = self.m / (2 * blocks);
            for b in 0..blocks {
                let (omg_re, omg_im) = self.twiddle(blocks - 1, b);
                let start: usize = 2 * b * half;
                for lo in start..start + half {
                    let hi: usize = lo + half;
                    cplx_twiddle(re, im, lo, hi, omg_re, omg_im);
                }
            }
            blocks <<= 1;
        }
    }

    /// Inverse of [ReimFFTTable::forward], including the `1/m` scaling.
    pub(crate) fn backward(&self, data: &mut [f64]) {
        debug_assert_eq!(data.len(), 2 * self.m);
        let (re, im) = data.split_at_mut(self.m);
        let mut blocks: usize = self.m >> 1;
        while blocks >= 1 {
            let half: usize = self.m / (2 * blocks);
            for b in 0..blocks {
                let (omg_re, omg_im) = self.twiddle(blocks - 1, b);
                let start: usize = 2 * b * half;
                for lo in start..start + half {
                    let hi: usize = lo + half;
                    cplx_inv_twiddle(re, im, lo, hi, omg_re, omg_im);
                }
            }
            blocks >>= 1;
        }
        let inv_m: f64 = 1.0 / self.m as f64;
        data.iter_mut().for_each(|x| *x *= inv_m);
    }

    /// `res = DFT(a)` where `a` is read as centred torus elements.
    pub(crate) fn from_torus(&self, res: &mut [f64], a: &[u64]) {
        debug_assert_eq!(res.len(), a.len());
        res.iter_mut().zip(a.iter()).for_each(|(r, x)| *r = *x as i64 as f64);
        self.forward(res);
    }

    /// `res = DFT(a)` for small signed coefficients.
    pub(crate) fn from_i64(&self, res: &mut [f64], a: &[i64]) {
        debug_assert_eq!(res.len(), a.len());
        res.iter_mut().zip(a.iter()).for_each(|(r, x)| *r = *x as f64);
        self.forward(res);
    }

    /// `res = IDFT(data) mod 2^64`. Consumes `data` as scratch.
    pub(crate) fn to_torus(&self, res: &mut [u64], data: &mut [f64]) {
        debug_assert_eq!(res.len(), data.len());
        self.backward(data);
        res.iter_mut().zip(data.iter()).for_each(|(r, x)| *r = torus_round(*x));
    }
}

/// Rounds `x` to the nearest integer modulo `2^64`.
#[inline(always)]
fn torus_round(x: f64) -> u64 {
    let r: f64 = x - (x / TWO_POW_64).round() * TWO_POW_64;
    r.round() as i64 as u64
}

#[inline(always)]
fn cplx_twiddle(re: &mut [f64], im: &mut [f64], lo: usize, hi: usize, omg_re: f64, omg_im: f64) {
    let dr: f64 = re[hi] * omg_re - im[hi] * omg_im;
    let di: f64 = re[hi] * omg_im + im[hi] * omg_re;
    re[hi] = re[lo] - dr;
    im[hi] = im[lo] - di;
    re[lo] += dr;
    im[lo] += di;
}

#[inline(always)]
fn cplx_inv_twiddle(re: &mut [f64], im: &mut [f64], lo: usize, hi: usize, omg_re: f64, omg_im: f64) {
    let ur: f64 = re[lo] - re[hi];
    let ui: f64 = im[lo] - im[hi];
    re[lo] += re[hi];
    im[lo] += im[hi];
    re[hi] = ur * omg_re + ui * omg_im;
    im[hi] = ui * omg_re - ur * omg_im;
}

/// `res += a * b` pointwise on reim vectors.
#[inline(always)]
pub(crate) fn reim_addmul(res: &mut [f64], a: &[f64], b: &[f64]) {
    let m: usize = res.len() >> 1;
    let (res_re, res_im) = res.split_at_mut(m);
    let (a_re, a_im) = a.split_at(m);
    let (b_re, b_im) = b.split_at(m);
    for j in 0..m {
        res_re[j] += a_re[j] * b_re[j] - a_im[j] * b_im[j];
        res_im[j] += a_re[j] * b_im[j] + a_im[j] * b_re[j];
    }
}
