use sampling::Source;

use crate::backend::lwe::{TorusNoise, fft::{ReimFFTTable, reim_addmul}};

/// Rank-1 GLWE secret `S` in `Z[X]/(X^N + 1)`, kept with its DFT.
pub(crate) struct GlweSecret {
    data: Vec<i64>,
    dft: Vec<f64>,
}

impl GlweSecret {
    pub(crate) fn new(data: Vec<i64>, table: &ReimFFTTable) -> Self {
        let mut dft: Vec<f64> = vec![0f64; data.len()];
        table.from_i64(&mut dft, &data);
        Self { data, dft }
    }

    pub(crate) fn data(&self) -> &[i64] {
        &self.data
    }

    /// `a * S mod (X^N + 1, 2^64)`.
    pub(crate) fn mul(&self, table: &ReimFFTTable, a: &[u64]) -> Vec<u64> {
        let n: usize = self.data.len();
        let mut a_dft: Vec<f64> = vec![0f64; n];
        table.from_torus(&mut a_dft, a);
        let mut acc: Vec<f64> = vec![0f64; n];
        reim_addmul(&mut acc, &a_dft, &self.dft);
        let mut res: Vec<u64> = vec![0u64; n];
        table.to_torus(&mut res, &mut acc);
        res
    }
}

/// `(a, b)` with phase `b - a * S`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GlweCiphertext {
    pub(crate) a: Vec<u64>,
    pub(crate) b: Vec<u64>,
}

impl GlweCiphertext {
    pub(crate) fn zero(n: usize) -> Self {
        Self {
            a: vec![0u64; n],
            b: vec![0u64; n],
        }
    }

    pub(crate) fn n(&self) -> usize {
        self.b.len()
    }

    /// Fresh encryption of zero.
    pub(crate) fn encrypt_zero(
        sk: &GlweSecret,
        table: &ReimFFTTable,
        noise: &TorusNoise,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let n: usize = table.n();
        let mut a: Vec<u64> = vec![0u64; n];
        source_xa.fill_uniform(&mut a);
        let mut b: Vec<u64> = sk.mul(table, &a);
        b.iter_mut().for_each(|x| *x = x.wrapping_add(noise.sample(source_xe)));
        Self { a, b }
    }

    pub(crate) fn phase(&self, sk: &GlweSecret, table: &ReimFFTTable) -> Vec<u64> {
        let a_s: Vec<u64> = sk.mul(table, &self.a);
        self.b
            .iter()
            .zip(a_s.iter())
            .map(|(b, x)| b.wrapping_sub(*x))
            .collect()
    }

    /// `self = X^k * a` for `k` in `[0, 2N)`.
    pub(crate) fn rotate(&mut self, k: usize, a: &GlweCiphertext) {
        rotate_negacyclic(&mut self.a, &a.a, k);
        rotate_negacyclic(&mut self.b, &a.b, k);
    }

    pub(crate) fn add_inplace(&mut self, a: &GlweCiphertext) {
        add_inplace(&mut self.a, &a.a);
        add_inplace(&mut self.b, &a.b);
    }

    pub(crate) fn sub_inplace(&mut self, a: &GlweCiphertext) {
        sub_inplace(&mut self.a, &a.a);
        sub_inplace(&mut self.b, &a.b);
    }

    /// LWE encryption of the constant coefficient of the phase, under the
    /// GLWE secret read as a vector.
    pub(crate) fn sample_extract(&self) -> (Vec<u64>, u64) {
        let n: usize = self.n();
        let mut a: Vec<u64> = vec![0u64; n];
        a[0] = self.a[0];
        for j in 1..n {
            a[j] = self.a[n - j].wrapping_neg();
        }
        (a, self.b[0])
    }
}

/// `res = X^k * a mod (X^N + 1)` for `k` in `[0, 2N)`.
pub(crate) fn rotate_negacyclic(res: &mut [u64], a: &[u64], k: usize) {
    let n: usize = a.len();
    debug_assert_eq!(res.len(), n);
    debug_assert!(k < 2 * n);
    for (i, x) in a.iter().enumerate() {
        let j: usize = i + k;
        if j < n {
            res[j] = *x;
        } else if j < 2 * n {
            res[j - n] = x.wrapping_neg();
        } else {
            res[j - 2 * n] = *x;
        }
    }
}

fn add_inplace(res: &mut [u64], a: &[u64]) {
    res.iter_mut().zip(a.iter()).for_each(|(r, x)| *r = r.wrapping_add(*x));
}

fn sub_inplace(res: &mut [u64], a: &[u64]) {
    res.iter_mut().zip(a.iter()).for_each(|(r, x)| *r = r.wrapping_sub(*x));
}

#[cfg(test)]
mod tests {
    use sampling::{Distribution, Gaussian};

    use super::*;

    #[test]
    fn rotation_is_negacyclic() {
        let a: Vec<u64> = vec![1, 2, 3, 4];
        let mut res: Vec<u64> = vec![0u64; 4];
        rotate_negacyclic(&mut res, &a, 1);
        assert_eq!(res, vec![4u64.wrapping_neg(), 1, 2, 3]);
        rotate_negacyclic(&mut res, &a, 4);
        assert_eq!(res, a.iter().map(|x| x.wrapping_neg()).collect::<Vec<u64>>());
        rotate_negacyclic(&mut res, &a, 7);
        assert_eq!(res, vec![2, 3, 4, 1u64.wrapping_neg()]);
    }

    #[test]
    fn extracted_sample_decrypts_constant_coefficient() {
        let n: usize = 64;
        let table: ReimFFTTable = ReimFFTTable::new(n);
        let mut source_xs: Source = Source::new([1u8; 32]);
        let mut source_xa: Source = Source::new([2u8; 32]);
        let mut source_xe: Source = Source::new([3u8; 32]);
        let sk: GlweSecret = GlweSecret::new(Distribution::BinaryProb(0.5).sample(n, &mut source_xs), &table);
        let noise: TorusNoise = TorusNoise::new(Gaussian::new(3.2, 19.2).unwrap(), 40);

        let mut ct: GlweCiphertext = GlweCiphertext::encrypt_zero(&sk, &table, &noise, &mut source_xa, &mut source_xe);
        let message: u64 = 3u64 << 61;
        ct.b[0] = ct.b[0].wrapping_add(message);

        let (a, b) = ct.sample_extract();
        let dot: u64 = a
            .iter()
            .zip(sk.data().iter())
            .fold(0u64, |acc, (x, s)| acc.wrapping_add(x.wrapping_mul(*s as u64)));
        let err: i64 = b.wrapping_sub(dot).wrapping_sub(message) as i64;
        assert!(err.abs() < 1 << 32, "err={err}");

        let phase: Vec<u64> = ct.phase(&sk, &table);
        assert!(phase.iter().skip(1).all(|x| (*x as i64).abs() < 1 << 32));
        assert!((phase[0].wrapping_sub(message) as i64).abs() < 1 << 32);
    }
}
