use sampling::Source;

use crate::backend::lwe::{LweCiphertext, LweSecret, TorusNoise, decomposer::Decomposer};

/// Switches LWE samples extracted from the GLWE accumulator (dimension `N`,
/// key `S`) back to the LWE key `s` (dimension `n`).
///
/// Row `(i, j)` encrypts `S_i * g_j` under `s`; rows are stored flat as
/// `n` mask coefficients followed by the body.
pub(crate) struct KeySwitchingKey {
    dec: Decomposer,
    n_in: usize,
    n_out: usize,
    data: Vec<u64>,
}

impl KeySwitchingKey {
    pub(crate) fn encrypt_sk(
        sk_in: &[i64],
        sk_out: &LweSecret,
        dec: Decomposer,
        noise: &TorusNoise,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let n_out: usize = sk_out.n().into();
        let mut data: Vec<u64> = Vec::with_capacity(sk_in.len() * dec.dnum() * (n_out + 1));
        for s in sk_in.iter() {
            for j in 0..dec.dnum() {
                let pt: u64 = (*s as u64).wrapping_mul(dec.gadget(j));
                let row: LweCiphertext = sk_out.encrypt(pt, noise, source_xa, source_xe);
                data.extend_from_slice(row.a());
                data.push(row.b());
            }
        }
        Self {
            dec,
            n_in: sk_in.len(),
            n_out,
            data,
        }
    }

    pub(crate) fn n_in(&self) -> usize {
        self.n_in
    }

    pub(crate) fn n_out(&self) -> usize {
        self.n_out
    }

    /// Re-encrypts `(a, b)` under the output key.
    pub(crate) fn apply(&self, a: &[u64], b: u64) -> LweCiphertext {
        debug_assert_eq!(a.len(), self.n_in);
        let dnum: usize = self.dec.dnum();
        let stride: usize = self.n_out + 1;
        let mut res_a: Vec<u64> = vec![0u64; self.n_out];
        let mut res_b: u64 = b;
        let mut digits: Vec<i64> = vec![0i64; dnum];
        for (i, x) in a.iter().enumerate() {
            self.dec.decompose(*x, &mut digits);
            for (j, d) in digits.iter().enumerate() {
                if *d == 0 {
                    continue;
                }
                let d: u64 = *d as u64;
                let row: &[u64] = &self.data[(i * dnum + j) * stride..(i * dnum + j + 1) * stride];
                res_a
                    .iter_mut()
                    .zip(row[..self.n_out].iter())
                    .for_each(|(r, k)| *r = r.wrapping_sub(d.wrapping_mul(*k)));
                res_b = res_b.wrapping_sub(d.wrapping_mul(row[self.n_out]));
            }
        }
        LweCiphertext::new(res_a, res_b)
    }
}
