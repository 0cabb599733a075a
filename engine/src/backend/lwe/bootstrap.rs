use sampling::Source;

use crate::backend::lwe::{
    LweCiphertext, LweSecret, MU, TorusNoise,
    decomposer::Decomposer,
    fft::ReimFFTTable,
    ggsw::{ExternalProductScratch, GgswCiphertext, external_product},
    glwe::{GlweCiphertext, GlweSecret, rotate_negacyclic},
};

/// GGSW encryptions of the LWE secret bits under the GLWE secret, with the
/// FFT table and gadget they were prepared for.
pub(crate) struct BootstrappingKey {
    table: ReimFFTTable,
    dec: Decomposer,
    ggsw: Vec<GgswCiphertext>,
    test_vector: Vec<u64>,
}

impl BootstrappingKey {
    pub(crate) fn encrypt_sk(
        lwe_sk: &LweSecret,
        glwe_sk: &GlweSecret,
        table: ReimFFTTable,
        dec: Decomposer,
        noise: &TorusNoise,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let ggsw: Vec<GgswCiphertext> = lwe_sk
            .data()
            .iter()
            .map(|s| GgswCiphertext::encrypt_sk(*s, glwe_sk, &table, &dec, noise, source_xa, source_xe))
            .collect();
        let test_vector: Vec<u64> = vec![MU; table.n()];
        Self {
            table,
            dec,
            ggsw,
            test_vector,
        }
    }

    /// Degree `N` of the accumulator.
    pub(crate) fn n(&self) -> usize {
        self.table.n()
    }

    /// Blind-rotates the test vector by the phase of `lwe` and extracts the
    /// constant coefficient: an LWE sample under the GLWE secret whose phase
    /// is `+MU` if the phase of `lwe` lies in `[0, 1/2)` and `-MU` otherwise.
    pub(crate) fn sign(&self, lwe: &LweCiphertext) -> (Vec<u64>, u64) {
        let mut acc: GlweCiphertext = GlweCiphertext::zero(self.n());
        cggi_blind_rotate_binary(&mut acc, lwe, &self.test_vector, self);
        acc.sample_extract()
    }
}

/// `acc = X^(-phase~) * lut`, where `phase~` is the phase of `lwe` switched
/// to `Z_2N`. The secret must be binary.
pub(crate) fn cggi_blind_rotate_binary(
    acc: &mut GlweCiphertext,
    lwe: &LweCiphertext,
    lut: &[u64],
    bsk: &BootstrappingKey,
) {
    let n: usize = bsk.n();
    let two_n: usize = 2 * n;
    let log2_two_n: u32 = two_n.trailing_zeros();
    debug_assert_eq!(lwe.a().len(), bsk.ggsw.len());

    let b: usize = mod_switch_2n(lwe.b(), log2_two_n);

    acc.a.iter_mut().for_each(|x| *x = 0);
    // Initialize acc to X^(-b) * LUT(X)
    rotate_negacyclic(&mut acc.b, lut, (two_n - b) % two_n);

    let mut scratch: ExternalProductScratch = ExternalProductScratch::new(n, &bsk.dec);
    let mut acc_tmp: GlweCiphertext = GlweCiphertext::zero(n);
    let mut acc_tmp_rot: GlweCiphertext = GlweCiphertext::zero(n);

    for (ai, ski) in lwe.a().iter().zip(bsk.ggsw.iter()) {
        let ai: usize = mod_switch_2n(*ai, log2_two_n);
        if ai == 0 {
            continue;
        }
        // acc_tmp = sk[i] * acc
        external_product(&mut acc_tmp, acc, ski, &bsk.table, &bsk.dec, &mut scratch);
        // acc = acc + (sk[i] * acc) * (X^ai - 1)
        acc_tmp_rot.rotate(ai, &acc_tmp);
        acc.add_inplace(&acc_tmp_rot);
        acc.sub_inplace(&acc_tmp);
    }
}

/// Rounds a torus element to `Z_2N`, `2N = 2^log2_two_n`.
#[inline(always)]
pub(crate) fn mod_switch_2n(x: u64, log2_two_n: u32) -> usize {
    let shift: u32 = u64::BITS - log2_two_n;
    (x.wrapping_add(1u64 << (shift - 1)) >> shift) as usize
}

#[cfg(test)]
mod tests {
    use sampling::{Distribution, Gaussian};

    use super::*;
    use crate::layouts::{Base2K, Dnum};

    #[test]
    fn mod_switch_rounds_to_nearest() {
        assert_eq!(mod_switch_2n(0, 9), 0);
        assert_eq!(mod_switch_2n(1u64 << 55, 9), 1);
        assert_eq!(mod_switch_2n((1u64 << 55) - (1u64 << 53), 9), 1);
        assert_eq!(mod_switch_2n(u64::MAX, 9), 0);
        assert_eq!(mod_switch_2n(1u64 << 63, 9), 256);
    }

    #[test]
    fn blind_rotation_extracts_the_sign_of_the_phase() {
        let n_lwe: usize = 16;
        let n_glwe: usize = 128;
        let mut source_xs: Source = Source::new([1u8; 32]);
        let mut source_xa: Source = Source::new([2u8; 32]);
        let mut source_xe: Source = Source::new([3u8; 32]);
        let table: ReimFFTTable = ReimFFTTable::new(n_glwe);
        let lwe_sk: LweSecret = LweSecret::new(Distribution::BinaryProb(0.5).sample(n_lwe, &mut source_xs));
        let glwe_sk: GlweSecret =
            GlweSecret::new(Distribution::BinaryProb(0.5).sample(n_glwe, &mut source_xs), &table);
        let lwe_noise: TorusNoise = TorusNoise::new(Gaussian::new(3.2, 19.2).unwrap(), 40);
        let glwe_noise: TorusNoise = TorusNoise::new(Gaussian::new(3.2, 19.2).unwrap(), 50);
        let bsk: BootstrappingKey = BootstrappingKey::encrypt_sk(
            &lwe_sk,
            &glwe_sk,
            table,
            Decomposer::new(Base2K(8), Dnum(2)),
            &glwe_noise,
            &mut source_xa,
            &mut source_xe,
        );

        for (phase, positive) in [
            (MU, true),
            (MU.wrapping_neg(), false),
            (3 * MU, true),
            (5 * MU, false),
            (1u64 << 60, true),
            ((1u64 << 60).wrapping_neg(), false),
        ] {
            let ct: LweCiphertext = lwe_sk.encrypt(phase, &lwe_noise, &mut source_xa, &mut source_xe);
            let (a, b) = bsk.sign(&ct);
            let dot: u64 = a
                .iter()
                .zip(glwe_sk.data().iter())
                .fold(0u64, |acc, (x, s)| acc.wrapping_add(x.wrapping_mul(*s as u64)));
            let want: u64 = if positive { MU } else { MU.wrapping_neg() };
            let err: i64 = b.wrapping_sub(dot).wrapping_sub(want) as i64;
            assert!(err.abs() < 1 << 56, "phase={phase:#x} err={err}");
        }
    }
}
