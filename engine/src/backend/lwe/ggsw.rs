use sampling::Source;

use crate::backend::lwe::{
    TorusNoise,
    decomposer::Decomposer,
    fft::{ReimFFTTable, reim_addmul},
    glwe::{GlweCiphertext, GlweSecret},
};

/// GLWE ciphertext in the DFT domain.
struct GlweDft {
    a: Vec<f64>,
    b: Vec<f64>,
}

impl GlweDft {
    fn from_glwe(ct: &GlweCiphertext, table: &ReimFFTTable) -> Self {
        let mut a: Vec<f64> = vec![0f64; ct.n()];
        let mut b: Vec<f64> = vec![0f64; ct.n()];
        table.from_torus(&mut a, &ct.a);
        table.from_torus(&mut b, &ct.b);
        Self { a, b }
    }
}

/// GGSW encryption of a small integer `m` under a rank-1 GLWE secret.
///
/// Holds one pair of rows per gadget digit `j`: `rows_a[j]` encrypts zero
/// with `m * g_j` added to its mask, `rows_b[j]` with `m * g_j` added to its
/// body. Rows are stored prepared (DFT) for the external product.
pub(crate) struct GgswCiphertext {
    rows_a: Vec<GlweDft>,
    rows_b: Vec<GlweDft>,
}

impl GgswCiphertext {
    pub(crate) fn encrypt_sk(
        m: i64,
        sk: &GlweSecret,
        table: &ReimFFTTable,
        dec: &Decomposer,
        noise: &TorusNoise,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self {
        let mut rows_a: Vec<GlweDft> = Vec::with_capacity(dec.dnum());
        let mut rows_b: Vec<GlweDft> = Vec::with_capacity(dec.dnum());
        for j in 0..dec.dnum() {
            let pt: u64 = (m as u64).wrapping_mul(dec.gadget(j));

            let mut row: GlweCiphertext = GlweCiphertext::encrypt_zero(sk, table, noise, source_xa, source_xe);
            row.a[0] = row.a[0].wrapping_add(pt);
            rows_a.push(GlweDft::from_glwe(&row, table));

            let mut row: GlweCiphertext = GlweCiphertext::encrypt_zero(sk, table, noise, source_xa, source_xe);
            row.b[0] = row.b[0].wrapping_add(pt);
            rows_b.push(GlweDft::from_glwe(&row, table));
        }
        Self { rows_a, rows_b }
    }
}

/// Reusable buffers of [external_product].
pub(crate) struct ExternalProductScratch {
    digits_a: Vec<Vec<i64>>,
    digits_b: Vec<Vec<i64>>,
    digit_dft: Vec<f64>,
    acc_a: Vec<f64>,
    acc_b: Vec<f64>,
}

impl ExternalProductScratch {
    pub(crate) fn new(n: usize, dec: &Decomposer) -> Self {
        Self {
            digits_a: vec![vec![0i64; n]; dec.dnum()],
            digits_b: vec![vec![0i64; n]; dec.dnum()],
            digit_dft: vec![0f64; n],
            acc_a: vec![0f64; n],
            acc_b: vec![0f64; n],
        }
    }
}

/// `res = ggsw * c`: a GLWE whose phase is `m * phase(c)`, up to
/// decomposition and key noise.
pub(crate) fn external_product(
    res: &mut GlweCiphertext,
    c: &GlweCiphertext,
    ggsw: &GgswCiphertext,
    table: &ReimFFTTable,
    dec: &Decomposer,
    scratch: &mut ExternalProductScratch,
) {
    dec.decompose_poly(&c.a, &mut scratch.digits_a);
    dec.decompose_poly(&c.b, &mut scratch.digits_b);
    scratch.acc_a.iter_mut().for_each(|x| *x = 0.0);
    scratch.acc_b.iter_mut().for_each(|x| *x = 0.0);

    for j in 0..dec.dnum() {
        for (digits, row) in [
            (&scratch.digits_a[j], &ggsw.rows_a[j]),
            (&scratch.digits_b[j], &ggsw.rows_b[j]),
        ] {
            table.from_i64(&mut scratch.digit_dft, digits);
            reim_addmul(&mut scratch.acc_a, &scratch.digit_dft, &row.a);
            reim_addmul(&mut scratch.acc_b, &scratch.digit_dft, &row.b);
        }
    }

    table.to_torus(&mut res.a, &mut scratch.acc_a);
    table.to_torus(&mut res.b, &mut scratch.acc_b);
}
