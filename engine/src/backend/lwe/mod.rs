mod bootstrap;
mod decomposer;
mod fft;
mod gates;
mod ggsw;
mod glwe;
mod keyswitch;
mod radix;

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use sampling::{Gaussian, Source};
use tracing::{debug, trace};

use crate::{
    backend::{Backend, Bivariate, KeyId, check_binding},
    encoding::Encoding,
    error::EngineError,
    layouts::{Degree, Parameters, TorusPrecision},
};

use self::{
    bootstrap::BootstrappingKey, decomposer::Decomposer, fft::ReimFFTTable, glwe::GlweSecret,
    keyswitch::KeySwitchingKey,
};

/// Torus encoding of a true bit; false is `-MU`.
pub(crate) const MU: u64 = 1 << 61;

/// Boolean TFHE over the 64-bit discretised torus.
///
/// Every bit of a `w + 1` bit two's-complement integer is an LWE ciphertext
/// `(a, b = <a, s> + m + e)` with `m = +-1/8`. Gates combine their inputs
/// linearly and bootstrap the result: the phase is blind-rotated through a
/// GLWE accumulator with the bootstrapping key, the sign is extracted, and
/// the sample is key-switched back to `s`. Integer operations are ripple
/// circuits of these gates.
///
/// Bits known in the clear (constants, clear arguments) stay trivial and
/// gates fold them away, so only gates whose inputs are all encrypted cost a
/// bootstrap.
///
/// Evaluation only touches the [LweEvaluationKey]; decryption needs the
/// [LweClientKey].
pub struct Lwe;

/// Rounded Gaussian noise placed at torus precision `k`.
pub(crate) struct TorusNoise {
    gaussian: Gaussian,
    shift: u32,
}

impl TorusNoise {
    pub(crate) fn new(gaussian: Gaussian, precision: u32) -> Self {
        Self {
            gaussian,
            shift: u64::BITS - precision,
        }
    }

    #[inline]
    pub(crate) fn sample(&self, source: &mut Source) -> u64 {
        (self.gaussian.sample(source) as u64) << self.shift
    }

    fn precision(&self) -> TorusPrecision {
        TorusPrecision(u64::BITS - self.shift)
    }

    fn scale(&self) -> f64 {
        (1u64 << self.shift) as f64
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LweSecret {
    data: Vec<i64>,
}

impl LweSecret {
    pub(crate) fn new(data: Vec<i64>) -> Self {
        Self { data }
    }

    pub fn n(&self) -> Degree {
        Degree(self.data.len() as u32)
    }

    pub(crate) fn data(&self) -> &[i64] {
        &self.data
    }

    #[inline]
    fn dot(&self, a: &[u64]) -> u64 {
        debug_assert_eq!(a.len(), self.data.len());
        a.iter()
            .zip(self.data.iter())
            .fold(0u64, |acc, (ai, si)| acc.wrapping_add(ai.wrapping_mul(*si as u64)))
    }

    /// `b - <a, s>`.
    pub(crate) fn phase(&self, ct: &LweCiphertext) -> u64 {
        ct.b.wrapping_sub(self.dot(&ct.a))
    }

    pub(crate) fn encrypt(
        &self,
        pt: u64,
        noise: &TorusNoise,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> LweCiphertext {
        let mut a: Vec<u64> = vec![0u64; self.data.len()];
        source_xa.fill_uniform(&mut a);
        let b: u64 = self
            .dot(&a)
            .wrapping_add(pt)
            .wrapping_add(noise.sample(source_xe));
        LweCiphertext { a, b }
    }
}

impl fmt::Debug for LweSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LweSecret(n={})", self.data.len())
    }
}

/// Secret half of an [Lwe] key set: encrypts and decrypts.
pub struct LweClientKey {
    sk: LweSecret,
    noise: TorusNoise,
    id: KeyId,
}

impl LweClientKey {
    pub fn secret(&self) -> &LweSecret {
        &self.sk
    }

    pub fn noise_precision(&self) -> TorusPrecision {
        self.noise.precision()
    }

    pub fn encrypt_bit(&self, bit: bool, source_xa: &mut Source, source_xe: &mut Source) -> LweCiphertext {
        self.sk.encrypt(encode_bit(bit), &self.noise, source_xa, source_xe)
    }

    pub fn decrypt_bit(&self, ct: &LweCiphertext) -> bool {
        (self.sk.phase(ct) as i64) > 0
    }

    /// Signed error of `ct` against the encoding of `bit`, in units of
    /// `2^-noise_precision`.
    pub fn noise(&self, ct: &LweCiphertext, bit: bool) -> f64 {
        let e: i64 = self.sk.phase(ct).wrapping_sub(encode_bit(bit)) as i64;
        e as f64 / self.noise.scale()
    }
}

impl fmt::Debug for LweClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LweClientKey")
            .field("n", &self.sk.data.len())
            .field("noise_precision", &self.noise.precision().0)
            .field("id", &self.id)
            .finish()
    }
}

/// Public half of an [Lwe] key set: the bootstrapping and key-switching keys.
pub struct LweEvaluationKey {
    bsk: BootstrappingKey,
    ksk: KeySwitchingKey,
    id: KeyId,
    bootstraps: AtomicU64,
}

impl LweEvaluationKey {
    pub fn lwe_dimension(&self) -> Degree {
        Degree(self.ksk.n_out() as u32)
    }

    pub fn glwe_degree(&self) -> Degree {
        Degree(self.bsk.n() as u32)
    }

    /// Number of gate bootstraps evaluated with this key so far.
    pub fn bootstraps(&self) -> u64 {
        self.bootstraps.load(Ordering::Relaxed)
    }

    /// Refreshes `ct` to `+-MU` according to the sign of its phase.
    pub(crate) fn bootstrap(&self, ct: &LweCiphertext) -> LweCiphertext {
        self.bootstraps.fetch_add(1, Ordering::Relaxed);
        let (a, b) = self.bsk.sign(ct);
        self.ksk.apply(&a, b)
    }
}

impl fmt::Debug for LweEvaluationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LweEvaluationKey")
            .field("n", &self.ksk.n_out())
            .field("glwe_degree", &self.bsk.n())
            .field("id", &self.id)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LweCiphertext {
    a: Vec<u64>,
    b: u64,
}

impl LweCiphertext {
    pub(crate) fn new(a: Vec<u64>, b: u64) -> Self {
        Self { a, b }
    }

    pub fn n(&self) -> Degree {
        Degree(self.a.len() as u32)
    }

    pub fn a(&self) -> &[u64] {
        &self.a
    }

    pub fn b(&self) -> u64 {
        self.b
    }
}

impl fmt::Debug for LweCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LweCiphertext(n={})", self.a.len())
    }
}

/// A circuit bit: public, or encrypted under the client key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LweBit {
    Trivial(bool),
    Encrypted(LweCiphertext),
}

impl LweBit {
    pub fn is_trivial(&self) -> bool {
        matches!(self, LweBit::Trivial(_))
    }
}

/// Two's-complement integer, one [LweBit] per bit, least significant first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LweInteger {
    bits: Vec<LweBit>,
    key: KeyId,
}

impl LweInteger {
    pub fn bits(&self) -> &[LweBit] {
        &self.bits
    }
}

#[inline]
fn encode_bit(bit: bool) -> u64 {
    if bit { MU } else { MU.wrapping_neg() }
}

impl Backend for Lwe {
    type ClientKey = LweClientKey;
    type EvaluationKey = LweEvaluationKey;
    type Ciphertext = LweInteger;

    const NAME: &'static str = "lwe";

    fn generate_keys(
        params: &Parameters,
        source_xs: &mut Source,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Result<(LweClientKey, LweEvaluationKey), EngineError> {
        params.validate().map_err(EngineError::KeyGen)?;

        let n: usize = params.lwe_dimension.into();
        let n_glwe: usize = params.glwe_degree.into();
        let gaussian: Gaussian = Gaussian::new(params.sigma, params.noise_bound())
            .map_err(|e| EngineError::KeyGen(format!("noise distribution: {e}")))?;
        let lwe_noise: TorusNoise = TorusNoise::new(gaussian, params.noise_precision.0);
        let glwe_noise: TorusNoise = TorusNoise::new(gaussian, params.glwe_noise_precision.0);

        let sk: LweSecret = LweSecret::new(params.secret.sample(n, source_xs));
        let table: ReimFFTTable = ReimFFTTable::new(n_glwe);
        let glwe_sk: GlweSecret = GlweSecret::new(params.glwe_secret.sample(n_glwe, source_xs), &table);
        let id: KeyId = KeyId::of_coefficients(sk.data(), source_xs.next_i64() as u64);

        trace!(n, n_glwe, key = %id, "sampled lwe and glwe secrets");

        let bsk: BootstrappingKey = BootstrappingKey::encrypt_sk(
            &sk,
            &glwe_sk,
            table,
            Decomposer::new(params.bsk_base2k, params.bsk_dnum),
            &glwe_noise,
            source_xa,
            source_xe,
        );
        let ksk: KeySwitchingKey = KeySwitchingKey::encrypt_sk(
            glwe_sk.data(),
            &sk,
            Decomposer::new(params.ksk_base2k, params.ksk_dnum),
            &lwe_noise,
            source_xa,
            source_xe,
        );

        debug!(
            n,
            n_glwe,
            bsk = %format!("{}x{}", params.bsk_base2k.0, params.bsk_dnum.0),
            ksk = %format!("{}x{}", params.ksk_base2k.0, params.ksk_dnum.0),
            key = %id,
            "generated evaluation key"
        );

        Ok((
            LweClientKey {
                sk,
                noise: lwe_noise,
                id,
            },
            LweEvaluationKey {
                bsk,
                ksk,
                id,
                bootstraps: AtomicU64::new(0),
            },
        ))
    }

    fn client_key_id(key: &LweClientKey) -> KeyId {
        key.id
    }

    fn evaluation_key_id(key: &LweEvaluationKey) -> KeyId {
        key.id
    }

    fn binding(ct: &LweInteger) -> KeyId {
        ct.key
    }

    fn encrypt(
        key: &LweClientKey,
        value: i64,
        encoding: &Encoding,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> LweInteger {
        LweInteger {
            bits: encoding
                .to_bits(value)
                .into_iter()
                .map(|bit| LweBit::Encrypted(key.encrypt_bit(bit, source_xa, source_xe)))
                .collect(),
            key: key.id,
        }
    }

    fn trivial(key: KeyId, value: i64, encoding: &Encoding) -> LweInteger {
        LweInteger {
            bits: encoding.to_bits(value).into_iter().map(LweBit::Trivial).collect(),
            key,
        }
    }

    fn add(key: &LweEvaluationKey, a: &LweInteger, b: &LweInteger, _encoding: &Encoding) -> LweInteger {
        LweInteger {
            bits: radix::add(key, &a.bits, &b.bits),
            key: a.key,
        }
    }

    fn sub(key: &LweEvaluationKey, a: &LweInteger, b: &LweInteger, _encoding: &Encoding) -> LweInteger {
        LweInteger {
            bits: radix::sub(key, &a.bits, &b.bits),
            key: a.key,
        }
    }

    fn mul_const(key: &LweEvaluationKey, a: &LweInteger, c: i64, encoding: &Encoding) -> LweInteger {
        LweInteger {
            bits: radix::mul_const(key, &a.bits, encoding.wrap(c)),
            key: a.key,
        }
    }

    fn bivariate(
        key: &LweEvaluationKey,
        op: Bivariate,
        a: &LweInteger,
        b: &LweInteger,
        encoding: &Encoding,
    ) -> Result<LweInteger, EngineError> {
        for ct in [a, b] {
            check_binding::<Lwe>(key.id, ct).map_err(|have| {
                EngineError::Evaluation(format!(
                    "ciphertext bound to key {have}, evaluation key is {}",
                    key.id
                ))
            })?;
            if ct.bits.len() != encoding.bits() {
                return Err(EngineError::Evaluation(format!(
                    "ciphertext has {} bits, circuit evaluates on {}",
                    ct.bits.len(),
                    encoding.bits()
                )));
            }
        }
        let bits: Vec<LweBit> = match op {
            Bivariate::Mul => radix::mul(key, &a.bits, &b.bits),
            Bivariate::Cmp(cmp) => radix::compare(key, cmp, &a.bits, &b.bits),
        };
        Ok(LweInteger { bits, key: key.id })
    }

    fn decrypt(key: &LweClientKey, ct: &LweInteger, encoding: &Encoding) -> Result<i64, EngineError> {
        check_binding::<Lwe>(key.id, ct).map_err(|have| {
            EngineError::Decryption(format!(
                "ciphertext was encrypted under key {have}, current key is {}",
                key.id
            ))
        })?;
        if ct.bits.len() != encoding.bits() {
            return Err(EngineError::Decryption(format!(
                "ciphertext has {} bits, expected {}",
                ct.bits.len(),
                encoding.bits()
            )));
        }
        let mut bits: Vec<bool> = Vec::with_capacity(ct.bits.len());
        for bit in ct.bits.iter() {
            match bit {
                LweBit::Trivial(b) => bits.push(*b),
                LweBit::Encrypted(c) => {
                    if c.a.len() != key.sk.data.len() {
                        return Err(EngineError::Decryption(format!(
                            "ciphertext dimension {} does not match key dimension {}",
                            c.a.len(),
                            key.sk.data.len()
                        )));
                    }
                    bits.push(key.decrypt_bit(c));
                }
            }
        }
        Ok(encoding.from_bits(&bits))
    }
}

/// Small parameters shared by the unit tests of this module.
#[cfg(test)]
pub(crate) fn test_keys(seed: u8) -> (LweClientKey, LweEvaluationKey) {
    use crate::layouts::{Base2K, Dnum};

    let params: Parameters = Parameters {
        lwe_dimension: Degree(32),
        noise_precision: TorusPrecision(40),
        glwe_degree: Degree(256),
        glwe_noise_precision: TorusPrecision(50),
        bsk_base2k: Base2K(8),
        bsk_dnum: Dnum(2),
        ksk_base2k: Base2K(4),
        ksk_dnum: Dnum(4),
        ..Parameters::default()
    };
    let mut source_xs: Source = Source::new([seed; 32]);
    let mut source_xa: Source = Source::new([seed.wrapping_add(1); 32]);
    let mut source_xe: Source = Source::new([seed.wrapping_add(2); 32]);
    Lwe::generate_keys(&params, &mut source_xs, &mut source_xa, &mut source_xe).unwrap()
}
