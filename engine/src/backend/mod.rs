mod lwe;
mod simulation;

pub use lwe::*;
pub use simulation::*;

use std::{fmt, hash::Hasher};

use fnv::FnvHasher;
use sampling::Source;

use crate::{encoding::Encoding, error::EngineError, layouts::Parameters, trace::CmpOp};

/// Fingerprint of a key set. Every ciphertext records the fingerprint of
/// the keys that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(pub u64);

impl KeyId {
    pub fn of_coefficients(data: &[i64], salt: u64) -> Self {
        let mut hasher: FnvHasher = FnvHasher::default();
        hasher.write_u64(salt);
        data.iter().for_each(|x| hasher.write_i64(*x));
        KeyId(hasher.finish())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Non-linear operations, evaluated by bootstrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bivariate {
    Mul,
    Cmp(CmpOp),
}

impl Bivariate {
    #[inline]
    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Bivariate::Mul => a.wrapping_mul(b),
            Bivariate::Cmp(cmp) => cmp.apply(a, b),
        }
    }
}

/// Ciphertext representation and primitive operations of an evaluation
/// backend.
///
/// Key material is split in two. The client key encrypts and decrypts and
/// never leaves the data owner. The evaluation key is all an evaluating
/// party receives: every homomorphic operation takes it, and nothing in it
/// can decrypt.
pub trait Backend: Sized + Send + Sync + 'static {
    type ClientKey: Send + Sync;
    type EvaluationKey: Send + Sync;
    type Ciphertext: Clone + fmt::Debug + Send + Sync;

    const NAME: &'static str;

    fn generate_keys(
        params: &Parameters,
        source_xs: &mut Source,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Result<(Self::ClientKey, Self::EvaluationKey), EngineError>;

    fn client_key_id(key: &Self::ClientKey) -> KeyId;

    fn evaluation_key_id(key: &Self::EvaluationKey) -> KeyId;

    /// Fingerprint of the keys `ct` was produced under.
    fn binding(ct: &Self::Ciphertext) -> KeyId;

    fn encrypt(
        key: &Self::ClientKey,
        value: i64,
        encoding: &Encoding,
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Self::Ciphertext;

    /// Noiseless encryption of a public value.
    fn trivial(key: KeyId, value: i64, encoding: &Encoding) -> Self::Ciphertext;

    fn add(
        key: &Self::EvaluationKey,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
        encoding: &Encoding,
    ) -> Self::Ciphertext;

    fn sub(
        key: &Self::EvaluationKey,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
        encoding: &Encoding,
    ) -> Self::Ciphertext;

    fn mul_const(key: &Self::EvaluationKey, a: &Self::Ciphertext, c: i64, encoding: &Encoding) -> Self::Ciphertext;

    /// Evaluates `op(a, b)`. Both operands must be bound to `key`.
    fn bivariate(
        key: &Self::EvaluationKey,
        op: Bivariate,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
        encoding: &Encoding,
    ) -> Result<Self::Ciphertext, EngineError>;

    fn decrypt(key: &Self::ClientKey, ct: &Self::Ciphertext, encoding: &Encoding) -> Result<i64, EngineError>;
}

pub(crate) fn check_binding<B: Backend>(key: KeyId, ct: &B::Ciphertext) -> Result<(), KeyId> {
    let have: KeyId = B::binding(ct);
    if have == key { Ok(()) } else { Err(have) }
}
