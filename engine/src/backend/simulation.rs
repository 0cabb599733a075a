use sampling::Source;

use crate::{
    backend::{Backend, Bivariate, KeyId, check_binding},
    encoding::Encoding,
    error::EngineError,
    layouts::Parameters,
};

/// Evaluates circuits on plain values with the same modular arithmetic as
/// [crate::Lwe].
///
/// Nothing is encrypted: a simulated ciphertext carries its value in the
/// clear and the client and evaluation keys are the same fingerprint. It
/// exists for fast functional checks. Ciphertexts still record the key set
/// they were produced under, so key lifecycle errors surface exactly as with
/// real encryption.
pub struct Simulation;

#[derive(Clone, Debug)]
pub struct SimulationKeys {
    id: KeyId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulatedCiphertext {
    value: i64,
    key: KeyId,
}

impl SimulatedCiphertext {
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl Backend for Simulation {
    type ClientKey = SimulationKeys;
    type EvaluationKey = SimulationKeys;
    type Ciphertext = SimulatedCiphertext;

    const NAME: &'static str = "simulation";

    fn generate_keys(
        params: &Parameters,
        source_xs: &mut Source,
        _source_xa: &mut Source,
        _source_xe: &mut Source,
    ) -> Result<(SimulationKeys, SimulationKeys), EngineError> {
        params.validate().map_err(EngineError::KeyGen)?;
        let data: Vec<i64> = params.secret.sample(params.lwe_dimension.into(), source_xs);
        let keys: SimulationKeys = SimulationKeys {
            id: KeyId::of_coefficients(&data, source_xs.next_i64() as u64),
        };
        Ok((keys.clone(), keys))
    }

    fn client_key_id(key: &SimulationKeys) -> KeyId {
        key.id
    }

    fn evaluation_key_id(key: &SimulationKeys) -> KeyId {
        key.id
    }

    fn binding(ct: &SimulatedCiphertext) -> KeyId {
        ct.key
    }

    fn encrypt(
        key: &SimulationKeys,
        value: i64,
        encoding: &Encoding,
        _source_xa: &mut Source,
        _source_xe: &mut Source,
    ) -> SimulatedCiphertext {
        Self::trivial(key.id, value, encoding)
    }

    fn trivial(key: KeyId, value: i64, encoding: &Encoding) -> SimulatedCiphertext {
        SimulatedCiphertext {
            value: encoding.wrap(value),
            key,
        }
    }

    fn add(
        _key: &SimulationKeys,
        a: &SimulatedCiphertext,
        b: &SimulatedCiphertext,
        encoding: &Encoding,
    ) -> SimulatedCiphertext {
        SimulatedCiphertext {
            value: encoding.wrap(a.value.wrapping_add(b.value)),
            key: a.key,
        }
    }

    fn sub(
        _key: &SimulationKeys,
        a: &SimulatedCiphertext,
        b: &SimulatedCiphertext,
        encoding: &Encoding,
    ) -> SimulatedCiphertext {
        SimulatedCiphertext {
            value: encoding.wrap(a.value.wrapping_sub(b.value)),
            key: a.key,
        }
    }

    fn mul_const(_key: &SimulationKeys, a: &SimulatedCiphertext, c: i64, encoding: &Encoding) -> SimulatedCiphertext {
        SimulatedCiphertext {
            value: encoding.wrap(a.value.wrapping_mul(c)),
            key: a.key,
        }
    }

    fn bivariate(
        key: &SimulationKeys,
        op: Bivariate,
        a: &SimulatedCiphertext,
        b: &SimulatedCiphertext,
        encoding: &Encoding,
    ) -> Result<SimulatedCiphertext, EngineError> {
        for ct in [a, b] {
            check_binding::<Simulation>(key.id, ct).map_err(|have| {
                EngineError::Evaluation(format!(
                    "ciphertext bound to key {have}, evaluation key is {}",
                    key.id
                ))
            })?;
        }
        Ok(SimulatedCiphertext {
            value: encoding.wrap(op.apply(a.value, b.value)),
            key: key.id,
        })
    }

    fn decrypt(key: &SimulationKeys, ct: &SimulatedCiphertext, _encoding: &Encoding) -> Result<i64, EngineError> {
        check_binding::<Simulation>(key.id, ct).map_err(|have| {
            EngineError::Decryption(format!(
                "value was produced under key {have}, current key is {}",
                key.id
            ))
        })?;
        Ok(ct.value)
    }
}
