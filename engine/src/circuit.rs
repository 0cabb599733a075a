use std::{fmt, marker::PhantomData, sync::Arc};

use sampling::{Source, new_seed};
use tracing::{debug, debug_span, info};

use crate::{
    backend::{Backend, Bivariate, KeyId, check_binding},
    compiler::EncryptionStatus,
    encoding::Encoding,
    error::EngineError,
    layouts::Parameters,
    trace::{Graph, NodeId, Op},
};

/// A compiled circuit argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub status: EncryptionStatus,
    pub len: usize,
}

/// Operation counts of a compiled circuit. They depend on the argument
/// shapes only, never on argument values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub nodes: usize,
    pub inputs: usize,
    pub constants: usize,
    /// Additions, subtractions and products with a constant.
    pub linear: usize,
    /// Comparisons and ciphertext-ciphertext products.
    pub nonlinear: usize,
    /// Longest chain of non-linear operations from an input to the output.
    pub depth: usize,
}

impl Statistics {
    pub(crate) fn of(graph: &Graph, output: NodeId) -> Self {
        let mut stats: Statistics = Statistics {
            nodes: graph.len(),
            ..Default::default()
        };
        let mut depth: Vec<usize> = vec![0; graph.len()];
        for (id, op) in graph.nodes().iter().enumerate() {
            match *op {
                Op::Input { .. } => stats.inputs += 1,
                Op::Const(_) => stats.constants += 1,
                Op::Add(a, b) | Op::Sub(a, b) => {
                    stats.linear += 1;
                    depth[id] = depth[a].max(depth[b]);
                }
                Op::Mul(a, b) if graph.constant(a).is_some() || graph.constant(b).is_some() => {
                    stats.linear += 1;
                    depth[id] = depth[a].max(depth[b]);
                }
                Op::Mul(a, b) | Op::Cmp(_, a, b) => {
                    stats.nonlinear += 1;
                    depth[id] = depth[a].max(depth[b]) + 1;
                }
            }
        }
        stats.depth = depth.get(output).copied().unwrap_or(0);
        stats
    }
}

/// Ciphertexts of one argument or of the result.
pub struct Value<B: Backend> {
    cts: Vec<B::Ciphertext>,
}

impl<B: Backend> Value<B> {
    pub fn len(&self) -> usize {
        self.cts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cts.is_empty()
    }

    pub fn ciphertexts(&self) -> &[B::Ciphertext] {
        &self.cts
    }
}

impl<B: Backend> Clone for Value<B> {
    fn clone(&self) -> Self {
        Self {
            cts: self.cts.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for Value<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("backend", &B::NAME)
            .field("cts", &self.cts)
            .finish()
    }
}

/// A traced, width-checked circuit ready for encrypted evaluation.
///
/// Lifecycle: [Circuit::keygen], then any number of
/// [Circuit::encrypt] / [Circuit::run] / [Circuit::decrypt] rounds. The
/// circuit and its keys are immutable between key generations, so rounds may
/// run concurrently from shared references.
///
/// Keygen produces a client key, which encrypts and decrypts, and an
/// evaluation key, which is the only key [Circuit::run] touches. An
/// evaluating party holds a copy of the circuit with the evaluation key alone
/// (see [Circuit::set_evaluation_key]) and can neither encrypt nor decrypt.
pub struct Circuit<B: Backend> {
    pub(crate) graph: Graph,
    pub(crate) output: NodeId,
    pub(crate) params: Vec<Param>,
    pub(crate) encoding: Encoding,
    pub(crate) parameters: Parameters,
    pub(crate) statistics: Statistics,
    pub(crate) client_key: Option<B::ClientKey>,
    pub(crate) evaluation_key: Option<Arc<B::EvaluationKey>>,
    pub(crate) _backend: PhantomData<B>,
}

impl<B: Backend> Circuit<B> {
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn shapes(&self) -> Vec<usize> {
        self.params.iter().map(|p| p.len).collect()
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn client_key(&self) -> Option<&B::ClientKey> {
        self.client_key.as_ref()
    }

    pub fn evaluation_key(&self) -> Option<&Arc<B::EvaluationKey>> {
        self.evaluation_key.as_ref()
    }

    pub fn key_id(&self) -> Option<KeyId> {
        match (&self.client_key, &self.evaluation_key) {
            (Some(ck), _) => Some(B::client_key_id(ck)),
            (None, Some(ek)) => Some(B::evaluation_key_id(ek)),
            (None, None) => None,
        }
    }

    /// Generates key material unless a client key already exists.
    pub fn keygen(&mut self) -> Result<(), EngineError> {
        if self.client_key.is_some() {
            return Ok(());
        }
        self.keygen_force()
    }

    /// Replaces key material. Values produced under the previous keys can no
    /// longer be evaluated or decrypted.
    pub fn keygen_force(&mut self) -> Result<(), EngineError> {
        self.keygen_with_seed(new_seed())
    }

    /// Deterministic key generation from `seed`.
    pub fn keygen_with_seed(&mut self, seed: [u8; 32]) -> Result<(), EngineError> {
        let mut source: Source = Source::new(seed);
        let (_, mut source_xs) = source.branch();
        let (_, mut source_xa) = source.branch();
        let (_, mut source_xe) = source.branch();
        let (ck, ek) = B::generate_keys(&self.parameters, &mut source_xs, &mut source_xa, &mut source_xe)?;
        info!(backend = B::NAME, key = %B::client_key_id(&ck), "generated keys");
        self.client_key = Some(ck);
        self.evaluation_key = Some(Arc::new(ek));
        Ok(())
    }

    /// Installs an evaluation key received from a client, dropping any
    /// client key this circuit held.
    pub fn set_evaluation_key(&mut self, key: Arc<B::EvaluationKey>) {
        debug!(backend = B::NAME, key = %B::evaluation_key_id(&key), "installed evaluation key");
        self.client_key = None;
        self.evaluation_key = Some(key);
    }

    /// Copy of this circuit for an evaluating party: same graph, evaluation
    /// key only.
    pub fn evaluator(&self) -> Result<Circuit<B>, EngineError> {
        let key: &Arc<B::EvaluationKey> = self.evaluation_key.as_ref().ok_or(EngineError::MissingKeys)?;
        Ok(Circuit {
            graph: self.graph.clone(),
            output: self.output,
            params: self.params.clone(),
            encoding: self.encoding,
            parameters: self.parameters.clone(),
            statistics: self.statistics,
            client_key: None,
            evaluation_key: Some(Arc::clone(key)),
            _backend: PhantomData,
        })
    }

    fn client_key_or_missing(&self) -> Result<&B::ClientKey, EngineError> {
        self.client_key.as_ref().ok_or(EngineError::MissingKeys)
    }

    fn evaluation_key_or_missing(&self) -> Result<&B::EvaluationKey, EngineError> {
        self.evaluation_key.as_deref().ok_or(EngineError::MissingKeys)
    }

    fn check_arity(&self, got: usize) -> Result<(), EngineError> {
        if got != self.params.len() {
            return Err(EngineError::ArgumentCount {
                expected: self.params.len(),
                got,
            });
        }
        Ok(())
    }

    fn check_shape(&self, param: &Param, got: usize) -> Result<(), EngineError> {
        if got != param.len {
            return Err(EngineError::ShapeMismatch {
                param: param.name.clone(),
                expected: param.len,
                got,
            });
        }
        Ok(())
    }

    /// Encrypts one array per parameter with fresh randomness.
    pub fn encrypt(&self, args: &[Vec<i64>]) -> Result<Vec<Value<B>>, EngineError> {
        let mut source: Source = Source::from_entropy();
        let (_, mut source_xa) = source.branch();
        let (_, mut source_xe) = source.branch();
        self.encrypt_with(args, &mut source_xa, &mut source_xe)
    }

    pub fn encrypt_with(
        &self,
        args: &[Vec<i64>],
        source_xa: &mut Source,
        source_xe: &mut Source,
    ) -> Result<Vec<Value<B>>, EngineError> {
        let key: &B::ClientKey = self.client_key_or_missing()?;
        let key_id: KeyId = B::client_key_id(key);
        self.check_arity(args.len())?;

        self.params
            .iter()
            .zip(args.iter())
            .map(|(param, arg)| {
                self.check_shape(param, arg.len())?;
                if let Some(value) = arg.iter().find(|v| !self.encoding.fits(**v)) {
                    return Err(EngineError::ValueOutOfRange {
                        param: param.name.clone(),
                        value: *value,
                        width: self.encoding.width().0,
                    });
                }
                let cts: Vec<B::Ciphertext> = arg
                    .iter()
                    .map(|v| match param.status {
                        EncryptionStatus::Encrypted => B::encrypt(key, *v, &self.encoding, source_xa, source_xe),
                        EncryptionStatus::Clear => B::trivial(key_id, *v, &self.encoding),
                    })
                    .collect();
                Ok(Value { cts })
            })
            .collect()
    }

    /// Evaluates the circuit on encrypted arguments with the installed
    /// evaluation key. Every node is evaluated on every call, whatever the
    /// argument values.
    pub fn run(&self, args: &[Value<B>]) -> Result<Value<B>, EngineError> {
        let key: &B::EvaluationKey = self.evaluation_key_or_missing()?;
        self.run_with(key, args)
    }

    /// Evaluates the circuit with `key`. No client key is involved.
    pub fn run_with(&self, key: &B::EvaluationKey, args: &[Value<B>]) -> Result<Value<B>, EngineError> {
        let key_id: KeyId = B::evaluation_key_id(key);
        self.check_arity(args.len())?;
        for (param, arg) in self.params.iter().zip(args.iter()) {
            self.check_shape(param, arg.len())?;
            for ct in arg.cts.iter() {
                check_binding::<B>(key_id, ct).map_err(|have| {
                    EngineError::Evaluation(format!(
                        "argument `{}` was encrypted under key {have}, evaluation key is {key_id}",
                        param.name,
                    ))
                })?;
            }
        }

        let _span = debug_span!("run", backend = B::NAME, nodes = self.graph.len()).entered();

        let enc: &Encoding = &self.encoding;
        let mut values: Vec<B::Ciphertext> = Vec::with_capacity(self.graph.len());
        for op in self.graph.nodes() {
            let ct: B::Ciphertext = match *op {
                Op::Input { param, index } => args[param].cts[index].clone(),
                Op::Const(c) => B::trivial(key_id, c, enc),
                Op::Add(a, b) => B::add(key, &values[a], &values[b], enc),
                Op::Sub(a, b) => B::sub(key, &values[a], &values[b], enc),
                Op::Mul(a, b) => match (self.graph.constant(a), self.graph.constant(b)) {
                    (Some(c), _) => B::mul_const(key, &values[b], c, enc),
                    (_, Some(c)) => B::mul_const(key, &values[a], c, enc),
                    (None, None) => B::bivariate(key, Bivariate::Mul, &values[a], &values[b], enc)?,
                },
                Op::Cmp(cmp, a, b) => B::bivariate(key, Bivariate::Cmp(cmp), &values[a], &values[b], enc)?,
            };
            values.push(ct);
        }

        let out: B::Ciphertext = values
            .into_iter()
            .nth(self.output)
            .ok_or_else(|| EngineError::Evaluation(format!("output node {} was not evaluated", self.output)))?;
        debug!("evaluated");
        Ok(Value { cts: vec![out] })
    }

    /// Decrypts a scalar result.
    pub fn decrypt(&self, value: &Value<B>) -> Result<i64, EngineError> {
        let key: &B::ClientKey = self.client_key_or_missing()?;
        match value.cts.as_slice() {
            [ct] => B::decrypt(key, ct, &self.encoding),
            cts => Err(EngineError::Decryption(format!(
                "expected a scalar value, got {} ciphertexts",
                cts.len()
            ))),
        }
    }

    /// Decrypts every ciphertext of `value`.
    pub fn decrypt_array(&self, value: &Value<B>) -> Result<Vec<i64>, EngineError> {
        let key: &B::ClientKey = self.client_key_or_missing()?;
        value
            .cts
            .iter()
            .map(|ct| B::decrypt(key, ct, &self.encoding))
            .collect()
    }

    /// Plain evaluation with the circuit's modular arithmetic.
    pub fn simulate(&self, args: &[Vec<i64>]) -> Result<i64, EngineError> {
        self.check_arity(args.len())?;
        for (param, arg) in self.params.iter().zip(args.iter()) {
            self.check_shape(param, arg.len())?;
        }
        let values: Vec<i64> = self.graph.eval(args);
        Ok(self.encoding.wrap(values[self.output]))
    }
}
