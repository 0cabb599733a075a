use std::fmt;

use engine::{Backend, Circuit, Compiler, Value};
use tracing::{debug, error, info, info_span};

use crate::{
    band::Band,
    circuit::DominantBand,
    config::Config,
    error::{PipelineError, Stage},
    samples::{RangePolicy, SampleSet},
};

/// Decrypted outcome of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub ordinal: i64,
    pub band: Option<Band>,
}

impl Classification {
    pub fn from_ordinal(ordinal: i64) -> Self {
        Self {
            ordinal,
            band: Band::from_ordinal(ordinal),
        }
    }

    /// Band name, or `"Unknown"` for an ordinal outside `0..=4`.
    pub fn name(&self) -> &'static str {
        self.band.map(Band::name).unwrap_or("Unknown")
    }

    /// The line printed for this result.
    pub fn render(&self) -> String {
        match self.band {
            Some(band) => format!("Classified Brainwave: {band}"),
            None => "Brainwave Type: Unknown".to_string(),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checks that a decrypted ordinal names a band.
pub fn interpret(ordinal: i64) -> Result<Classification, PipelineError> {
    let classification: Classification = Classification::from_ordinal(ordinal);
    if classification.band.is_none() {
        error!(ordinal, "decrypted ordinal is not a band");
        return Err(PipelineError::Inconsistent { ordinal });
    }
    Ok(classification)
}

/// Compiles the dominant-band circuit for the configured input set.
pub fn compile<B: Backend>(config: &Config) -> Result<Circuit<B>, PipelineError> {
    let inputset: Vec<Vec<Vec<i64>>> = config
        .inputset
        .sample_sets()?
        .iter()
        .map(SampleSet::to_args)
        .collect();
    info!(stage = %Stage::Compile, backend = B::NAME, samples = inputset.len(), "compiling");
    let circuit: Circuit<B> = Compiler::new(DominantBand, &DominantBand::encryption_statuses())
        .with_parameters(config.engine.parameters.clone())
        .compile(&inputset)
        .map_err(PipelineError::at(Stage::Compile))?;
    debug!(
        shapes = ?circuit.shapes(),
        width = circuit.encoding().width().0,
        statistics = ?circuit.statistics(),
        "compiled"
    );
    Ok(circuit)
}

/// A compiled classification circuit together with its key material.
///
/// Opening a session compiles and generates keys; [Session::close] releases
/// them. The session plays both parties: it encrypts and decrypts with the
/// client key, and hands evaluation to a copy of the circuit that holds the
/// evaluation key only. Classifications only need `&self` and may run from
/// several threads at once.
pub struct Session<B: Backend> {
    circuit: Circuit<B>,
    evaluator: Circuit<B>,
    range_policy: RangePolicy,
}

impl<B: Backend> Session<B> {
    pub fn open(config: &Config) -> Result<Self, PipelineError> {
        Self::with_circuit(compile::<B>(config)?, config)
    }

    /// Generates keys for an already compiled circuit.
    pub fn with_circuit(mut circuit: Circuit<B>, config: &Config) -> Result<Self, PipelineError> {
        info!(stage = %Stage::KeyGen, backend = B::NAME, "generating keys");
        circuit.keygen().map_err(PipelineError::at(Stage::KeyGen))?;
        let evaluator: Circuit<B> = circuit.evaluator().map_err(PipelineError::at(Stage::KeyGen))?;
        Ok(Self {
            circuit,
            evaluator,
            range_policy: config.input.range_policy,
        })
    }

    /// The client side: holds the client key.
    pub fn circuit(&self) -> &Circuit<B> {
        &self.circuit
    }

    /// The evaluating side: holds the evaluation key and nothing else.
    pub fn evaluator(&self) -> &Circuit<B> {
        &self.evaluator
    }

    pub fn range_policy(&self) -> RangePolicy {
        self.range_policy
    }

    /// Number of samples the circuit was compiled for.
    pub fn sample_len(&self) -> usize {
        self.circuit.shapes()[0]
    }

    pub fn encrypt(&self, samples: &SampleSet) -> Result<Vec<Value<B>>, PipelineError> {
        debug!(stage = %Stage::Encrypt, n = samples.len());
        self.circuit
            .encrypt(&samples.to_args())
            .map_err(PipelineError::at(Stage::Encrypt))
    }

    pub fn evaluate(&self, args: &[Value<B>]) -> Result<Value<B>, PipelineError> {
        debug!(stage = %Stage::Evaluate);
        self.evaluator.run(args).map_err(PipelineError::at(Stage::Evaluate))
    }

    pub fn decrypt(&self, result: &Value<B>) -> Result<Classification, PipelineError> {
        debug!(stage = %Stage::Decrypt);
        let ordinal: i64 = self
            .circuit
            .decrypt(result)
            .map_err(PipelineError::at(Stage::Decrypt))?;
        interpret(ordinal)
    }

    /// Encrypts, evaluates and decrypts one sample set.
    pub fn classify(&self, samples: &SampleSet) -> Result<Classification, PipelineError> {
        let _span = info_span!("classify", backend = B::NAME, n = samples.len()).entered();
        let args: Vec<Value<B>> = self.encrypt(samples)?;
        let result: Value<B> = self.evaluate(&args)?;
        let classification: Classification = self.decrypt(&result)?;
        info!(band = classification.name(), "classified");
        Ok(classification)
    }

    /// Scales raw values under the session's range policy, then classifies.
    pub fn classify_hz(&self, powers: &[f64], frequencies: &[f64]) -> Result<Classification, PipelineError> {
        let samples: SampleSet = SampleSet::from_hz(powers, frequencies, self.range_policy)?;
        self.classify(&samples)
    }

    /// Replaces the key material. Values encrypted before fail to evaluate
    /// or decrypt afterwards.
    pub fn regenerate_keys(&mut self) -> Result<(), PipelineError> {
        info!(stage = %Stage::KeyGen, "regenerating keys");
        self.circuit
            .keygen_force()
            .map_err(PipelineError::at(Stage::KeyGen))?;
        self.evaluator = self.circuit.evaluator().map_err(PipelineError::at(Stage::KeyGen))?;
        Ok(())
    }

    /// Drops the circuit and key material.
    pub fn close(self) {
        info!(backend = B::NAME, "session closed");
    }
}
