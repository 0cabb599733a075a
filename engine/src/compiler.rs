use std::marker::PhantomData;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::{
    backend::Backend,
    circuit::{Circuit, Param, Statistics},
    encoding::Encoding,
    error::{CompilationError, EngineError},
    integer::Integer,
    layouts::{Parameters, Width},
    trace::{Graph, trace},
};

/// Whether an argument is supplied encrypted or in the clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionStatus {
    Encrypted,
    Clear,
}

/// A circuit body: a function of integer arrays written only with
/// [Integer] operations.
pub trait CircuitFn {
    /// Names of the array arguments, in order.
    fn parameters(&self) -> &[&'static str];

    fn evaluate<T: Integer>(&self, args: &[Vec<T>]) -> T;
}

/// Turns a [CircuitFn] into an executable [Circuit].
pub struct Compiler<F: CircuitFn> {
    circuit_fn: F,
    statuses: Vec<(String, EncryptionStatus)>,
    parameters: Parameters,
}

impl<F: CircuitFn> Compiler<F> {
    pub fn new(circuit_fn: F, statuses: &[(&str, EncryptionStatus)]) -> Self {
        Self {
            circuit_fn,
            statuses: statuses
                .iter()
                .map(|(name, status)| (name.to_string(), *status))
                .collect(),
            parameters: Parameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn circuit_fn(&self) -> &F {
        &self.circuit_fn
    }

    /// Traces the circuit body and sizes its integers so that every
    /// intermediate value of every sample of `inputset` is representable.
    ///
    /// Each sample holds one array per parameter. All samples must agree on
    /// the argument count and on every array length; the compiled circuit
    /// accepts exactly those shapes.
    pub fn compile<B: Backend>(&self, inputset: &[Vec<Vec<i64>>]) -> Result<Circuit<B>, EngineError> {
        let _span = info_span!("compile", backend = B::NAME, samples = inputset.len()).entered();

        self.parameters
            .validate()
            .map_err(CompilationError::InvalidParameters)?;

        let names: &[&'static str] = self.circuit_fn.parameters();
        let params: Vec<Param> = self.resolve_statuses(names)?;
        let shapes: Vec<usize> = check_inputset(names, inputset)?;

        let (graph, output) = trace(&shapes, |args| self.circuit_fn.evaluate(args));
        let (graph, output) = graph.prune(output);

        let width: Width = infer_width(&graph, inputset);
        debug!(nodes = graph.len(), width = width.0, "traced circuit");
        if width > self.parameters.max_width {
            return Err(CompilationError::WidthExceeded {
                required: width.0,
                max: self.parameters.max_width.0,
            }
            .into());
        }

        let statistics: Statistics = Statistics::of(&graph, output);
        debug!(?statistics, "compiled");

        Ok(Circuit {
            graph,
            output,
            params: params
                .into_iter()
                .zip(shapes)
                .map(|(p, len)| Param { len, ..p })
                .collect(),
            encoding: Encoding::new(width),
            parameters: self.parameters.clone(),
            statistics,
            client_key: None,
            evaluation_key: None,
            _backend: PhantomData,
        })
    }

    fn resolve_statuses(&self, names: &[&'static str]) -> Result<Vec<Param>, CompilationError> {
        if let Some((unknown, _)) = self
            .statuses
            .iter()
            .find(|(name, _)| !names.contains(&name.as_str()))
        {
            return Err(CompilationError::UnknownParameter(unknown.clone()));
        }
        names
            .iter()
            .map(|name| {
                self.statuses
                    .iter()
                    .find(|(n, _)| n.as_str() == *name)
                    .map(|(_, status)| Param {
                        name: name.to_string(),
                        status: *status,
                        len: 0,
                    })
                    .ok_or_else(|| CompilationError::MissingStatus(name.to_string()))
            })
            .collect()
    }
}

/// Returns the argument shapes shared by every sample.
fn check_inputset(names: &[&'static str], inputset: &[Vec<Vec<i64>>]) -> Result<Vec<usize>, CompilationError> {
    let first: &Vec<Vec<i64>> = inputset.first().ok_or(CompilationError::EmptyInputset)?;
    let shapes: Vec<usize> = first.iter().map(Vec::len).collect();

    for (sample, args) in inputset.iter().enumerate() {
        if args.len() != names.len() {
            return Err(CompilationError::ArgumentCount {
                sample,
                expected: names.len(),
                got: args.len(),
            });
        }
        for ((name, arg), expected) in names.iter().zip_eq(args.iter()).zip(shapes.iter()) {
            if arg.len() != *expected {
                return Err(CompilationError::InconsistentShape {
                    sample,
                    param: name.to_string(),
                    expected: *expected,
                    got: arg.len(),
                });
            }
        }
    }

    if let Some((name, _)) = names.iter().zip(shapes.iter()).find(|(_, len)| **len == 0) {
        return Err(CompilationError::EmptyArgument(name.to_string()));
    }

    Ok(shapes)
}

/// Widest signed width taken by any node over `inputset`.
fn infer_width(graph: &Graph, inputset: &[Vec<Vec<i64>>]) -> Width {
    let mut bounds: Vec<(i64, i64)> = vec![(0, 0); graph.len()];
    for sample in inputset {
        graph
            .eval(sample)
            .into_iter()
            .zip(bounds.iter_mut())
            .for_each(|(v, (min, max))| {
                *min = (*min).min(v);
                *max = (*max).max(v);
            });
    }
    bounds
        .into_iter()
        .map(|(min, max)| Width::of_range(min, max))
        .max()
        .unwrap_or(Width(1))
}
