//! Homomorphic evaluation of branch-free integer circuits.
//!
//! A circuit is written once against the [Integer] trait. The [Compiler]
//! traces it into a data-flow [Graph], infers the integer width every
//! intermediate value needs from a representative input set, and produces
//! a [Circuit] bound to a [Backend]. The compiled circuit then drives the
//! key generation, encryption, evaluation and decryption lifecycle.

pub mod backend;
mod circuit;
mod compiler;
mod encoding;
mod error;
mod integer;
mod layouts;
mod trace;

#[cfg(test)]
mod tests;

pub use backend::{
    Backend, Bivariate, KeyId, Lwe, LweBit, LweCiphertext, LweClientKey, LweEvaluationKey, LweInteger, LweSecret,
    SimulatedCiphertext, Simulation, SimulationKeys,
};
pub use circuit::*;
pub use compiler::*;
pub use encoding::*;
pub use error::*;
pub use integer::*;
pub use layouts::*;
pub use trace::*;

pub use sampling::{Distribution, SIGMA, SIX_SIGMA, Source};
