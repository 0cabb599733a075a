//! Classification of the dominant oscillation band of a set of
//! (power, frequency) samples, evaluated over encrypted integers.
//!
//! Samples are first mapped to a 16-bit integer domain ([scale]). The
//! classification circuit ([classify_dominant_band]) then finds the frequency
//! of the strongest sample ([reduce]) and maps it to a [Band] ([classify]),
//! using only additions, products and comparisons so that no step branches
//! on sample values. A [Session] runs the circuit under encryption.

mod argmax;
mod band;
mod circuit;
pub mod config;
mod error;
pub mod logging;
mod pipeline;
mod samples;
mod scale;

pub use argmax::*;
pub use band::*;
pub use circuit::*;
pub use config::{BackendKind, Config, ConfigError};
pub use error::*;
pub use logging::{LogConfig, LogError, LogFormat, init_logging};
pub use pipeline::*;
pub use samples::*;
pub use scale::*;
