use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::InvalidInput,
    scale::{scale, try_scale},
};

/// Handling of sample values outside `[0, 100)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Fail with [InvalidInput::OutOfRange].
    #[default]
    Reject,
    /// Scale anyway. Values past the compiled range then fail at encryption,
    /// values the circuit accepts classify as documented (Delta alias).
    Passthrough,
}

/// Index-aligned, non-empty arrays of scaled powers and frequencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    powers: Vec<i64>,
    frequencies: Vec<i64>,
}

impl SampleSet {
    /// Wraps already-scaled arrays.
    pub fn new(powers: Vec<i64>, frequencies: Vec<i64>) -> Result<Self, InvalidInput> {
        check_lengths(powers.len(), frequencies.len())?;
        Ok(Self { powers, frequencies })
    }

    /// Scales raw values given in Hz (frequencies) and in the same 0..100
    /// units (powers).
    pub fn from_hz(powers: &[f64], frequencies: &[f64], policy: RangePolicy) -> Result<Self, InvalidInput> {
        check_lengths(powers.len(), frequencies.len())?;
        let convert = |values: &[f64]| -> Result<Vec<i64>, InvalidInput> {
            values
                .iter()
                .map(|v| match policy {
                    RangePolicy::Reject => try_scale(*v),
                    RangePolicy::Passthrough if v.is_finite() => Ok(scale(*v)),
                    RangePolicy::Passthrough => Err(InvalidInput::NotFinite),
                })
                .collect()
        };
        let powers: Vec<i64> = convert(powers)?;
        let frequencies: Vec<i64> = convert(frequencies)?;

        if policy == RangePolicy::Passthrough {
            let outside: usize = powers
                .iter()
                .chain(frequencies.iter())
                .filter(|v| !(0..crate::scale::SCALE_MAX).contains(*v))
                .count();
            if outside > 0 {
                warn!(outside, "samples outside [0, 100) passed through");
            }
        }

        Ok(Self { powers, frequencies })
    }

    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn powers(&self) -> &[i64] {
        &self.powers
    }

    pub fn frequencies(&self) -> &[i64] {
        &self.frequencies
    }

    /// Circuit arguments, in parameter order.
    pub fn to_args(&self) -> Vec<Vec<i64>> {
        vec![self.powers.clone(), self.frequencies.clone()]
    }
}

fn check_lengths(powers: usize, frequencies: usize) -> Result<(), InvalidInput> {
    if powers != frequencies {
        return Err(InvalidInput::LengthMismatch { powers, frequencies });
    }
    if powers == 0 {
        return Err(InvalidInput::Empty);
    }
    Ok(())
}
