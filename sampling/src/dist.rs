use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::source::Source;

/// Distribution of the coefficients of a secret key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "param")]
pub enum Distribution {
    /// Binary in {0, 1} where each coefficient is 1 with probability `p`.
    BinaryProb(f64),
    /// Binary in {0, 1} with exactly `h` ones.
    BinaryFixed(usize),
    /// Ternary in {-1, 0, 1} where each coefficient is non-zero with probability `p`.
    TernaryProb(f64),
    /// Ternary in {-1, 0, 1} with exactly `h` non-zero coefficients.
    TernaryFixed(usize),
    /// All-zero secret (debug / testing only).
    Zero,
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::BinaryProb(0.5)
    }
}

impl Distribution {
    /// Whether every sampled coefficient is in {0, 1}.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Distribution::BinaryProb(_) | Distribution::BinaryFixed(_) | Distribution::Zero
        )
    }

    /// Checks the parameter against a secret of `n` coefficients.
    pub fn validate(&self, n: usize) -> Result<(), String> {
        match *self {
            Distribution::BinaryProb(p) | Distribution::TernaryProb(p) => {
                if !(0.0..=1.0).contains(&p) {
                    return Err(format!("probability {p} not in [0, 1]"));
                }
            }
            Distribution::BinaryFixed(h) | Distribution::TernaryFixed(h) => {
                if h > n {
                    return Err(format!("hamming weight {h} exceeds dimension {n}"));
                }
            }
            Distribution::Zero => {}
        }
        Ok(())
    }

    /// Samples `n` secret coefficients.
    pub fn sample(&self, n: usize, source: &mut Source) -> Vec<i64> {
        let mut data: Vec<i64> = vec![0i64; n];
        match *self {
            Distribution::BinaryProb(p) => {
                data.iter_mut()
                    .for_each(|x| *x = (source.next_f64(0.0, 1.0) < p) as i64);
            }
            Distribution::TernaryProb(p) => {
                data.iter_mut().for_each(|x| {
                    if source.next_f64(0.0, 1.0) < p {
                        *x = random_sign(source);
                    }
                });
            }
            Distribution::BinaryFixed(h) => {
                fixed_weight_positions(n, h, source)
                    .into_iter()
                    .for_each(|i| data[i] = 1);
            }
            Distribution::TernaryFixed(h) => {
                fixed_weight_positions(n, h, source)
                    .into_iter()
                    .for_each(|i| data[i] = random_sign(source));
            }
            Distribution::Zero => {}
        }
        data
    }
}

fn random_sign(source: &mut Source) -> i64 {
    ((source.next_u32() & 1) as i64) * 2 - 1
}

// Partial Fisher-Yates over the index set.
fn fixed_weight_positions(n: usize, h: usize, source: &mut Source) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    let mask: u64 = (n as u64).next_power_of_two() - 1;
    for i in 0..h.min(n) {
        let j: usize = i + source.next_u64n((n - i) as u64, mask) as usize;
        idx.swap(i, j);
    }
    idx.truncate(h.min(n));
    idx
}
