mod compile;
mod evaluation;
mod lifecycle;

pub use compile::*;
pub use evaluation::*;
pub use lifecycle::*;

use crate::{Base2K, CircuitFn, Degree, Distribution, Dnum, Integer, Parameters, TorusPrecision, Width};

/// Small, insecure parameters that keep gate bootstrapping fast in tests.
pub(crate) static TEST_PARAMETERS: Parameters = Parameters {
    lwe_dimension: Degree(32),
    noise_precision: TorusPrecision(40),
    sigma: 3.2,
    secret: Distribution::BinaryProb(0.5),
    glwe_degree: Degree(256),
    glwe_noise_precision: TorusPrecision(50),
    glwe_secret: Distribution::BinaryProb(0.5),
    bsk_base2k: Base2K(8),
    bsk_dnum: Dnum(2),
    ksk_base2k: Base2K(4),
    ksk_dnum: Dnum(4),
    max_width: Width(32),
};

/// Running maximum with branch-free selection, starting from zero.
pub(crate) struct SelectMax;

impl CircuitFn for SelectMax {
    fn parameters(&self) -> &[&'static str] {
        &["xs"]
    }

    fn evaluate<T: Integer>(&self, args: &[Vec<T>]) -> T {
        let xs: &[T] = &args[0];
        let mut acc: T = xs[0].constant_like(0);
        for x in xs {
            let c: T = x.is_gt(&acc);
            acc = acc.clone() + c * (x.clone() - acc);
        }
        acc
    }
}

/// `sum(x * y + 3 * x - [x >= y])`.
pub(crate) struct WeightedSum;

impl CircuitFn for WeightedSum {
    fn parameters(&self) -> &[&'static str] {
        &["xs", "ys"]
    }

    fn evaluate<T: Integer>(&self, args: &[Vec<T>]) -> T {
        let (xs, ys) = (&args[0], &args[1]);
        let three: T = xs[0].constant_like(3);
        xs.iter()
            .zip(ys.iter())
            .map(|(x, y)| x.clone() * y.clone() + three.clone() * x.clone() - x.is_ge(y))
            .fold(xs[0].constant_like(0), |acc, t| acc + t)
    }
}

pub(crate) const WEIGHTED_SUM_LEN: usize = 4;
pub(crate) const WEIGHTED_SUM_BOUND: i64 = 20;

/// Samples holding the sign extremes of [WeightedSum].
pub(crate) fn weighted_sum_inputset() -> Vec<Vec<Vec<i64>>> {
    let (n, m) = (WEIGHTED_SUM_LEN, WEIGHTED_SUM_BOUND);
    [(m, m), (-m, m), (m, -m), (-m, -m)]
        .into_iter()
        .map(|(x, y)| vec![vec![x; n], vec![y; n]])
        .collect()
}
