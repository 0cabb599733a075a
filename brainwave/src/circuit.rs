use engine::{CircuitFn, EncryptionStatus, Integer};

use crate::{argmax::reduce, band::classify};

/// Argument names of [DominantBand], in order.
pub const PARAMETERS: [&str; 2] = ["powers", "frequencies"];

/// Band ordinal of the frequency carrying the most power.
pub fn classify_dominant_band<T: Integer>(powers: &[T], frequencies: &[T]) -> T {
    classify(&reduce(powers, frequencies))
}

/// [classify_dominant_band] as a compilable circuit over two arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct DominantBand;

impl DominantBand {
    /// Both arguments are confidential.
    pub fn encryption_statuses() -> [(&'static str, EncryptionStatus); 2] {
        PARAMETERS.map(|name| (name, EncryptionStatus::Encrypted))
    }
}

impl CircuitFn for DominantBand {
    fn parameters(&self) -> &[&'static str] {
        &PARAMETERS
    }

    fn evaluate<T: Integer>(&self, args: &[Vec<T>]) -> T {
        classify_dominant_band(&args[0], &args[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{band::Band, scale::scale};
    use engine::{Circuit, Compiler, Simulation, Width};

    fn scaled(hz: &[f64]) -> Vec<i64> {
        hz.iter().copied().map(scale).collect()
    }

    #[test]
    fn plain_scenarios() {
        let cases: [(&[f64], &[f64], Band); 4] = [
            (&[10.0, 6.0, 40.0], &[2.0, 6.0, 40.0], Band::Gamma),
            (&[40.0, 6.0, 10.0], &[2.0, 6.0, 40.0], Band::Delta),
            (&[10.0, 25.0, 40.0], &[2.0, 10.0, 40.0], Band::Gamma),
            (&[5.0, 5.0, 5.0], &[1.0, 20.0, 35.0], Band::Delta),
        ];
        for (powers, frequencies, band) in cases {
            assert_eq!(
                classify_dominant_band(&scaled(powers), &scaled(frequencies)),
                band.ordinal()
            );
        }
    }

    #[test]
    fn compiles_to_a_17_bit_circuit() {
        let compiler: Compiler<DominantBand> = Compiler::new(DominantBand, &DominantBand::encryption_statuses());
        let a: Circuit<Simulation> = compiler.compile(&[vec![vec![0; 3], vec![0; 3]]]).unwrap();
        let b: Circuit<Simulation> = compiler
            .compile(&[
                vec![scaled(&[10.0, 6.0, 40.0]), scaled(&[2.0, 6.0, 40.0])],
                vec![vec![65535; 3], vec![65535; 3]],
            ])
            .unwrap();

        // The largest threshold constant already needs 17 bits.
        assert_eq!(a.encoding().width(), Width(17));
        assert_eq!(b.encoding().width(), Width(17));
        assert_eq!(a.statistics(), b.statistics());

        // One comparison and two products per sample, less the dead final
        // running-maximum update, then nine comparisons and four indicator
        // products to classify.
        assert_eq!(a.statistics().nonlinear, 3 * 3 - 1 + 9 + 4);
        assert_eq!(a.shapes(), vec![3, 3]);
    }
}
