use sampling::Source;

use crate::{
    Backend, Circuit, CircuitFn, Compiler, EncryptionStatus, Encoding, Lwe, LweCiphertext, LweClientKey, LweInteger,
    Value,
    tests::test_suite::{
        SelectMax, TEST_PARAMETERS, WEIGHTED_SUM_BOUND, WEIGHTED_SUM_LEN, WeightedSum, weighted_sum_inputset,
    },
};

fn random_args(source: &mut Source, n: usize, bound: i64) -> Vec<i64> {
    let max: u64 = 2 * bound as u64 + 1;
    let mask: u64 = max.next_power_of_two() - 1;
    (0..n)
        .map(|_| source.next_u64n(max, mask) as i64 - bound)
        .collect()
}

pub fn test_circuit_matches_plain<B: Backend>() {
    let compiler: Compiler<WeightedSum> = Compiler::new(
        WeightedSum,
        &[("xs", EncryptionStatus::Encrypted), ("ys", EncryptionStatus::Encrypted)],
    )
    .with_parameters(TEST_PARAMETERS.clone());
    let mut circuit: Circuit<B> = compiler.compile(&weighted_sum_inputset()).unwrap();
    circuit.keygen_with_seed([1u8; 32]).unwrap();

    let mut source: Source = Source::new([5u8; 32]);
    for _ in 0..4 {
        // Stay strictly inside the provisioned range.
        let bound: i64 = WEIGHTED_SUM_BOUND - 2;
        let args: Vec<Vec<i64>> = vec![
            random_args(&mut source, WEIGHTED_SUM_LEN, bound),
            random_args(&mut source, WEIGHTED_SUM_LEN, bound),
        ];
        let want: i64 = WeightedSum.evaluate::<i64>(&args);

        let cts: Vec<Value<B>> = circuit.encrypt(&args).unwrap();
        let out: Value<B> = circuit.run(&cts).unwrap();
        assert_eq!(circuit.decrypt(&out).unwrap(), want, "args={args:?}");
        assert_eq!(circuit.simulate(&args).unwrap(), want);
    }

    // Ties keep the first maximum; all-negative inputs keep the zero start.
    let compiler: Compiler<SelectMax> =
        Compiler::new(SelectMax, &[("xs", EncryptionStatus::Encrypted)]).with_parameters(TEST_PARAMETERS.clone());
    let mut circuit: Circuit<B> = compiler
        .compile(&[vec![vec![0, 0, 0]], vec![vec![100, -100, 100]]])
        .unwrap();
    circuit.keygen().unwrap();
    for xs in [vec![3, 7, 7], vec![-5, -1, -9], vec![100, 0, 99]] {
        let want: i64 = SelectMax.evaluate::<i64>(&[xs.clone()]);
        let out: Value<B> = circuit.run(&circuit.encrypt(&[xs]).unwrap()).unwrap();
        assert_eq!(circuit.decrypt(&out).unwrap(), want);
    }
}

pub fn test_clear_arguments<B: Backend>() {
    let compiler: Compiler<WeightedSum> = Compiler::new(
        WeightedSum,
        &[("xs", EncryptionStatus::Encrypted), ("ys", EncryptionStatus::Clear)],
    )
    .with_parameters(TEST_PARAMETERS.clone());
    let mut circuit: Circuit<B> = compiler.compile(&weighted_sum_inputset()).unwrap();
    circuit.keygen().unwrap();

    let args: Vec<Vec<i64>> = vec![vec![1, -2, 3, -4], vec![10, 20, -30, 40]];
    let want: i64 = WeightedSum.evaluate::<i64>(&args);
    let out: Value<B> = circuit.run(&circuit.encrypt(&args).unwrap()).unwrap();
    assert_eq!(circuit.decrypt(&out).unwrap(), want);
}

/// Fresh encryptions carry Gaussian noise of the configured deviation.
pub fn test_fresh_noise() {
    let compiler: Compiler<SelectMax> =
        Compiler::new(SelectMax, &[("xs", EncryptionStatus::Encrypted)]).with_parameters(TEST_PARAMETERS.clone());
    let mut circuit: Circuit<Lwe> = compiler.compile(&[vec![vec![-1000, 1000]]]).unwrap();
    circuit.keygen_with_seed([2u8; 32]).unwrap();

    let encoding: Encoding = *circuit.encoding();
    let mut source_xa: Source = Source::new([3u8; 32]);
    let mut source_xe: Source = Source::new([4u8; 32]);
    let ck: &LweClientKey = circuit.client_key().unwrap();

    for x in [-1000i64, -1, 0, 999] {
        let ct: LweInteger = Lwe::encrypt(ck, x, &encoding, &mut source_xa, &mut source_xe);
        assert_eq!(ct.bits().len(), encoding.bits());
        assert_eq!(Lwe::decrypt(ck, &ct, &encoding), Ok(x));
    }

    let noise: Vec<f64> = (0..4096)
        .map(|i| {
            let bit: bool = i % 2 == 0;
            let ct: LweCiphertext = ck.encrypt_bit(bit, &mut source_xa, &mut source_xe);
            assert_eq!(ck.decrypt_bit(&ct), bit);
            ck.noise(&ct, bit)
        })
        .collect();

    let mean: f64 = noise.iter().sum::<f64>() / noise.len() as f64;
    let std: f64 = (noise.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / noise.len() as f64).sqrt();
    assert!(mean.abs() < 0.3, "mean={mean}");
    assert!((std - TEST_PARAMETERS.sigma).abs() < 0.3, "std={std}");
}
