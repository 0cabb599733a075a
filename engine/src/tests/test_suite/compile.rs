use crate::{
    Backend, Circuit, CompilationError, Compiler, EncryptionStatus, EngineError, Parameters, Statistics, Width,
    tests::test_suite::{SelectMax, TEST_PARAMETERS, WeightedSum, weighted_sum_inputset},
};

fn compile_err<B: Backend>(compiler: &Compiler<WeightedSum>, inputset: &[Vec<Vec<i64>>]) -> CompilationError {
    match compiler.compile::<B>(inputset) {
        Err(EngineError::Compilation(e)) => e,
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("compilation should fail"),
    }
}

pub fn test_compile_errors<B: Backend>() {
    let both: [(&str, EncryptionStatus); 2] = [("xs", EncryptionStatus::Encrypted), ("ys", EncryptionStatus::Encrypted)];
    let compiler: Compiler<WeightedSum> = Compiler::new(WeightedSum, &both).with_parameters(TEST_PARAMETERS.clone());

    assert_eq!(compile_err::<B>(&compiler, &[]), CompilationError::EmptyInputset);

    assert_eq!(
        compile_err::<B>(&compiler, &[vec![vec![1, 2]]]),
        CompilationError::ArgumentCount {
            sample: 0,
            expected: 2,
            got: 1
        }
    );

    assert_eq!(
        compile_err::<B>(&compiler, &[vec![vec![1, 2], vec![3, 4]], vec![vec![1, 2], vec![3, 4, 5]]]),
        CompilationError::InconsistentShape {
            sample: 1,
            param: "ys".to_string(),
            expected: 2,
            got: 3
        }
    );

    assert_eq!(
        compile_err::<B>(&compiler, &[vec![vec![], vec![]]]),
        CompilationError::EmptyArgument("xs".to_string())
    );

    let partial: Compiler<WeightedSum> = Compiler::new(WeightedSum, &[("xs", EncryptionStatus::Encrypted)]);
    assert_eq!(
        compile_err::<B>(&partial, &weighted_sum_inputset()),
        CompilationError::MissingStatus("ys".to_string())
    );

    let extra: Compiler<WeightedSum> = Compiler::new(
        WeightedSum,
        &[
            ("xs", EncryptionStatus::Encrypted),
            ("ys", EncryptionStatus::Encrypted),
            ("zs", EncryptionStatus::Clear),
        ],
    );
    assert_eq!(
        compile_err::<B>(&extra, &weighted_sum_inputset()),
        CompilationError::UnknownParameter("zs".to_string())
    );

    let narrow: Compiler<WeightedSum> = Compiler::new(WeightedSum, &both).with_parameters(Parameters {
        max_width: Width(8),
        ..TEST_PARAMETERS.clone()
    });
    assert!(matches!(
        compile_err::<B>(&narrow, &weighted_sum_inputset()),
        CompilationError::WidthExceeded { max: 8, .. }
    ));

    let invalid: Compiler<WeightedSum> = Compiler::new(WeightedSum, &both).with_parameters(Parameters {
        sigma: f64::NAN,
        ..TEST_PARAMETERS.clone()
    });
    assert!(matches!(
        compile_err::<B>(&invalid, &weighted_sum_inputset()),
        CompilationError::InvalidParameters(_)
    ));
}

pub fn test_statistics_independent_of_values<B: Backend>() {
    let compiler: Compiler<SelectMax> =
        Compiler::new(SelectMax, &[("xs", EncryptionStatus::Encrypted)]).with_parameters(TEST_PARAMETERS.clone());

    let small: Circuit<B> = compiler.compile(&[vec![vec![0, 1, 2]]]).unwrap();
    let large: Circuit<B> = compiler
        .compile(&[vec![vec![-40000, 40000, 0]], vec![vec![7, 7, 7]]])
        .unwrap();

    assert_eq!(small.statistics(), large.statistics());
    assert!(small.encoding().width() < large.encoding().width());

    // Per element: one comparison, one product, one subtraction, one addition.
    let stats: &Statistics = small.statistics();
    assert_eq!(stats.inputs, 3);
    assert_eq!(stats.constants, 1);
    assert_eq!(stats.nonlinear, 6);
    assert_eq!(stats.linear, 6);
    assert_eq!(stats.depth, 6);
    assert_eq!(stats.nodes, 16);
}
