use std::sync::Arc;

use crate::{
    Backend, Circuit, Compiler, EncryptionStatus, EngineError, KeyId, Value,
    tests::test_suite::{SelectMax, TEST_PARAMETERS, WeightedSum, weighted_sum_inputset},
};

fn select_max<B: Backend>() -> Circuit<B> {
    Compiler::new(SelectMax, &[("xs", EncryptionStatus::Encrypted)])
        .with_parameters(TEST_PARAMETERS.clone())
        .compile(&[vec![vec![0, 0]], vec![vec![255, -255]]])
        .unwrap()
}

pub fn test_key_lifecycle<B: Backend>() {
    let mut circuit: Circuit<B> = select_max::<B>();

    assert_eq!(circuit.key_id(), None);
    assert_eq!(circuit.encrypt(&[vec![1, 2]]).unwrap_err(), EngineError::MissingKeys);

    circuit.keygen().unwrap();
    let first: KeyId = circuit.key_id().unwrap();
    circuit.keygen().unwrap();
    assert_eq!(circuit.key_id(), Some(first), "keygen must keep existing keys");

    let cts: Vec<Value<B>> = circuit.encrypt(&[vec![12, 200]]).unwrap();
    let out: Value<B> = circuit.run(&cts).unwrap();
    assert_eq!(circuit.decrypt(&out), Ok(200));

    circuit.keygen_force().unwrap();
    assert_ne!(circuit.key_id(), Some(first));

    assert!(matches!(circuit.decrypt(&out), Err(EngineError::Decryption(_))));
    assert!(matches!(circuit.run(&cts), Err(EngineError::Evaluation(_))));

    let fresh: Vec<Value<B>> = circuit.encrypt(&[vec![12, 200]]).unwrap();
    assert_eq!(circuit.decrypt(&circuit.run(&fresh).unwrap()), Ok(200));

    // Same seed, same keys.
    let mut a: Circuit<B> = select_max::<B>();
    let mut b: Circuit<B> = select_max::<B>();
    a.keygen_with_seed([9u8; 32]).unwrap();
    b.keygen_with_seed([9u8; 32]).unwrap();
    assert_eq!(a.key_id(), b.key_id());
}

/// The evaluating side gets the evaluation key alone: it runs circuits but
/// can neither encrypt nor decrypt.
pub fn test_evaluator_cannot_decrypt<B: Backend>() {
    let mut client: Circuit<B> = select_max::<B>();
    assert!(matches!(client.evaluator(), Err(EngineError::MissingKeys)));
    client.keygen().unwrap();

    let server: Circuit<B> = client.evaluator().unwrap();
    assert!(server.client_key().is_none());
    assert!(server.evaluation_key().is_some());
    assert_eq!(server.key_id(), client.key_id());

    let cts: Vec<Value<B>> = client.encrypt(&[vec![12, 200]]).unwrap();
    let out: Value<B> = server.run(&cts).unwrap();
    assert_eq!(server.decrypt(&out).unwrap_err(), EngineError::MissingKeys);
    assert_eq!(server.decrypt_array(&cts[0]).unwrap_err(), EngineError::MissingKeys);
    assert_eq!(server.encrypt(&[vec![1, 2]]).unwrap_err(), EngineError::MissingKeys);
    assert_eq!(client.decrypt(&out), Ok(200));

    // A separately compiled copy accepts the shipped key.
    let mut other: Circuit<B> = select_max::<B>();
    assert!(matches!(other.run(&cts), Err(EngineError::MissingKeys)));
    other.set_evaluation_key(Arc::clone(client.evaluation_key().unwrap()));
    assert_eq!(client.decrypt(&other.run(&cts).unwrap()), Ok(200));

    let key: &B::EvaluationKey = client.evaluation_key().unwrap();
    assert_eq!(client.decrypt(&select_max::<B>().run_with(key, &cts).unwrap()), Ok(200));

    // Installing an evaluation key drops the client key.
    let mut both: Circuit<B> = select_max::<B>();
    both.keygen().unwrap();
    both.set_evaluation_key(Arc::clone(client.evaluation_key().unwrap()));
    assert!(both.client_key().is_none());
    assert_eq!(both.key_id(), client.key_id());
}

pub fn test_shape_errors<B: Backend>() {
    let mut circuit: Circuit<B> = Compiler::new(
        WeightedSum,
        &[("xs", EncryptionStatus::Encrypted), ("ys", EncryptionStatus::Encrypted)],
    )
    .with_parameters(TEST_PARAMETERS.clone())
    .compile(&weighted_sum_inputset())
    .unwrap();
    circuit.keygen().unwrap();
    assert_eq!(circuit.shapes(), vec![4, 4]);

    let err: EngineError = circuit.encrypt(&[vec![1, 2, 3, 4]]).unwrap_err();
    assert_eq!(err, EngineError::ArgumentCount { expected: 2, got: 1 });
    assert!(err.is_shape_error());

    let err: EngineError = circuit.encrypt(&[vec![1, 2, 3, 4], vec![1, 2, 3]]).unwrap_err();
    assert_eq!(
        err,
        EngineError::ShapeMismatch {
            param: "ys".to_string(),
            expected: 4,
            got: 3
        }
    );

    let too_big: i64 = circuit.encoding().max_value() + 1;
    assert!(matches!(
        circuit.encrypt(&[vec![1, 2, 3, too_big], vec![1, 2, 3, 4]]),
        Err(EngineError::ValueOutOfRange { value, .. }) if value == too_big
    ));

    let cts: Vec<Value<B>> = circuit.encrypt(&[vec![1, 2, 3, 4], vec![5, 6, 7, 8]]).unwrap();
    assert!(matches!(
        circuit.run(&cts[..1]),
        Err(EngineError::ArgumentCount { expected: 2, got: 1 })
    ));
    let swapped: Vec<Value<B>> = vec![cts[0].clone(), cts[0].clone()];
    assert!(circuit.run(&swapped).is_ok());

    assert!(matches!(circuit.decrypt(&cts[0]), Err(EngineError::Decryption(_))));
    assert_eq!(circuit.decrypt_array(&cts[1]), Ok(vec![5, 6, 7, 8]));
}
