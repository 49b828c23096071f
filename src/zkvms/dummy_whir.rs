//! A made-up WHIR configuration exercising every WHIR phase.

use super::Zkvm;
use crate::{
    fields::AvailableFields,
    parameters::{BatchingStrategy, Circuit, CircuitParameters, WhirParameters},
};

pub fn zkvm() -> Zkvm {
    Zkvm::new("DummyWHIR", vec![circuit()])
}

pub fn circuit() -> Circuit {
    let num_iterations = 5;
    let folding_factor = 4;

    Circuit {
        name: "DummyWHIR".to_string(),
        best_attack_bits: None,
        parameters: CircuitParameters::Whir(WhirParameters {
            hash_size_bits: 256,
            field: AvailableFields::Goldilocks2,
            // rate 1/2
            log_inv_rate: 1,
            num_iterations,
            folding_factor,
            log_degree: 23,
            batch_size: 100,
            batching: BatchingStrategy::Powers,
            constraint_degree: 1,
            num_queries: vec![80, 35, 22, 12, 9],
            num_ood_samples: vec![2; num_iterations - 1],
            grinding_bits_batching: 10,
            grinding_bits_folding: vec![vec![10; folding_factor]; num_iterations],
            grinding_bits_queries: vec![0, 0, 0, 12, 20],
            grinding_bits_ood: vec![0; num_iterations - 1],
        }),
    }
}
