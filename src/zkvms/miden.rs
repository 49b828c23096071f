//! Miden, with the `RECURSIVE_96_BITS` proof options of `miden-vm`
//! (<https://github.com/0xMiden/miden-vm/blob/fde5256c7ea99112e7dc2677b4c57ad824f63dcb/air/src/options.rs#L47>).
//!
//! Parts of the proof system are described in "STARK-based Signatures from
//! the RPO Permutation" (<https://eprint.iacr.org/2024/1553>).

use super::{uniform_folding, Zkvm};
use crate::{
    fields::AvailableFields,
    parameters::{BatchingStrategy, Circuit, CircuitParameters, FriParameters},
};

pub fn zkvm() -> Zkvm {
    Zkvm::new("Miden", vec![main_circuit()])
}

pub fn main_circuit() -> Circuit {
    // Blowup factor 8.
    let rate = 1.0 / 8.0;
    let trace_length = 1 << 18;
    // Miden stops at degree 127; a power of two is used here.
    let early_stop_degree = 1 << 7;
    let domain_size = trace_length * 8;

    Circuit {
        name: "main".to_string(),
        best_attack_bits: Some(96),
        parameters: CircuitParameters::Fri(FriParameters {
            hash_size_bits: 256,
            field: AvailableFields::Goldilocks2,
            rate,
            trace_length,
            num_columns: 100,
            batch_size: 100,
            // Algebraic batching.
            batching: BatchingStrategy::Powers,
            num_queries: 27,
            // Bounded by 1/ρ + 1, as in winterfell.
            air_max_degree: 9,
            folding_factors: uniform_folding(domain_size, 4, early_stop_degree),
            early_stop_degree,
            max_combo: 2,
            grinding_bits: 16,
        }),
    }
}
