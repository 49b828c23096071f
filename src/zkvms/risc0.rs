//! RISC0, with the parameters of its soundness notebook (September 2024) and
//! section 3.2 of the proof system report
//! (<https://dev.risczero.com/proof-system-in-detail.pdf>).

use super::{uniform_folding, Zkvm};
use crate::{
    fields::AvailableFields,
    parameters::{BatchingStrategy, Circuit, CircuitParameters, FriParameters},
};

const NUM_CONTROL_COLUMNS: usize = 16;
const NUM_DATA_COLUMNS: usize = 223;
const NUM_ACCUM_COLUMNS: usize = 40;

pub fn zkvm() -> Zkvm {
    Zkvm::new("RISC0", vec![main_circuit()])
}

pub fn main_circuit() -> Circuit {
    let trace_length = 1 << 21;
    let early_stop_degree = 1 << 7;
    let num_columns = NUM_CONTROL_COLUMNS + NUM_DATA_COLUMNS + NUM_ACCUM_COLUMNS;

    Circuit {
        name: "main".to_string(),
        best_attack_bits: Some(99),
        parameters: CircuitParameters::Fri(FriParameters {
            hash_size_bits: 256,
            field: AvailableFields::BabyBear4,
            rate: 1.0 / 4.0,
            trace_length,
            num_columns,
            // Four extra composition polynomials.
            batch_size: num_columns + 4,
            batching: BatchingStrategy::Powers,
            num_queries: 50,
            // RISC0 uses degree 5, but the DEEP-ALI error counts d - 1.
            air_max_degree: 4,
            folding_factors: uniform_folding(trace_length * 4, 16, early_stop_degree),
            early_stop_degree,
            max_combo: 9,
            grinding_bits: 0,
        }),
    }
}
