//! Per-phase soundness models of the supported proximity tests.

use serde::{Deserialize, Serialize};

use crate::{bits::Bits, parameters::CircuitParameters, regimes::ProximityGapsRegime};

pub mod fri;
pub mod whir;

pub use fri::FriCircuit;
pub use whir::WhirCircuit;

/// Bit security of one named step of the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub bits: i64,
}

impl Phase {
    /// Converts an error probability into a phase, capped at the hash output
    /// length.
    pub fn from_error(name: impl Into<String>, error: f64, hash_size_bits: usize) -> Self {
        Self {
            name: name.into(),
            bits: Bits::from_error(error).level(hash_size_bits),
        }
    }
}

/// A protocol whose soundness error splits into independent phases.
pub trait PhaseModel {
    /// Every phase of the protocol, in the order the protocol runs them.
    fn phases(&self, regime: &dyn ProximityGapsRegime) -> Vec<Phase>;

    /// Estimated size of a non-interactive proof.
    fn proof_size_bits(&self) -> u64;
}

/// Picks the phase model of a circuit's scheme. The parameters are expected
/// to be validated already.
pub fn phase_model(parameters: &CircuitParameters) -> Box<dyn PhaseModel + '_> {
    match parameters {
        CircuitParameters::Fri(params) => Box::new(FriCircuit::new(params)),
        CircuitParameters::Whir(params) => Box::new(WhirCircuit::new(params)),
    }
}
