//! FRI as a STARK low-degree test, following the phase decomposition of
//! ethSTARK and [Ha22]: algebraic linking (ALI), DEEP, batching, one commit
//! round per folding step, and the query phase.

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{Phase, PhaseModel};
use crate::{
    fields::FieldParams,
    parameters::{BatchingStrategy, FriParameters},
    regimes::{distance_error, ProximityGapsRegime},
    utils::merkle_path_size_bits,
};

pub struct FriCircuit<'a> {
    params: &'a FriParameters,
    field: FieldParams,
}

impl<'a> FriCircuit<'a> {
    pub fn new(params: &'a FriParameters) -> Self {
        Self {
            params,
            field: params.field.params(),
        }
    }

    fn phase(&self, name: impl Into<String>, error: f64) -> Phase {
        Phase::from_error(name, error, self.params.hash_size_bits)
    }

    /// Error of the random linear combination of all `batch_size` functions.
    fn batching_error(&self, regime: &dyn ProximityGapsRegime) -> f64 {
        let p = self.params;
        let dimension = p.trace_length as f64;
        match p.batching {
            BatchingStrategy::Powers => {
                regime.error_powers(p.rate, dimension, &self.field, p.batch_size)
            }
            BatchingStrategy::Affine => regime.error_linear(p.rate, dimension, &self.field),
        }
    }

    /// Correlated-agreement error of commit round `round` (1-based), where the
    /// code dimension has shrunk to `H / f^round`.
    fn commit_round_error(&self, regime: &dyn ProximityGapsRegime, round: usize) -> f64 {
        let p = self.params;
        let factor = p.folding_factors[round - 1] as f64;
        let dimension = p.trace_length as f64 / factor.powf(round as f64);
        regime.error_powers(p.rate, dimension, &self.field, p.batch_size)
    }
}

impl PhaseModel for FriCircuit<'_> {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            skip_all,
            fields(regime = %regime.regime(), trace_length = self.params.trace_length)
        )
    )]
    fn phases(&self, regime: &dyn ProximityGapsRegime) -> Vec<Phase> {
        let p = self.params;
        let field_size = self.field.size();
        let trace_length = p.trace_length as f64;
        let domain_size = trace_length / p.rate;
        let list_size = regime.max_list_size(p.rate);

        let mut phases = Vec::with_capacity(p.folding_factors.len() + 4);

        let ali = list_size * p.num_columns as f64 / field_size;
        phases.push(self.phase("ALI", ali));

        let deep_numerator = p.air_max_degree as f64 * (trace_length + p.max_combo as f64 - 1.0)
            + (trace_length - 1.0);
        let deep = list_size * deep_numerator / (field_size - trace_length - domain_size);
        phases.push(self.phase("DEEP", deep));

        phases.push(self.phase("batching", self.batching_error(regime)));

        let (rounds, _) = p.charged_rounds();
        for round in 1..=rounds {
            phases.push(self.phase(
                format!("commit round {round}"),
                self.commit_round_error(regime, round),
            ));
        }

        let theta = regime.proximity_parameter(p.rate);
        let query = distance_error(theta, p.num_queries, p.grinding_bits);
        phases.push(self.phase("query phase", query));

        phases
    }

    /// One Merkle root and `num_queries` openings for the batched initial
    /// codeword and for every folded codeword, plus the final polynomial sent
    /// in the clear. Siblings of one fold share a leaf.
    fn proof_size_bits(&self) -> u64 {
        let p = self.params;
        let element = self.field.element_size_bits();
        let hash = p.hash_size_bits;
        let queries = p.num_queries as u64;

        let commitment = |num_leafs: usize, tuple_size: usize| {
            let openings = queries.saturating_mul(merkle_path_size_bits(
                num_leafs, tuple_size, element, hash,
            ));
            (hash as u64).saturating_add(openings)
        };

        let mut size = p.domain_size();
        let mut bits = commitment(size, p.batch_size);

        let (rounds, _) = p.charged_rounds();
        for &factor in &p.folding_factors[..rounds] {
            size /= factor;
            bits = bits.saturating_add(commitment(size, factor));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let final_polynomial = (p.rate * size as f64 * element as f64) as u64;
        bits.saturating_add(final_polynomial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parameters::CircuitParameters,
        regimes::Regime,
        zkvms::{miden, risc0, zisk},
    };
    use proptest::prelude::*;

    fn fri_params(parameters: CircuitParameters) -> FriParameters {
        match parameters {
            CircuitParameters::Fri(params) => params,
            CircuitParameters::Whir(_) => unreachable!(),
        }
    }

    fn bits(params: &FriParameters, regime: Regime) -> Vec<(String, i64)> {
        FriCircuit::new(params)
            .phases(regime.evaluator())
            .into_iter()
            .map(|phase| (phase.name, phase.bits))
            .collect()
    }

    fn expected(values: &[i64]) -> Vec<(String, i64)> {
        let rounds = values.len() - 4;
        let mut names = vec!["ALI".to_string(), "DEEP".into(), "batching".into()];
        names.extend((1..=rounds).map(|round| format!("commit round {round}")));
        names.push("query phase".into());
        names.into_iter().zip(values.iter().copied()).collect()
    }

    #[test]
    fn test_miden_phases() {
        let params = fri_params(miden::main_circuit().parameters);
        assert_eq!(
            bits(&params, Regime::UniqueDecoding),
            expected(&[121, 106, 103, 105, 107, 109, 111, 113, 115, 117, 38])
        );
        assert_eq!(
            bits(&params, Regime::JohnsonBound),
            expected(&[114, 99, 75, 77, 79, 81, 83, 85, 87, 89, 55])
        );
    }

    #[test]
    fn test_risc0_phases() {
        let params = fri_params(risc0::main_circuit().parameters);
        assert_eq!(
            bits(&params, Regime::UniqueDecoding),
            expected(&[115, 100, 94, 98, 102, 106, 110, 33])
        );
        assert_eq!(
            bits(&params, Regime::JohnsonBound),
            expected(&[109, 94, 69, 73, 77, 81, 85, 47])
        );
    }

    #[test]
    fn test_zisk_compressor_phases() {
        let circuit = zisk::circuits()
            .into_iter()
            .map(|circuit| circuit.unwrap())
            .find(|circuit| circuit.name == "Keccakf Compressor")
            .unwrap();
        let params = fri_params(circuit.parameters);
        assert_eq!(
            bits(&params, Regime::UniqueDecoding),
            expected(&[185, 168, 163, 167, 171, 175, 175, 178, 43])
        );
        assert_eq!(
            bits(&params, Regime::JohnsonBound),
            expected(&[179, 162, 138, 142, 146, 150, 150, 153, 61])
        );
    }

    #[test]
    fn test_affine_batching_ignores_batch_size() {
        let params = FriParameters {
            batching: BatchingStrategy::Affine,
            ..fri_params(miden::main_circuit().parameters)
        };
        let small = FriParameters {
            batch_size: params.num_columns,
            ..params.clone()
        };
        let large = FriParameters {
            batch_size: 10 * params.num_columns,
            ..params
        };
        for regime in Regime::ALL {
            assert_eq!(bits(&small, regime)[2], bits(&large, regime)[2]);
        }
    }

    #[test]
    fn test_hash_cap() {
        // A short hash caps every phase.
        let params = FriParameters {
            hash_size_bits: 64,
            ..fri_params(miden::main_circuit().parameters)
        };
        let phases = bits(&params, Regime::UniqueDecoding);
        assert!(phases.iter().all(|(_, bits)| *bits <= 64));
        assert_eq!(phases[0].1, 64);
        assert_eq!(phases.last().unwrap().1, 38);
    }

    #[test]
    fn test_proof_size() {
        let miden = fri_params(miden::main_circuit().parameters);
        assert_eq!(FriCircuit::new(&miden).proof_size_bits(), 1_220_608);
        let risc0 = fri_params(risc0::main_circuit().parameters);
        assert_eq!(FriCircuit::new(&risc0).proof_size_bits(), 3_116_648);
    }

    proptest! {
        #[test]
        fn grinding_only_moves_query_phase(grinding in 0usize..40) {
            let base = fri_params(miden::main_circuit().parameters);
            let ground = FriParameters {
                grinding_bits: base.grinding_bits + grinding,
                ..base.clone()
            };
            for regime in Regime::ALL {
                let before = bits(&base, regime);
                let after = bits(&ground, regime);
                let last = before.len() - 1;
                prop_assert_eq!(&before[..last], &after[..last]);
                prop_assert_eq!(after[last].1, before[last].1 + grinding as i64);
            }
        }

        #[test]
        fn commit_rounds_never_decrease(num_queries in 1usize..200, log_inv_rate in 1u32..5) {
            let base = fri_params(risc0::main_circuit().parameters);
            let rate = 2f64.powf(-f64::from(log_inv_rate));
            let params = FriParameters {
                num_queries,
                rate,
                folding_factors: vec![16; 8],
                ..base
            };
            prop_assume!(params.validate().is_ok());
            for regime in Regime::ALL {
                let commit: Vec<i64> = bits(&params, regime)
                    .into_iter()
                    .filter(|(name, _)| name.starts_with("commit round"))
                    .map(|(_, bits)| bits)
                    .collect();
                prop_assert!(commit.windows(2).all(|pair| pair[0] <= pair[1]));
            }
        }

        #[test]
        fn unique_decoding_dominates_on_batching(num_queries in 1usize..200) {
            let params = FriParameters {
                num_queries,
                ..fri_params(miden::main_circuit().parameters)
            };
            let udr = bits(&params, Regime::UniqueDecoding);
            let jbr = bits(&params, Regime::JohnsonBound);
            for ((name, udr_bits), (_, jbr_bits)) in udr.iter().zip(&jbr) {
                if name == "batching" || name.starts_with("commit round") {
                    prop_assert!(udr_bits >= jbr_bits);
                }
            }
        }
    }
}
