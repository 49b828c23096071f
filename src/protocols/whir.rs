//! WHIR round-by-round soundness, following Theorem 5.2 of the WHIR paper.
//!
//! `C^{i,s}` denotes the code of iteration `i` after `s` sumcheck rounds: it
//! has rate `2^-log_inv_rates[i]` and dimension `2^(log_degrees[i] - s)`.

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{Phase, PhaseModel};
use crate::{
    fields::FieldParams,
    parameters::{BatchingStrategy, WhirParameters},
    regimes::{distance_error, ProximityGapsRegime},
    utils::merkle_path_size_bits,
};

pub struct WhirCircuit<'a> {
    params: &'a WhirParameters,
    field: FieldParams,
    log_degrees: Vec<usize>,
    log_inv_rates: Vec<usize>,
}

impl<'a> WhirCircuit<'a> {
    pub fn new(params: &'a WhirParameters) -> Self {
        Self {
            params,
            field: params.field.params(),
            log_degrees: params.log_degrees(),
            log_inv_rates: params.log_inv_rates(),
        }
    }

    fn phase(&self, name: impl Into<String>, error: f64) -> Phase {
        Phase::from_error(name, error, self.params.hash_size_bits)
    }

    /// Rate and dimension of `C^{i,s}`.
    fn code(&self, iteration: usize, round: usize) -> (f64, f64) {
        let rate = 2f64.powf(-(self.log_inv_rates[iteration] as f64));
        let dimension = 2f64.powf((self.log_degrees[iteration] - round) as f64);
        (rate, dimension)
    }

    fn list_size(&self, regime: &dyn ProximityGapsRegime, iteration: usize, round: usize) -> f64 {
        let (rate, _) = self.code(iteration, round);
        regime.max_list_size(rate)
    }

    /// `δ_i`: the smallest proximity parameter over the codes of iteration `i`.
    fn delta(&self, regime: &dyn ProximityGapsRegime, iteration: usize) -> f64 {
        (1..=self.params.folding_factor)
            .map(|round| regime.proximity_parameter(self.code(iteration, round).0))
            .fold(1.0, f64::min)
    }

    fn batching_error(&self, regime: &dyn ProximityGapsRegime) -> f64 {
        let p = self.params;
        let (rate, dimension) = self.code(0, 0);
        let error = match p.batching {
            BatchingStrategy::Powers => {
                regime.error_powers(rate, dimension, &self.field, p.batch_size)
            }
            BatchingStrategy::Affine => regime.error_linear(rate, dimension, &self.field),
        };
        error * 2f64.powf(-(p.grinding_bits_batching as f64))
    }

    /// Sumcheck round `s` of iteration `i`: the degree-`d` sumcheck error over
    /// the previous list plus the folding error into `C^{i,s}`.
    fn fold_error(&self, regime: &dyn ProximityGapsRegime, iteration: usize, round: usize) -> f64 {
        let p = self.params;
        let sumcheck = p.constraint_degree as f64 * self.list_size(regime, iteration, round - 1)
            / self.field.size();
        let (rate, dimension) = self.code(iteration, round);
        let folding = regime.error_powers(rate, dimension, &self.field, 2);
        let grinding = p.grinding_bits_folding[iteration][round - 1];
        (sumcheck + folding) * 2f64.powf(-(grinding as f64))
    }

    fn ood_error(&self, regime: &dyn ProximityGapsRegime, iteration: usize) -> f64 {
        let p = self.params;
        let list_size = self.list_size(regime, iteration, 0);
        let samples = p.num_ood_samples[iteration - 1];
        let collision = 2f64.powf(self.log_degrees[iteration] as f64) / (2.0 * self.field.size());
        let grinding = p.grinding_bits_ood[iteration - 1];
        list_size * list_size * collision.powf(samples as f64) * 2f64.powf(-(grinding as f64))
    }

    fn shift_error(&self, regime: &dyn ProximityGapsRegime, iteration: usize) -> f64 {
        let p = self.params;
        let queries = p.num_queries[iteration - 1];
        let distance = (1.0 - self.delta(regime, iteration - 1)).powf(queries as f64);
        let collision =
            self.list_size(regime, iteration, 0) * (queries as f64 + 1.0) / self.field.size();
        let grinding = p.grinding_bits_queries[iteration - 1];
        (distance + collision) * 2f64.powf(-(grinding as f64))
    }

    fn fin_error(&self, regime: &dyn ProximityGapsRegime) -> f64 {
        let p = self.params;
        let last = p.num_iterations - 1;
        distance_error(
            self.delta(regime, last),
            p.num_queries[last],
            p.grinding_bits_queries[last],
        )
    }

    fn push_folds(
        &self,
        regime: &dyn ProximityGapsRegime,
        iteration: usize,
        phases: &mut Vec<Phase>,
    ) {
        for round in 1..=self.params.folding_factor {
            phases.push(self.phase(
                format!("fold(i={iteration},s={round})"),
                self.fold_error(regime, iteration, round),
            ));
        }
    }
}

impl PhaseModel for WhirCircuit<'_> {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            skip_all,
            fields(regime = %regime.regime(), iterations = self.params.num_iterations)
        )
    )]
    fn phases(&self, regime: &dyn ProximityGapsRegime) -> Vec<Phase> {
        let p = self.params;
        let mut phases = Vec::with_capacity(p.num_iterations * (p.folding_factor + 2) + 1);

        if p.batch_size > 1 {
            phases.push(self.phase("batching", self.batching_error(regime)));
        }

        self.push_folds(regime, 0, &mut phases);
        for iteration in 1..p.num_iterations {
            phases.push(self.phase(
                format!("OOD(i={iteration})"),
                self.ood_error(regime, iteration),
            ));
            phases.push(self.phase(
                format!("Shift(i={iteration})"),
                self.shift_error(regime, iteration),
            ));
            self.push_folds(regime, iteration, &mut phases);
        }

        phases.push(self.phase("fin", self.fin_error(regime)));
        phases
    }

    /// Counts prover messages only; verifier messages come from Fiat-Shamir.
    fn proof_size_bits(&self) -> u64 {
        let p = self.params;
        let element = self.field.element_size_bits() as u64;
        let hash = p.hash_size_bits as u64;
        let sumcheck = (p.folding_factor as u64)
            .saturating_mul(p.constraint_degree as u64)
            .saturating_mul(element);

        // Initial commitment and sumcheck.
        let mut bits = hash.saturating_add(sumcheck);

        for &samples in &p.num_ood_samples {
            let ood = (samples as u64).saturating_mul(element);
            bits = bits
                .saturating_add(hash)
                .saturating_add(ood)
                .saturating_add(sumcheck);
        }

        // Final polynomial, multilinear in `m_M` variables.
        let final_polynomial = (1u64 << self.log_degrees[p.num_iterations]).saturating_mul(element);
        bits = bits.saturating_add(final_polynomial);

        // One leaf per queried block of folding siblings.
        let block_size = 1usize << p.folding_factor;
        for iteration in 0..p.num_iterations {
            let log_domain_size = self.log_degrees[iteration] + self.log_inv_rates[iteration];
            let domain_size = 1usize << log_domain_size;
            let path = merkle_path_size_bits(
                domain_size / block_size,
                block_size,
                element as usize,
                p.hash_size_bits,
            );
            bits = bits.saturating_add((p.num_queries[iteration] as u64).saturating_mul(path));
        }

        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parameters::CircuitParameters, regimes::Regime, zkvms::dummy_whir};

    fn whir_params() -> WhirParameters {
        match dummy_whir::circuit().parameters {
            CircuitParameters::Whir(params) => params,
            CircuitParameters::Fri(_) => unreachable!(),
        }
    }

    fn bits(params: &WhirParameters, regime: Regime) -> Vec<(String, i64)> {
        WhirCircuit::new(params)
            .phases(regime.evaluator())
            .into_iter()
            .map(|phase| (phase.name, phase.bits))
            .collect()
    }

    fn lookup(phases: &[(String, i64)], name: &str) -> i64 {
        phases
            .iter()
            .find(|(phase, _)| phase == name)
            .map(|(_, bits)| *bits)
            .unwrap()
    }

    #[test]
    fn test_phase_order() {
        let names: Vec<String> = bits(&whir_params(), Regime::UniqueDecoding)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names.len(), 1 + 4 + 4 * 6 + 1);
        assert_eq!(names[0], "batching");
        assert_eq!(names[1], "fold(i=0,s=1)");
        assert_eq!(names[4], "fold(i=0,s=4)");
        assert_eq!(names[5], "OOD(i=1)");
        assert_eq!(names[6], "Shift(i=1)");
        assert_eq!(names[7], "fold(i=1,s=1)");
        assert_eq!(names.last().unwrap(), "fin");
    }

    #[test]
    fn test_unique_decoding_values() {
        let phases = bits(&whir_params(), Regime::UniqueDecoding);
        assert_eq!(lookup(&phases, "batching"), 108);
        let expected_folds = [115, 119, 123, 127, 131];
        for (iteration, first) in expected_folds.into_iter().enumerate() {
            for round in 1..=4 {
                assert_eq!(
                    lookup(&phases, &format!("fold(i={iteration},s={round})")),
                    first + round as i64 - 1
                );
            }
        }
        for (iteration, (ood, shift)) in [(219, 33), (227, 31), (235, 21), (243, 23)]
            .into_iter()
            .enumerate()
        {
            assert_eq!(lookup(&phases, &format!("OOD(i={})", iteration + 1)), ood);
            assert_eq!(lookup(&phases, &format!("Shift(i={})", iteration + 1)), shift);
        }
        assert_eq!(lookup(&phases, "fin"), 28);
    }

    #[test]
    fn test_johnson_bound_values() {
        let phases = bits(&whir_params(), Regime::JohnsonBound);
        assert_eq!(lookup(&phases, "batching"), 85);
        let expected_folds = [93, 89, 86, 82, 79];
        for (iteration, first) in expected_folds.into_iter().enumerate() {
            for round in 1..=4 {
                assert_eq!(
                    lookup(&phases, &format!("fold(i={iteration},s={round})")),
                    first + round as i64 - 1
                );
            }
        }
        for (iteration, (ood, shift)) in [(203, 36), (205, 68), (207, 76), (209, 71)]
            .into_iter()
            .enumerate()
        {
            assert_eq!(lookup(&phases, &format!("OOD(i={})", iteration + 1)), ood);
            assert_eq!(lookup(&phases, &format!("Shift(i={})", iteration + 1)), shift);
        }
        assert_eq!(lookup(&phases, "fin"), 78);
    }

    #[test]
    fn test_hash_cap() {
        let uncapped = bits(&whir_params(), Regime::UniqueDecoding);
        let params = WhirParameters {
            hash_size_bits: 64,
            ..whir_params()
        };
        let capped = bits(&params, Regime::UniqueDecoding);
        assert_eq!(capped.len(), uncapped.len());
        assert!(capped.iter().all(|(_, bits)| *bits <= 64));
        assert_eq!(lookup(&capped, "batching"), 64);
        assert_eq!(lookup(&capped, "fold(i=0,s=1)"), 64);
        for name in ["Shift(i=1)", "Shift(i=2)", "Shift(i=3)", "Shift(i=4)", "fin"] {
            assert_eq!(lookup(&capped, name), lookup(&uncapped, name), "{name}");
        }
    }

    #[test]
    fn test_proof_size_saturates() {
        let params = WhirParameters {
            constraint_degree: usize::MAX,
            ..whir_params()
        };
        assert_eq!(WhirCircuit::new(&params).proof_size_bits(), u64::MAX);
    }

    #[test]
    fn test_single_polynomial_has_no_batching() {
        let params = WhirParameters {
            batch_size: 1,
            ..whir_params()
        };
        let phases = bits(&params, Regime::UniqueDecoding);
        assert_eq!(phases[0].0, "fold(i=0,s=1)");
        assert!(phases.iter().all(|(name, _)| name != "batching"));
    }

    #[test]
    fn test_single_iteration() {
        let params = WhirParameters {
            num_iterations: 1,
            num_queries: vec![80],
            num_ood_samples: vec![],
            grinding_bits_folding: vec![vec![10; 4]],
            grinding_bits_queries: vec![0],
            grinding_bits_ood: vec![],
            ..whir_params()
        };
        assert_eq!(params.validate(), Ok(()));
        let names: Vec<String> = bits(&params, Regime::JohnsonBound)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            [
                "batching",
                "fold(i=0,s=1)",
                "fold(i=0,s=2)",
                "fold(i=0,s=3)",
                "fold(i=0,s=4)",
                "fin"
            ]
        );
    }

    #[test]
    fn test_proof_size() {
        let params = whir_params();
        assert_eq!(WhirCircuit::new(&params).proof_size_bits(), 1_099_776);
    }
}
