//! Aggregation of phase-level bit security into circuit and zkVM reports.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
#[cfg(feature = "tracing")]
use tracing::{instrument, warn};

use crate::{
    errors::Rejection,
    parameters::{Circuit, CircuitParameters, ParameterError},
    protocols::{phase_model, Phase},
    regimes::Regime,
    zkvms::Zkvm,
};

/// Phase-by-phase security of one circuit under one regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSecurityReport {
    pub regime: Regime,
    /// In the order the protocol runs them.
    pub phases: Vec<Phase>,
    /// The weakest phase.
    pub total: i64,
    /// `-log2(Σ 2^-bits)`: the union bound over all phases.
    pub union_bound: f64,
}

impl PhaseSecurityReport {
    pub fn new(regime: Regime, phases: Vec<Phase>) -> Self {
        let total = phases.iter().map(|phase| phase.bits).min().unwrap_or(i64::MAX);
        let union_bound = -phases
            .iter()
            .map(|phase| 2f64.powf(-(phase.bits as f64)))
            .sum::<f64>()
            .log2();
        Self {
            regime,
            phases,
            total,
            union_bound,
        }
    }

    pub fn phase(&self, name: &str) -> Option<i64> {
        self.phases
            .iter()
            .find(|phase| phase.name == name)
            .map(|phase| phase.bits)
    }
}

/// Validates the parameters and computes the security of every phase.
#[cfg_attr(feature = "tracing", instrument(skip(parameters), fields(scheme = parameters.scheme())))]
pub fn evaluate(
    parameters: &CircuitParameters,
    regime: Regime,
) -> Result<PhaseSecurityReport, ParameterError> {
    parameters.validate()?;
    let phases = phase_model(parameters).phases(regime.evaluator());
    Ok(PhaseSecurityReport::new(regime, phases))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitReport {
    pub name: String,
    pub parameters: CircuitParameters,
    pub proof_size_bits: u64,
    /// One report per regime, UDR first.
    pub regimes: Vec<PhaseSecurityReport>,
    pub best_attack: Option<i64>,
}

impl CircuitReport {
    pub fn regime(&self, regime: Regime) -> Option<&PhaseSecurityReport> {
        self.regimes.iter().find(|report| report.regime == regime)
    }
}

#[cfg_attr(feature = "tracing", instrument(skip_all, fields(circuit = %circuit.name)))]
pub fn evaluate_circuit(circuit: &Circuit) -> Result<CircuitReport, ParameterError> {
    let regimes = Regime::ALL
        .into_iter()
        .map(|regime| evaluate(&circuit.parameters, regime))
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(feature = "tracing")]
    for report in regimes.iter().filter(|report| report.total < 0) {
        warn!(
            circuit = %circuit.name,
            regime = %report.regime,
            total = report.total,
            "error bound exceeds one"
        );
    }

    Ok(CircuitReport {
        name: circuit.name.clone(),
        parameters: circuit.parameters.clone(),
        proof_size_bits: phase_model(&circuit.parameters).proof_size_bits(),
        regimes,
        best_attack: circuit.best_attack_bits,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CircuitOutcome {
    Evaluated(CircuitReport),
    Rejected(Rejection),
}

impl CircuitOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Evaluated(report) => &report.name,
            Self::Rejected(rejection) => &rejection.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZkvmReport {
    pub name: String,
    pub circuits: Vec<CircuitOutcome>,
}

fn evaluate_outcome(circuit: &Result<Circuit, Rejection>) -> CircuitOutcome {
    match circuit {
        Ok(circuit) => match evaluate_circuit(circuit) {
            Ok(report) => CircuitOutcome::Evaluated(report),
            Err(err) => CircuitOutcome::Rejected(Rejection::new(&circuit.name, err)),
        },
        Err(rejection) => CircuitOutcome::Rejected(rejection.clone()),
    }
}

/// Evaluates every circuit of a zkVM independently, keeping their order.
#[cfg_attr(
    feature = "tracing",
    instrument(skip_all, fields(zkvm = %zkvm.name, circuits = zkvm.circuits.len()))
)]
pub fn evaluate_zkvm(zkvm: &Zkvm) -> ZkvmReport {
    #[cfg(feature = "parallel")]
    let circuits: Vec<CircuitOutcome> = zkvm.circuits.par_iter().map(evaluate_outcome).collect();
    #[cfg(not(feature = "parallel"))]
    let circuits: Vec<CircuitOutcome> = zkvm.circuits.iter().map(evaluate_outcome).collect();

    #[cfg(feature = "tracing")]
    for outcome in &circuits {
        if let CircuitOutcome::Rejected(rejection) = outcome {
            warn!(zkvm = %zkvm.name, %rejection, "circuit rejected");
        }
    }

    ZkvmReport {
        name: zkvm.name.clone(),
        circuits,
    }
}
