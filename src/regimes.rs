//! Proximity-gap regimes for Reed-Solomon codes.
//!
//! A regime fixes how far from the code a function may be while the analysis
//! still applies (the proximity parameter θ), how many codewords can be that
//! close (the list size), and the correlated-agreement error of a random
//! linear combination. Codes have rate `k/n` and the errors are expressed
//! for a code of the given dimension over the given field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::FieldParams;

/// Multiplicity parameter `m` of the Johnson bound list-decoding radius.
const JOHNSON_MULTIPLICITY: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "UDR")]
    UniqueDecoding,
    #[serde(rename = "JBR")]
    JohnsonBound,
}

impl Regime {
    pub const ALL: [Self; 2] = [Self::UniqueDecoding, Self::JohnsonBound];

    pub fn evaluator(self) -> &'static dyn ProximityGapsRegime {
        match self {
            Self::UniqueDecoding => &UniqueDecodingRegime,
            Self::JohnsonBound => &JohnsonBoundRegime,
        }
    }

    pub const fn identifier(self) -> &'static str {
        match self {
            Self::UniqueDecoding => "UDR",
            Self::JohnsonBound => "JBR",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// The interval of distances a regime covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeBound {
    pub lower: f64,
    pub upper: f64,
    pub upper_inclusive: bool,
}

impl RegimeBound {
    pub fn contains(&self, delta: f64) -> bool {
        delta > self.lower
            && (delta < self.upper || (self.upper_inclusive && delta == self.upper))
    }
}

pub trait ProximityGapsRegime: Sync {
    fn regime(&self) -> Regime;

    fn admissible_range(&self, rate: f64) -> RegimeBound;

    /// The largest distance θ the regime handles for a code of this rate.
    fn proximity_parameter(&self, rate: f64) -> f64;

    /// Upper bound on the number of codewords within distance θ.
    fn max_list_size(&self, rate: f64) -> f64;

    /// Correlated-agreement error for a combination with independent
    /// coefficients `1, r_1, r_2, ...` (batching over affine spaces). The
    /// error does not depend on the number of functions.
    fn error_linear(&self, rate: f64, dimension: f64, field: &FieldParams) -> f64;

    /// Correlated-agreement error for a combination of `num_functions` with
    /// coefficients `r^0, r^1, ...` (batching over parameterized curves).
    fn error_powers(
        &self,
        rate: f64,
        dimension: f64,
        field: &FieldParams,
        num_functions: usize,
    ) -> f64 {
        self.error_linear(rate, dimension, field) * (num_functions as f64 - 1.0)
    }
}

/// Unique decoding regime (UDR).
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueDecodingRegime;

impl ProximityGapsRegime for UniqueDecodingRegime {
    fn regime(&self) -> Regime {
        Regime::UniqueDecoding
    }

    fn admissible_range(&self, rate: f64) -> RegimeBound {
        RegimeBound {
            lower: 0.0,
            upper: (1.0 - rate) / 2.0,
            upper_inclusive: true,
        }
    }

    fn proximity_parameter(&self, rate: f64) -> f64 {
        (1.0 - rate) / 2.0
    }

    fn max_list_size(&self, _rate: f64) -> f64 {
        1.0
    }

    fn error_linear(&self, _rate: f64, dimension: f64, field: &FieldParams) -> f64 {
        // BCIKS20, Theorem 4.1
        dimension / field.size()
    }
}

/// Johnson bound regime (JBR).
///
/// Reed-Solomon codes are `(1 - √ρ - η, 1 / (2η√ρ))`-list decodable, with
/// `η = √ρ / 2m` for a fixed multiplicity `m`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JohnsonBoundRegime;

impl JohnsonBoundRegime {
    pub fn eta(rate: f64) -> f64 {
        rate.sqrt() / (2.0 * JOHNSON_MULTIPLICITY)
    }
}

impl ProximityGapsRegime for JohnsonBoundRegime {
    fn regime(&self) -> Regime {
        Regime::JohnsonBound
    }

    fn admissible_range(&self, rate: f64) -> RegimeBound {
        RegimeBound {
            lower: (1.0 - rate) / 2.0,
            upper: 1.0 - rate.sqrt(),
            upper_inclusive: false,
        }
    }

    fn proximity_parameter(&self, rate: f64) -> f64 {
        1.0 - (rate.sqrt() + Self::eta(rate))
    }

    fn max_list_size(&self, rate: f64) -> f64 {
        1.0 / (2.0 * Self::eta(rate) * rate.sqrt())
    }

    fn error_linear(&self, rate: f64, dimension: f64, field: &FieldParams) -> f64 {
        // WHIR, Conjecture 4.12. 1 - √ρ - δ = η here.
        let gap = Self::eta(rate).min(rate.sqrt() / 20.0);
        dimension / ((2.0 * gap).powf(5.0) * field.size())
    }
}

/// Probability that every one of `repetitions` spot checks misses a function
/// at distance `theta`, with `grinding_bits` of proof of work on top.
pub fn distance_error(theta: f64, repetitions: usize, grinding_bits: usize) -> f64 {
    (1.0 - theta).powf(repetitions as f64) * 2f64.powf(-(grinding_bits as f64))
}
