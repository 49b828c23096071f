use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{fields::AvailableFields, utils::is_power_of_two};

/// Errors that make a parameter set unusable. They are raised before any
/// phase is evaluated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Rate {0} is not strictly between 0 and 1.")]
    RateOutOfRange(f64),

    #[error("{what} must be a power of two, got {value}.")]
    NotPowerOfTwo { what: &'static str, value: usize },

    #[error("Number of queries shouldn't be zero.")]
    ZeroQueries,

    #[error("Batch size shouldn't be zero.")]
    ZeroBatchSize,

    #[error("Number of columns {columns} exceeds the batch size {batch_size}.")]
    TooManyColumns { columns: usize, batch_size: usize },

    #[error("FRI folding factor {factor} in round {round} is smaller than 2.")]
    InvalidFoldingFactor { round: usize, factor: usize },

    #[error("Early stop degree shouldn't be zero.")]
    ZeroEarlyStopDegree,

    #[error(
        "Folding schedule ends at size {remaining}, above the early stop degree {early_stop_degree}."
    )]
    FoldingScheduleTooShort {
        remaining: usize,
        early_stop_degree: usize,
    },

    #[error("Evaluation domain of size 2^{0} does not fit in a machine word.")]
    DomainTooLarge(f64),

    #[error("Log inverse rate shouldn't be zero.")]
    InvalidLogInvRate,

    #[error("Number of WHIR iterations shouldn't be zero.")]
    ZeroIterations,

    #[error("WHIR folding factor shouldn't be zero.")]
    ZeroFoldingFactor,

    #[error(
        "{iterations} iterations of folding factor {folding_factor} exceed the log degree {log_degree}."
    )]
    FoldingExceedsDegree {
        iterations: usize,
        folding_factor: usize,
        log_degree: usize,
    },

    #[error("Schedule `{schedule}` has length {actual}, expected {expected}.")]
    ScheduleLength {
        schedule: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid FRI arity string `{0}`.")]
    ArityString(String),
}

/// How several polynomials are combined into one before a proximity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchingStrategy {
    /// Coefficients `r^0, r^1, ..., r^{n-1}`: batching over parameterized
    /// curves, error grows with the number of functions.
    Powers,
    /// Coefficients `1, r_1, ..., r_{n-1}`: batching over affine spaces,
    /// error independent of the number of functions.
    Affine,
}

impl Display for BatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Powers => f.write_str("Powers"),
            Self::Affine => f.write_str("Affine"),
        }
    }
}

/// Parameters of a FRI-based circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriParameters {
    /// Output length of the Merkle tree hash function.
    pub hash_size_bits: usize,
    pub field: AvailableFields,
    /// The code rate ρ.
    pub rate: f64,
    /// Domain size before low-degree extension.
    pub trace_length: usize,
    /// Total columns of the AIR table.
    pub num_columns: usize,
    /// Number of functions in the batched FRI; may exceed `num_columns` when
    /// composition polynomials are committed as well.
    pub batch_size: usize,
    pub batching: BatchingStrategy,
    pub num_queries: usize,
    pub air_max_degree: usize,
    /// One folding factor per FRI round.
    pub folding_factors: Vec<usize>,
    /// Folding stops once the domain reaches this size.
    pub early_stop_degree: usize,
    /// Maximum number of entries of a single column referenced in a constraint.
    pub max_combo: usize,
    /// Proof-of-work bits in the query phase.
    pub grinding_bits: usize,
}

impl FriParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.rate > 0.0 && self.rate < 1.0) {
            return Err(ParameterError::RateOutOfRange(self.rate));
        }
        if !is_power_of_two(self.trace_length) {
            return Err(ParameterError::NotPowerOfTwo {
                what: "Trace length",
                value: self.trace_length,
            });
        }
        if self.num_queries == 0 {
            return Err(ParameterError::ZeroQueries);
        }
        if self.batch_size == 0 {
            return Err(ParameterError::ZeroBatchSize);
        }
        if self.num_columns > self.batch_size {
            return Err(ParameterError::TooManyColumns {
                columns: self.num_columns,
                batch_size: self.batch_size,
            });
        }
        if let Some((round, &factor)) = self
            .folding_factors
            .iter()
            .enumerate()
            .find(|(_, &factor)| factor < 2)
        {
            return Err(ParameterError::InvalidFoldingFactor { round, factor });
        }
        let log_domain_size = (self.trace_length as f64 / self.rate).log2();
        if log_domain_size >= f64::from(usize::BITS) {
            return Err(ParameterError::DomainTooLarge(log_domain_size));
        }
        if self.early_stop_degree == 0 {
            return Err(ParameterError::ZeroEarlyStopDegree);
        }
        let (_, remaining) = self.charged_rounds();
        if remaining > self.early_stop_degree {
            return Err(ParameterError::FoldingScheduleTooShort {
                remaining,
                early_stop_degree: self.early_stop_degree,
            });
        }
        Ok(())
    }

    /// Domain size after low-degree extension, `D = H / ρ`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn domain_size(&self) -> usize {
        (self.trace_length as f64 / self.rate).round() as usize
    }

    /// `-log2(ρ)`, rounded.
    #[allow(clippy::cast_possible_truncation)]
    pub fn log_inv_rate(&self) -> i64 {
        (-self.rate.log2()).round() as i64
    }

    /// `log2(H)`.
    pub const fn log_trace_length(&self) -> u32 {
        self.trace_length.trailing_zeros()
    }

    /// Number of folding rounds that are actually performed, together with
    /// the domain size that remains afterwards.
    ///
    /// Folding stops as soon as the domain is no larger than
    /// `early_stop_degree`, so trailing factors are not charged.
    pub fn charged_rounds(&self) -> (usize, usize) {
        let mut size = self.domain_size();
        let mut rounds = 0;
        for &factor in &self.folding_factors {
            if size <= self.early_stop_degree {
                break;
            }
            size /= factor;
            rounds += 1;
        }
        (rounds, size)
    }
}

impl Display for FriParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rounds, _) = self.charged_rounds();
        let rows: [(&str, String); 18] = [
            ("hash_size_bits", self.hash_size_bits.to_string()),
            ("rho", self.rate.to_string()),
            ("k = -log2(rho)", self.log_inv_rate().to_string()),
            ("trace_length", self.trace_length.to_string()),
            ("h = log2(trace_length)", self.log_trace_length().to_string()),
            ("domain_size D = trace_length / rho", self.domain_size().to_string()),
            ("num_columns", self.num_columns.to_string()),
            ("batch_size", self.batch_size.to_string()),
            ("batching", self.batching.to_string()),
            ("num_queries", self.num_queries.to_string()),
            ("max_combo", self.max_combo.to_string()),
            ("FRI_folding_factors", format!("{:?}", self.folding_factors)),
            ("FRI_early_stop_degree", self.early_stop_degree.to_string()),
            ("FRI_rounds_n", rounds.to_string()),
            ("grinding_query_phase", self.grinding_bits.to_string()),
            ("AIR_max_degree", self.air_max_degree.to_string()),
            ("field", self.field.to_string()),
            (
                "field_extension_degree",
                self.field.params().extension_degree.to_string(),
            ),
        ];
        write_aligned(f, &rows)
    }
}

/// Parameters of a WHIR-based circuit.
///
/// Indexing follows Theorem 5.2 of the WHIR paper: iterations `0..M`, each
/// with `k` sumcheck rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhirParameters {
    pub hash_size_bits: usize,
    pub field: AvailableFields,
    /// `log2(1/ρ)` of the initial code.
    pub log_inv_rate: usize,
    /// Number of WHIR iterations `M`.
    pub num_iterations: usize,
    /// Folding factor `k`, the same for every iteration.
    pub folding_factor: usize,
    /// `m`, the log of the degree being tested.
    pub log_degree: usize,
    pub batch_size: usize,
    pub batching: BatchingStrategy,
    /// `d` in Construction 5.1 of WHIR.
    pub constraint_degree: usize,
    /// `t_0, ..., t_{M-1}`.
    pub num_queries: Vec<usize>,
    /// OOD samples for iterations `1..M`.
    pub num_ood_samples: Vec<usize>,
    pub grinding_bits_batching: usize,
    /// `M x k` grinding bits for the fold rounds.
    pub grinding_bits_folding: Vec<Vec<usize>>,
    /// Grinding bits for the query rounds, length `M`.
    pub grinding_bits_queries: Vec<usize>,
    /// Grinding bits for the OOD rounds, length `M - 1`.
    pub grinding_bits_ood: Vec<usize>,
}

impl WhirParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.log_inv_rate == 0 {
            return Err(ParameterError::InvalidLogInvRate);
        }
        if self.num_iterations == 0 {
            return Err(ParameterError::ZeroIterations);
        }
        if self.folding_factor == 0 {
            return Err(ParameterError::ZeroFoldingFactor);
        }
        let folded = self.num_iterations.checked_mul(self.folding_factor);
        if folded.map_or(true, |folded| folded > self.log_degree) {
            return Err(ParameterError::FoldingExceedsDegree {
                iterations: self.num_iterations,
                folding_factor: self.folding_factor,
                log_degree: self.log_degree,
            });
        }
        let log_domain_size = self.log_degree.checked_add(self.log_inv_rate);
        if log_domain_size.map_or(true, |log| log >= usize::BITS as usize) {
            return Err(ParameterError::DomainTooLarge(
                self.log_degree as f64 + self.log_inv_rate as f64,
            ));
        }
        if self.batch_size == 0 {
            return Err(ParameterError::ZeroBatchSize);
        }

        let m = self.num_iterations;
        check_length("num_queries", m, self.num_queries.len())?;
        check_length("num_ood_samples", m - 1, self.num_ood_samples.len())?;
        check_length("grinding_bits_queries", m, self.grinding_bits_queries.len())?;
        check_length("grinding_bits_ood", m - 1, self.grinding_bits_ood.len())?;
        check_length("grinding_bits_folding", m, self.grinding_bits_folding.len())?;
        for row in &self.grinding_bits_folding {
            check_length("grinding_bits_folding[i]", self.folding_factor, row.len())?;
        }
        if self.num_queries.contains(&0) {
            return Err(ParameterError::ZeroQueries);
        }
        Ok(())
    }

    /// `m_0, ..., m_M` with `m_i = m - i k`.
    pub fn log_degrees(&self) -> Vec<usize> {
        (0..=self.num_iterations)
            .map(|i| self.log_degree - i * self.folding_factor)
            .collect()
    }

    /// Log inverse rates of the codes of each iteration. The evaluation
    /// domain halves while the degree shrinks by `2^k`.
    pub fn log_inv_rates(&self) -> Vec<usize> {
        (0..=self.num_iterations)
            .map(|i| self.log_inv_rate + i * (self.folding_factor - 1))
            .collect()
    }

    /// `log2` of the total prover grinding work (sum of `2^bits` over every
    /// grinding step), rounded to two decimals.
    pub fn log_grinding_overhead(&self) -> f64 {
        let work = |bits: &usize| 2f64.powf(*bits as f64);
        let total = work(&self.grinding_bits_batching)
            + self.grinding_bits_queries.iter().map(work).sum::<f64>()
            + self.grinding_bits_ood.iter().map(work).sum::<f64>()
            + self
                .grinding_bits_folding
                .iter()
                .flatten()
                .map(work)
                .sum::<f64>();
        (total.log2() * 100.0).round() / 100.0
    }
}

impl Display for WhirParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [(&str, String); 8] = [
            ("hash_size_bits", self.hash_size_bits.to_string()),
            ("folding_factor", self.folding_factor.to_string()),
            ("batch_size", self.batch_size.to_string()),
            ("batching", self.batching.to_string()),
            ("grinding_bits_batching", self.grinding_bits_batching.to_string()),
            ("num_iterations", self.num_iterations.to_string()),
            ("constraint_degree", self.constraint_degree.to_string()),
            ("field", self.field.to_string()),
        ];
        write_aligned(f, &rows)?;
        writeln!(f)?;
        writeln!(f, "  Per-round parameters:")?;
        writeln!(f, "    log_degrees           : {:?}", self.log_degrees())?;
        writeln!(f, "    log_inv_rates         : {:?}", self.log_inv_rates())?;
        writeln!(f, "    num_queries           : {:?}", self.num_queries)?;
        writeln!(f, "    grinding_bits_queries : {:?}", self.grinding_bits_queries)?;
        writeln!(f, "    num_ood_samples       : {:?}", self.num_ood_samples)?;
        writeln!(f, "    grinding_bits_ood     : {:?}", self.grinding_bits_ood)?;
        writeln!(f, "    grinding_bits_folding : {:?}", self.grinding_bits_folding)?;
        writeln!(f)?;
        writeln!(
            f,
            "  Total grinding overhead (sum of 2^grinding_bits) = 2^({})",
            self.log_grinding_overhead()
        )
    }
}

/// Scheme-specific parameters of one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme")]
pub enum CircuitParameters {
    #[serde(rename = "FRI")]
    Fri(FriParameters),
    #[serde(rename = "WHIR")]
    Whir(WhirParameters),
}

impl CircuitParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            Self::Fri(params) => params.validate(),
            Self::Whir(params) => params.validate(),
        }
    }

    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::Fri(_) => "FRI",
            Self::Whir(_) => "WHIR",
        }
    }

}

impl Display for CircuitParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fri(params) => params.fmt(f),
            Self::Whir(params) => params.fmt(f),
        }
    }
}

/// One independently analyzed circuit of a zkVM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub name: String,
    /// Security of the best known attack, supplied with the parameters.
    #[serde(default)]
    pub best_attack_bits: Option<i64>,
    #[serde(flatten)]
    pub parameters: CircuitParameters,
}

/// Parses a FRI arity string such as `23-19-15-11-8-5`.
///
/// The values are log2 domain sizes: consecutive differences give the folding
/// factors `2^Δ` and the last value gives the early stop degree.
pub fn parse_fri_arities(arities: &str) -> Result<(Vec<usize>, usize), ParameterError> {
    let invalid = || ParameterError::ArityString(arities.to_string());
    let log_sizes = arities
        .split('-')
        .map(|s| s.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    let (&last, _) = log_sizes.split_last().ok_or_else(invalid)?;
    let folding_factors = log_sizes
        .windows(2)
        .map(|pair| match pair[0].checked_sub(pair[1]) {
            Some(diff) if diff > 0 && diff < usize::BITS => Ok(1 << diff),
            _ => Err(invalid()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if last >= usize::BITS {
        return Err(invalid());
    }
    Ok((folding_factors, 1 << last))
}

fn check_length(
    schedule: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ParameterError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ParameterError::ScheduleLength {
            schedule,
            expected,
            actual,
        })
    }
}

fn write_aligned(f: &mut fmt::Formatter<'_>, rows: &[(&str, String)]) -> fmt::Result {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in rows {
        writeln!(f, "  {key:<width$} : {value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zkvms::{dummy_whir, miden};

    fn fri() -> FriParameters {
        match miden::main_circuit().parameters {
            CircuitParameters::Fri(params) => params,
            CircuitParameters::Whir(_) => unreachable!(),
        }
    }

    fn whir() -> WhirParameters {
        match dummy_whir::circuit().parameters {
            CircuitParameters::Whir(params) => params,
            CircuitParameters::Fri(_) => unreachable!(),
        }
    }

    #[test]
    fn test_parse_fri_arities() {
        assert_eq!(
            parse_fri_arities("23-19-15-11-8-5").unwrap(),
            (vec![16, 16, 16, 8, 8], 32)
        );
        assert_eq!(parse_fri_arities("17-13-9-5").unwrap(), (vec![16, 16, 16], 32));
        assert_eq!(parse_fri_arities("20-15-10").unwrap(), (vec![32, 32], 1024));
        assert_eq!(parse_fri_arities("7").unwrap(), (vec![], 128));
    }

    #[test]
    fn test_parse_fri_arities_invalid() {
        for bad in ["", "23-x-5", "5-9", "10-10", "23--5"] {
            assert_eq!(
                parse_fri_arities(bad),
                Err(ParameterError::ArityString(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_valid_presets() {
        assert_eq!(fri().validate(), Ok(()));
        assert_eq!(whir().validate(), Ok(()));
    }

    #[test]
    fn test_fri_derived_values() {
        let params = fri();
        assert_eq!(params.domain_size(), 1 << 21);
        assert_eq!(params.log_inv_rate(), 3);
        assert_eq!(params.log_trace_length(), 18);
        assert_eq!(params.charged_rounds(), (7, 128));
    }

    #[test]
    fn test_fri_rate_out_of_range() {
        for rate in [0.0, 1.0, 1.5, -0.25, f64::NAN] {
            let params = FriParameters { rate, ..fri() };
            assert!(matches!(
                params.validate(),
                Err(ParameterError::RateOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_fri_invalid_counts() {
        let params = FriParameters {
            num_queries: 0,
            ..fri()
        };
        assert_eq!(params.validate(), Err(ParameterError::ZeroQueries));

        let params = FriParameters {
            num_columns: 101,
            ..fri()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::TooManyColumns {
                columns: 101,
                batch_size: 100
            })
        );

        let params = FriParameters {
            trace_length: 3 << 16,
            ..fri()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::NotPowerOfTwo { .. })
        ));

        let params = FriParameters {
            folding_factors: vec![4, 1, 4],
            ..fri()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::InvalidFoldingFactor { round: 1, factor: 1 })
        );
    }

    #[test]
    fn test_fri_schedule_truncates_at_early_stop() {
        // Extra trailing factors are never charged.
        let mut params = fri();
        params.folding_factors.extend([4, 4, 4]);
        assert_eq!(params.validate(), Ok(()));
        assert_eq!(params.charged_rounds(), (7, 128));
    }

    #[test]
    fn test_fri_schedule_too_short() {
        let params = FriParameters {
            folding_factors: vec![4, 4],
            ..fri()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::FoldingScheduleTooShort {
                remaining: 1 << 17,
                early_stop_degree: 128
            })
        );
    }

    #[test]
    fn test_whir_schedule_lengths() {
        let params = WhirParameters {
            num_ood_samples: vec![2, 2, 2],
            ..whir()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::ScheduleLength {
                schedule: "num_ood_samples",
                expected: 4,
                actual: 3
            })
        );

        let mut params = whir();
        params.grinding_bits_folding[2].pop();
        assert_eq!(
            params.validate(),
            Err(ParameterError::ScheduleLength {
                schedule: "grinding_bits_folding[i]",
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_whir_folding_exceeds_degree() {
        let params = WhirParameters {
            log_degree: 19,
            ..whir()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::FoldingExceedsDegree {
                iterations: 5,
                folding_factor: 4,
                log_degree: 19
            })
        );
    }

    #[test]
    fn test_whir_folding_overflow() {
        let params = WhirParameters {
            num_iterations: usize::MAX / 2,
            ..whir()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::FoldingExceedsDegree { .. })
        ));
    }

    #[test]
    fn test_domain_too_large() {
        // 2^62 coefficients at rate 1/4 need a domain of 2^64.
        let params = WhirParameters {
            log_degree: 62,
            log_inv_rate: 2,
            ..whir()
        };
        assert_eq!(params.validate(), Err(ParameterError::DomainTooLarge(64.0)));

        let params = WhirParameters {
            log_inv_rate: 1100,
            ..whir()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::DomainTooLarge(_))
        ));

        let params = FriParameters {
            rate: 2f64.powi(-50),
            ..fri()
        };
        assert_eq!(params.validate(), Err(ParameterError::DomainTooLarge(68.0)));
    }

    #[test]
    fn test_whir_derived_values() {
        let params = whir();
        assert_eq!(params.log_degrees(), vec![23, 19, 15, 11, 7, 3]);
        assert_eq!(params.log_inv_rates(), vec![1, 4, 7, 10, 13, 16]);
        assert_eq!(params.log_grinding_overhead(), 20.03);
    }

    #[test]
    fn test_circuit_serde() {
        let circuit = miden::main_circuit();
        let json = serde_json::to_string(&circuit).unwrap();
        assert!(json.contains(r#""scheme":"FRI""#));
        assert!(json.contains(r#""field":"Goldilocks^2""#));
        let decoded: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, circuit);

        let circuit = dummy_whir::circuit();
        let json = serde_json::to_string(&circuit).unwrap();
        let decoded: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, circuit);
    }

    #[test]
    fn test_scheme_fields_must_match() {
        // A WHIR-only field does not turn a FRI circuit into a valid one.
        let json = r#"{ "name": "broken", "scheme": "FRI", "hash_size_bits": 256,
                        "field": "Goldilocks^2", "log_inv_rate": 1 }"#;
        assert!(serde_json::from_str::<Circuit>(json).is_err());
    }

    #[test]
    fn test_summary_is_aligned() {
        let summary = fri().to_string();
        let width = "domain_size D = trace_length / rho".len();
        assert!(summary.contains(&format!("  {:<width$} : 7\n", "FRI_rounds_n")));
        assert!(summary.contains(&format!("  {:<width$} : Goldilocks²\n", "field")));
    }
}
