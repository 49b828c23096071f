//! ZisK: 21 base circuits plus the compressor, recursive and final circuits
//! of its aggregation tree. Parameters are from
//! <https://github.com/ethereum/soundcalc/issues/18>.

use super::Zkvm;
use crate::{
    errors::Rejection,
    fields::AvailableFields,
    parameters::{parse_fri_arities, BatchingStrategy, Circuit, CircuitParameters, FriParameters},
};

/// One line of the ZisK circuit table.
struct CircuitRow {
    name: &'static str,
    /// `log2` of the trace length.
    bits: u32,
    /// `log2` of the blowup factor.
    blowup_bits: u32,
    degree: usize,
    fixed: usize,
    stage1: usize,
    /// Committed polynomials, i.e. the batch size.
    pols: usize,
    queries: usize,
    opens: usize,
    arities: &'static str,
    best_attack_bits: i64,
}

const fn row(
    name: &'static str,
    (bits, blowup_bits, degree): (u32, u32, usize),
    (fixed, stage1, pols): (usize, usize, usize),
    (queries, opens): (usize, usize),
    arities: &'static str,
    best_attack_bits: i64,
) -> CircuitRow {
    CircuitRow {
        name,
        bits,
        blowup_bits,
        degree,
        fixed,
        stage1,
        pols,
        queries,
        opens,
        arities,
        best_attack_bits,
    }
}

#[rustfmt::skip]
const CIRCUITS: [CircuitRow; 29] = [
    //   name                        bits bf  d      fix   stg1  pols     qry  opn   arities
    row("Main",                      (22, 1, 3), (  3,   38,   61), (128,  3), "23-19-15-11-8-5", 128),
    row("Rom",                       (22, 1, 2), (  1,    1,   18), (128,  3), "23-19-15-11-8-5", 128),
    row("Mem",                       (22, 1, 3), (  2,   13,   29), (128,  3), "23-19-15-11-8-5", 128),
    row("RomData",                   (21, 1, 3), (  2,    6,   19), (128,  3), "22-18-14-11-8-5", 128),
    row("InputData",                 (21, 1, 3), (  2,    9,   27), (128,  3), "22-18-14-11-8-5", 128),
    row("MemAlign",                  (21, 1, 3), (  2,   29,   59), (128,  3), "22-18-14-11-8-5", 128),
    row("MemAlignByte",              (22, 1, 3), (  1,   16,   25), (128,  3), "23-19-15-11-8-5", 128),
    row("MemAlignReadByte",          (22, 1, 3), (  1,   10,   18), (128,  3), "23-19-15-11-8-5", 128),
    row("MemAlignWriteByte",         (22, 1, 3), (  1,   14,   23), (128,  3), "23-19-15-11-8-5", 128),
    row("Arith",                     (21, 1, 3), (  1,   44,   64), (128,  3), "22-18-14-11-8-5", 128),
    row("Binary",                    (22, 1, 3), (  1,   39,   49), (128,  3), "23-19-15-11-8-5", 128),
    row("BinaryAdd",                 (22, 1, 3), (  1,   10,   18), (128,  3), "23-19-15-11-8-5", 128),
    row("BinaryExtension",           (22, 1, 3), (  1,   29,   40), (128,  3), "23-19-15-11-8-5", 128),
    row("Add256",                    (20, 1, 3), (  1,   47,   69), (128,  3), "21-17-13-9-5",    128),
    row("ArithEq",                   (20, 1, 3), (  2,   39,  434), (128, 36), "21-17-13-9-5",    128),
    row("ArithEq384",                (20, 1, 3), (  2,   33,  536), (128, 54), "21-17-13-9-5",    128),
    row("Keccakf",                   (16, 1, 3), (  2, 2137, 4065), (128, 26), "17-13-9-5",       128),
    row("Sha256f",                   (18, 1, 3), (  2,  102, 1265), (128, 87), "19-15-11-8-5",    128),
    row("SpecifiedRanges",           (20, 1, 3), ( 34,   33,   88), (128,  3), "21-17-13-9-5",    128),
    row("VirtualTable0",             (20, 1, 3), (100,   16,  129), (128,  3), "21-17-13-9-5",    128),
    row("VirtualTable1",             (20, 1, 3), (145,   16,  174), (128,  3), "21-17-13-9-5",    128),
    row("ArithEq Compressor",        (18, 2, 3), ( 45,   36,  238), ( 64,  4), "20-16-12-8-5",    128),
    row("ArithEq384 Compressor",     (18, 2, 3), ( 45,   36,  238), ( 64,  4), "20-16-12-8-5",    128),
    row("Keccakf Compressor",        (21, 2, 3), ( 45,   36,  238), ( 64,  4), "23-19-15-11-8-5", 128),
    row("Sha256f Compressor",        (19, 2, 3), ( 45,   36,  238), ( 64,  4), "21-17-13-9-5",    128),
    row("VirtualTable1 Compressor",  (18, 2, 3), ( 45,   36,  238), ( 64,  4), "20-16-12-8-5",    128),
    row("Recursive1",                (17, 3, 3), ( 45,   36,  243), ( 43,  4), "20-16-12-8-5",    129),
    row("Recursive2",                (17, 3, 3), ( 45,   36,  243), ( 43,  4), "20-16-12-8-5",    129),
    row("Final",                     (16, 4, 3), ( 45,   42,  249), ( 32,  4), "20-15-10",        128),
];

impl CircuitRow {
    fn circuit(&self) -> Result<Circuit, Rejection> {
        let (folding_factors, early_stop_degree) =
            parse_fri_arities(self.arities).map_err(|err| Rejection::new(self.name, err))?;
        Ok(Circuit {
            name: self.name.to_string(),
            best_attack_bits: Some(self.best_attack_bits),
            parameters: CircuitParameters::Fri(FriParameters {
                hash_size_bits: 256,
                field: AvailableFields::Goldilocks3,
                rate: 1.0 / f64::from(1u32 << self.blowup_bits),
                trace_length: 1 << self.bits,
                num_columns: self.fixed + self.stage1,
                batch_size: self.pols,
                batching: BatchingStrategy::Powers,
                num_queries: self.queries,
                air_max_degree: self.degree,
                folding_factors,
                early_stop_degree,
                max_combo: self.opens,
                grinding_bits: 0,
            }),
        })
    }
}

pub fn circuits() -> Vec<Result<Circuit, Rejection>> {
    CIRCUITS.iter().map(CircuitRow::circuit).collect()
}

pub fn zkvm() -> Zkvm {
    Zkvm {
        name: "ZisK".to_string(),
        circuits: circuits(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_table() {
        let circuits: Vec<Circuit> = circuits().into_iter().map(Result::unwrap).collect();
        assert_eq!(circuits.len(), 29);
        assert_eq!(circuits[0].name, "Main");
        assert_eq!(circuits[28].name, "Final");

        let CircuitParameters::Fri(keccakf) = &circuits[16].parameters else {
            panic!("ZisK circuits are FRI based");
        };
        assert_eq!(keccakf.trace_length, 1 << 16);
        assert_eq!(keccakf.num_columns, 2139);
        assert_eq!(keccakf.batch_size, 4065);
        assert_eq!(keccakf.folding_factors, vec![16, 16, 16]);
        assert_eq!(keccakf.early_stop_degree, 32);
        assert_eq!(keccakf.charged_rounds(), (3, 32));
    }

    #[test]
    fn test_round_counts() {
        for circuit in circuits() {
            let circuit = circuit.unwrap();
            let CircuitParameters::Fri(params) = &circuit.parameters else {
                panic!("ZisK circuits are FRI based");
            };
            let expected = match circuit.name.as_str() {
                "Final" => 2,
                "Keccakf" => 3,
                name if name.ends_with("Compressor") && name != "Keccakf Compressor" => 4,
                "Recursive1" | "Recursive2" | "Sha256f" => 4,
                "Add256" | "ArithEq" | "ArithEq384" | "SpecifiedRanges" | "VirtualTable0"
                | "VirtualTable1" => 4,
                _ => 5,
            };
            assert_eq!(params.charged_rounds().0, expected, "{}", circuit.name);
        }
    }
}
