//! Markdown reports and the console summary.

use std::fmt::{self, Display, Formatter};

use crate::{
    parameters::CircuitParameters,
    security::{CircuitOutcome, CircuitReport, ZkvmReport},
    utils::KIB,
};

const EMPTY_CELL: &str = "—";
const COMMIT_ROUND: &str = "commit round ";

/// The Markdown report of a zkVM.
pub struct MarkdownReport<'a>(pub &'a ZkvmReport);

impl Display for MarkdownReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "# 📊 {}", report.name)?;
        writeln!(f)?;
        writeln!(f, "How to read this report:")?;
        writeln!(f, "- Table rows correspond to security regimes")?;
        writeln!(f, "- Table columns correspond to proof system components")?;
        writeln!(f, "- Cells show bits of security per component")?;
        writeln!(f, "- Proof size estimate is only indicative")?;
        writeln!(f)?;

        match report.circuits.as_slice() {
            [] => writeln!(f, "No circuits available."),
            [single] => circuit_section(f, single),
            circuits => {
                writeln!(f, "## Circuits")?;
                writeln!(f)?;
                for circuit in circuits {
                    writeln!(f, "- [{}](#{})", circuit.name(), anchor(circuit.name()))?;
                }
                writeln!(f)?;
                for circuit in circuits {
                    writeln!(f, "## {}", circuit.name())?;
                    writeln!(f)?;
                    circuit_section(f, circuit)?;
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}

pub fn render_markdown(report: &ZkvmReport) -> String {
    MarkdownReport(report).to_string()
}

fn anchor(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn circuit_section(f: &mut Formatter<'_>, outcome: &CircuitOutcome) -> fmt::Result {
    match outcome {
        CircuitOutcome::Rejected(rejection) => writeln!(f, "**Rejected:** {}", rejection.reason),
        CircuitOutcome::Evaluated(report) => {
            writeln!(f, "**Parameters:**")?;
            for parameter in parameter_lines(&report.parameters) {
                writeln!(f, "- {parameter}")?;
            }
            writeln!(f)?;
            writeln!(
                f,
                "**Proof Size Estimate:** {} KiB, where 1 KiB = 1024 bytes",
                report.proof_size_bits / KIB
            )?;
            writeln!(f)?;
            SecurityTable(report).fmt(f)
        }
    }
}

fn parameter_lines(parameters: &CircuitParameters) -> Vec<String> {
    match parameters {
        CircuitParameters::Fri(p) => {
            let (rounds, _) = p.charged_rounds();
            vec![
                "Polynomial commitment scheme: FRI".to_string(),
                format!("Hash size (bits): {}", p.hash_size_bits),
                format!("Number of queries: {}", p.num_queries),
                format!("Grinding (bits): {}", p.grinding_bits),
                format!("Field: {}", p.field),
                format!("Rate (ρ): {}", p.rate),
                format!("Trace length (H): $2^{{{}}}$", p.log_trace_length()),
                format!("FRI rounds: {rounds}"),
                format!("FRI folding factors: {:?}", p.folding_factors),
                format!("FRI early stop degree: {}", p.early_stop_degree),
                format!("Batching: {}", p.batching),
            ]
        }
        CircuitParameters::Whir(p) => vec![
            "Polynomial commitment scheme: WHIR".to_string(),
            format!("Hash size (bits): {}", p.hash_size_bits),
            format!("Field: {}", p.field),
            format!("Iterations (M): {}", p.num_iterations),
            format!("Folding factor (k): {}", p.folding_factor),
            format!("Constraint degree: {}", p.constraint_degree),
            format!("Batch size: {}", p.batch_size),
            format!("Batching: {}", p.batching),
            format!("Queries per iteration: {:?}", p.num_queries),
            format!("OOD samples per iteration: {:?}", p.num_ood_samples),
            format!("Total grinding overhead log2: {}", p.log_grinding_overhead()),
        ],
    }
}

struct Column {
    header: String,
    /// The phase whose value fills the column.
    phase: String,
}

/// Columns in the order the phases were computed. Commit rounds collapse
/// into one column when every regime gives them all the same value.
fn columns(report: &CircuitReport) -> Vec<Column> {
    let Some(first) = report.regimes.first() else {
        return Vec::new();
    };
    let commit_rounds: Vec<&str> = first
        .phases
        .iter()
        .map(|phase| phase.name.as_str())
        .filter(|name| name.starts_with(COMMIT_ROUND))
        .collect();
    let collapse = commit_rounds.len() > 1
        && report.regimes.iter().all(|regime| {
            let values: Vec<Option<i64>> =
                commit_rounds.iter().map(|name| regime.phase(name)).collect();
            values.windows(2).all(|pair| pair[0] == pair[1])
        });

    let mut columns = Vec::with_capacity(first.phases.len());
    for phase in &first.phases {
        if collapse && phase.name.starts_with(COMMIT_ROUND) {
            if phase.name == commit_rounds[0] {
                columns.push(Column {
                    header: format!("commit rounds (×{})", commit_rounds.len()),
                    phase: phase.name.clone(),
                });
            }
        } else {
            columns.push(Column {
                header: phase.name.clone(),
                phase: phase.name.clone(),
            });
        }
    }
    columns
}

/// The `regime | total | phases...` table of one circuit, with a final
/// `best attack` row.
pub struct SecurityTable<'a>(pub &'a CircuitReport);

impl Display for SecurityTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let columns = columns(report);

        let mut header = vec!["regime", "total"];
        header.extend(columns.iter().map(|column| column.header.as_str()));
        table_row(f, &header)?;
        table_row(f, &["---"].repeat(header.len()))?;

        for regime in &report.regimes {
            let mut row = vec![regime.regime.to_string(), regime.total.to_string()];
            row.extend(columns.iter().map(|column| {
                regime
                    .phase(&column.phase)
                    .map_or_else(|| EMPTY_CELL.to_string(), |bits| bits.to_string())
            }));
            table_row(f, &row)?;
        }

        let best_attack = report
            .best_attack
            .map_or_else(|| "unavailable".to_string(), |bits| bits.to_string());
        let mut row = vec!["best attack".to_string(), best_attack];
        row.extend(columns.iter().map(|_| EMPTY_CELL.to_string()));
        table_row(f, &row)
    }
}

fn table_row<S: AsRef<str>>(f: &mut Formatter<'_>, cells: &[S]) -> fmt::Result {
    write!(f, "|")?;
    for cell in cells {
        write!(f, " {} |", cell.as_ref())?;
    }
    writeln!(f)
}

/// The console summary of a zkVM.
pub struct Summary<'a>(pub &'a ZkvmReport);

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f)?;
        writeln!(f, "#############################################")?;
        writeln!(f, "#  zkVM: {}", report.name)?;
        writeln!(f, "#############################################")?;

        let multi_circuit = report.circuits.len() > 1;
        for outcome in &report.circuits {
            writeln!(f)?;
            if multi_circuit {
                writeln!(f, "--- Circuit: {} ---", outcome.name())?;
                writeln!(f)?;
            }
            match outcome {
                CircuitOutcome::Rejected(rejection) => {
                    writeln!(f, "rejected: {}", rejection.reason)?;
                }
                CircuitOutcome::Evaluated(circuit) => circuit_summary(f, circuit)?,
            }
        }
        Ok(())
    }
}

fn circuit_summary(f: &mut Formatter<'_>, circuit: &CircuitReport) -> fmt::Result {
    writeln!(
        f,
        "proof size estimate: {} KiB, where 1 KiB = 1024 bytes",
        circuit.proof_size_bits / KIB
    )?;
    writeln!(f)?;
    writeln!(f, "parameters:")?;
    circuit.parameters.fmt(f)?;
    writeln!(f)?;
    writeln!(f, "security levels (rbr):")?;
    for regime in &circuit.regimes {
        let phases: Vec<String> = regime
            .phases
            .iter()
            .map(|phase| format!("{}={}", phase.name, phase.bits))
            .collect();
        writeln!(
            f,
            "  {}: total={} (union bound {:.2}) {}",
            regime.regime,
            regime.total,
            regime.union_bound,
            phases.join(", ")
        )?;
    }
    match circuit.best_attack {
        Some(bits) => writeln!(f, "  best attack: {bits}"),
        None => writeln!(f, "  best attack: unavailable"),
    }
}
