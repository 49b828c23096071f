use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use soundcalc::{
    evaluate_zkvm,
    report::{render_markdown, Summary},
    security::ZkvmReport,
    zkvms::{self, Zkvm},
    Error,
};
#[cfg(feature = "tracing")]
use tracing::info;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

/// Bit-security calculator for FRI and WHIR based zkVMs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in zkVMs to analyze. Defaults to all of them.
    #[arg(short = 'z', long = "zkvm", num_args = 1..)]
    zkvms: Vec<String>,

    /// Additional JSON parameter bundles.
    #[arg(short = 'p', long = "params", num_args = 1..)]
    bundles: Vec<PathBuf>,

    /// Only print the console summary of these zkVMs.
    #[arg(long = "print-only", num_args = 1..)]
    print_only: Vec<String>,

    #[arg(short = 'o', long = "out-dir", default_value = "reports")]
    out_dir: PathBuf,

    /// Also write a JSON report next to each Markdown report.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Error> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut selected = if args.zkvms.is_empty() {
        zkvms::presets()
    } else {
        args.zkvms
            .iter()
            .map(|name| zkvms::preset(name))
            .collect::<Result<Vec<_>, _>>()?
    };
    for path in &args.bundles {
        selected.push(zkvms::load_bundle(path)?);
    }

    let reports: Vec<ZkvmReport> = selected.iter().map(evaluate_zkvm).collect();

    for report in &reports {
        let printed = args.print_only.is_empty()
            || args
                .print_only
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&report.name));
        if printed {
            println!("{}", Summary(report));
        }
    }

    fs::create_dir_all(&args.out_dir).map_err(|err| Error::io(&args.out_dir, err))?;
    for (zkvm, report) in selected.iter().zip(&reports) {
        write_reports(zkvm, report, &args.out_dir, args.json)?;
    }
    Ok(())
}

fn write_reports(
    zkvm: &Zkvm,
    report: &ZkvmReport,
    out_dir: &Path,
    json: bool,
) -> Result<(), Error> {
    let stem = zkvm.file_stem();

    let md_path = out_dir.join(format!("{stem}.md"));
    fs::write(&md_path, render_markdown(report)).map_err(|err| Error::io(&md_path, err))?;
    #[cfg(feature = "tracing")]
    info!(path = %md_path.display(), "wrote report");
    println!("wrote :: {}", md_path.display());

    if json {
        let json_path = out_dir.join(format!("{stem}.json"));
        let encoded = serde_json::to_string_pretty(report)?;
        fs::write(&json_path, encoded).map_err(|err| Error::io(&json_path, err))?;
        println!("wrote :: {}", json_path.display());
    }
    Ok(())
}
