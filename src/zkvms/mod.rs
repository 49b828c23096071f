//! Built-in zkVM parameter sets and JSON parameter bundles.

use std::{fs, path::Path};

use serde::Deserialize;
#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

use crate::{
    errors::{Error, Rejection},
    parameters::Circuit,
};

pub mod dummy_whir;
pub mod miden;
pub mod risc0;
pub mod zisk;

/// A zkVM: a named list of independently analyzed circuits. Entries that
/// could not be decoded are kept as rejections so that the report lists them.
#[derive(Debug, Clone, PartialEq)]
pub struct Zkvm {
    pub name: String,
    pub circuits: Vec<Result<Circuit, Rejection>>,
}

impl Zkvm {
    pub fn new(name: impl Into<String>, circuits: Vec<Circuit>) -> Self {
        Self {
            name: name.into(),
            circuits: circuits.into_iter().map(Ok).collect(),
        }
    }

    /// File stem used for reports, e.g. `dummywhir` for `DummyWHIR`.
    pub fn file_stem(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }
}

pub fn presets() -> Vec<Zkvm> {
    vec![
        zisk::zkvm(),
        miden::zkvm(),
        risc0::zkvm(),
        dummy_whir::zkvm(),
    ]
}

/// Looks up a preset by name, ignoring case.
pub fn preset(name: &str) -> Result<Zkvm, Error> {
    presets()
        .into_iter()
        .find(|zkvm| zkvm.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::UnknownZkvm(name.to_string()))
}

#[derive(Deserialize)]
struct Bundle {
    name: String,
    circuits: Vec<serde_json::Value>,
}

/// Parses a JSON parameter bundle.
///
/// Every circuit entry is decoded on its own, so a malformed entry becomes a
/// rejection while the rest of the bundle is still usable.
pub fn parse_bundle(json: &str) -> Result<Zkvm, Error> {
    let bundle: Bundle = serde_json::from_str(json)?;
    let circuits = bundle
        .circuits
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let name = value
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| format!("circuit #{index}"), str::to_string);
            decode_circuit(&value).map_err(|reason| Rejection::new(name, reason))
        })
        .collect();
    Ok(Zkvm {
        name: bundle.name,
        circuits,
    })
}

/// Decodes one circuit entry. Keys that the entry's scheme does not know,
/// such as WHIR schedules on a FRI circuit, reject the entry.
fn decode_circuit(value: &serde_json::Value) -> Result<Circuit, String> {
    let circuit = Circuit::deserialize(value).map_err(|err| err.to_string())?;
    let known = serde_json::to_value(&circuit).map_err(|err| err.to_string())?;
    if let (Some(given), Some(known)) = (value.as_object(), known.as_object()) {
        if let Some(key) = given.keys().find(|key| !known.contains_key(key.as_str())) {
            return Err(format!(
                "unknown field `{key}` for a {} circuit",
                circuit.parameters.scheme()
            ));
        }
    }
    Ok(circuit)
}

#[cfg_attr(feature = "tracing", instrument(skip_all, fields(path = %path.display())))]
pub fn load_bundle(path: &Path) -> Result<Zkvm, Error> {
    let json = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    let zkvm = parse_bundle(&json)?;
    #[cfg(feature = "tracing")]
    debug!(zkvm = %zkvm.name, circuits = zkvm.circuits.len(), "loaded parameter bundle");
    Ok(zkvm)
}

/// Folding factors obtained by folding a domain of `domain_size` by `factor`
/// until it is no larger than `early_stop_degree`.
pub(crate) fn uniform_folding(
    domain_size: usize,
    factor: usize,
    early_stop_degree: usize,
) -> Vec<usize> {
    let mut factors = Vec::new();
    let mut size = domain_size;
    while size > early_stop_degree {
        factors.push(factor);
        size /= factor;
    }
    factors
}
