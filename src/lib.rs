pub mod bits;
pub mod errors;
pub mod fields; // Preset extension fields
pub mod parameters;
pub mod protocols; // Per-phase soundness of FRI and WHIR
pub mod regimes; // Proximity-gap regimes
pub mod report;
pub mod security; // Aggregation into circuit and zkVM reports
pub mod utils; // Utils in general
pub mod zkvms;

pub use errors::Error;
pub use security::{evaluate, evaluate_circuit, evaluate_zkvm};
