//! Fingerprint domain - identity of a generation-parameter set

mod builder;
mod params;

pub use builder::{Fingerprint, FingerprintBuilder};
pub use params::{ModelParams, StopSequences};
