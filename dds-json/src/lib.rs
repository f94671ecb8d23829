//! dds-json contains the JSON schemas used by the DDS reference model tools.
//!
//! Configurations, parameter sweeps and run reports are read from and written
//! to disk with these schemas. Field names of the DDS configuration follow the
//! parameter names of the HDL core (`PHASE_DW`, `OUT_DW`, ...).

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// DDS configuration JSON schema.
///
/// This schema is not validated. It is converted into a validated
/// configuration by the `dds-model` crate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    /// Phase code width in bits.
    pub phase_dw: u32,
    /// Output sample width in bits.
    pub out_dw: u32,
    /// Use the Taylor-corrected (deeper) pipeline.
    #[serde(default)]
    pub use_taylor: bool,
    /// Quadrant LUT address width used when `use_taylor` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lut_dw: Option<u32>,
    /// Enable the cosine output.
    #[serde(default)]
    pub sin_cos: bool,
    /// Invert the sign of the sine output.
    #[serde(default)]
    pub negative_sine: bool,
    /// Invert the sign of the cosine output.
    #[serde(default)]
    pub negative_cosine: bool,
    /// Use the memory initialization LUT encoding instead of literal
    /// assignments (the default).
    #[serde(default = "default_true")]
    pub use_lut_file: bool,
}

/// Parameter sweep JSON schema.
///
/// A sweep lists the values of each parameter. The sweep runs every
/// combination of the lists (their cartesian product).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Sweep {
    /// Phase code widths.
    pub phase_dw: Vec<u32>,
    /// Output sample widths.
    pub out_dw: Vec<u32>,
    /// Taylor pipeline settings.
    pub use_taylor: Vec<bool>,
    /// LUT address widths (only used by Taylor configurations).
    pub lut_dw: Vec<u32>,
    /// Cosine output settings.
    pub sin_cos: Vec<bool>,
    /// Sine sign inversion settings.
    pub negative_sine: Vec<bool>,
    /// Cosine sign inversion settings.
    pub negative_cosine: Vec<bool>,
    /// LUT encoding settings.
    #[serde(default = "default_use_lut_file")]
    pub use_lut_file: Vec<bool>,
    /// Phase increment per clock cycle of the stimulus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<u64>,
    /// Number of samples compared per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_items: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_use_lut_file() -> Vec<bool> {
    vec![default_true()]
}

/// Report of a single run of the model against a device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Configuration of the run.
    pub config: Config,
    /// Whether every compared sample was within tolerance.
    pub passed: bool,
    /// Number of sample pairs compared.
    pub compared: usize,
    /// Tolerance applied to each sample pair.
    pub tolerance: i64,
    /// Largest absolute sine difference found.
    pub max_error_sin: i64,
    /// Largest absolute cosine difference found, if the cosine was checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_error_cos: Option<i64>,
    /// Description of the first tolerance violation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<String>,
    /// Pipeline latency of the model in clock cycles.
    pub latency: usize,
    /// Number of clock cycles simulated.
    pub cycles: u64,
    /// Advisory spurious free dynamic range of the device sine output in dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sfdr_db: Option<f64>,
    /// Name of the LUT file written for this run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lut_file: Option<String>,
    /// Time at which the run finished (RFC 3339).
    pub datetime: String,
}

/// Report of a parameter sweep.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// Program that produced the report.
    pub generator: String,
    /// Number of runs that passed.
    pub passed: usize,
    /// Number of runs that failed.
    pub failed: usize,
    /// Individual run reports.
    pub runs: Vec<RunReport>,
}
