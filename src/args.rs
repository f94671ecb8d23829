//! dds-model CLI arguments.
//!
//! This module contains the definition of the CLI arguments of the
//! `generate-sine-lut` and `dds-check` applications.

use clap::Parser;
use std::path::PathBuf;

/// `generate-sine-lut` CLI arguments.
///
/// The flag names follow the parameter names of the HDL core.
#[derive(Parser, Debug, Clone, Eq, PartialEq, Hash)]
#[clap(author, version, about = "Generates a quadrant sine LUT", long_about = None)]
pub struct LutArgs {
    /// Output file (its extension is replaced by .hex or .vh)
    #[clap(long, default_value = "sine_lut.hex")]
    pub filename: PathBuf,
    /// Quadrant LUT address width in bits
    #[clap(long = "PHASE_DW", default_value_t = 8)]
    pub phase_dw: u32,
    /// LUT entry width in bits
    #[clap(long = "OUT_DW", default_value_t = 8)]
    pub out_dw: u32,
    /// Write only the memory initialization file (true) or only the literal
    /// assignments file (false); both are written if omitted
    #[clap(long = "USE_LUT_FILE")]
    pub use_lut_file: Option<bool>,
}

/// `dds-check` CLI arguments.
#[derive(Parser, Debug, Clone, Eq, PartialEq, Hash)]
#[clap(
    author,
    version,
    about = "Checks a DDS device emulation against the reference model",
    long_about = None
)]
pub struct CheckArgs {
    /// JSON file with the parameter sweep to run (the built-in sweep is used
    /// if omitted)
    #[clap(long)]
    pub sweep: Option<PathBuf>,
    /// Directory where the LUT files and the report are written
    #[clap(long, default_value = "dds-check")]
    pub output: PathBuf,
    /// Phase increment per clock cycle (overrides the sweep file)
    #[clap(long)]
    pub increment: Option<u64>,
    /// Number of samples compared per run (overrides the sweep file)
    #[clap(long)]
    pub num_items: Option<usize>,
}
