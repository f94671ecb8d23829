//! Error types.
//!
//! This module contains the errors returned by the library. Failed
//! comparisons found by the equivalence checker have their own type,
//! [`CheckError`](crate::checker::CheckError), since they carry the compared
//! samples.

use thiserror::Error;

/// Result type of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors of the DDS reference model library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Phase code width out of range.
    #[error("PHASE_DW = {0} is not between 2 and 32")]
    PhaseWidth(u32),

    /// Output sample width out of range.
    #[error("OUT_DW = {0} is not between 2 and 32")]
    OutputWidth(u32),

    /// Taylor pipeline selected without a LUT address width.
    #[error("USE_TAYLOR is set but LUT_DW is missing")]
    MissingLutWidth,

    /// LUT address width out of range.
    #[error("LUT address width {width} is out of range (maximum {max})")]
    LutWidth {
        /// Requested address width.
        width: u32,
        /// Largest allowed address width.
        max: u32,
    },

    /// Malformed LUT text.
    #[error("LUT line {line}: {reason}")]
    LutParse {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// The testbench ran out of cycles before collecting enough samples.
    #[error(
        "capture timed out after {cycles} cycles \
         (model produced {model} samples, device produced {device})"
    )]
    CaptureTimeout {
        /// Number of simulated clock cycles.
        cycles: u64,
        /// Valid samples collected from the model.
        model: usize,
        /// Valid samples collected from the device.
        device: usize,
    },
}

impl Error {
    pub(crate) fn lut_parse(line: usize, reason: impl Into<String>) -> Error {
        Error::LutParse {
            line,
            reason: reason.into(),
        }
    }
}
