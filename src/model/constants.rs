//! DDS implementation constants.
//!
//! This module contains constants that define the characteristics of the DDS
//! core implementation in the FPGA.

/// Pipeline depth of the DDS core without the Taylor correction.
///
/// This is the number of clock cycles between a phase code entering the core
/// and the corresponding sample leaving it.
pub const BASE_DEPTH: usize = 3;

/// Extra pipeline depth added by the Taylor correction.
///
/// The correction needs a multiplier and an adder after the LUT read.
pub const TAYLOR_EXTRA_DEPTH: usize = 3;

/// Largest absolute sample error of the Taylor-corrected core.
pub const TAYLOR_TOLERANCE: i64 = 10;

/// Largest supported phase code width.
pub const MAX_PHASE_DW: u32 = 32;

/// Largest supported output sample width.
pub const MAX_OUT_DW: u32 = 32;

/// Largest address width of a generated quadrant LUT.
pub const MAX_LUT_ADDRESS_WIDTH: u32 = 24;
