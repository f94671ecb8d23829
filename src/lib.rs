//! dds-model is a bit-exact software reference model of a pipelined direct
//! digital synthesizer (DDS) core, together with the tools used to verify a
//! hardware implementation against it. It generates the quarter-wave sine
//! lookup tables that the core loads, drives the model and a device under
//! test in lockstep, checks that their outputs agree within a tolerance
//! derived from the configuration, and analyzes the spectrum of the
//! synthesized waveform.

#![warn(missing_docs)]

pub mod app;
pub mod args;
pub mod checker;
pub mod config;
pub mod device;
pub mod error;
pub mod lut;
pub mod model;
pub mod report;
pub mod spectrum;
pub mod stimulus;
pub mod sweep;
pub mod testbench;

pub use error::{Error, Result};
