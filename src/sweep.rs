//! Parameter sweeps.
//!
//! This module expands a [`dds_json::Sweep`] into the list of configurations
//! that it describes and runs the reference model against a [`LutDevice`]
//! for each of them.

use crate::checker::{CheckError, CheckReport, Checker, Tolerance};
use crate::config::Config;
use crate::device::LutDevice;
use crate::error::Result;
use crate::lut::SineLut;
use crate::spectrum::Spectrum;
use crate::stimulus::PhaseStimulus;
use crate::testbench::Testbench;
use dds_json::Sweep;
use std::collections::HashSet;

/// Gives the sweeps run when no sweep file is given.
///
/// The first sweep covers the Taylor pipeline with wide phase codes. The
/// second covers the plain pipeline, including a 3-bit output, with every
/// combination of the output options.
pub fn default_sweeps() -> Vec<Sweep> {
    vec![
        Sweep {
            phase_dw: vec![20, 24],
            out_dw: vec![16],
            use_taylor: vec![true],
            lut_dw: vec![9, 11],
            sin_cos: vec![true],
            negative_sine: vec![false, true],
            negative_cosine: vec![false, true],
            use_lut_file: vec![true],
            increment: None,
            num_items: None,
        },
        Sweep {
            phase_dw: vec![16, 8],
            out_dw: vec![16, 3],
            use_taylor: vec![false],
            lut_dw: vec![6],
            sin_cos: vec![true, false],
            negative_sine: vec![true, false],
            negative_cosine: vec![true, false],
            use_lut_file: vec![true],
            increment: None,
            num_items: None,
        },
    ]
}

/// Expands a sweep into the configurations that it describes.
///
/// Every combination of the parameter lists is built and validated, in the
/// order in which the lists are given. `LUT_DW` only applies to Taylor
/// configurations, so configurations that only differ in `LUT_DW` are listed
/// once. Returns an error if any combination is not a valid configuration.
pub fn expand(sweep: &Sweep) -> Result<Vec<Config>> {
    let mut configs = Vec::new();
    let mut seen = HashSet::new();
    for &phase_dw in &sweep.phase_dw {
        for &out_dw in &sweep.out_dw {
            for &use_taylor in &sweep.use_taylor {
                let lut_dws: Vec<Option<u32>> = if use_taylor && !sweep.lut_dw.is_empty() {
                    sweep.lut_dw.iter().copied().map(Some).collect()
                } else {
                    vec![None]
                };
                for lut_dw in lut_dws {
                    for &sin_cos in &sweep.sin_cos {
                        for &negative_sine in &sweep.negative_sine {
                            for &negative_cosine in &sweep.negative_cosine {
                                for &use_lut_file in &sweep.use_lut_file {
                                    let mut builder = Config::builder(phase_dw, out_dw)
                                        .use_taylor(use_taylor)
                                        .sin_cos(sin_cos)
                                        .negative_sine(negative_sine)
                                        .negative_cosine(negative_cosine)
                                        .use_lut_file(use_lut_file);
                                    if let Some(lut_dw) = lut_dw {
                                        builder = builder.lut_dw(lut_dw);
                                    }
                                    let config = builder.build()?;
                                    if seen.insert(config) {
                                        configs.push(config);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    tracing::debug!(configs = configs.len(), "expanded sweep");
    Ok(configs)
}

/// Result of running the model against a device for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Configuration of the run.
    pub config: Config,
    /// LUT loaded in the device.
    pub lut: SineLut,
    /// Tolerance bound applied by the checker.
    pub tolerance: i64,
    /// Number of clock cycles simulated.
    pub cycles: u64,
    /// Outcome of the comparison.
    pub check: std::result::Result<CheckReport, CheckError>,
    /// Spurious free dynamic range of the device sine output in dB.
    pub sfdr_db: Option<f64>,
}

impl Run {
    /// Returns `true` if every compared sample was within tolerance.
    pub fn passed(&self) -> bool {
        self.check.is_ok()
    }
}

/// Runs the reference model against a [`LutDevice`] for a configuration.
///
/// The stimulus starts at phase 0 and advances by `increment` every clock
/// cycle. If `num_items` is `None`, the number of samples that covers half
/// a waveform period is compared.
#[tracing::instrument(name = "sweep::run", level = "debug", skip_all, fields(%config))]
pub fn run(config: Config, increment: u64, num_items: Option<usize>) -> Result<Run> {
    let device = LutDevice::new(config)?;
    let lut = device.lut().clone();
    let tolerance = Tolerance::for_lut(&config, lut.address_width());
    let stimulus = PhaseStimulus::new(&config, increment);
    let num_items = num_items.unwrap_or_else(|| stimulus.half_wave_items());

    let mut testbench = Testbench::new(config, device, stimulus);
    testbench.reset();
    let capture = testbench.capture(num_items)?;

    let checker = Checker::new(&config, tolerance);
    let check = checker.check(
        capture.model.iter().copied(),
        capture.device.iter().copied(),
    );
    let sine: Vec<i32> = capture.device.iter().map(|sample| sample.sin).collect();
    let sfdr_db = Spectrum::analyze(&sine, config.max_out_val()).sfdr_db();
    match &check {
        Ok(_) => tracing::info!(%config, ?sfdr_db, "run passed"),
        Err(error) => tracing::warn!(%config, %error, "run failed"),
    }
    Ok(Run {
        config,
        lut,
        tolerance: checker.tolerance(),
        cycles: capture.cycles,
        check,
        sfdr_db,
    })
}
