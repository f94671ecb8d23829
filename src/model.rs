//! DDS reference model.
//!
//! This module contains a cycle-accurate behavioral model of the DDS core. The
//! model computes the exact sine and cosine of each phase code in double
//! precision, quantizes them to the output width, and delays them through a
//! shift-register pipeline with the same depth as the FPGA implementation.
//!
//! The Taylor-corrected core is modelled by its latency only. Its
//! approximation error is absorbed by the tolerance of the equivalence checker
//! (see [`Tolerance`](crate::checker::Tolerance)).

use crate::config::Config;
use serde::Serialize;

pub mod constants;

/// Output sample of the DDS.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize)]
pub struct Sample {
    /// Sine amplitude.
    pub sin: i32,
    /// Cosine amplitude.
    ///
    /// This is zero if the cosine output is disabled.
    pub cos: i32,
}

impl Sample {
    /// Creates a sample from its sine and cosine amplitudes.
    pub fn new(sin: i32, cos: i32) -> Sample {
        Sample { sin, cos }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
struct Stage {
    valid: bool,
    sample: Sample,
}

/// Fixed-length shift-register pipeline.
///
/// The pipeline is a ring buffer with one slot per clock cycle of latency. A
/// push writes the slot of the oldest entry, so that after `len` pushes an
/// entry becomes the oldest one and is readable at the output.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Pipeline {
    stages: Vec<Stage>,
    // index of the oldest stage, which is the next one to be written
    head: usize,
}

impl Pipeline {
    pub(crate) fn new(depth: usize) -> Pipeline {
        assert!(depth > 0, "pipeline depth must be positive");
        Pipeline {
            stages: vec![Stage::default(); depth],
            head: 0,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.stages.len()
    }

    pub(crate) fn push(&mut self, valid: bool, sample: Sample) {
        self.stages[self.head] = Stage { valid, sample };
        self.head = (self.head + 1) % self.stages.len();
    }

    pub(crate) fn output(&self) -> Option<Sample> {
        let stage = &self.stages[self.head];
        stage.valid.then_some(stage.sample)
    }

    pub(crate) fn clear(&mut self) {
        self.stages.fill(Stage::default());
        self.head = 0;
    }
}

/// DDS reference model.
///
/// The model is driven one clock cycle at a time. Each cycle the harness
/// optionally latches a phase code with [`DdsModel::set_data`], advances the
/// model with [`DdsModel::tick`], and reads the output slot of the pipeline
/// with [`DdsModel::data_valid`], [`DdsModel::get_data`] and
/// [`DdsModel::get_data_cos`].
///
/// A phase code latched before a tick becomes valid at the output after
/// exactly [`DdsModel::latency`] ticks.
///
/// # Examples
/// ```
/// use dds_model::{config::Config, model::DdsModel};
/// let config = Config::builder(8, 8).sin_cos(true).build()?;
/// let mut model = DdsModel::new(config);
/// model.set_data(64); // quarter turn
/// for _ in 0..model.latency() {
///     model.tick();
/// }
/// assert!(model.data_valid());
/// assert_eq!(model.get_data(), 127);
/// assert_eq!(model.get_data_cos(), 0);
/// # Ok::<(), dds_model::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DdsModel {
    config: Config,
    pipeline: Pipeline,
    phase: u32,
    in_valid: bool,
}

impl DdsModel {
    /// Creates a new model.
    ///
    /// The pipeline depth is fixed by the configuration for the lifetime of the
    /// model.
    pub fn new(config: Config) -> DdsModel {
        tracing::debug!(%config, latency = config.latency(), "creating DDS model");
        DdsModel {
            config,
            pipeline: Pipeline::new(config.latency()),
            phase: 0,
            in_valid: false,
        }
    }

    /// Gives the configuration of the model.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives the pipeline latency in clock cycles.
    pub fn latency(&self) -> usize {
        self.pipeline.depth()
    }

    /// Latches the phase code for the next tick.
    ///
    /// The phase code should be in `[0, 2^PHASE_DW)`. Only its `PHASE_DW` low
    /// bits are used.
    pub fn set_data(&mut self, phase: u32) {
        self.phase = phase;
        self.in_valid = true;
    }

    /// Advances the model one clock cycle.
    ///
    /// The sample of the latched phase code enters the pipeline and every other
    /// sample moves one stage towards the output. The new sample is valid only
    /// if a phase code was latched since the previous tick. Without a new
    /// phase code, the last latched one is recomputed as an invalid sample.
    pub fn tick(&mut self) {
        let valid = std::mem::take(&mut self.in_valid);
        self.pipeline
            .push(valid, ideal_sample(&self.config, self.phase));
    }

    /// Returns `true` if the output slot holds a valid sample.
    pub fn data_valid(&self) -> bool {
        self.pipeline.output().is_some()
    }

    /// Gives the sine amplitude in the output slot.
    ///
    /// The value is zero if the output slot is not valid.
    pub fn get_data(&self) -> i32 {
        self.pipeline.output().map_or(0, |s| s.sin)
    }

    /// Gives the cosine amplitude in the output slot.
    ///
    /// The value is zero if the output slot is not valid or if the cosine
    /// output is disabled.
    pub fn get_data_cos(&self) -> i32 {
        self.pipeline.output().map_or(0, |s| s.cos)
    }

    /// Gives the sample in the output slot, if it is valid.
    pub fn output(&self) -> Option<Sample> {
        self.pipeline.output()
    }

    /// Clears all the state of the model.
    ///
    /// All the pipeline stages become invalid with zero data, and any latched
    /// phase code is discarded.
    pub fn reset(&mut self) {
        self.pipeline.clear();
        self.phase = 0;
        self.in_valid = false;
    }
}

/// Quantizes a value in `[-1, 1]` to an amplitude in
/// `[-max_out_val, max_out_val]`.
pub fn quantize(x: f64, max_out_val: i32) -> i32 {
    (x * f64::from(max_out_val)).round() as i32
}

/// Gives the phase angle in radians of a phase code.
///
/// Only the `phase_dw` low bits of the phase code are used, so the angle
/// wraps every `2^phase_dw` codes.
pub fn phase_angle(phase: u32, phase_dw: u32) -> f64 {
    let modulus = 1u64 << phase_dw;
    let phase = u64::from(phase) & (modulus - 1);
    std::f64::consts::TAU * phase as f64 / modulus as f64
}

/// Computes the ideal output sample of a phase code.
///
/// The sine is `round(sin(2π·phase/2^PHASE_DW) · MAX_OUT_VAL)`, negated if
/// `NEGATIVE_SINE` is set. The cosine is computed in the same way, or is zero
/// if `SIN_COS` is not set.
pub fn ideal_sample(config: &Config, phase: u32) -> Sample {
    let max_out_val = config.max_out_val();
    let angle = phase_angle(phase, config.phase_dw());
    let sin = apply_sign(quantize(angle.sin(), max_out_val), config.negative_sine());
    let cos = if config.sin_cos() {
        apply_sign(
            quantize(angle.cos(), max_out_val),
            config.negative_cosine(),
        )
    } else {
        0
    };
    Sample { sin, cos }
}

pub(crate) fn apply_sign(value: i32, negative: bool) -> i32 {
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config_8_8() -> Config {
        Config::builder(8, 8).sin_cos(true).build().unwrap()
    }

    fn run_single(model: &mut DdsModel, phase: u32) -> (usize, Sample) {
        model.set_data(phase);
        let mut ticks = 0;
        loop {
            model.tick();
            ticks += 1;
            if let Some(sample) = model.output() {
                return (ticks, sample);
            }
            assert!(ticks < 100, "sample never became valid");
        }
    }

    #[test]
    fn quarter_turn() {
        let mut model = DdsModel::new(config_8_8());
        let (_, sample) = run_single(&mut model, 64);
        assert_eq!(sample, Sample::new(127, 0));
    }

    #[test]
    fn zero_phase() {
        let mut model = DdsModel::new(config_8_8());
        let (_, sample) = run_single(&mut model, 0);
        assert_eq!(sample, Sample::new(0, 127));
    }

    #[test]
    fn cardinal_points() {
        let config = config_8_8();
        assert_eq!(ideal_sample(&config, 128), Sample::new(0, -127));
        assert_eq!(ideal_sample(&config, 192), Sample::new(-127, 0));
        // sin(π/4) * 127 = 89.80
        assert_eq!(ideal_sample(&config, 32), Sample::new(90, 90));
    }

    #[test]
    fn latency() {
        for config in [
            config_8_8(),
            Config::builder(20, 16).taylor(9).build().unwrap(),
        ] {
            let mut model = DdsModel::new(config);
            assert_eq!(model.latency(), config.latency());
            let (ticks, _) = run_single(&mut model, 10);
            assert_eq!(ticks, config.latency());
            // the sample leaves the pipeline on the next tick
            model.tick();
            assert!(!model.data_valid());
        }
    }

    #[test]
    fn back_to_back() {
        let config = config_8_8();
        let mut model = DdsModel::new(config);
        let phases = [0, 16, 32, 48, 64, 80];
        let mut outputs = Vec::new();
        for cycle in 0..phases.len() + model.latency() {
            if let Some(&phase) = phases.get(cycle) {
                model.set_data(phase);
            }
            model.tick();
            if let Some(sample) = model.output() {
                assert!(cycle + 1 >= model.latency());
                outputs.push(sample);
            }
        }
        let expected: Vec<Sample> = phases.iter().map(|&p| ideal_sample(&config, p)).collect();
        assert_eq!(outputs, expected);
    }

    #[test]
    fn cosine_disabled() {
        let config = Config::builder(8, 8).build().unwrap();
        let mut model = DdsModel::new(config);
        let (_, sample) = run_single(&mut model, 0);
        assert_eq!(sample, Sample::new(0, 0));
        assert_eq!(model.get_data_cos(), 0);
    }

    #[test]
    fn negative_outputs() {
        let config = Config::builder(8, 8)
            .sin_cos(true)
            .negative_sine(true)
            .negative_cosine(true)
            .build()
            .unwrap();
        assert_eq!(ideal_sample(&config, 64), Sample::new(-127, 0));
        assert_eq!(ideal_sample(&config, 0), Sample::new(0, -127));
    }

    #[test]
    fn reset() {
        let mut model = DdsModel::new(config_8_8());
        model.set_data(64);
        model.tick();
        model.reset();
        for _ in 0..2 * model.latency() {
            model.tick();
            assert!(!model.data_valid());
            assert_eq!(model.get_data(), 0);
        }
    }

    #[test]
    fn small_output_width() {
        let config = Config::builder(8, 3).sin_cos(true).build().unwrap();
        for phase in 0..256 {
            let sample = ideal_sample(&config, phase);
            assert!((-3..=3).contains(&sample.sin));
            assert!((-3..=3).contains(&sample.cos));
        }
    }
}
