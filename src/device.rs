//! Devices under test.
//!
//! This module contains the [`Device`] trait, which is the interface through
//! which the testbench drives the DDS implementation being verified, and
//! [`LutDevice`], a software emulation of the FPGA datapath.
//!
//! The reference model also implements [`Device`], so it can be driven by the
//! same code as any device.

use crate::config::Config;
use crate::lut::{unfold, SineLut};
use crate::model::{apply_sign, DdsModel, Pipeline, Sample};

/// DDS under test.
///
/// A device is advanced one clock cycle at a time. Each cycle, the testbench
/// may present one phase code with [`Device::set_phase`], then calls
/// [`Device::tick`] and reads [`Device::output`].
pub trait Device {
    /// Presents a valid phase code for the next clock cycle.
    fn set_phase(&mut self, phase: u32);

    /// Advances the device one clock cycle.
    fn tick(&mut self);

    /// Gives the output sample, if the output is valid in the current cycle.
    fn output(&self) -> Option<Sample>;

    /// Synchronously resets the device.
    fn reset(&mut self);
}

impl Device for DdsModel {
    fn set_phase(&mut self, phase: u32) {
        self.set_data(phase);
    }

    fn tick(&mut self) {
        DdsModel::tick(self);
    }

    fn output(&self) -> Option<Sample> {
        DdsModel::output(self)
    }

    fn reset(&mut self) {
        DdsModel::reset(self);
    }
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn set_phase(&mut self, phase: u32) {
        (**self).set_phase(phase);
    }

    fn tick(&mut self) {
        (**self).tick();
    }

    fn output(&self) -> Option<Sample> {
        (**self).output()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// LUT-based DDS emulation.
///
/// This emulates the datapath of the FPGA DDS core. The phase code is folded
/// into the first quadrant and truncated to the address width of a quadrant
/// [`SineLut`]. With the Taylor correction, the truncated phase is used to
/// correct the LUT values to first order:
///
/// ```text
/// sin(x + d) ≈ sin(x) + d·cos(x)
/// cos(x + d) ≈ cos(x) - d·sin(x)
/// ```
///
/// The results are rounded, saturated to the output range and delayed
/// through a pipeline.
#[derive(Debug, Clone)]
pub struct LutDevice {
    config: Config,
    lut: SineLut,
    pipeline: Pipeline,
    phase: Option<u32>,
}

impl LutDevice {
    /// Creates a device with the LUT and latency of a configuration.
    pub fn new(config: Config) -> crate::Result<LutDevice> {
        LutDevice::with_lut(config, SineLut::for_config(&config)?, config.latency())
    }

    /// Creates a device with a given LUT and pipeline latency.
    ///
    /// The LUT entry width must equal `OUT_DW`.
    ///
    /// # Panics
    ///
    /// Panics if `latency` is zero.
    pub fn with_lut(config: Config, lut: SineLut, latency: usize) -> crate::Result<LutDevice> {
        if lut.out_dw() != config.out_dw() {
            return Err(crate::Error::OutputWidth(lut.out_dw()));
        }
        tracing::debug!(
            %config,
            address_width = lut.address_width(),
            latency,
            "creating LUT device"
        );
        Ok(LutDevice {
            config,
            lut,
            pipeline: Pipeline::new(latency),
            phase: None,
        })
    }

    /// Gives the pipeline latency in clock cycles.
    pub fn latency(&self) -> usize {
        self.pipeline.depth()
    }

    /// Gives the LUT used by the device.
    pub fn lut(&self) -> &SineLut {
        &self.lut
    }

    /// Computes the output sample of a phase code.
    pub fn compute(&self, phase: u32) -> Sample {
        let (sin, cos) = if self.config.use_taylor() {
            self.taylor(phase)
        } else {
            self.lut.fold(phase, self.config.phase_dw())
        };
        Sample {
            sin: apply_sign(sin, self.config.negative_sine()),
            cos: if self.config.sin_cos() {
                apply_sign(cos, self.config.negative_cosine())
            } else {
                0
            },
        }
    }

    fn taylor(&self, phase: u32) -> (i32, i32) {
        let split = self.lut.split_phase(phase, self.config.phase_dw());
        let (sin, cos) = self.lut.first_quadrant(split.address);
        let (sin, cos) = (f64::from(sin), f64::from(cos));
        let step = std::f64::consts::FRAC_PI_2 / self.lut.entries().len() as f64;
        let delta = split.residual * step;
        let max_out_val = f64::from(self.config.max_out_val());
        let saturate = |x: f64| x.round().clamp(-max_out_val, max_out_val) as i32;
        let (sin, cos) = unfold(split.quadrant, sin + delta * cos, cos - delta * sin);
        (saturate(sin), saturate(cos))
    }
}

impl Device for LutDevice {
    fn set_phase(&mut self, phase: u32) {
        self.phase = Some(phase);
    }

    fn tick(&mut self) {
        let sample = self.phase.take().map(|phase| self.compute(phase));
        self.pipeline
            .push(sample.is_some(), sample.unwrap_or_default());
    }

    fn output(&self) -> Option<Sample> {
        self.pipeline.output()
    }

    fn reset(&mut self) {
        self.pipeline.clear();
        self.phase = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::ideal_sample;

    #[test]
    fn exact_lut_matches_model() {
        let config = Config::builder(10, 12)
            .sin_cos(true)
            .negative_cosine(true)
            .build()
            .unwrap();
        let device = LutDevice::new(config).unwrap();
        for phase in 0..1024 {
            assert_eq!(device.compute(phase), ideal_sample(&config, phase));
        }
    }

    #[test]
    fn taylor_error_is_small() {
        let config = Config::builder(20, 16)
            .taylor(9)
            .sin_cos(true)
            .build()
            .unwrap();
        let device = LutDevice::new(config).unwrap();
        let max_error = (0..1u32 << 20)
            .step_by(97)
            .map(|phase| {
                let expected = ideal_sample(&config, phase);
                let sample = device.compute(phase);
                (sample.sin - expected.sin)
                    .abs()
                    .max((sample.cos - expected.cos).abs())
            })
            .max()
            .unwrap();
        assert!(max_error <= 2, "max error {max_error}");
    }

    #[test]
    fn taylor_saturates() {
        let config = Config::builder(12, 8).taylor(3).sin_cos(true).build().unwrap();
        let device = LutDevice::new(config).unwrap();
        for phase in 0..4096 {
            let sample = device.compute(phase);
            assert!((-127..=127).contains(&sample.sin));
            assert!((-127..=127).contains(&sample.cos));
        }
    }

    #[test]
    fn pipeline() {
        let config = Config::builder(8, 8).sin_cos(true).build().unwrap();
        let lut = SineLut::for_config(&config).unwrap();
        let mut device = LutDevice::with_lut(config, lut, 5).unwrap();
        device.set_phase(64);
        for _ in 0..4 {
            device.tick();
            assert_eq!(device.output(), None);
        }
        device.tick();
        assert_eq!(device.output(), Some(Sample::new(127, 0)));
        device.reset();
        device.tick();
        assert_eq!(device.output(), None);
    }

    #[test]
    fn lut_width_mismatch() {
        let config = Config::builder(8, 8).build().unwrap();
        let lut = SineLut::generate(6, 16).unwrap();
        assert!(LutDevice::with_lut(config, lut, 3).is_err());
    }

    #[test]
    fn boxed_model() {
        let config = Config::builder(8, 8).build().unwrap();
        let mut device: Box<dyn Device> = Box::new(DdsModel::new(config));
        device.set_phase(64);
        for _ in 0..config.latency() {
            device.tick();
        }
        assert_eq!(device.output(), Some(Sample::new(127, 0)));
    }
}
