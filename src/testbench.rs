//! Lockstep testbench.
//!
//! This module drives the reference model and a device under test in lockstep,
//! one clock cycle at a time, with the same phase code stimulus. The valid
//! output samples of both are collected in order, ready to be compared by the
//! [`Checker`](crate::checker::Checker).

use crate::config::Config;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::model::{DdsModel, Sample};
use crate::stimulus::PhaseStimulus;

/// Number of clock cycles allowed on top of the number of requested samples
/// before a capture is abandoned.
pub const CAPTURE_SLACK_CYCLES: u64 = 4096;

/// Number of idle clock cycles applied after a reset.
pub const RESET_CYCLES: usize = 2;

/// Captured output streams.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Capture {
    /// Valid samples of the reference model, in order.
    pub model: Vec<Sample>,
    /// Valid samples of the device, in order.
    pub device: Vec<Sample>,
    /// Number of clock cycles simulated.
    pub cycles: u64,
}

/// Lockstep testbench.
///
/// Each clock cycle the testbench takes one phase code from the stimulus,
/// presents it to the model and to the device, advances both, and collects
/// their valid output samples.
#[derive(Debug)]
pub struct Testbench<D> {
    model: DdsModel,
    device: D,
    stimulus: PhaseStimulus,
}

impl<D: Device> Testbench<D> {
    /// Creates a testbench for a configuration and a device.
    pub fn new(config: Config, device: D, stimulus: PhaseStimulus) -> Testbench<D> {
        Testbench {
            model: DdsModel::new(config),
            device,
            stimulus,
        }
    }

    /// Gives access to the reference model.
    pub fn model(&self) -> &DdsModel {
        &self.model
    }

    /// Gives access to the device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Gives access to the stimulus.
    pub fn stimulus(&self) -> &PhaseStimulus {
        &self.stimulus
    }

    /// Resets the model and the device and restarts the stimulus.
    ///
    /// Both are reset, clocked for [`RESET_CYCLES`] cycles without input and
    /// reset again, so that nothing computed before the reset reaches the
    /// outputs.
    pub fn reset(&mut self) {
        self.model.reset();
        self.device.reset();
        for _ in 0..RESET_CYCLES {
            self.model.tick();
            self.device.tick();
        }
        self.model.reset();
        self.device.reset();
        self.stimulus.restart();
    }

    /// Runs until `num_items` valid samples have been collected from both the
    /// model and the device.
    ///
    /// Samples produced beyond `num_items` are discarded. Returns
    /// [`Error::CaptureTimeout`] if this takes more than `num_items +`
    /// [`CAPTURE_SLACK_CYCLES`] cycles.
    #[tracing::instrument(name = "Testbench::capture", level = "debug", skip(self))]
    pub fn capture(&mut self, num_items: usize) -> Result<Capture> {
        let max_cycles = num_items as u64 + CAPTURE_SLACK_CYCLES;
        let mut capture = Capture::default();
        while capture.model.len() < num_items || capture.device.len() < num_items {
            if capture.cycles == max_cycles {
                return Err(Error::CaptureTimeout {
                    cycles: capture.cycles,
                    model: capture.model.len(),
                    device: capture.device.len(),
                });
            }
            // the stimulus never ends
            let phase = self.stimulus.next().unwrap_or_default();
            self.model.set_data(phase);
            self.device.set_phase(phase);
            self.model.tick();
            self.device.tick();
            capture.cycles += 1;

            if let Some(sample) = self.model.output().filter(|_| capture.model.len() < num_items) {
                tracing::trace!(index = capture.model.len(), ?sample, "model");
                capture.model.push(sample);
            }
            if let Some(sample) = self
                .device
                .output()
                .filter(|_| capture.device.len() < num_items)
            {
                tracing::trace!(index = capture.device.len(), ?sample, "device");
                capture.device.push(sample);
            }
        }
        tracing::debug!(cycles = capture.cycles, num_items, "capture finished");
        Ok(capture)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::device::LutDevice;
    use crate::lut::SineLut;
    use crate::model::ideal_sample;

    #[derive(Debug, Default)]
    struct Silent;

    impl Device for Silent {
        fn set_phase(&mut self, _phase: u32) {}
        fn tick(&mut self) {}
        fn output(&self) -> Option<Sample> {
            None
        }
        fn reset(&mut self) {}
    }

    #[test]
    fn aligned_by_valid_order() {
        let config = Config::builder(12, 12).sin_cos(true).build().unwrap();
        let lut = SineLut::for_config(&config).unwrap();
        // the device is 7 cycles slower than the model
        let device = LutDevice::with_lut(config, lut, config.latency() + 7).unwrap();
        let mut testbench = Testbench::new(config, device, PhaseStimulus::new(&config, 100));
        testbench.reset();
        let capture = testbench.capture(20).unwrap();
        assert_eq!(capture.model.len(), 20);
        assert_eq!(capture.device, capture.model);
        assert_eq!(capture.cycles, 20 + config.latency() as u64 + 6);
        let expected: Vec<Sample> = PhaseStimulus::new(&config, 100)
            .take(20)
            .map(|phase| ideal_sample(&config, phase))
            .collect();
        assert_eq!(capture.model, expected);
    }

    #[test]
    fn timeout() {
        let config = Config::builder(8, 8).build().unwrap();
        let mut testbench = Testbench::new(config, Silent, PhaseStimulus::new(&config, 1));
        testbench.reset();
        assert_eq!(
            testbench.capture(10),
            Err(Error::CaptureTimeout {
                cycles: 10 + CAPTURE_SLACK_CYCLES,
                model: 10,
                device: 0,
            })
        );
    }

    #[derive(Debug)]
    struct CountingResets {
        inner: DdsModel,
        resets: usize,
    }

    impl Device for CountingResets {
        fn set_phase(&mut self, phase: u32) {
            self.inner.set_data(phase);
        }
        fn tick(&mut self) {
            self.inner.tick();
        }
        fn output(&self) -> Option<Sample> {
            self.inner.output()
        }
        fn reset(&mut self) {
            self.inner.reset();
            self.resets += 1;
        }
    }

    #[test]
    fn reset_clears_model_and_device() {
        let config = Config::builder(8, 8).build().unwrap();
        let device = CountingResets {
            inner: DdsModel::new(config),
            resets: 0,
        };
        let mut testbench = Testbench::new(config, device, PhaseStimulus::new(&config, 5));
        testbench.capture(4).unwrap();
        // leave samples in flight in both pipelines
        testbench.model.set_data(64);
        testbench.device.set_phase(64);
        testbench.model.tick();
        testbench.device.tick();
        testbench.reset();
        assert_eq!(testbench.device().resets, 2);
        for _ in 0..config.latency() {
            testbench.model.tick();
            testbench.device.tick();
            assert_eq!(testbench.model().output(), None);
            assert_eq!(testbench.device().output(), None);
        }
    }

    #[test]
    fn reset_discards_previous_run() {
        let config = Config::builder(8, 8).build().unwrap();
        let device = DdsModel::new(config);
        let mut testbench = Testbench::new(config, device, PhaseStimulus::new(&config, 3));
        testbench.reset();
        let first = testbench.capture(5).unwrap();
        testbench.reset();
        let second = testbench.capture(5).unwrap();
        assert_eq!(first, second);
    }
}
