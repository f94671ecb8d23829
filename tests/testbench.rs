//! Lockstep runs of the reference model against device emulations.

use dds_model::checker::{CheckError, CheckReport, Channel, Checker, Tolerance};
use dds_model::config::Config;
use dds_model::device::{Device, LutDevice};
use dds_model::lut::{Encoding, SineLut};
use dds_model::model::{DdsModel, Sample};
use dds_model::stimulus::PhaseStimulus;
use dds_model::testbench::Testbench;

// Adds an offset to the sine of one valid output sample of a device.
struct Divergent<D> {
    inner: D,
    index: usize,
    offset: i32,
    emitted: usize,
}

impl<D: Device> Divergent<D> {
    fn new(inner: D, index: usize, offset: i32) -> Divergent<D> {
        Divergent {
            inner,
            index,
            offset,
            emitted: 0,
        }
    }
}

impl<D: Device> Device for Divergent<D> {
    fn set_phase(&mut self, phase: u32) {
        self.inner.set_phase(phase);
    }

    fn tick(&mut self) {
        self.inner.tick();
        if self.inner.output().is_some() {
            self.emitted += 1;
        }
    }

    fn output(&self) -> Option<Sample> {
        self.inner.output().map(|mut sample| {
            if self.emitted == self.index + 1 {
                sample.sin += self.offset;
            }
            sample
        })
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.emitted = 0;
    }
}

fn check<D: Device>(
    config: Config,
    device: D,
    tolerance: Tolerance,
    increment: u64,
    num_items: usize,
) -> Result<CheckReport, CheckError> {
    let mut testbench = Testbench::new(config, device, PhaseStimulus::new(&config, increment));
    testbench.reset();
    let capture = testbench.capture(num_items).unwrap();
    assert_eq!(capture.model.len(), num_items);
    assert_eq!(capture.device.len(), num_items);
    Checker::new(&config, tolerance).check(capture.model, capture.device)
}

#[test]
fn full_width_lut_is_exact() {
    for (phase_dw, out_dw) in [(16, 16), (8, 3), (16, 3), (8, 16), (12, 24)] {
        for negative in [false, true] {
            let config = Config::builder(phase_dw, out_dw)
                .sin_cos(true)
                .negative_sine(negative)
                .negative_cosine(!negative)
                .build()
                .unwrap();
            let device = LutDevice::new(config).unwrap();
            let tolerance = Tolerance::for_lut(&config, device.lut().address_width());
            assert_eq!(tolerance, Tolerance::Exact);
            let report = check(config, device, tolerance, 37, 2000).unwrap();
            assert_eq!(report.compared, 2000);
            assert_eq!(report.max_error_sin, 0);
            assert_eq!(report.max_error_cos, Some(0));
        }
    }
}

#[test]
fn taylor_within_tolerance() {
    for (phase_dw, lut_dw) in [(20, 9), (20, 11), (24, 9), (24, 11)] {
        let config = Config::builder(phase_dw, 16)
            .taylor(lut_dw)
            .sin_cos(true)
            .negative_sine(true)
            .build()
            .unwrap();
        let device = LutDevice::new(config).unwrap();
        assert_eq!(device.latency(), config.latency());
        let report = check(config, device, Tolerance::for_config(&config), 4099, 4096).unwrap();
        assert!(report.max_error_sin <= 10);
        assert!(report.max_error_cos.unwrap() <= 10);
    }
}

#[test]
fn truncated_lut_within_folding_bound() {
    let config = Config::builder(16, 16).sin_cos(true).build().unwrap();
    let lut = SineLut::generate(9, 16).unwrap();
    let tolerance = Tolerance::for_lut(&config, lut.address_width());
    assert_eq!(tolerance, Tolerance::LutFolding { address_width: 9 });
    let device = LutDevice::with_lut(config, lut, config.latency() + 2).unwrap();
    let report = check(config, device, tolerance, 101, 1500).unwrap();
    // the truncation error is visible but bounded
    assert!(report.max_error_sin > 0);
    assert!(report.max_error_sin <= 128);

    // the same device fails an exact comparison
    let lut = SineLut::generate(9, 16).unwrap();
    let device = LutDevice::with_lut(config, lut, config.latency()).unwrap();
    assert!(check(config, device, Tolerance::Exact, 101, 1500).is_err());
}

#[test]
fn taylor_divergence() {
    let config = Config::builder(20, 16).taylor(9).build().unwrap();
    let tolerance = Tolerance::for_config(&config);

    let device = Divergent::new(DdsModel::new(config), 17, 10);
    let report = check(config, device, tolerance, 1000, 64).unwrap();
    assert_eq!(report.max_error_sin, 10);

    let device = Divergent::new(DdsModel::new(config), 17, -11);
    let error = check(config, device, tolerance, 1000, 64).unwrap_err();
    let CheckError::Mismatch(mismatch) = error else {
        panic!("unexpected error {error:?}");
    };
    assert_eq!(mismatch.index, 17);
    assert_eq!(mismatch.channel, Channel::Sine);
    assert_eq!(i64::from(mismatch.device) - i64::from(mismatch.model), -11);
    assert_eq!(mismatch.tolerance, 10);
}

#[test]
fn lut_files_round_trip() {
    let config = Config::builder(12, 16).sin_cos(true).build().unwrap();
    let lut = SineLut::for_config(&config).unwrap();
    let dir = std::env::temp_dir().join(format!("dds-model-lut-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let hex = lut
        .write_file(&dir.join("sine_lut.hex"), Encoding::MemInit)
        .unwrap();
    let vh = lut
        .write_file(&dir.join("sine_lut.hex"), Encoding::Literal)
        .unwrap();
    assert_eq!(hex.extension().unwrap(), "hex");
    assert_eq!(vh.extension().unwrap(), "vh");
    let from_hex = SineLut::from_mem_init(&std::fs::read_to_string(&hex).unwrap(), 16).unwrap();
    let from_vh = SineLut::from_literal(&std::fs::read_to_string(&vh).unwrap()).unwrap();
    assert_eq!(from_hex.entries(), from_vh.entries());
    std::fs::remove_dir_all(&dir).unwrap();

    // a device loaded from the file matches the model
    let device = LutDevice::with_lut(config, from_vh, config.latency()).unwrap();
    assert!(check(config, device, Tolerance::Exact, 7, 585).is_ok());
}
