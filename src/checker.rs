//! Equivalence checker.
//!
//! This module compares the output stream of the reference model with the
//! output stream of a device. Streams are aligned by the order of their valid
//! samples: the n-th valid model sample is compared with the n-th valid device
//! sample, whatever their latencies are.

use crate::config::Config;
use crate::model::{constants, Sample};
use thiserror::Error;

/// Tolerance of the comparison.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tolerance {
    /// Samples must be identical.
    Exact,
    /// Error bound of the Taylor-corrected core.
    Taylor,
    /// Error bound of a quadrant LUT addressed with `address_width` bits,
    /// when the phase is truncated to the LUT resolution.
    LutFolding {
        /// LUT address width.
        address_width: u32,
    },
}

impl Tolerance {
    /// Gives the tolerance for a configuration.
    ///
    /// This is [`Tolerance::Taylor`] if the Taylor pipeline is used and
    /// [`Tolerance::Exact`] otherwise.
    pub fn for_config(config: &Config) -> Tolerance {
        if config.use_taylor() {
            Tolerance::Taylor
        } else {
            Tolerance::Exact
        }
    }

    /// Gives the tolerance for a device that folds the phase into a quadrant
    /// LUT with `address_width` bits.
    ///
    /// The Taylor pipeline has its own bound. Otherwise, if the LUT is
    /// narrower than a quadrant of phase codes, the phase is truncated and the
    /// folding bound applies.
    pub fn for_lut(config: &Config, address_width: u32) -> Tolerance {
        if config.use_taylor() {
            Tolerance::Taylor
        } else if address_width < config.phase_dw() - 2 {
            Tolerance::LutFolding { address_width }
        } else {
            Tolerance::Exact
        }
    }

    /// Gives the largest allowed absolute difference between samples.
    ///
    /// The folding bound is `ceil(MAX_OUT_VAL / 2^(address_width - 1))`.
    /// Truncating the phase moves the sampled angle back by less than one LUT
    /// step of `π/2 / 2^address_width` radians, so the amplitude changes by
    /// less than `π/2 · MAX_OUT_VAL / 2^address_width`, plus the rounding of
    /// both samples.
    pub fn bound(&self, max_out_val: i32) -> i64 {
        match *self {
            Tolerance::Exact => 0,
            Tolerance::Taylor => constants::TAYLOR_TOLERANCE,
            Tolerance::LutFolding { address_width } => {
                let shift = address_width.clamp(1, 63) - 1;
                let step = 1i64 << shift;
                (i64::from(max_out_val) + step - 1) / step
            }
        }
    }
}

/// Output channel of the DDS.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Channel {
    /// Sine output.
    Sine,
    /// Cosine output.
    Cosine,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(match self {
            Channel::Sine => "sin",
            Channel::Cosine => "cos",
        })
    }
}

/// Output stream of a comparison.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stream {
    /// Reference model samples.
    Model,
    /// Device samples.
    Device,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(match self {
            Stream::Model => "model",
            Stream::Device => "device",
        })
    }
}

/// Tolerance violation.
///
/// This is returned by [`Checker::check`], wrapped in
/// [`CheckError::Mismatch`], for the first sample pair whose difference
/// exceeds the tolerance.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[error("[{index}] {channel} device: {device} model: {model} (tolerance {tolerance})")]
pub struct Mismatch {
    /// Index of the sample pair, in order of valid samples.
    pub index: usize,
    /// Channel in which the violation happened.
    pub channel: Channel,
    /// Device sample.
    pub device: i32,
    /// Model sample.
    pub model: i32,
    /// Tolerance that was exceeded.
    pub tolerance: i64,
}

/// Failed comparison.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CheckError {
    /// A sample pair differs by more than the tolerance.
    #[error(transparent)]
    Mismatch(#[from] Mismatch),
    /// One of the streams ended before the other.
    #[error("[{index}] {stream} sample missing")]
    MissingSample {
        /// Index of the first unpaired sample.
        index: usize,
        /// Stream that ended first.
        stream: Stream,
    },
}

impl CheckError {
    /// Gives the index of the sample pair at which the comparison failed.
    pub fn index(&self) -> usize {
        match self {
            CheckError::Mismatch(mismatch) => mismatch.index,
            CheckError::MissingSample { index, .. } => *index,
        }
    }
}

/// Summary of a successful comparison.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct CheckReport {
    /// Number of sample pairs compared.
    pub compared: usize,
    /// Largest absolute sine difference.
    pub max_error_sin: i64,
    /// Largest absolute cosine difference, if the cosine was compared.
    pub max_error_cos: Option<i64>,
}

/// Equivalence checker.
///
/// The checker holds no state besides its settings. It consumes the model
/// and device sample sequences and reduces them to a [`CheckReport`] or to
/// the first [`CheckError`].
///
/// # Examples
/// ```
/// use dds_model::checker::{Checker, Tolerance};
/// use dds_model::config::Config;
/// use dds_model::model::Sample;
///
/// let config = Config::builder(20, 16).taylor(9).build()?;
/// let checker = Checker::new(&config, Tolerance::for_config(&config));
/// let model = [Sample::new(100, 0), Sample::new(200, 0)];
/// let device = [Sample::new(110, 0), Sample::new(211, 0)];
/// let error = checker.check(model, device).unwrap_err();
/// assert_eq!(error.index(), 1);
/// # Ok::<(), dds_model::Error>(())
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Checker {
    tolerance: i64,
    check_cos: bool,
}

impl Checker {
    /// Creates a checker for a configuration.
    ///
    /// The cosine channel is compared only if it is enabled in the
    /// configuration.
    pub fn new(config: &Config, tolerance: Tolerance) -> Checker {
        Checker {
            tolerance: tolerance.bound(config.max_out_val()),
            check_cos: config.sin_cos(),
        }
    }

    /// Creates a checker with an explicit tolerance bound.
    pub fn with_bound(tolerance: i64, check_cos: bool) -> Checker {
        Checker {
            tolerance,
            check_cos,
        }
    }

    /// Gives the tolerance bound.
    pub fn tolerance(&self) -> i64 {
        self.tolerance
    }

    /// Compares the model and device sample sequences.
    ///
    /// Samples are paired in order. Both sequences must have the same length.
    /// Comparison stops at the first pair whose difference exceeds the
    /// tolerance on any checked channel, or at the first sample that has no
    /// counterpart in the other sequence.
    pub fn check<M, D>(&self, model: M, device: D) -> Result<CheckReport, CheckError>
    where
        M: IntoIterator<Item = Sample>,
        D: IntoIterator<Item = Sample>,
    {
        let mut report = CheckReport {
            max_error_cos: self.check_cos.then_some(0),
            ..Default::default()
        };
        let mut model_samples = model.into_iter();
        let mut device_samples = device.into_iter();
        loop {
            let index = report.compared;
            let (model, device) = match (model_samples.next(), device_samples.next()) {
                (Some(model), Some(device)) => (model, device),
                (None, None) => break,
                (None, Some(_)) => return Err(missing(index, Stream::Model)),
                (Some(_), None) => return Err(missing(index, Stream::Device)),
            };
            report.max_error_sin = report.max_error_sin.max(self.compare(
                index,
                Channel::Sine,
                model.sin,
                device.sin,
            )?);
            if let Some(max_error_cos) = report.max_error_cos.as_mut() {
                *max_error_cos = (*max_error_cos).max(self.compare(
                    index,
                    Channel::Cosine,
                    model.cos,
                    device.cos,
                )?);
            }
            report.compared += 1;
        }
        tracing::info!(
            compared = report.compared,
            tolerance = self.tolerance,
            max_error_sin = report.max_error_sin,
            max_error_cos = ?report.max_error_cos,
            "streams match"
        );
        Ok(report)
    }

    fn compare(
        &self,
        index: usize,
        channel: Channel,
        model: i32,
        device: i32,
    ) -> Result<i64, Mismatch> {
        let error = (i64::from(device) - i64::from(model)).abs();
        if error > self.tolerance {
            let mismatch = Mismatch {
                index,
                channel,
                device,
                model,
                tolerance: self.tolerance,
            };
            tracing::error!(%mismatch, "tolerance violation");
            return Err(mismatch);
        }
        Ok(error)
    }
}

fn missing(index: usize, stream: Stream) -> CheckError {
    let error = CheckError::MissingSample { index, stream };
    tracing::error!(%error, "stream ended early");
    error
}
