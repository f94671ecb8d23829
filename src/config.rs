//! DDS configuration.
//!
//! This module contains the validated configuration shared by the reference
//! model, the LUT generator and the equivalence checker. The configuration
//! mirrors the parameters of the HDL core and is immutable once built.

use crate::error::{Error, Result};
use crate::lut::Encoding;
use crate::model::constants;

/// DDS configuration.
///
/// A `Config` can only be obtained through [`Config::builder`] or by
/// converting a [`dds_json::Config`], and both paths validate the parameters.
///
/// # Examples
/// ```
/// use dds_model::config::Config;
/// let config = Config::builder(20, 16).taylor(9).sin_cos(true).build()?;
/// assert_eq!(config.max_out_val(), 32767);
/// assert_eq!(config.lut_address_width(), 9);
/// # Ok::<(), dds_model::Error>(())
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Config {
    phase_dw: u32,
    out_dw: u32,
    lut_dw: Option<u32>,
    use_taylor: bool,
    sin_cos: bool,
    negative_sine: bool,
    negative_cosine: bool,
    use_lut_file: bool,
}

/// Builder for [`Config`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ConfigBuilder(Config);

impl Config {
    /// Starts building a configuration.
    ///
    /// `phase_dw` is the width of the phase code and `out_dw` the width of the
    /// output samples. All the other parameters default to disabled, except
    /// `USE_LUT_FILE`, which defaults to the memory initialization encoding.
    pub fn builder(phase_dw: u32, out_dw: u32) -> ConfigBuilder {
        ConfigBuilder(Config {
            phase_dw,
            out_dw,
            lut_dw: None,
            use_taylor: false,
            sin_cos: false,
            negative_sine: false,
            negative_cosine: false,
            use_lut_file: true,
        })
    }

    fn validate(self) -> Result<Config> {
        if !(2..=constants::MAX_PHASE_DW).contains(&self.phase_dw) {
            return Err(Error::PhaseWidth(self.phase_dw));
        }
        if !(2..=constants::MAX_OUT_DW).contains(&self.out_dw) {
            return Err(Error::OutputWidth(self.out_dw));
        }
        if self.use_taylor {
            let lut_dw = self.lut_dw.ok_or(Error::MissingLutWidth)?;
            let max = self.phase_dw - 2;
            if !(1..=max).contains(&lut_dw) {
                return Err(Error::LutWidth {
                    width: lut_dw,
                    max,
                });
            }
        }
        Ok(self)
    }

    /// Gives the phase code width (`PHASE_DW`).
    pub fn phase_dw(&self) -> u32 {
        self.phase_dw
    }

    /// Gives the output sample width (`OUT_DW`).
    pub fn out_dw(&self) -> u32 {
        self.out_dw
    }

    /// Gives the Taylor LUT address width (`LUT_DW`), if set.
    pub fn lut_dw(&self) -> Option<u32> {
        self.lut_dw
    }

    /// Returns `true` if the Taylor pipeline is used (`USE_TAYLOR`).
    pub fn use_taylor(&self) -> bool {
        self.use_taylor
    }

    /// Returns `true` if the cosine output is enabled (`SIN_COS`).
    pub fn sin_cos(&self) -> bool {
        self.sin_cos
    }

    /// Returns `true` if the sine output is inverted (`NEGATIVE_SINE`).
    pub fn negative_sine(&self) -> bool {
        self.negative_sine
    }

    /// Returns `true` if the cosine output is inverted (`NEGATIVE_COSINE`).
    pub fn negative_cosine(&self) -> bool {
        self.negative_cosine
    }

    /// Returns `true` if the memory initialization LUT encoding is selected
    /// (`USE_LUT_FILE`).
    pub fn use_lut_file(&self) -> bool {
        self.use_lut_file
    }

    /// Gives the largest output amplitude, `2^(OUT_DW-1) - 1`.
    ///
    /// The output range is symmetric, `[-max_out_val, max_out_val]`.
    pub fn max_out_val(&self) -> i32 {
        max_out_val(self.out_dw)
    }

    /// Gives the number of distinct phase codes, `2^PHASE_DW`.
    pub fn phase_modulus(&self) -> u64 {
        1u64 << self.phase_dw
    }

    /// Gives the address width of the quadrant LUT.
    ///
    /// This is `LUT_DW` for the Taylor pipeline and `PHASE_DW - 2` otherwise,
    /// in which case the LUT holds one entry per phase code of a quadrant.
    pub fn lut_address_width(&self) -> u32 {
        match (self.use_taylor, self.lut_dw) {
            (true, Some(lut_dw)) => lut_dw,
            _ => self.phase_dw - 2,
        }
    }

    /// Gives the LUT encoding selected by `USE_LUT_FILE`.
    pub fn lut_encoding(&self) -> Encoding {
        if self.use_lut_file {
            Encoding::MemInit
        } else {
            Encoding::Literal
        }
    }

    /// Gives the pipeline latency of the DDS in clock cycles.
    pub fn latency(&self) -> usize {
        if self.use_taylor {
            constants::BASE_DEPTH + constants::TAYLOR_EXTRA_DEPTH
        } else {
            constants::BASE_DEPTH
        }
    }
}

impl ConfigBuilder {
    /// Selects the Taylor pipeline with a quadrant LUT of `lut_dw` address
    /// bits.
    pub fn taylor(mut self, lut_dw: u32) -> ConfigBuilder {
        self.0.use_taylor = true;
        self.0.lut_dw = Some(lut_dw);
        self
    }

    /// Selects or deselects the Taylor pipeline.
    ///
    /// The Taylor pipeline also needs a LUT address width, given with
    /// [`ConfigBuilder::lut_dw`].
    pub fn use_taylor(mut self, enable: bool) -> ConfigBuilder {
        self.0.use_taylor = enable;
        self
    }

    /// Sets the LUT address width without selecting the Taylor pipeline.
    ///
    /// The width is ignored unless the Taylor pipeline is selected.
    pub fn lut_dw(mut self, lut_dw: u32) -> ConfigBuilder {
        self.0.lut_dw = Some(lut_dw);
        self
    }

    /// Enables or disables the cosine output.
    pub fn sin_cos(mut self, enable: bool) -> ConfigBuilder {
        self.0.sin_cos = enable;
        self
    }

    /// Enables or disables the sine sign inversion.
    pub fn negative_sine(mut self, enable: bool) -> ConfigBuilder {
        self.0.negative_sine = enable;
        self
    }

    /// Enables or disables the cosine sign inversion.
    pub fn negative_cosine(mut self, enable: bool) -> ConfigBuilder {
        self.0.negative_cosine = enable;
        self
    }

    /// Selects the LUT encoding.
    pub fn use_lut_file(mut self, enable: bool) -> ConfigBuilder {
        self.0.use_lut_file = enable;
        self
    }

    /// Validates the parameters and builds the configuration.
    pub fn build(self) -> Result<Config> {
        self.0.validate()
    }
}

impl TryFrom<dds_json::Config> for Config {
    type Error = Error;

    fn try_from(value: dds_json::Config) -> Result<Config> {
        Config {
            phase_dw: value.phase_dw,
            out_dw: value.out_dw,
            lut_dw: value.lut_dw,
            use_taylor: value.use_taylor,
            sin_cos: value.sin_cos,
            negative_sine: value.negative_sine,
            negative_cosine: value.negative_cosine,
            use_lut_file: value.use_lut_file,
        }
        .validate()
    }
}

impl From<Config> for dds_json::Config {
    fn from(value: Config) -> dds_json::Config {
        dds_json::Config {
            phase_dw: value.phase_dw,
            out_dw: value.out_dw,
            use_taylor: value.use_taylor,
            lut_dw: value.lut_dw,
            sin_cos: value.sin_cos,
            negative_sine: value.negative_sine,
            negative_cosine: value.negative_cosine,
            use_lut_file: value.use_lut_file,
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PHASE_DW={} OUT_DW={} USE_TAYLOR={} LUT_DW={} SIN_COS={} \
             NEGATIVE_SINE={} NEGATIVE_COSINE={}",
            self.phase_dw,
            self.out_dw,
            u8::from(self.use_taylor),
            self.lut_address_width(),
            u8::from(self.sin_cos),
            u8::from(self.negative_sine),
            u8::from(self.negative_cosine),
        )
    }
}

/// Gives the largest amplitude representable with `out_dw` bits in the
/// symmetric output range, `2^(out_dw-1) - 1`.
pub fn max_out_val(out_dw: u32) -> i32 {
    ((1i64 << (out_dw - 1)) - 1) as i32
}
