//! Sine lookup table generation.
//!
//! This module generates the quadrant sine LUT used by the DDS core and
//! encodes it in the two text formats understood by the HDL tools:
//!
//! - Memory initialization (`.hex`), read with `$readmemh`. Each line holds an
//!   `@`-tagged address followed by up to 8 entries.
//! - Literal assignments (`.vh`), one `lut[i] = W'hXX;` statement per entry,
//!   for tools that cannot initialize memories from files.
//!
//! Only the first quadrant of the waveform is stored. The full cycle of sine
//! and cosine is reconstructed with [`SineLut::fold`] by mirroring and
//! negating the quadrant.

use crate::config::{max_out_val, Config};
use crate::error::{Error, Result};
use crate::model::{constants, quantize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const ENTRIES_PER_LINE: usize = 8;
const LITERAL_TABLE: &str = "lut";

/// LUT text encoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Encoding {
    /// Memory initialization file (`.hex`).
    MemInit,
    /// Literal assignment statements (`.vh`).
    Literal,
}

impl Encoding {
    /// Gives the file extension used for the encoding.
    pub fn extension(&self) -> &'static str {
        match self {
            Encoding::MemInit => "hex",
            Encoding::Literal => "vh",
        }
    }
}

/// Quadrant sine LUT.
///
/// The table has `2^address_width` entries. Entry `p` holds
/// `round(sin(π/2 · p/2^address_width) · MAX_OUT_VAL)`, so the table spans
/// the angles `[0, π/2)`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SineLut {
    address_width: u32,
    out_dw: u32,
    entries: Vec<i32>,
}

impl SineLut {
    /// Generates a quadrant LUT.
    ///
    /// Returns an error if `address_width` is larger than
    /// [`MAX_LUT_ADDRESS_WIDTH`](constants::MAX_LUT_ADDRESS_WIDTH), or if
    /// `out_dw` is not between 2 and 32.
    pub fn generate(address_width: u32, out_dw: u32) -> Result<SineLut> {
        if address_width > constants::MAX_LUT_ADDRESS_WIDTH {
            return Err(Error::LutWidth {
                width: address_width,
                max: constants::MAX_LUT_ADDRESS_WIDTH,
            });
        }
        if !(2..=constants::MAX_OUT_DW).contains(&out_dw) {
            return Err(Error::OutputWidth(out_dw));
        }
        let max_out_val = max_out_val(out_dw);
        let size = 1usize << address_width;
        let entries = (0..size)
            .map(|p| {
                let angle = std::f64::consts::TAU * p as f64 / size as f64 / 4.0;
                quantize(angle.sin(), max_out_val)
            })
            .collect();
        tracing::debug!(address_width, out_dw, size, "generated sine LUT");
        Ok(SineLut {
            address_width,
            out_dw,
            entries,
        })
    }

    /// Generates the quadrant LUT used by a DDS configuration.
    ///
    /// The address width is given by [`Config::lut_address_width`].
    pub fn for_config(config: &Config) -> Result<SineLut> {
        SineLut::generate(config.lut_address_width(), config.out_dw())
    }

    /// Gives the address width of the table.
    pub fn address_width(&self) -> u32 {
        self.address_width
    }

    /// Gives the width of the table entries.
    pub fn out_dw(&self) -> u32 {
        self.out_dw
    }

    /// Gives the table entries.
    pub fn entries(&self) -> &[i32] {
        &self.entries
    }

    /// Gives the sine and cosine of the first quadrant at a table address.
    ///
    /// The cosine is read from the mirrored address. Address 0 mirrors to the
    /// angle π/2, which lies one entry past the end of the table, and reads
    /// `MAX_OUT_VAL`.
    pub fn first_quadrant(&self, address: usize) -> (i32, i32) {
        let sin = self.entries[address];
        let cos = if address == 0 {
            max_out_val(self.out_dw)
        } else {
            self.entries[self.entries.len() - address]
        };
        (sin, cos)
    }

    /// Splits a phase code into quadrant, table address and residual.
    ///
    /// The two most significant bits of the `phase_dw`-bit phase code select
    /// the quadrant. If the rest of the phase is wider than the table address,
    /// its low bits are truncated and returned as the residual, as a fraction
    /// of one table step in `[0, 1)`.
    pub fn split_phase(&self, phase: u32, phase_dw: u32) -> QuadrantAddress {
        let quadrant_bits = phase_dw - 2;
        let phase = u64::from(phase) & ((1u64 << phase_dw) - 1);
        let quadrant = (phase >> quadrant_bits) as u8;
        let offset = phase & ((1u64 << quadrant_bits) - 1);
        if quadrant_bits >= self.address_width {
            let shift = quadrant_bits - self.address_width;
            let residual = offset & ((1u64 << shift) - 1);
            QuadrantAddress {
                quadrant,
                address: (offset >> shift) as usize,
                residual: residual as f64 / (1u64 << shift) as f64,
            }
        } else {
            QuadrantAddress {
                quadrant,
                address: (offset << (self.address_width - quadrant_bits)) as usize,
                residual: 0.0,
            }
        }
    }

    /// Reconstructs the full-cycle sine and cosine of a phase code.
    ///
    /// The quadrant is mirrored and negated according to the two most
    /// significant bits of the `phase_dw`-bit phase code. If `phase_dw - 2`
    /// equals the table address width the result is exactly
    /// `round(sin(2π·phase/2^phase_dw) · MAX_OUT_VAL)` (and the same for the
    /// cosine). Wider phase codes are truncated to the table resolution.
    pub fn fold(&self, phase: u32, phase_dw: u32) -> (i32, i32) {
        let split = self.split_phase(phase, phase_dw);
        let (sin, cos) = self.first_quadrant(split.address);
        unfold(split.quadrant, sin, cos)
    }

    /// Encodes the table in the memory initialization format.
    pub fn to_mem_init(&self) -> String {
        let digits = hex_digits(self.out_dw);
        let mut s = String::new();
        for (line, chunk) in self.entries.chunks(ENTRIES_PER_LINE).enumerate() {
            write!(s, "@{:08x}", line * ENTRIES_PER_LINE).unwrap();
            for &value in chunk {
                write!(s, " {:0digits$x}", to_twos_complement(value, self.out_dw)).unwrap();
            }
            s.push('\n');
        }
        s
    }

    /// Encodes the table as literal assignment statements.
    pub fn to_literal(&self) -> String {
        let digits = hex_digits(self.out_dw);
        let mut s = String::new();
        for (index, &value) in self.entries.iter().enumerate() {
            writeln!(
                s,
                "{LITERAL_TABLE}[{index}] = {}'h{:0digits$x};",
                self.out_dw,
                to_twos_complement(value, self.out_dw)
            )
            .unwrap();
        }
        s
    }

    /// Encodes the table with the given encoding.
    pub fn encode(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::MemInit => self.to_mem_init(),
            Encoding::Literal => self.to_literal(),
        }
    }

    /// Parses a table in the memory initialization format.
    ///
    /// The entry width is not stored in the format, so it must be given in
    /// `out_dw`, which must be between 2 and 32. Values are sign-extended from
    /// `out_dw` bits. Addresses must be contiguous from 0 and the number of
    /// entries must be a power of two.
    pub fn from_mem_init(text: &str, out_dw: u32) -> Result<SineLut> {
        if !(2..=constants::MAX_OUT_DW).contains(&out_dw) {
            return Err(Error::OutputWidth(out_dw));
        }
        let mut entries = Vec::new();
        for (num, line) in text.lines().enumerate() {
            let num = num + 1;
            let mut tokens = line.split_whitespace();
            let Some(address) = tokens.next() else {
                continue;
            };
            let address = address
                .strip_prefix('@')
                .ok_or_else(|| Error::lut_parse(num, "missing @ address"))?;
            let address = usize::from_str_radix(address, 16)
                .map_err(|e| Error::lut_parse(num, format!("bad address: {e}")))?;
            if address != entries.len() {
                return Err(Error::lut_parse(
                    num,
                    format!("address {address:#x}, expected {:#x}", entries.len()),
                ));
            }
            for token in tokens {
                entries.push(parse_hex_value(token, out_dw, num)?);
            }
        }
        SineLut::from_entries(entries, out_dw, text.lines().count())
    }

    /// Parses a table in the literal assignment format.
    ///
    /// The entry width is taken from the sized literals, which must all have
    /// the same width. Indices must be contiguous from 0.
    pub fn from_literal(text: &str) -> Result<SineLut> {
        let mut entries = Vec::new();
        let mut out_dw = None;
        for (num, line) in text.lines().enumerate() {
            let num = num + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (target, literal) = line
                .strip_suffix(';')
                .and_then(|l| l.split_once('='))
                .ok_or_else(|| Error::lut_parse(num, "expected `lut[i] = W'hX;`"))?;
            let index = target
                .trim()
                .strip_prefix(LITERAL_TABLE)
                .and_then(|t| t.strip_prefix('['))
                .and_then(|t| t.strip_suffix(']'))
                .ok_or_else(|| Error::lut_parse(num, "bad table index"))?;
            let index: usize = index
                .parse()
                .map_err(|e| Error::lut_parse(num, format!("bad table index: {e}")))?;
            if index != entries.len() {
                return Err(Error::lut_parse(
                    num,
                    format!("index {index}, expected {}", entries.len()),
                ));
            }
            let (width, value) = literal
                .trim()
                .split_once("'h")
                .ok_or_else(|| Error::lut_parse(num, "expected sized hex literal"))?;
            let width: u32 = width
                .parse()
                .map_err(|e| Error::lut_parse(num, format!("bad literal width: {e}")))?;
            if *out_dw.get_or_insert(width) != width {
                return Err(Error::lut_parse(num, "literal width changes"));
            }
            if !(2..=constants::MAX_OUT_DW).contains(&width) {
                return Err(Error::lut_parse(num, format!("literal width {width}")));
            }
            entries.push(parse_hex_value(value, width, num)?);
        }
        let out_dw = out_dw.ok_or_else(|| Error::lut_parse(0, "empty table"))?;
        SineLut::from_entries(entries, out_dw, text.lines().count())
    }

    fn from_entries(entries: Vec<i32>, out_dw: u32, lines: usize) -> Result<SineLut> {
        if !entries.len().is_power_of_two() {
            return Err(Error::lut_parse(
                lines,
                format!("{} entries is not a power of two", entries.len()),
            ));
        }
        Ok(SineLut {
            address_width: entries.len().trailing_zeros(),
            out_dw,
            entries,
        })
    }

    /// Writes the table to a file with the given encoding.
    ///
    /// The extension of `path` is replaced by the extension of the encoding.
    /// Returns the path of the written file.
    pub fn write_file(&self, path: &Path, encoding: Encoding) -> std::io::Result<PathBuf> {
        let path = path.with_extension(encoding.extension());
        std::fs::write(&path, self.encode(encoding))?;
        tracing::info!(path = %path.display(), entries = self.entries.len(), "wrote sine LUT");
        Ok(path)
    }
}

/// Phase code split into quadrant and LUT address.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadrantAddress {
    /// Quadrant, from 0 to 3.
    pub quadrant: u8,
    /// Table address within the quadrant.
    pub address: usize,
    /// Truncated phase below the table resolution, in table steps.
    pub residual: f64,
}

/// Maps first-quadrant sine and cosine values to a quadrant.
///
/// With `x` in the first quadrant, this gives `(sin, cos)` of
/// `x + quadrant·π/2`.
pub fn unfold<T: std::ops::Neg<Output = T>>(quadrant: u8, sin: T, cos: T) -> (T, T) {
    match quadrant & 3 {
        0 => (sin, cos),
        1 => (cos, -sin),
        2 => (-sin, -cos),
        _ => (-cos, sin),
    }
}

fn hex_digits(out_dw: u32) -> usize {
    out_dw.div_ceil(4) as usize
}

fn to_twos_complement(value: i32, width: u32) -> u64 {
    (i64::from(value) as u64) & ((1u64 << width) - 1)
}

fn parse_hex_value(token: &str, width: u32, line: usize) -> Result<i32> {
    let raw = u64::from_str_radix(token, 16)
        .map_err(|e| Error::lut_parse(line, format!("bad value {token:?}: {e}")))?;
    if raw >> width != 0 {
        return Err(Error::lut_parse(
            line,
            format!("value {token} does not fit in {width} bits"),
        ));
    }
    // sign extension
    let shift = 64 - width;
    Ok((((raw << shift) as i64) >> shift) as i32)
}
