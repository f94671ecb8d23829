//! Spectral analysis.
//!
//! This module computes the magnitude spectrum of a captured DDS output
//! stream. It is used to inspect the signal purity (the absence of spurious
//! tones) and its results are advisory: they are never used to decide whether
//! a run passes.

use rustfft::{num_complex::Complex64, FftPlanner};

/// Additive floor applied to the normalized magnitudes before taking the
/// logarithm, so that empty bins give -200 dB instead of minus infinity.
pub const MAGNITUDE_FLOOR: f64 = 1e-10;

/// Correction applied to the non-DC bins of the one-sided spectrum, in dB.
///
/// This accounts for the power of the mirrored negative frequency bin.
pub const ONE_SIDED_CORRECTION_DB: f64 = 6.0;

/// Magnitude spectrum of a DDS output stream.
///
/// # Examples
/// ```
/// use dds_model::spectrum::Spectrum;
/// // 4 cycles of a full scale sine in 32 samples
/// let samples: Vec<i32> = (0..32)
///     .map(|n| (127.0 * (std::f64::consts::TAU * 4.0 * n as f64 / 32.0).sin()).round() as i32)
///     .collect();
/// let spectrum = Spectrum::analyze(&samples, 127);
/// assert_eq!(spectrum.one_sided_peak(), Some(4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    two_sided_db: Vec<f64>,
    one_sided_db: Vec<f64>,
}

impl Spectrum {
    /// Computes the spectrum of a stream of samples.
    ///
    /// The samples are normalized by `max_out_val` to `[-1, 1]` and
    /// transformed with an FFT of the length of the stream. The two-sided
    /// spectrum is shifted so that zero frequency is in the middle, at index
    /// `N/2`, and given as `20·log10(|S|/N + ε)`. The one-sided spectrum
    /// starts at zero frequency and adds [`ONE_SIDED_CORRECTION_DB`] to every
    /// bin except DC.
    pub fn analyze(samples: &[i32], max_out_val: i32) -> Spectrum {
        let n = samples.len();
        if n == 0 {
            return Spectrum {
                two_sided_db: Vec::new(),
                one_sided_db: Vec::new(),
            };
        }
        let scale = 1.0 / f64::from(max_out_val);
        let mut buffer: Vec<Complex64> = samples
            .iter()
            .map(|&x| Complex64::new(f64::from(x) * scale, 0.0))
            .collect();
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(n).process(&mut buffer);

        let mut two_sided_db: Vec<f64> = buffer
            .iter()
            .map(|c| 20.0 * (c.norm() / n as f64 + MAGNITUDE_FLOOR).log10())
            .collect();
        fft_shift(&mut two_sided_db);
        let one_sided_db = two_sided_db[n / 2..]
            .iter()
            .enumerate()
            .map(|(k, &db)| {
                if k == 0 {
                    db
                } else {
                    db + ONE_SIDED_CORRECTION_DB
                }
            })
            .collect();
        tracing::debug!(n, "computed spectrum");
        Spectrum {
            two_sided_db,
            one_sided_db,
        }
    }

    /// Gives the two-sided spectrum in dB, with zero frequency at index
    /// `N/2`.
    pub fn two_sided_db(&self) -> &[f64] {
        &self.two_sided_db
    }

    /// Gives the one-sided spectrum in dB, starting at zero frequency.
    pub fn one_sided_db(&self) -> &[f64] {
        &self.one_sided_db
    }

    /// Gives the frequency of each bin of the two-sided spectrum, in cycles
    /// per sample.
    pub fn two_sided_frequencies(&self) -> Vec<f64> {
        let n = self.two_sided_db.len();
        let center = (n / 2) as f64;
        (0..n).map(|k| (k as f64 - center) / n as f64).collect()
    }

    /// Gives the frequency of each bin of the one-sided spectrum, in cycles
    /// per sample.
    pub fn one_sided_frequencies(&self) -> Vec<f64> {
        let n = self.two_sided_db.len();
        (0..self.one_sided_db.len())
            .map(|k| k as f64 / n as f64)
            .collect()
    }

    /// Gives the index of the strongest non-DC bin of the one-sided spectrum.
    pub fn one_sided_peak(&self) -> Option<usize> {
        self.one_sided_db
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
    }

    /// Estimates the spurious free dynamic range in dB.
    ///
    /// This is the difference between the strongest non-DC bin (the carrier)
    /// and the strongest of the remaining non-DC bins of the one-sided
    /// spectrum. Returns `None` if there are fewer than two non-DC bins.
    pub fn sfdr_db(&self) -> Option<f64> {
        let carrier = self.one_sided_peak()?;
        let spur = self
            .one_sided_db
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(k, _)| k != carrier)
            .map(|(_, &db)| db)
            .max_by(f64::total_cmp)?;
        Some(self.one_sided_db[carrier] - spur)
    }
}

// Moves zero frequency to index n/2. Same convention as numpy's fftshift, also
// for odd lengths.
fn fft_shift<T>(spectrum: &mut [T]) {
    let n = spectrum.len();
    spectrum.rotate_right(n / 2);
}
