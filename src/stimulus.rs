//! Phase code stimulus.
//!
//! This module contains the stimulus driver that plays the role of the phase
//! accumulator in front of the DDS. The same sequence of phase codes is fed to
//! the reference model and to the device under test.

use crate::config::Config;

/// Phase increment used by default, in phase codes per clock cycle.
pub const DEFAULT_INCREMENT: u64 = 100;

/// Phase accumulator stimulus.
///
/// This is an infinite iterator over phase codes. The phase starts at 0 and
/// advances by a fixed increment every clock cycle, wrapping modulo
/// `2^PHASE_DW`.
///
/// # Examples
/// ```
/// use dds_model::{config::Config, stimulus::PhaseStimulus};
/// let config = Config::builder(8, 8).build()?;
/// let phases: Vec<u32> = PhaseStimulus::new(&config, 100).take(4).collect();
/// assert_eq!(phases, vec![0, 100, 200, 44]);
/// # Ok::<(), dds_model::Error>(())
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PhaseStimulus {
    phase: u64,
    increment: u64,
    modulus: u64,
}

impl PhaseStimulus {
    /// Creates a stimulus with the given phase increment.
    pub fn new(config: &Config, increment: u64) -> PhaseStimulus {
        let modulus = config.phase_modulus();
        PhaseStimulus {
            phase: 0,
            increment: increment % modulus,
            modulus,
        }
    }

    /// Gives the phase increment.
    pub fn increment(&self) -> u64 {
        self.increment
    }

    /// Gives the default number of samples to compare with this stimulus.
    ///
    /// This is the number of cycles that the phase takes to cover half of the
    /// waveform period, and at least 1.
    pub fn half_wave_items(&self) -> usize {
        if self.increment == 0 {
            return 1;
        }
        usize::try_from(self.modulus / self.increment / 2)
            .unwrap_or(usize::MAX)
            .max(1)
    }

    /// Restarts the stimulus from phase 0.
    pub fn restart(&mut self) {
        self.phase = 0;
    }
}

impl Iterator for PhaseStimulus {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let phase = self.phase;
        self.phase = (self.phase + self.increment) % self.modulus;
        // the modulus is at most 2^32
        Some(phase as u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
