//! The decoded pulse sequence.
//!
//! [`PulseData`] is the sink the frame decoder writes into and the source the
//! encoder reads from: an ordered list of (pulse, gap) widths plus the sample
//! rate those widths are expressed in. Decoded frames stamp the sink with
//! [`SAMPLE_RATE_US`], so one unit is one microsecond.
//!
//! Capacity is fixed at [`MAX_PULSES`] pairs in both `std` and `no_std`
//! builds. Pushing past it fails with [`RfrawError::Overflow`] and leaves the
//! stored pairs untouched.

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use crate::consts::{MAX_PULSES, SAMPLE_RATE_US};
use crate::error::RfrawError;

/// An ordered sequence of (pulse, gap) width pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseData {
    /// Pulse widths, one per pair
    #[cfg(not(feature = "std"))]
    pulse: Vec<u32, MAX_PULSES>,
    /// Gap widths, one per pair
    #[cfg(not(feature = "std"))]
    gap: Vec<u32, MAX_PULSES>,
    /// Pulse widths, one per pair
    #[cfg(feature = "std")]
    pulse: Vec<u32>,
    /// Gap widths, one per pair
    #[cfg(feature = "std")]
    gap: Vec<u32>,
    sample_rate: u32,
}

impl Default for PulseData {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseData {
    /// Creates an empty sink at the nominal microsecond sample rate.
    pub fn new() -> Self {
        Self::with_sample_rate(SAMPLE_RATE_US)
    }

    /// Creates an empty sink whose widths are counted in samples at `sample_rate` Hz.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            pulse: Vec::new(),
            gap: Vec::new(),
            sample_rate,
        }
    }

    /// Builds a sink from `(pulse, gap)` pairs, stopping at capacity.
    pub fn from_pairs<I>(pairs: I, sample_rate: u32) -> Result<Self, RfrawError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut data = Self::with_sample_rate(sample_rate);
        for (pulse, gap) in pairs {
            data.push_pair(pulse, gap)?;
        }
        Ok(data)
    }

    /// Drops every pair and zeroes the sample rate.
    pub fn clear(&mut self) {
        self.pulse.clear();
        self.gap.clear();
        self.sample_rate = 0;
    }

    /// Number of complete pairs.
    pub fn count(&self) -> usize {
        self.gap.len()
    }

    /// Returns `true` if no pair has been emitted.
    pub fn is_empty(&self) -> bool {
        self.gap.is_empty()
    }

    /// Returns `true` once [`MAX_PULSES`] pairs are stored.
    pub fn is_full(&self) -> bool {
        self.count() >= MAX_PULSES
    }

    /// Pulse widths, `pulses()[i]` pairs with `gaps()[i]`.
    pub fn pulses(&self) -> &[u32] {
        &self.pulse
    }

    /// Gap widths.
    pub fn gaps(&self) -> &[u32] {
        &self.gap
    }

    /// Iterates the pairs in stream order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pulse.iter().copied().zip(self.gap.iter().copied())
    }

    /// Sample rate the widths are expressed in, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Overrides the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// Appends one pair.
    ///
    /// # Errors
    /// [`RfrawError::Overflow`] if the sink already holds [`MAX_PULSES`] pairs.
    pub fn push_pair(&mut self, pulse: u32, gap: u32) -> Result<(), RfrawError> {
        if self.is_full() {
            return Err(RfrawError::Overflow {
                capacity: MAX_PULSES,
            });
        }
        #[cfg(feature = "std")]
        {
            self.pulse.push(pulse);
            self.gap.push(gap);
        }
        #[cfg(not(feature = "std"))]
        {
            // Both vectors share the same length, checked above.
            let _ = self.pulse.push(pulse);
            let _ = self.gap.push(gap);
        }
        Ok(())
    }
}
