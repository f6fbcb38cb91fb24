// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The interface to a single remote beamforming pipeline.
//!
//! How commands actually reach a pipeline (the RPC transport and its wire
//! protocol) is up to the application embedding this crate; it supplies a
//! [`PipelineConnector`] that hands out [`PipelineControl`] handles.

mod error;

pub use error::PipelineError;

use std::net::IpAddr;

use marlu::c32;

use crate::constants::{chan_to_freq, NBEAM};

/// What a pipeline reports about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStatus {
    /// The first F-engine channel processed by the pipeline.
    pub chan0: usize,

    /// The number of channels processed by the pipeline.
    pub nchan: usize,

    /// The beam output destination addresses currently in use. This may list
    /// fewer than 16 entries.
    pub dest_addrs: Vec<IpAddr>,

    /// The beam output destination ports currently in use. This may list fewer
    /// than 16 entries.
    pub dest_ports: Vec<u16>,
}

impl PipelineStatus {
    /// The inclusive frequency range covered by the pipeline \[Hz\]. `None` if
    /// the pipeline claims to process no channels.
    pub fn frequency_range(&self) -> Option<FrequencyRange> {
        if self.nchan == 0 {
            return None;
        }
        Some(FrequencyRange {
            lo: chan_to_freq(self.chan0),
            hi: chan_to_freq(self.chan0 + self.nchan - 1),
        })
    }
}

/// An inclusive range of frequencies \[Hz\].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    pub lo: f64,
    pub hi: f64,
}

impl FrequencyRange {
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.lo && freq_hz <= self.hi
    }
}

/// A handle to one remote pipeline. Handles are shared between beams, so
/// every method takes `&self`.
pub trait PipelineControl: Send + Sync {
    fn get_status(&self) -> Result<PipelineStatus, PipelineError>;

    /// Replace the whole 16-slot beam destination table.
    fn set_destination(
        &self,
        addrs: &[IpAddr; NBEAM],
        ports: &[u16; NBEAM],
    ) -> Result<(), PipelineError>;

    /// Set the delays \[ns\] and amplitudes for one beam/polarisation slot.
    /// Both vectors are antenna-major with polarisations interleaved.
    fn update_delays(&self, slot: usize, delays: &[f64], amps: &[f32])
        -> Result<(), PipelineError>;

    /// Set the per-channel calibration gains for one antenna/polarisation of
    /// one beam/polarisation slot.
    fn update_calibration_gains(
        &self,
        slot: usize,
        antenna_pol_slot: usize,
        gains: &[c32],
    ) -> Result<(), PipelineError>;

    fn set_vlbi_destination(&self, addr: IpAddr, port: u16) -> Result<(), PipelineError>;
}

/// Hands out pipeline handles.
pub trait PipelineConnector {
    fn connect(
        &self,
        host: &str,
        pipeline_id: usize,
    ) -> Result<Box<dyn PipelineControl>, PipelineError>;
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::constants::CHAN_WIDTH_HZ;

    #[test]
    fn frequency_range_is_inclusive() {
        let status = PipelineStatus {
            chan0: 1000,
            nchan: 96,
            dest_addrs: vec![],
            dest_ports: vec![],
        };
        let range = status.frequency_range().unwrap();
        assert_abs_diff_eq!(range.lo, 1000.0 * CHAN_WIDTH_HZ);
        assert_abs_diff_eq!(range.hi, 1095.0 * CHAN_WIDTH_HZ);
        assert!(range.contains(range.lo));
        assert!(range.contains(range.hi));
        assert!(!range.contains(range.hi + CHAN_WIDTH_HZ));
    }

    #[test]
    fn no_channels_no_range() {
        let status = PipelineStatus {
            chan0: 1000,
            nchan: 0,
            dest_addrs: vec![],
            dest_ports: vec![],
        };
        assert!(status.frequency_range().is_none());
    }
}
