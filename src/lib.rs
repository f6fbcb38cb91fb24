// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Beam pointing, calibration and tracking control for the OVRO-LWA X-engine
beamformer.

A beam is steered by turning a topocentric direction into per-antenna delays
and amplitudes, and corrected by per-antenna bandpass calibration gains. Both
are pushed to the fleet of remote beamforming pipelines, each of which handles
a slice of the observing band.
 */

pub mod calibration;
pub mod cli;
pub mod config;
pub mod constants;
pub mod control;
pub mod coord;
pub mod delays;
pub mod distribute;
pub mod fleet;
pub mod io;
pub mod pipeline;
pub mod station;
pub mod tracking;

#[cfg(test)]
pub(crate) mod tests;

use crossbeam_utils::atomic::AtomicCell;

lazy_static::lazy_static! {
    /// Are progress bars being drawn? This should only ever be enabled by CLI
    /// code.
    pub(crate) static ref PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
}

// Re-exports.
pub use calibration::{CalibrationError, CalibrationReader, CalibrationTable, CasaBcalReader};
pub use cli::{Beamctl, BeamctlError};
pub use config::BeamControlConfig;
pub use control::{create_and_calibrate, BeamControlError, BeamController, BeamId};
pub use coord::{CoordinateResolver, Ephemeris, StandardResolver, Target};
pub use delays::PointingDirection;
pub use fleet::{BroadcastReport, FleetError, PipelineFleet};
pub use pipeline::{PipelineConnector, PipelineControl, PipelineError, PipelineStatus};
pub use station::{Antenna, Station};
pub use tracking::{CancelToken, TrackingError, TrackingScheduler, TrackingSummary};
