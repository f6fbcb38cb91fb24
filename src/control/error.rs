// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with controlling a beam.

use thiserror::Error;

use crate::{
    calibration::CalibrationError, config::ConfigError, coord::ResolveError,
    delays::InvalidPointing, fleet::FleetError,
};

#[derive(Error, Debug)]
pub enum BeamControlError {
    #[error("Beam must be between 1 and {max}, got {got}")]
    InvalidBeam { got: u8, max: usize },

    #[error("The station has {got} antennas, but the beamformer expects {expected}")]
    StationSize { expected: usize, got: usize },

    #[error("Beam gain must be a non-negative number, got {0}")]
    InvalidGain(f64),

    #[error("Expected {expected} delays (one per antenna and polarisation), got {got}")]
    WrongDelayLength { expected: usize, got: usize },

    #[error("Polarisation {got} does not exist; there are only {max}")]
    InvalidPol { got: usize, max: usize },

    #[error("{0}")]
    InvalidOperation(String),

    #[error(transparent)]
    InvalidPointing(#[from] InvalidPointing),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

