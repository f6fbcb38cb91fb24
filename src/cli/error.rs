// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all beamctl-related errors. This should be the *only* error
//! enum that is publicly visible from the CLI.

use thiserror::Error;

use crate::{
    calibration::CalibrationError, config::ConfigError, coord::ResolveError,
    delays::InvalidPointing, io::GlobError, station::StationError,
};

/// The *only* publicly visible error from the beamctl CLI. Each variant
/// carries a rendered message, plus a hint where one helps.
#[derive(Error, Debug)]
pub enum BeamctlError {
    /// An error related to bandpass calibration tables.
    #[error("{0}\n\nCalibration tables are CASA bandpass tables (directories ending in .bcal) with one row per antenna.")]
    Calibration(String),

    /// An error related to station descriptions.
    #[error("{0}\n\nStation files are toml or json, with a 'name' and an 'antennas' list of index/e/n/z entries.")]
    Station(String),

    /// An error related to pointing directions.
    #[error("{0}")]
    Pointing(String),

    /// An error related to resolving targets.
    #[error("{0}\n\nA target is 'zenith', a solar-system body, a name from a catalog (--catalog), or an RA in hours followed by a Dec. in degrees.")]
    Target(String),

    /// An error related to configuration or other argument files.
    #[error("{0}")]
    Config(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

impl From<CalibrationError> for BeamctlError {
    fn from(e: CalibrationError) -> Self {
        let s = e.to_string();
        match e {
            CalibrationError::Glob(e) => Self::from(e),
            CalibrationError::NotADirectory(_)
            | CalibrationError::NoSpectralWindow(_)
            | CalibrationError::MalformedCalibration { .. }
            | CalibrationError::Inconsistent(_)
            | CalibrationError::Table(_)
            | CalibrationError::Casacore(_) => Self::Calibration(s),
        }
    }
}

impl From<StationError> for BeamctlError {
    fn from(e: StationError) -> Self {
        let s = e.to_string();
        match e {
            StationError::NoAntennas | StationError::BadIndex { .. } => Self::Station(s),
            StationError::File(e) => Self::from(e),
        }
    }
}

impl From<ResolveError> for BeamctlError {
    fn from(e: ResolveError) -> Self {
        let s = e.to_string();
        match e {
            ResolveError::Catalog(e) => Self::from(e),
            ResolveError::InvalidTarget(_)
            | ResolveError::BadCoordinate { .. }
            | ResolveError::DecOutOfRange(_)
            | ResolveError::UnsupportedTarget(_)
            | ResolveError::NoCatalog(_)
            | ResolveError::NotInCatalog(_) => Self::Target(s),
        }
    }
}

impl From<InvalidPointing> for BeamctlError {
    fn from(e: InvalidPointing) -> Self {
        Self::Pointing(e.to_string())
    }
}

impl From<ConfigError> for BeamctlError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<GlobError> for BeamctlError {
    fn from(e: GlobError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for BeamctlError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<serde_json::Error> for BeamctlError {
    fn from(e: serde_json::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
