// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading bandpass calibration tables.

use std::path::PathBuf;

use marlu::rubbl_casatables;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Calibration table {0} does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("Calibration table {0} has no SPECTRAL_WINDOW sub-table")]
    NoSpectralWindow(PathBuf),

    #[error("Malformed calibration table: expected {expected} {what}, got {got}")]
    MalformedCalibration {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Malformed calibration table: {0}")]
    Inconsistent(String),

    #[error("Error when trying to interface with calibration table: {0}")]
    Table(#[from] rubbl_casatables::TableError),

    #[error("Error from casacore: {0}")]
    Casacore(#[from] rubbl_casatables::CasacoreError),

    #[error(transparent)]
    Glob(#[from] crate::io::GlobError),
}
