// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bandpass calibration tables.
//!
//! A table holds one complex gain per antenna, channel and polarisation, with
//! a matching flag, for the channels of one subband. Only the phase of the
//! gains is used; gains are normalised to unit magnitude when loaded.

mod bcal;
mod error;
#[cfg(test)]
pub(crate) mod tests;

pub use bcal::CasaBcalReader;
pub use error::CalibrationError;

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use marlu::c32;
use ndarray::prelude::*;
use vec1::Vec1;

use crate::{
    constants::{CAL_TABLE_EXTENSION, NCHAN_PIPELINE, NPIPELINE_SUBBAND, NPOL, NSTAND},
    io::get_all_matches_from_glob,
};

/// The number of channels in a calibration table.
pub const NCHAN_CAL: usize = NCHAN_PIPELINE * NPIPELINE_SUBBAND;

/// What a calibration reader pulls out of a calibration artifact, before any
/// validation.
#[derive(Debug, Clone)]
pub struct RawCalibration {
    /// Dimensions of (antenna, channel, polarisation).
    pub gains: Array3<c32>,
    /// Same dimensions as `gains`.
    pub flags: Array3<bool>,
    /// The centre frequency of each channel \[Hz\].
    pub chan_freqs: Vec<f64>,
}

/// Something that can read the arrays out of a calibration artifact.
pub trait CalibrationReader {
    fn read(&self, path: &Path) -> Result<RawCalibration, CalibrationError>;
}

#[derive(Debug, Clone)]
pub struct CalibrationTable {
    /// Unit-magnitude gains with dimensions (antenna, channel, polarisation).
    gains: Array3<c32>,
    flags: Array3<bool>,
    chan_freqs: Vec1<f64>,
}

impl CalibrationTable {
    /// Load a CASA bandpass calibration table.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<CalibrationTable, CalibrationError> {
        Self::load_with(path, &CasaBcalReader)
    }

    /// Load a calibration table with a specific reader. The artifact must be a
    /// directory with a SPECTRAL_WINDOW sub-table.
    pub fn load_with<P: AsRef<Path>, R: CalibrationReader + ?Sized>(
        path: P,
        reader: &R,
    ) -> Result<CalibrationTable, CalibrationError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(CalibrationError::NotADirectory(path.to_path_buf()));
        }
        if !path.join("SPECTRAL_WINDOW").is_dir() {
            return Err(CalibrationError::NoSpectralWindow(path.to_path_buf()));
        }

        debug!("Reading calibration table {}", path.display());
        let table = Self::from_raw(reader.read(path)?)?;
        let (num_ants, num_chans, num_pols) = table.gains.dim();
        info!(
            "Loaded {num_ants} by {num_chans} by {num_pols} complex gains covering {:.3} to {:.3} MHz",
            table.chan_freqs.first() / 1e6,
            table.chan_freqs.last() / 1e6
        );
        Ok(table)
    }

    /// Validate the dimensions of raw calibration data and normalise its
    /// gains.
    pub fn from_raw(raw: RawCalibration) -> Result<CalibrationTable, CalibrationError> {
        let RawCalibration {
            mut gains,
            flags,
            chan_freqs,
        } = raw;

        let (num_ants, num_chans, num_pols) = gains.dim();
        for (what, expected, got) in [
            ("antennas", NSTAND, num_ants),
            ("channels", NCHAN_CAL, num_chans),
            ("polarisations", NPOL, num_pols),
            ("channel frequencies", NCHAN_CAL, chan_freqs.len()),
        ] {
            if expected != got {
                return Err(CalibrationError::MalformedCalibration {
                    what,
                    expected,
                    got,
                });
            }
        }
        if flags.dim() != gains.dim() {
            return Err(CalibrationError::Inconsistent(format!(
                "flag dimensions {:?} don't match gain dimensions {:?}",
                flags.dim(),
                gains.dim()
            )));
        }
        let chan_freqs = Vec1::try_from_vec(chan_freqs).map_err(|_| {
            CalibrationError::MalformedCalibration {
                what: "channel frequencies",
                expected: NCHAN_CAL,
                got: 0,
            }
        })?;

        // Phase-only calibration. Zero gains become NaN here, and are zeroed
        // when coefficients are derived.
        gains.mapv_inplace(|g| g / g.norm());

        Ok(CalibrationTable {
            gains,
            flags,
            chan_freqs,
        })
    }

    /// Unit-magnitude gains with dimensions (antenna, channel, polarisation).
    pub fn gains(&self) -> ArrayView3<c32> {
        self.gains.view()
    }

    pub fn flags(&self) -> ArrayView3<bool> {
        self.flags.view()
    }

    pub fn chan_freqs(&self) -> &[f64] {
        &self.chan_freqs
    }

    pub fn num_flagged(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// The centre frequency of one pipeline's worth of channels in this table
    /// \[Hz\]. `None` if there's no such block.
    pub fn block_centre_freq(&self, block: usize) -> Option<f64> {
        if block >= NPIPELINE_SUBBAND {
            return None;
        }
        self.chan_freqs
            .get(block * NCHAN_PIPELINE + NCHAN_PIPELINE / 2)
            .copied()
    }

    /// The coefficients to be sent to the pipelines: the inverse of each gain,
    /// with zeros where the inverse isn't finite or the gain is flagged.
    /// Dimensions are (antenna, channel, polarisation).
    pub fn coefficients(&self) -> Array3<c32> {
        let one = c32::new(1.0, 0.0);
        let mut cal = self.gains.mapv(|g| {
            let c = one / g;
            if c.is_finite() {
                c
            } else {
                c32::default()
            }
        });
        cal.zip_mut_with(&self.flags, |c, &flagged| {
            if flagged {
                *c = c32::default();
            }
        });
        cal
    }
}

/// Find all calibration tables in a directory, sorted by name. An empty
/// directory is worth a warning, but not an error.
pub fn find_cal_tables<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, CalibrationError> {
    let dir = dir.as_ref();
    let glob = format!("{}/*.{CAL_TABLE_EXTENSION}", dir.display());
    let mut files = get_all_matches_from_glob(&glob)?;
    files.sort();
    if files.is_empty() {
        warn!("No calibration data found in '{}'", dir.display());
    } else {
        debug!("Found {} calibration tables in {}", files.len(), dir.display());
    }
    Ok(files)
}
