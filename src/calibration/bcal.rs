// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Read CASA bandpass calibration tables (".bcal").
//!
//! The main table has one row per antenna; its CPARAM and FLAG cells have
//! dimensions (channel, polarisation). The SPECTRAL_WINDOW sub-table lists the
//! channel frequencies, possibly split over several rows.

use std::path::Path;

use log::trace;
use marlu::{c32, rubbl_casatables};
use ndarray::prelude::*;
use rubbl_casatables::{Table, TableOpenMode};

use super::{CalibrationError, CalibrationReader, RawCalibration};

#[derive(Debug, Clone, Copy, Default)]
pub struct CasaBcalReader;

impl CalibrationReader for CasaBcalReader {
    fn read(&self, path: &Path) -> Result<RawCalibration, CalibrationError> {
        let mut main_table = Table::open(path, TableOpenMode::Read)?;
        let num_rows = main_table.n_rows() as usize;
        trace!("{} has {num_rows} rows", path.display());

        let mut gain_cells: Vec<Array2<c32>> = Vec::with_capacity(num_rows);
        let mut flag_cells: Vec<Array2<bool>> = Vec::with_capacity(num_rows);
        main_table.for_each_row(|row| {
            gain_cells.push(row.get_cell("CPARAM")?);
            flag_cells.push(row.get_cell("FLAG")?);
            Ok(())
        })?;

        let gains = stack_cells(&gain_cells, "CPARAM")?;
        let flags = stack_cells(&flag_cells, "FLAG")?;

        let mut spw_table = Table::open(path.join("SPECTRAL_WINDOW"), TableOpenMode::Read)?;
        let mut chan_freqs = vec![];
        for row in 0..spw_table.n_rows() {
            let freqs: Vec<f64> = spw_table.get_cell_as_vec("CHAN_FREQ", row)?;
            chan_freqs.extend(freqs);
        }

        Ok(RawCalibration {
            gains,
            flags,
            chan_freqs,
        })
    }
}

/// Stack per-row (channel, polarisation) cells into an (antenna, channel,
/// polarisation) array. Every cell must have the same shape.
fn stack_cells<T: Clone + Default>(
    cells: &[Array2<T>],
    column: &str,
) -> Result<Array3<T>, CalibrationError> {
    let (num_chans, num_pols) = cells.first().map(|c| c.dim()).unwrap_or((0, 0));
    let mut out = Array3::default((cells.len(), num_chans, num_pols));
    for (i_row, (cell, mut out_row)) in cells.iter().zip(out.outer_iter_mut()).enumerate() {
        if cell.dim() != (num_chans, num_pols) {
            return Err(CalibrationError::Inconsistent(format!(
                "{column} cell in row {i_row} has dimensions {:?}, but the first row's are {:?}",
                cell.dim(),
                (num_chans, num_pols)
            )));
        }
        out_row.assign(cell);
    }
    Ok(out)
}
