// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to verify bandpass calibration tables.

use std::{borrow::Cow, path::PathBuf};

use clap::Parser;
use log::info;

use super::{
    common::{InfoPrinter, Warn},
    BeamctlError,
};
use crate::{
    calibration::{find_cal_tables, CalibrationTable},
    constants::NPIPELINE_SUBBAND,
};

/// Verify that bandpass calibration tables can be used, and summarise them.
#[derive(Parser, Debug, Default)]
pub struct CalVerifyArgs {
    /// Path to the calibration table(s) to be verified.
    #[clap(name = "CAL_TABLES", parse(from_os_str))]
    cal_tables: Vec<PathBuf>,

    /// Verify every calibration table in this directory.
    #[clap(long, parse(from_os_str))]
    cal_dir: Option<PathBuf>,
}

impl CalVerifyArgs {
    /// Read and summarise each table. A table that can't be read is reported
    /// and the others are still checked; the run fails if any table failed.
    pub fn run(self) -> Result<(), BeamctlError> {
        let mut tables = self.cal_tables;
        if let Some(dir) = self.cal_dir.as_ref() {
            tables.extend(find_cal_tables(dir)?);
        }
        if tables.is_empty() {
            return Err(BeamctlError::Calibration(
                "No calibration tables were supplied!".to_string(),
            ));
        }

        let mut num_bad = 0;
        for path in &tables {
            let table = match CalibrationTable::load(path) {
                Ok(t) => t,
                Err(e) => {
                    format!("{}: {e}", path.display()).warn();
                    num_bad += 1;
                    continue;
                }
            };
            summarise(path.display().to_string(), &table);
        }

        if num_bad > 0 {
            return Err(BeamctlError::Calibration(format!(
                "{num_bad} of {} calibration tables could not be used",
                tables.len()
            )));
        }
        info!("All {} calibration tables are usable", tables.len());
        Ok(())
    }
}

fn summarise(name: String, table: &CalibrationTable) {
    let (num_ants, num_chans, num_pols) = table.gains().dim();
    let freqs = table.chan_freqs();
    let num_gains = num_ants * num_chans * num_pols;
    let num_flagged = table.num_flagged();

    let mut printer = InfoPrinter::new(name.into());
    printer.push_line(
        format!("{num_ants} antennas, {num_chans} channels, {num_pols} polarisations").into(),
    );
    if let (Some(first), Some(last)) = (freqs.first(), freqs.last()) {
        printer.push_line(format!("{:.3} to {:.3} MHz", first / 1e6, last / 1e6).into());
    }
    printer.push_line(
        format!(
            "{num_flagged} of {num_gains} gains flagged ({:.2}%)",
            100.0 * num_flagged as f64 / num_gains.max(1) as f64
        )
        .into(),
    );
    let blocks: Vec<Cow<'static, str>> = (0..NPIPELINE_SUBBAND)
        .filter_map(|block| {
            table
                .block_centre_freq(block)
                .map(|f| format!("Pipeline block {block} centred on {:.3} MHz", f / 1e6).into())
        })
        .collect();
    printer.push_block(blocks);
    printer.display();
}
