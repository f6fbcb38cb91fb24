// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to verify beam-control configuration files.

use std::path::PathBuf;

use clap::Parser;

use super::{
    common::{InfoPrinter, Warn},
    BeamctlError,
};
use crate::{calibration::find_cal_tables, config::BeamControlConfig};

/// Verify that a beam-control configuration file can be read, and print what
/// it would do.
#[derive(Parser, Debug)]
pub struct ConfigVerifyArgs {
    /// Path to the configuration file (toml or json).
    #[clap(name = "CONFIG_FILE", parse(from_os_str))]
    config: PathBuf,
}

impl ConfigVerifyArgs {
    pub fn run(self) -> Result<(), BeamctlError> {
        let config = BeamControlConfig::read(&self.config)?;

        let mut printer = InfoPrinter::new(format!("Beam {}", config.beam).into());
        let hosts = config.hosts();
        printer.push_block(vec![
            format!(
                "{} servers, {} pipelines each:",
                hosts.len(),
                config.pipelines_per_host()
            )
            .into(),
            hosts.join(", ").into(),
        ]);

        let cal_dir = config.cal_directory();
        if cal_dir.is_dir() {
            let tables = find_cal_tables(cal_dir)?;
            printer.push_line(
                format!(
                    "{} calibration tables in {}",
                    tables.len(),
                    cal_dir.display()
                )
                .into(),
            );
        } else {
            format!(
                "Calibration directory {} doesn't exist here",
                cal_dir.display()
            )
            .warn();
        }

        let dest = config.destination();
        printer.push_line(format!("Beam data to {}:{}", dest.addr, dest.port).into());
        if config.beam == 1 {
            let vlbi = config.vlbi_destination();
            printer.push_line(format!("VLBI data to {}:{}", vlbi.addr, vlbi.port).into());
        }
        printer.push_block(vec![
            format!(
                "Tracking updates every {:.1} s",
                config.update_interval().as_secs_f64()
            )
            .into(),
            format!(
                "{} ms between calibration pushes",
                config.cal_push_interval().as_millis()
            )
            .into(),
        ]);
        printer.display();
        Ok(())
    }
}
