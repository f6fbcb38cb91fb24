// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print the delays that would point a station's beam somewhere.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use log::info;
use serde::Serialize;

use super::{
    common::{azel_now, Warn},
    BeamctlError,
};
use crate::{
    delays::{calculate_delays, PointingDirection},
    station::Station,
};

/// Calculate the per-antenna beamforming delays \[ns\] for a direction or a
/// target.
#[derive(Parser, Debug)]
pub struct DelaysArgs {
    /// The station description (toml or json).
    #[clap(short, long, parse(from_os_str))]
    station: PathBuf,

    /// The azimuth to point at, east of north. Degrees unless --radians is
    /// given.
    #[clap(long, allow_hyphen_values = true)]
    #[clap(required_unless_present = "target", requires = "alt")]
    az: Option<f64>,

    /// The altitude to point at. Degrees unless --radians is given.
    #[clap(long, allow_hyphen_values = true)]
    #[clap(required_unless_present = "target", requires = "az")]
    alt: Option<f64>,

    /// --az and --alt are in radians.
    #[clap(long)]
    radians: bool,

    /// Point at this target, as of now. A zenith token, a solar-system body,
    /// a catalog name or, with --dec, a right ascension in hours.
    #[clap(long, allow_hyphen_values = true)]
    #[clap(conflicts_with_all = &["az", "alt"])]
    target: Option<String>,

    /// The declination that goes with --target \[degrees\].
    #[clap(long, allow_hyphen_values = true, requires = "target")]
    dec: Option<String>,

    /// A catalog of named sources (toml or json).
    #[clap(long, parse(from_os_str))]
    catalog: Option<PathBuf>,

    /// Write JSON instead of text.
    #[clap(long)]
    json: bool,

    /// Write the delays here instead of stdout.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DelaysOutput {
    azimuth_deg: f64,
    altitude_deg: f64,
    /// One per antenna, in index order.
    delays_ns: Vec<f64>,
}

impl DelaysArgs {
    pub fn run(self) -> Result<(), BeamctlError> {
        let station = Station::read(&self.station)?;
        info!(
            "Station '{}' has {} antennas",
            station.name,
            station.num_antennas()
        );

        let dir = match (self.target.as_deref(), self.az, self.alt) {
            (Some(target), _, _) => {
                if self.radians {
                    "--radians has no effect with --target".warn();
                }
                let (target, azel) = azel_now(
                    target,
                    self.dec.as_deref(),
                    self.catalog.as_deref(),
                    &station.location,
                )?;
                info!(
                    "{target} is at az {:.4}°, alt {:.4}°",
                    azel.az.to_degrees(),
                    azel.el.to_degrees()
                );
                PointingDirection::from_azel(azel)?
            }
            (None, Some(az), Some(alt)) if self.radians => PointingDirection::new(az, alt)?,
            (None, Some(az), Some(alt)) => PointingDirection::from_degrees(az, alt)?,
            _ => {
                return Err(BeamctlError::Pointing(
                    "Either --target or both --az and --alt must be given".to_string(),
                ))
            }
        };
        info!("Pointing at {dir}");

        let output = DelaysOutput {
            azimuth_deg: dir.az().to_degrees(),
            altitude_deg: dir.alt().to_degrees(),
            delays_ns: calculate_delays(station.antennas(), dir),
        };

        match self.output.as_ref() {
            Some(path) => {
                let mut f = BufWriter::new(File::create(path)?);
                write_delays(&mut f, &output, self.json)?;
                f.flush()?;
                info!("Wrote delays to {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                write_delays(&mut stdout.lock(), &output, self.json)?;
            }
        }
        Ok(())
    }
}

fn write_delays<W: Write>(
    w: &mut W,
    output: &DelaysOutput,
    json: bool,
) -> Result<(), BeamctlError> {
    if json {
        serde_json::to_writer_pretty(&mut *w, output)?;
        writeln!(w)?;
    } else {
        writeln!(
            w,
            "# az {:.6} deg, alt {:.6} deg",
            output.azimuth_deg, output.altitude_deg
        )?;
        writeln!(w, "# antenna delay_ns")?;
        for (i, d) in output.delays_ns.iter().enumerate() {
            writeln!(w, "{i} {d:.6}")?;
        }
    }
    Ok(())
}
