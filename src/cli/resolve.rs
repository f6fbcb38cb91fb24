// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print where a target currently is.

use std::path::PathBuf;

use clap::Parser;

use super::{
    common::{azel_now, observer, InfoPrinter, Warn},
    BeamctlError,
};
use crate::delays::PointingDirection;

/// Print the current azimuth and altitude of a target.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// A zenith token, a solar-system body or a catalog name. If DEC is also
    /// given, this is a right ascension in hours.
    #[clap(name = "TARGET", allow_hyphen_values = true)]
    target: String,

    /// A declination in degrees, decimal or sexagesimal.
    #[clap(name = "DEC", allow_hyphen_values = true)]
    dec: Option<String>,

    /// A station file, for its location. The default is the OVRO-LWA site.
    #[clap(short, long, parse(from_os_str))]
    station: Option<PathBuf>,

    /// A catalog of named sources (toml or json).
    #[clap(long, parse(from_os_str))]
    catalog: Option<PathBuf>,
}

impl ResolveArgs {
    pub fn run(self) -> Result<(), BeamctlError> {
        let observer = observer(self.station.as_deref())?;
        let (target, azel) = azel_now(
            &self.target,
            self.dec.as_deref(),
            self.catalog.as_deref(),
            &observer,
        )?;

        let mut printer = InfoPrinter::new(target.to_string().into());
        printer.push_block(vec![
            format!("Azimuth:  {:.4}°", azel.az.to_degrees().rem_euclid(360.0)).into(),
            format!("Altitude: {:.4}°", azel.el.to_degrees()).into(),
        ]);
        printer.display();

        if let Err(e) = PointingDirection::from_azel(azel) {
            format!("{target} can't be pointed at right now: {e}").warn();
        }
        Ok(())
    }
}
