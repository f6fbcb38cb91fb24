// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things shared by several `beamctl` subcommands.

mod printers;

pub(super) use printers::{display_warnings, InfoPrinter, Warn};

use std::path::Path;

use log::debug;
use marlu::{AzEl, LatLngHeight};

use super::BeamctlError;
use crate::{
    coord::{epoch_now, CoordinateResolver, SourceCatalog, StandardResolver, Target},
    station::{ovro_location, Station},
};

/// A resolver that knows about the sources in `catalog`, if one is given.
pub(super) fn make_resolver(catalog: Option<&Path>) -> Result<StandardResolver, BeamctlError> {
    match catalog {
        Some(catalog) => {
            let catalog = SourceCatalog::read(catalog)?;
            debug!("Using a catalog of {} sources", catalog.len());
            Ok(StandardResolver::with_catalog(catalog))
        }
        None => Ok(StandardResolver::new()),
    }
}

/// Where the station is. Without a station file, this is the OVRO-LWA site.
pub(super) fn observer(station: Option<&Path>) -> Result<LatLngHeight, BeamctlError> {
    match station {
        Some(file) => Ok(Station::read(file)?.location),
        None => Ok(ovro_location()),
    }
}

/// Resolve a target and find where it is right now.
pub(super) fn azel_now(
    target_or_ra: &str,
    dec: Option<&str>,
    catalog: Option<&Path>,
    observer: &LatLngHeight,
) -> Result<(Target, AzEl), BeamctlError> {
    let target = Target::parse(target_or_ra, dec)?;
    let ephemeris = make_resolver(catalog)?.ephemeris(&target)?;
    let azel = ephemeris.azalt(epoch_now(), observer);
    Ok((target, azel))
}
