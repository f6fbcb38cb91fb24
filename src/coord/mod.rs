// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Turning a target into a topocentric direction.

A [`Target`] is what a user asks to point at: zenith, an explicit RA/Dec, a
solar-system body or a name to be looked up in a catalog. A
[`CoordinateResolver`] resolves a target once into an [`Ephemeris`], which can
then be evaluated at any time for any observer; a tracking loop resolves once
and evaluates many times.
 */

mod sexagesimal;
mod sun;

pub use sexagesimal::{format_dms, format_hms, parse_degrees, parse_hours, SexagesimalError};

use std::{
    collections::BTreeMap,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use hifitime::{Duration, Epoch};
use log::{debug, info};
use marlu::{
    precession::{get_lmst, precess_time},
    AzEl, LatLngHeight, RADec,
};
use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    config::{read_arg_file, ConfigError},
    constants::FRAC_PI_2,
};

/// Any of these (ignoring case) means zenith.
const ZENITH_TOKENS: [&str; 3] = ["z", "zen", "zenith"];

lazy_static::lazy_static! {
    /// UT1 - UTC. Not known here, and irrelevant at beam-pointing precision.
    static ref DUT1: Duration = Duration::from_seconds(0.0);
}

/// The solar-system bodies that can be named as targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SolarSystemBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Earth,
    EarthMoonBarycenter,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

#[derive(Debug, Clone)]
pub enum Target {
    Zenith,

    /// Equatorial coordinates (J2000).
    RaDec(RADec),

    Body(SolarSystemBody),

    /// A name for a [`CatalogLookup`] to resolve.
    Named(String),
}

impl Target {
    /// Interpret what a user asked to point at. With `dec`, `target_or_ra` is
    /// a right ascension in hours and `dec` a declination in degrees, either
    /// in decimal or sexagesimal form. Without it, `target_or_ra` is a zenith
    /// token, a solar-system body or a catalog name.
    pub fn parse(target_or_ra: &str, dec: Option<&str>) -> Result<Target, ResolveError> {
        let target_or_ra = target_or_ra.trim();
        let lower = target_or_ra.to_lowercase();
        if ZENITH_TOKENS.contains(&lower.as_str()) {
            return Ok(Target::Zenith);
        }

        if let Some(dec) = dec {
            let ra_hours = parse_hours(target_or_ra).map_err(|err| ResolveError::BadCoordinate {
                what: "RA",
                value: target_or_ra.to_string(),
                err,
            })?;
            let dec_deg = parse_degrees(dec).map_err(|err| ResolveError::BadCoordinate {
                what: "Dec.",
                value: dec.to_string(),
                err,
            })?;
            if !(-90.0..=90.0).contains(&dec_deg) {
                return Err(ResolveError::DecOutOfRange(dec_deg));
            }
            return Ok(Target::RaDec(RADec::from_degrees(
                (ra_hours * 15.0).rem_euclid(360.0),
                dec_deg,
            )));
        }

        if let Ok(body) = lower.parse::<SolarSystemBody>() {
            return match body {
                SolarSystemBody::Earth | SolarSystemBody::EarthMoonBarycenter => {
                    Err(ResolveError::InvalidTarget(target_or_ra.to_string()))
                }
                _ => Ok(Target::Body(body)),
            };
        }

        if target_or_ra.is_empty() {
            return Err(ResolveError::InvalidTarget(target_or_ra.to_string()));
        }
        Ok(Target::Named(target_or_ra.to_string()))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Zenith => write!(f, "zenith"),
            Target::RaDec(radec) => write!(
                f,
                "RA {}, Dec. {}",
                format_hms(radec.ra.to_degrees() / 15.0),
                format_dms(radec.dec.to_degrees())
            ),
            Target::Body(body) => write!(f, "{body}"),
            Target::Named(name) => write!(f, "'{name}'"),
        }
    }
}

/// The position of a resolved target as a function of time.
pub trait Ephemeris: Send + Sync {
    /// Where the target is at `time`, seen from `observer`.
    fn azalt(&self, time: Epoch, observer: &LatLngHeight) -> AzEl;
}

pub trait CoordinateResolver: Send + Sync {
    fn ephemeris(&self, target: &Target) -> Result<Box<dyn Ephemeris>, ResolveError>;
}

/// Something that knows where named sources are.
pub trait CatalogLookup: Send + Sync {
    fn lookup(&self, name: &str) -> Result<RADec, ResolveError>;
}

struct ZenithEphemeris;

impl Ephemeris for ZenithEphemeris {
    fn azalt(&self, _time: Epoch, _observer: &LatLngHeight) -> AzEl {
        AzEl::from_radians(0.0, FRAC_PI_2)
    }
}

/// A source fixed in J2000 coordinates.
struct SiderealEphemeris(RADec);

impl Ephemeris for SiderealEphemeris {
    fn azalt(&self, time: Epoch, observer: &LatLngHeight) -> AzEl {
        let precession_info = precess_time(
            observer.longitude_rad,
            observer.latitude_rad,
            self.0,
            time,
            *DUT1,
        );
        self.0
            .to_hadec(precession_info.lmst_j2000)
            .to_azel(precession_info.array_latitude_j2000)
    }
}

struct SunEphemeris;

impl Ephemeris for SunEphemeris {
    fn azalt(&self, time: Epoch, observer: &LatLngHeight) -> AzEl {
        // Already referred to the equinox of date, so no precession.
        let lmst = get_lmst(observer.longitude_rad, time, *DUT1);
        sun::sun_radec(time)
            .to_hadec(lmst)
            .to_azel(observer.latitude_rad)
    }
}

/// Resolves zenith, RA/Dec and the Sun itself, and names through an optional
/// catalog.
#[derive(Default)]
pub struct StandardResolver {
    catalog: Option<Box<dyn CatalogLookup>>,
}

impl StandardResolver {
    pub fn new() -> StandardResolver {
        StandardResolver::default()
    }

    pub fn with_catalog<C: CatalogLookup + 'static>(catalog: C) -> StandardResolver {
        StandardResolver {
            catalog: Some(Box::new(catalog)),
        }
    }
}

impl CoordinateResolver for StandardResolver {
    fn ephemeris(&self, target: &Target) -> Result<Box<dyn Ephemeris>, ResolveError> {
        let ephemeris: Box<dyn Ephemeris> = match target {
            Target::Zenith => Box::new(ZenithEphemeris),
            Target::RaDec(radec) => Box::new(SiderealEphemeris(*radec)),
            Target::Body(SolarSystemBody::Sun) => Box::new(SunEphemeris),
            Target::Body(body) => return Err(ResolveError::UnsupportedTarget(body.to_string())),
            Target::Named(name) => {
                let catalog = self
                    .catalog
                    .as_ref()
                    .ok_or_else(|| ResolveError::NoCatalog(name.clone()))?;
                let radec = catalog.lookup(name)?;
                info!("Resolved {target} to {}", Target::RaDec(radec));
                Box::new(SiderealEphemeris(radec))
            }
        };
        debug!("Resolved {target}");
        Ok(ephemeris)
    }
}

/// The current time.
pub fn epoch_now() -> Epoch {
    let since_unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Epoch::from_unix_seconds(since_unix.as_secs_f64())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogEntry {
    /// Hours, decimal or sexagesimal.
    ra: String,
    /// Degrees, decimal or sexagesimal.
    dec: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    sources: BTreeMap<String, CatalogEntry>,
}

/// Named sources read from a file. Names are matched ignoring case.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    sources: BTreeMap<String, RADec>,
}

impl SourceCatalog {
    /// Read a catalog from a TOML or JSON file with a `sources` table, each
    /// entry of which has an `ra` and `dec`.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<SourceCatalog, ResolveError> {
        let CatalogFile { sources } = read_arg_file(file.as_ref())?;
        let mut catalog = BTreeMap::new();
        for (name, CatalogEntry { ra, dec }) in sources {
            match Target::parse(&ra, Some(&dec))? {
                Target::RaDec(radec) => {
                    catalog.insert(name.to_lowercase(), radec);
                }
                _ => return Err(ResolveError::InvalidTarget(name)),
            }
        }
        debug!("Read {} sources from {}", catalog.len(), file.as_ref().display());
        Ok(SourceCatalog { sources: catalog })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl CatalogLookup for SourceCatalog {
    fn lookup(&self, name: &str) -> Result<RADec, ResolveError> {
        self.sources
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| ResolveError::NotInCatalog(name.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid target: '{0}'")]
    InvalidTarget(String),

    #[error("Cannot read {what} '{value}': {err}")]
    BadCoordinate {
        what: &'static str,
        value: String,
        err: SexagesimalError,
    },

    #[error("Declination {0}° is out of range")]
    DecOutOfRange(f64),

    #[error("No ephemeris is available for {0}")]
    UnsupportedTarget(String),

    #[error("Cannot resolve '{0}' without a source catalog")]
    NoCatalog(String),

    #[error("'{0}' is not in the source catalog")]
    NotInCatalog(String),

    #[error(transparent)]
    Catalog(#[from] ConfigError),
}
