// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The station: where it is and where its antennas are.

Antenna positions are local East, North and Zenith offsets from the array
centre. Nothing here ever changes after the station description is loaded.
*/

use std::path::Path;

use log::debug;
use marlu::LatLngHeight;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::{read_arg_file, ConfigError},
    constants::{OVRO_HEIGHT_M, OVRO_LAT_DEG, OVRO_LONG_DEG},
};

/// East, North and Zenith coordinates of an antenna relative to the array
/// centre.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Enz {
    /// East \[metres\]
    pub e: f64,
    /// North \[metres\]
    pub n: f64,
    /// Zenith \[metres\]
    pub z: f64,
}

impl Enz {
    pub fn as_array(&self) -> [f64; 3] {
        [self.e, self.n, self.z]
    }

    /// The distance from the array centre projected onto the ground
    /// \[metres\].
    pub fn ground_distance(&self) -> f64 {
        self.e.hypot(self.n)
    }

    pub fn dot(&self, v: [f64; 3]) -> f64 {
        self.e * v[0] + self.n * v[1] + self.z * v[2]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Antenna {
    /// Zero-indexed position of this antenna in every per-antenna vector.
    pub index: usize,

    #[serde(flatten)]
    pub enz: Enz,
}

/// The static description of the station.
#[derive(Debug, Clone)]
pub struct Station {
    pub name: String,

    /// The geodetic location of the array centre.
    pub location: LatLngHeight,

    /// All antennas, ordered by their index.
    antennas: Vec<Antenna>,
}

/// The on-disk representation of a station.
#[derive(Debug, Serialize, Deserialize)]
struct StationFile {
    name: String,
    latitude_deg: Option<f64>,
    longitude_deg: Option<f64>,
    height_m: Option<f64>,
    antennas: Vec<Antenna>,
}

impl Station {
    /// Create a new station. Antennas may be supplied in any order, but their
    /// indices must be exactly `0..antennas.len()`.
    pub fn new(
        name: String,
        location: LatLngHeight,
        mut antennas: Vec<Antenna>,
    ) -> Result<Station, StationError> {
        if antennas.is_empty() {
            return Err(StationError::NoAntennas);
        }
        antennas.sort_unstable_by_key(|a| a.index);
        for (expected, antenna) in antennas.iter().enumerate() {
            if antenna.index != expected {
                return Err(StationError::BadIndex {
                    expected,
                    got: antenna.index,
                });
            }
        }

        Ok(Station {
            name,
            location,
            antennas,
        })
    }

    /// Create a station at the OVRO-LWA site from antenna positions listed in
    /// index order.
    pub fn ovro_with_positions(positions: &[Enz]) -> Result<Station, StationError> {
        let antennas = positions
            .iter()
            .enumerate()
            .map(|(index, &enz)| Antenna { index, enz })
            .collect();
        Station::new("ovro".to_string(), ovro_location(), antennas)
    }

    /// Read a station description from a toml or json file. A missing location
    /// means the OVRO-LWA site.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<Station, StationError> {
        let file = file.as_ref();
        debug!("Reading station description from {}", file.display());
        let StationFile {
            name,
            latitude_deg,
            longitude_deg,
            height_m,
            antennas,
        } = read_arg_file(file)?;

        let location = LatLngHeight {
            longitude_rad: longitude_deg.unwrap_or(OVRO_LONG_DEG).to_radians(),
            latitude_rad: latitude_deg.unwrap_or(OVRO_LAT_DEG).to_radians(),
            height_metres: height_m.unwrap_or(OVRO_HEIGHT_M),
        };
        Station::new(name, location, antennas)
    }

    pub fn antennas(&self) -> &[Antenna] {
        &self.antennas
    }

    pub fn num_antennas(&self) -> usize {
        self.antennas.len()
    }
}

/// The geodetic location of the OVRO-LWA array centre.
pub fn ovro_location() -> LatLngHeight {
    LatLngHeight {
        longitude_rad: OVRO_LONG_DEG.to_radians(),
        latitude_rad: OVRO_LAT_DEG.to_radians(),
        height_metres: OVRO_HEIGHT_M,
    }
}

#[derive(Error, Debug)]
pub enum StationError {
    #[error("The station description contains no antennas")]
    NoAntennas,

    #[error("Antenna indices must run from 0 without gaps or repeats; expected index {expected}, got {got}")]
    BadIndex { expected: usize, got: usize },

    #[error(transparent)]
    File(#[from] ConfigError),
}
