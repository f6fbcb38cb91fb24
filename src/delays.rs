// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Geometric delays for steering a beam.

A pointing direction is a topocentric azimuth (east of north) and altitude. The
delay for an antenna is the extra path length of a plane wave from that
direction relative to a wave from zenith, because calibration is referenced to
zenith. The pipelines can only add delay, so delays are then shifted so that
the antenna with the largest geometric delay gets zero and every other antenna
a positive delay.

All delays here are in nanoseconds.
 */

use marlu::AzEl;
use thiserror::Error;

use crate::{
    constants::{FRAC_PI_2, NPOL, SPEED_OF_LIGHT_M_PER_NS, TAU},
    station::Antenna,
};

/// Altitudes this far above zenith are treated as zenith, which lets degree
/// to radian conversions of 90 through.
const ALT_TOLERANCE_RAD: f64 = 1e-9;

/// A validated topocentric direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointingDirection {
    /// Azimuth east of north \[radians\], in `[0, 2π)`.
    az: f64,
    /// Altitude above the horizon \[radians\], in `[0, π/2]`.
    alt: f64,
}

impl PointingDirection {
    /// Azimuth and altitude in radians. The azimuth is wrapped into `[0, 2π)`;
    /// an altitude below the horizon or above zenith is rejected.
    pub fn new(az_rad: f64, alt_rad: f64) -> Result<PointingDirection, InvalidPointing> {
        if !az_rad.is_finite() || !alt_rad.is_finite() {
            return Err(InvalidPointing::NotFinite {
                az: az_rad,
                alt: alt_rad,
            });
        }
        if alt_rad < 0.0 {
            return Err(InvalidPointing::BelowHorizon {
                alt_deg: alt_rad.to_degrees(),
            });
        }
        if alt_rad > FRAC_PI_2 + ALT_TOLERANCE_RAD {
            return Err(InvalidPointing::PastZenith {
                alt_deg: alt_rad.to_degrees(),
            });
        }

        Ok(PointingDirection {
            az: az_rad.rem_euclid(TAU),
            alt: alt_rad.min(FRAC_PI_2),
        })
    }

    /// The same as [`PointingDirection::new`], but in degrees.
    pub fn from_degrees(az_deg: f64, alt_deg: f64) -> Result<PointingDirection, InvalidPointing> {
        Self::new(az_deg.to_radians(), alt_deg.to_radians())
    }

    pub fn zenith() -> PointingDirection {
        PointingDirection {
            az: 0.0,
            alt: FRAC_PI_2,
        }
    }

    pub fn from_azel(azel: AzEl) -> Result<PointingDirection, InvalidPointing> {
        Self::new(azel.az, azel.el)
    }

    pub fn az(&self) -> f64 {
        self.az
    }

    pub fn alt(&self) -> f64 {
        self.alt
    }

    /// The unit vector in (east, north, zenith) coordinates.
    pub fn unit_vector(&self) -> [f64; 3] {
        let (s_az, c_az) = self.az.sin_cos();
        let (s_alt, c_alt) = self.alt.sin_cos();
        [c_alt * s_az, c_alt * c_az, s_alt]
    }
}

impl std::fmt::Display for PointingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "az {:.4}°, alt {:.4}°",
            self.az.to_degrees(),
            self.alt.to_degrees()
        )
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidPointing {
    #[error("Pointing direction (az {az}, alt {alt}) is not finite")]
    NotFinite { az: f64, alt: f64 },

    #[error("Altitude {alt_deg:.3}° is below the horizon")]
    BelowHorizon { alt_deg: f64 },

    #[error("Altitude {alt_deg:.3}° is past zenith")]
    PastZenith { alt_deg: f64 },
}

/// The delay of each antenna for a wave from `dir`, relative to a wave from
/// zenith. These have not been made non-negative.
pub fn geometric_delays(antennas: &[Antenna], dir: PointingDirection) -> Vec<f64> {
    const ZENITH: [f64; 3] = [0.0, 0.0, 1.0];
    let dir = dir.unit_vector();
    antennas
        .iter()
        .map(|a| (a.enz.dot(dir) - a.enz.dot(ZENITH)) / SPEED_OF_LIGHT_M_PER_NS)
        .collect()
}

/// Replace each delay with `max - delay`. Afterwards every delay is
/// non-negative and the antenna with the largest input delay has zero.
pub fn normalise_delays(delays: &mut [f64]) {
    let max = delays.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    for d in delays.iter_mut() {
        *d = max - *d;
    }
}

/// Non-negative delays for each antenna, steering towards `dir`.
pub fn calculate_delays(antennas: &[Antenna], dir: PointingDirection) -> Vec<f64> {
    let mut delays = geometric_delays(antennas, dir);
    normalise_delays(&mut delays);
    delays
}

/// Repeat each antenna's value for every polarisation, antenna-major, so that
/// the value for (antenna, pol) lands at `NPOL * antenna + pol`.
pub fn per_pol<T: Copy>(values: &[T]) -> Vec<T> {
    values
        .iter()
        .flat_map(|&v| std::iter::repeat(v).take(NPOL))
        .collect()
}
