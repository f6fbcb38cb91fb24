// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Where the Sun is, from the low-precision formulae of the Astronomical
//! Almanac. Good to about 0.01° between 1950 and 2050, which is far better
//! than a beam width.

use hifitime::Epoch;
use marlu::RADec;

use crate::constants::TAU;

/// The Julian date of the GPS epoch (1980-01-06 00:00:00 UTC).
const GPS_EPOCH_JD: f64 = 2444244.5;

/// The Julian date of J2000.0.
const J2000_JD: f64 = 2451545.0;

/// The apparent position of the Sun at `time`, referred to the equinox of
/// date.
pub(super) fn sun_radec(time: Epoch) -> RADec {
    // Days since J2000.0. GPS and UT differ by seconds, which doesn't matter
    // at this precision.
    let n = time.to_gpst_seconds() / 86400.0 + GPS_EPOCH_JD - J2000_JD;

    let mean_longitude = (280.460 + 0.9856474 * n).rem_euclid(360.0);
    let mean_anomaly = (357.528 + 0.9856003 * n).rem_euclid(360.0).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.0000004 * n).to_radians();

    let (s_lambda, c_lambda) = ecliptic_longitude.sin_cos();
    let ra = (obliquity.cos() * s_lambda).atan2(c_lambda).rem_euclid(TAU);
    let dec = (obliquity.sin() * s_lambda).asin();
    RADec::from_radians(ra, dec)
}
