// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

The array dimensions here are fixed by the X-engine firmware; the pipelines
expect coefficient vectors laid out with exactly these sizes.
 */

use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// The number of antennas (stands) in the array.
pub const NSTAND: usize = 352;

/// The number of polarisations per antenna.
pub const NPOL: usize = 2;

/// The number of independently steerable beams.
pub const NBEAM: usize = 16;

/// The number of frequency channels processed by a single pipeline.
pub const NCHAN_PIPELINE: usize = 96;

/// The number of pipelines that cooperate on a single subband.
pub const NPIPELINE_SUBBAND: usize = 2;

/// The number of pipelines running on each GPU server.
pub const NPIPELINE_SERVER: usize = 4;

/// The total number of pipelines in the X-engine.
pub const NPIPELINE: usize = 32;

/// The number of subbands that the band is split into.
pub const NSUBBAND: usize = NPIPELINE / NPIPELINE_SUBBAND;

/// The number of GPU servers.
pub const NSERVER: usize = NPIPELINE / NPIPELINE_SERVER;

static_assertions::const_assert_eq!(NSUBBAND * NPIPELINE_SUBBAND, NPIPELINE);
static_assertions::const_assert_eq!(NSERVER * NPIPELINE_SERVER, NPIPELINE);

/// The F-engine ADC sampling rate \[Hz\].
pub const ADC_CLOCK_HZ: f64 = 196e6;

/// The number of F-engine channels across the full (Nyquist) band.
pub const NCHAN_FENGINE: usize = 4096;

/// The width of one F-engine channel \[Hz\].
pub const CHAN_WIDTH_HZ: f64 = ADC_CLOCK_HZ / (2 * NCHAN_FENGINE) as f64;

/// Convert an F-engine channel number into its centre frequency \[Hz\].
pub fn chan_to_freq(chan: usize) -> f64 {
    chan as f64 * CHAN_WIDTH_HZ
}

/// The speed of light \[metres per nanosecond\].
pub const SPEED_OF_LIGHT_M_PER_NS: f64 = marlu::constants::VEL_C / 1e9;

/// OVRO-LWA geodetic latitude \[degrees\].
pub const OVRO_LAT_DEG: f64 = 37.2397808;

/// OVRO-LWA geodetic longitude \[degrees\].
pub const OVRO_LONG_DEG: f64 = -118.2816819;

/// OVRO-LWA height above the ellipsoid \[metres\].
pub const OVRO_HEIGHT_M: f64 = 1183.4839;

/// Default UDP destination for beam data (the "dr-beam-1" recorder).
pub const DEFAULT_BEAM_DEST_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 41, 0, 25));
pub const DEFAULT_BEAM_DEST_PORT: u16 = 20001;

/// Default UDP destination for the VLBI copy of beam 1.
pub const DEFAULT_VLBI_DEST_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 41, 0, 25));
pub const DEFAULT_VLBI_DEST_PORT: u16 = 21001;

/// The default number of GPU servers to control.
pub const DEFAULT_NSERVER: usize = NSERVER;

/// The default number of pipelines controlled per server.
pub const DEFAULT_NPIPELINE_PER_SERVER: usize = NPIPELINE_SERVER;

/// The default directory searched for bandpass calibration tables.
pub const DEFAULT_CAL_DIRECTORY: &str = "/home/ubuntu/mmanders";

/// The file extension of bandpass calibration tables.
pub const CAL_TABLE_EXTENSION: &str = "bcal";

/// The pause between successive calibration pushes to a pipeline. The
/// pipeline control channel can't take them any faster.
pub const DEFAULT_CAL_PUSH_INTERVAL: Duration = Duration::from_millis(5);

/// How often a tracked target's pointing is refreshed.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// How long a target is tracked if no (positive) duration is given.
pub const DEFAULT_TRACKING_DURATION: Duration = Duration::from_secs(86400 / 2);

/// The granularity of sleeps in the tracking loop; cancellation is noticed
/// within this time.
pub const TRACKING_SLEEP_INCREMENT: Duration = Duration::from_millis(10);

/// The hostname of the `n`th (one-indexed) GPU server.
pub fn default_hostname(n: usize) -> String {
    format!("lxdlwagpu{n:02}")
}
