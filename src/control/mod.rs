// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
High-level control over a single beam.

A [`BeamController`] owns the beam's gain, antenna weighting and calibration
state, and turns requests like "point at the Sun" into coefficient pushes to
the fleet. Several controllers (one per beam) can share the same fleet.
 */

mod error;

pub use error::BeamControlError;

use std::{path::Path, sync::Arc, time::Duration};

use log::{debug, info, warn};

use crate::{
    calibration::{find_cal_tables, CalibrationTable},
    config::{BeamControlConfig, Destination},
    constants::{DEFAULT_CAL_PUSH_INTERVAL, FRAC_PI_2, NBEAM, NPOL, NSTAND},
    coord::{epoch_now, CoordinateResolver, Target},
    delays::{calculate_delays, per_pol, PointingDirection},
    distribute::{amplitudes_for_pol, CoefficientDistributor},
    fleet::{BroadcastReport, PipelineFleet},
    pipeline::PipelineConnector,
    station::Station,
};

/// A beam number, 1 to [`NBEAM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeamId(u8);

impl BeamId {
    pub fn new(beam: u8) -> Result<BeamId, BeamControlError> {
        if (1..=NBEAM).contains(&(beam as usize)) {
            Ok(BeamId(beam))
        } else {
            Err(BeamControlError::InvalidBeam {
                got: beam,
                max: NBEAM,
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-indexed, e.g. for the beam's slot in a destination table.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl std::fmt::Display for BeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for BeamId {
    type Error = BeamControlError;

    fn try_from(beam: u8) -> Result<Self, Self::Error> {
        BeamId::new(beam)
    }
}

pub struct BeamController {
    beam: BeamId,
    fleet: Arc<PipelineFleet>,
    station: Arc<Station>,
    resolver: Arc<dyn CoordinateResolver>,

    /// Multiplies every amplitude. Only takes effect on the next pointing.
    gain: f64,

    /// Per-antenna amplitude taper in `[0, 1]`, laid out by antenna and then
    /// polarisation.
    weighting: Vec<f64>,

    /// Has each pipeline in the fleet had a full calibration pushed?
    cal_set: Vec<bool>,

    push_interval: Duration,
}

impl BeamController {
    /// A controller with unit gain and uniform weighting. The station must
    /// have exactly as many antennas as the beamformer.
    pub fn new(
        beam: BeamId,
        fleet: Arc<PipelineFleet>,
        station: Arc<Station>,
        resolver: Arc<dyn CoordinateResolver>,
    ) -> Result<BeamController, BeamControlError> {
        if station.num_antennas() != NSTAND {
            return Err(BeamControlError::StationSize {
                expected: NSTAND,
                got: station.num_antennas(),
            });
        }

        let cal_set = vec![false; fleet.len()];
        let mut controller = BeamController {
            beam,
            fleet,
            station,
            resolver,
            gain: 1.0,
            weighting: vec![],
            cal_set,
            push_interval: DEFAULT_CAL_PUSH_INTERVAL,
        };
        controller.set_weighting(|_| 1.0);
        Ok(controller)
    }

    /// Set the pause after each calibration command.
    pub fn with_push_interval(mut self, push_interval: Duration) -> BeamController {
        self.push_interval = push_interval;
        self
    }

    pub fn beam(&self) -> BeamId {
        self.beam
    }

    pub fn fleet(&self) -> &PipelineFleet {
        &self.fleet
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn resolver(&self) -> &dyn CoordinateResolver {
        self.resolver.as_ref()
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn weighting(&self) -> &[f64] {
        &self.weighting
    }

    /// Has every pipeline been calibrated?
    pub fn cal_set(&self) -> bool {
        self.cal_set.iter().all(|&c| c)
    }

    /// Per-pipeline calibration state, in fleet order.
    pub fn calibrated_pipelines(&self) -> &[bool] {
        &self.cal_set
    }

    fn distributor(&self) -> CoefficientDistributor<'_> {
        CoefficientDistributor::new(&self.fleet, self.beam, self.push_interval)
    }

    /// Set the antenna weighting from a function of each antenna's distance
    /// from the array centre on the ground \[metres\]. Weights are clipped to
    /// `[0, 1]`; anything that isn't a number is 0.
    pub fn set_weighting<F: Fn(f64) -> f64>(&mut self, profile: F) {
        let weights: Vec<f64> = self
            .station
            .antennas()
            .iter()
            .map(|a| {
                let w = profile(a.enz.ground_distance());
                if w.is_nan() {
                    0.0
                } else {
                    w.clamp(0.0, 1.0)
                }
            })
            .collect();
        self.weighting = per_pol(&weights);
    }

    /// Set the beam gain. This is only sent to the pipelines with the next
    /// pointing.
    pub fn set_gain(&mut self, gain: f64) -> Result<(), BeamControlError> {
        if !gain.is_finite() || gain < 0.0 {
            return Err(BeamControlError::InvalidGain(gain));
        }
        self.gain = gain;
        Ok(())
    }

    /// Push a calibration table to the pipelines handling its frequencies.
    pub fn apply_calibration(&mut self, table: &CalibrationTable) -> BroadcastReport {
        let push = self.distributor().push_calibration(table);
        for index in push.calibrated {
            self.cal_set[index] = true;
        }
        push.report
    }

    /// Load a calibration table and push it.
    pub fn load_calibration<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<BroadcastReport, BeamControlError> {
        let table = CalibrationTable::load(path)?;
        Ok(self.apply_calibration(&table))
    }

    /// Send delays \[ns\] for polarisation `pol`, along with the current gain
    /// and weighting. `delays` has a value for each antenna and polarisation.
    pub fn set_delays(
        &self,
        delays: &[f64],
        pol: usize,
    ) -> Result<BroadcastReport, BeamControlError> {
        if delays.len() != NSTAND * NPOL {
            return Err(BeamControlError::WrongDelayLength {
                expected: NSTAND * NPOL,
                got: delays.len(),
            });
        }
        if pol >= NPOL {
            return Err(BeamControlError::InvalidPol {
                got: pol,
                max: NPOL,
            });
        }

        let amps = amplitudes_for_pol(self.gain, &self.weighting, pol);
        Ok(self.distributor().push_delays(pol, delays, &amps))
    }

    /// Point the beam at an azimuth and altitude \[radians\].
    pub fn point(&self, az: f64, alt: f64) -> Result<BroadcastReport, BeamControlError> {
        let dir = PointingDirection::new(az, alt)?;
        Ok(self.point_direction(dir))
    }

    /// The same as [`BeamController::point`], but in degrees.
    pub fn point_degrees(&self, az: f64, alt: f64) -> Result<BroadcastReport, BeamControlError> {
        let dir = PointingDirection::from_degrees(az, alt)?;
        Ok(self.point_direction(dir))
    }

    pub fn point_direction(&self, dir: PointingDirection) -> BroadcastReport {
        if !self.cal_set() {
            warn!("Calibration is not set, your results may be suspect");
        }
        debug!("Pointing beam {} at {dir}", self.beam);

        let delays = per_pol(&calculate_delays(self.station.antennas(), dir));
        let mut report = BroadcastReport::default();
        for pol in 0..NPOL {
            let amps = amplitudes_for_pol(self.gain, &self.weighting, pol);
            report.merge(self.distributor().push_delays(pol, &delays, &amps));
        }
        report
    }

    /// Point at a target: a zenith token, a solar-system body, a catalog name
    /// or, with `dec`, a right ascension. The target's position is worked out
    /// for now.
    pub fn point_at_target(
        &self,
        target_or_ra: &str,
        dec: Option<&str>,
    ) -> Result<BroadcastReport, BeamControlError> {
        let target = Target::parse(target_or_ra, dec)?;
        if matches!(target, Target::Zenith) {
            return self.point(0.0, FRAC_PI_2);
        }

        let ephemeris = self.resolver.ephemeris(&target)?;
        let azel = ephemeris.azalt(epoch_now(), &self.station.location);
        info!(
            "{target} is currently at azimuth {:.3}°, altitude {:.3}°",
            azel.az.to_degrees(),
            azel.el.to_degrees()
        );
        self.point(azel.az, azel.el)
    }

    /// Send this beam's data to `dest`. Other beams' destinations are left
    /// alone.
    pub fn set_destination(&self, dest: Destination) -> BroadcastReport {
        info!("Sending beam {} to {}:{}", self.beam, dest.addr, dest.port);
        let slot = self.beam.index();
        self.fleet.for_each_tolerant(|index, pipeline| {
            self.fleet
                .destinations()
                .patch_slot(index, pipeline.handle(), slot, dest)
        })
    }

    /// Send the VLBI copy of the beam data to `dest`. Only beam 1 has one.
    pub fn set_vlbi_destination(
        &self,
        dest: Destination,
    ) -> Result<BroadcastReport, BeamControlError> {
        if self.beam.get() != 1 {
            return Err(BeamControlError::InvalidOperation(
                "The VLBI beam is controlled through beam 1".to_string(),
            ));
        }
        info!("Sending VLBI beam to {}:{}", dest.addr, dest.port);
        Ok(self.fleet.for_each_tolerant(|_, pipeline| {
            pipeline.handle().set_vlbi_destination(dest.addr, dest.port)
        }))
    }
}

/// Connect to the configured pipelines, push every calibration table in the
/// configured directory and start the beam data flowing.
pub fn create_and_calibrate<C: PipelineConnector + ?Sized>(
    config: &BeamControlConfig,
    connector: &C,
    station: Arc<Station>,
    resolver: Arc<dyn CoordinateResolver>,
) -> Result<BeamController, BeamControlError> {
    config.validate()?;
    let beam = BeamId::new(config.beam)?;
    let fleet = PipelineFleet::connect(&config.hosts(), config.pipelines_per_host(), connector)?;
    let mut controller = BeamController::new(beam, Arc::new(fleet), station, resolver)?
        .with_push_interval(config.cal_push_interval());

    for cal_file in find_cal_tables(config.cal_directory())? {
        info!("Applying calibration {}", cal_file.display());
        controller.load_calibration(&cal_file)?;
    }

    controller.set_destination(config.destination());
    if beam.get() == 1 {
        controller.set_vlbi_destination(config.vlbi_destination())?;
    }
    Ok(controller)
}
