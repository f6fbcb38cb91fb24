// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pushing calibration and pointing coefficients to the pipelines.
//!
//! The pipelines address coefficients by two slots: a beam/polarisation slot
//! choosing which of the beamformer's outputs is being updated, and (for
//! calibration) an antenna/polarisation slot choosing the input. The layout of
//! these slots is fixed by the pipeline firmware; [`beam_pol_slot`] and
//! [`antenna_pol_slot`] are the only places it is written down.


use std::{thread, time::Duration};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};
use ndarray::prelude::*;

use crate::{
    calibration::CalibrationTable,
    constants::{NCHAN_PIPELINE, NPIPELINE_SUBBAND, NPOL},
    control::BeamId,
    fleet::{BroadcastReport, PipelineFleet},
    PROGRESS_BARS,
};

/// The beamformer output slot for polarisation `pol` of `beam`.
pub fn beam_pol_slot(beam: BeamId, pol: usize) -> usize {
    NPOL * beam.index() + pol
}

/// The beamformer input slot for polarisation `pol` of the zero-indexed
/// `antenna`.
pub fn antenna_pol_slot(antenna: usize, pol: usize) -> usize {
    NPOL * antenna + pol
}

/// Amplitudes for updating polarisation `pol`: `gain` times the weighting of
/// each antenna/polarisation slot for `pol`, and zero for the other
/// polarisations. `weighting` is laid out by [`antenna_pol_slot`].
pub fn amplitudes_for_pol(gain: f64, weighting: &[f64], pol: usize) -> Vec<f32> {
    weighting
        .iter()
        .enumerate()
        .map(|(slot, &w)| {
            if slot % NPOL == pol {
                (gain * w) as f32
            } else {
                0.0
            }
        })
        .collect()
}

/// The outcome of pushing one calibration table.
#[derive(Debug, Default)]
pub struct CalibrationPush {
    pub report: BroadcastReport,

    /// Fleet indices of the pipelines that received every antenna's
    /// coefficients.
    pub calibrated: Vec<usize>,
}

pub struct CoefficientDistributor<'a> {
    fleet: &'a PipelineFleet,
    beam: BeamId,

    /// How long to wait after each calibration command.
    push_interval: Duration,
}

impl<'a> CoefficientDistributor<'a> {
    pub fn new(
        fleet: &'a PipelineFleet,
        beam: BeamId,
        push_interval: Duration,
    ) -> CoefficientDistributor<'a> {
        CoefficientDistributor {
            fleet,
            beam,
            push_interval,
        }
    }

    /// Work out which pipeline handles each block of the table's channels.
    /// Blocks that no pipeline handles are left out.
    pub fn subband_pipelines(&self, table: &CalibrationTable) -> Vec<(usize, usize)> {
        let mut mapped = Vec::with_capacity(NPIPELINE_SUBBAND);
        for block in 0..NPIPELINE_SUBBAND {
            let Some(centre_freq) = table.block_centre_freq(block) else {
                continue;
            };
            match self.fleet.lookup_pipeline(centre_freq) {
                Ok(index) => {
                    let range = self.fleet.pipelines()[index].frequency_range();
                    info!(
                        "Found pipeline {index} covering {:.3} to {:.3} MHz",
                        range.lo / 1e6,
                        range.hi / 1e6
                    );
                    mapped.push((block, index));
                }
                Err(e) => debug!("Channel block {block}: {e}"),
            }
        }

        if mapped.len() != NPIPELINE_SUBBAND {
            warn!(
                "Found {} pipelines associated with these data instead of the expected {NPIPELINE_SUBBAND}",
                mapped.len()
            );
        }
        mapped
    }

    /// Push the calibration coefficients of `table` to the pipelines handling
    /// its channels, one antenna and polarisation at a time. A pipeline only
    /// counts as calibrated if none of its commands failed.
    pub fn push_calibration(&self, table: &CalibrationTable) -> CalibrationPush {
        let mapped = self.subband_pipelines(table);
        let coefficients = table.coefficients();
        let num_ants = coefficients.len_of(Axis(0));

        let pb = ProgressBar::with_draw_target(
            Some((mapped.len() * num_ants) as _),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:17}: [{wide_bar:.blue}] {pos:3}/{len:3} antennas ({elapsed_precise}<{eta_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Calibrating");

        let mut push = CalibrationPush::default();
        for (i_mapped, &(block, index)) in mapped.iter().enumerate() {
            let chans = block * NCHAN_PIPELINE..(block + 1) * NCHAN_PIPELINE;
            let report = self.fleet.for_each_tolerant_in([index], |_, pipeline| {
                // A failed antenna doesn't stop the rest; the first error
                // stands for the pipeline.
                let mut first_error = None;
                let mut num_failed = 0;
                for (antenna, coeffs) in coefficients.outer_iter().enumerate() {
                    for pol in 0..NPOL {
                        let cal = coeffs.slice(s![chans.clone(), pol]).to_vec();
                        let slot = antenna_pol_slot(antenna, pol);
                        if let Err(e) = pipeline.handle().update_calibration_gains(
                            beam_pol_slot(self.beam, pol),
                            slot,
                            &cal,
                        ) {
                            debug!(
                                "{} (pipeline {}) antenna/pol slot {slot}: {e}",
                                pipeline.host(),
                                pipeline.pipeline_id()
                            );
                            num_failed += 1;
                            first_error.get_or_insert(e);
                        }
                        thread::sleep(self.push_interval);
                    }
                    pb.inc(1);
                }
                match first_error {
                    Some(e) => {
                        warn!(
                            "{num_failed} of {} calibration pushes to {} (pipeline {}) failed",
                            num_ants * NPOL,
                            pipeline.host(),
                            pipeline.pipeline_id()
                        );
                        Err(e)
                    }
                    None => Ok(()),
                }
            });
            pb.set_position(((i_mapped + 1) * num_ants) as _);

            if report.succeeded_on(index) {
                push.calibrated.push(index);
            }
            push.report.merge(report);
        }
        pb.finish();

        push
    }

    /// Push delays and amplitudes for polarisation `pol` to every pipeline.
    /// Both are laid out by [`antenna_pol_slot`].
    pub fn push_delays(&self, pol: usize, delays: &[f64], amps: &[f32]) -> BroadcastReport {
        let slot = beam_pol_slot(self.beam, pol);
        debug!("Sending delays for beam {} pol {pol} (slot {slot})", self.beam);
        self.fleet
            .for_each_tolerant(|_, pipeline| pipeline.handle().update_delays(slot, delays, amps))
    }
}
