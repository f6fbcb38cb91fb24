// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fleet of pipelines under the control of a beam-control session.
//!
//! Every command sent to "all pipelines" goes through
//! [`PipelineFleet::for_each_tolerant`]: a pipeline that can't be reached or
//! rejects a command is reported and skipped, and the rest of the fleet still
//! gets the command.

mod destination;
mod error;

pub use destination::{DestinationCoordinator, DestinationTable};
pub use error::FleetError;

use log::{debug, info, trace, warn};
use vec1::Vec1;

use crate::{
    constants::{NPIPELINE, NSERVER},
    pipeline::{FrequencyRange, PipelineConnector, PipelineControl, PipelineError},
};

/// One remote beamforming pipeline.
pub struct Pipeline {
    host: String,
    pipeline_id: usize,

    /// Derived from the pipeline's reported channels when it was connected.
    frequency_range: FrequencyRange,

    handle: Box<dyn PipelineControl>,
}

impl Pipeline {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn pipeline_id(&self) -> usize {
        self.pipeline_id
    }

    pub fn frequency_range(&self) -> FrequencyRange {
        self.frequency_range
    }

    pub fn handle(&self) -> &dyn PipelineControl {
        self.handle.as_ref()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("host", &self.host)
            .field("pipeline_id", &self.pipeline_id)
            .field("frequency_range", &self.frequency_range)
            .finish()
    }
}

/// A pipeline that failed during a fleet-wide operation.
#[derive(Debug)]
pub struct NodeFailure {
    /// The index of the pipeline in the fleet.
    pub index: usize,
    pub host: String,
    pub pipeline_id: usize,
    pub error: PipelineError,
}

/// The per-pipeline outcome of a fleet-wide operation.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    /// Fleet indices of the pipelines for which the operation succeeded.
    pub succeeded: Vec<usize>,
    pub failed: Vec<NodeFailure>,
}

impl BroadcastReport {
    /// Did every targeted pipeline succeed?
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn succeeded_on(&self, index: usize) -> bool {
        self.succeeded.contains(&index)
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: BroadcastReport) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }
}

pub struct PipelineFleet {
    pipelines: Vec1<Pipeline>,
    destinations: DestinationCoordinator,
}

impl PipelineFleet {
    /// Connect to `pipelines_per_host` pipelines on each of `hosts`, in
    /// host-major order, and work out which frequencies each pipeline
    /// handles. Any pipeline that can't be connected to fails the whole
    /// operation.
    pub fn connect<C: PipelineConnector + ?Sized>(
        hosts: &[String],
        pipelines_per_host: usize,
        connector: &C,
    ) -> Result<PipelineFleet, FleetError> {
        if hosts.is_empty() {
            return Err(FleetError::NoHosts);
        }
        if hosts.len() > NSERVER {
            return Err(FleetError::TooManyServers {
                got: hosts.len(),
                max: NSERVER,
            });
        }
        let num_pipelines = hosts.len() * pipelines_per_host;
        if pipelines_per_host == 0 || num_pipelines > NPIPELINE {
            return Err(FleetError::BadPipelineCount {
                got: num_pipelines,
                max: NPIPELINE,
            });
        }

        let mut pipelines = Vec::with_capacity(num_pipelines);
        for host in hosts {
            for pipeline_id in 0..pipelines_per_host {
                let handle = connector.connect(host, pipeline_id).map_err(|e| {
                    FleetError::Connect {
                        host: host.clone(),
                        pipeline_id,
                        err: e,
                    }
                })?;
                let status = handle.get_status().map_err(|e| FleetError::Connect {
                    host: host.clone(),
                    pipeline_id,
                    err: e,
                })?;
                let frequency_range =
                    status
                        .frequency_range()
                        .ok_or_else(|| FleetError::NoChannels {
                            host: host.clone(),
                            pipeline_id,
                        })?;
                debug!(
                    "{host} pipeline {pipeline_id} covers {:.3} to {:.3} MHz",
                    frequency_range.lo / 1e6,
                    frequency_range.hi / 1e6
                );

                pipelines.push(Pipeline {
                    host: host.clone(),
                    pipeline_id,
                    frequency_range,
                    handle,
                });
            }
        }
        info!(
            "Connected to {} pipelines on {} servers",
            pipelines.len(),
            hosts.len()
        );

        let destinations = DestinationCoordinator::new(pipelines.len());
        let pipelines = Vec1::try_from_vec(pipelines).map_err(|_| FleetError::NoHosts)?;
        Ok(PipelineFleet {
            pipelines,
            destinations,
        })
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// A connected fleet always has at least one pipeline.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    pub fn pipeline(&self, index: usize) -> Option<&Pipeline> {
        self.pipelines.get(index)
    }

    /// The fleet's beam destination tables.
    pub fn destinations(&self) -> &DestinationCoordinator {
        &self.destinations
    }

    /// Get the index of the first pipeline that handles `freq_hz`.
    pub fn lookup_pipeline(&self, freq_hz: f64) -> Result<usize, FleetError> {
        self.pipelines
            .iter()
            .position(|p| p.frequency_range.contains(freq_hz))
            .ok_or(FleetError::NotFound { freq_hz })
    }

    /// Run `op` on every pipeline. A failing pipeline is logged and recorded
    /// in the returned report, and the remaining pipelines are still visited.
    pub fn for_each_tolerant<F>(&self, op: F) -> BroadcastReport
    where
        F: FnMut(usize, &Pipeline) -> Result<(), PipelineError>,
    {
        self.for_each_tolerant_in(0..self.pipelines.len(), op)
    }

    /// The same as [`PipelineFleet::for_each_tolerant`], but only for the
    /// pipelines at `indices`. Indices that don't refer to a pipeline are
    /// ignored.
    pub fn for_each_tolerant_in<I, F>(&self, indices: I, mut op: F) -> BroadcastReport
    where
        I: IntoIterator<Item = usize>,
        F: FnMut(usize, &Pipeline) -> Result<(), PipelineError>,
    {
        let mut report = BroadcastReport::default();
        for index in indices {
            let Some(pipeline) = self.pipelines.get(index) else {
                continue;
            };
            match op(index, pipeline) {
                Ok(()) => {
                    trace!("Commanded {} (pipeline {})", pipeline.host, pipeline.pipeline_id);
                    report.succeeded.push(index);
                }
                Err(e) => {
                    warn!(
                        "Failed to command {} (pipeline {}): {e}",
                        pipeline.host, pipeline.pipeline_id
                    );
                    report.failed.push(NodeFailure {
                        index,
                        host: pipeline.host.clone(),
                        pipeline_id: pipeline.pipeline_id,
                        error: e,
                    });
                }
            }
        }
        report
    }
}
