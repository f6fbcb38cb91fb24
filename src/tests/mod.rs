// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful things for tests: a pipeline that records what it's told.

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
};

use crossbeam_utils::atomic::AtomicCell;
use marlu::c32;

use crate::{
    constants::{NBEAM, NCHAN_PIPELINE, NSTAND},
    pipeline::{PipelineConnector, PipelineControl, PipelineError, PipelineStatus},
    station::{Enz, Station},
};

/// The first channel of the first mock pipeline. Pipeline `i` starts at
/// `MOCK_CHAN0 + i * NCHAN_PIPELINE`.
pub(crate) const MOCK_CHAN0: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GetStatus,
    SetDestination {
        addrs: Vec<IpAddr>,
        ports: Vec<u16>,
    },
    UpdateDelays {
        slot: usize,
        delays: Vec<f64>,
        amps: Vec<f32>,
    },
    UpdateCalibrationGains {
        slot: usize,
        antenna_pol_slot: usize,
        gains: Vec<c32>,
    },
    SetVlbiDestination {
        addr: IpAddr,
        port: u16,
    },
}

struct MockState {
    status: Mutex<PipelineStatus>,
    calls: Mutex<Vec<Call>>,
    failing: AtomicCell<bool>,
    failing_antenna_pol_slot: AtomicCell<Option<usize>>,
}

/// A pipeline that records every command. Clones share the same record, so a
/// test can keep one while the fleet owns another.
#[derive(Clone)]
pub(crate) struct MockPipeline(Arc<MockState>);

impl MockPipeline {
    pub(crate) fn new(chan0: usize, nchan: usize) -> MockPipeline {
        MockPipeline(Arc::new(MockState {
            status: Mutex::new(PipelineStatus {
                chan0,
                nchan,
                dest_addrs: vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))],
                dest_ports: vec![10000],
            }),
            calls: Mutex::new(vec![]),
            failing: AtomicCell::new(false),
            failing_antenna_pol_slot: AtomicCell::new(None),
        }))
    }

    /// Make every subsequent command fail (or succeed again).
    pub(crate) fn set_failing(&self, failing: bool) {
        self.0.failing.store(failing);
    }

    /// Make calibration updates for this antenna/polarisation slot fail.
    pub(crate) fn fail_antenna_pol_slot(&self, slot: usize) {
        self.0.failing_antenna_pol_slot.store(Some(slot));
    }

    pub(crate) fn set_reported_destinations(&self, addrs: Vec<IpAddr>, ports: Vec<u16>) {
        let mut status = self.0.status.lock().unwrap();
        status.dest_addrs = addrs;
        status.dest_ports = ports;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.calls.lock().unwrap().clone()
    }

    /// All calls other than status queries.
    pub(crate) fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::GetStatus))
            .collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.0.calls.lock().unwrap().clear();
    }

    pub(crate) fn destinations(&self) -> (Vec<IpAddr>, Vec<u16>) {
        let status = self.0.status.lock().unwrap();
        (status.dest_addrs.clone(), status.dest_ports.clone())
    }

    fn record(&self, call: Call) -> Result<(), PipelineError> {
        if self.0.failing.load() {
            return Err(PipelineError::Unreachable("mock pipeline is down".to_string()));
        }
        self.0.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl PipelineControl for MockPipeline {
    fn get_status(&self) -> Result<PipelineStatus, PipelineError> {
        self.record(Call::GetStatus)?;
        Ok(self.0.status.lock().unwrap().clone())
    }

    fn set_destination(
        &self,
        addrs: &[IpAddr; NBEAM],
        ports: &[u16; NBEAM],
    ) -> Result<(), PipelineError> {
        self.record(Call::SetDestination {
            addrs: addrs.to_vec(),
            ports: ports.to_vec(),
        })?;
        self.set_reported_destinations(addrs.to_vec(), ports.to_vec());
        Ok(())
    }

    fn update_delays(
        &self,
        slot: usize,
        delays: &[f64],
        amps: &[f32],
    ) -> Result<(), PipelineError> {
        self.record(Call::UpdateDelays {
            slot,
            delays: delays.to_vec(),
            amps: amps.to_vec(),
        })
    }

    fn update_calibration_gains(
        &self,
        slot: usize,
        antenna_pol_slot: usize,
        gains: &[c32],
    ) -> Result<(), PipelineError> {
        if self.0.failing_antenna_pol_slot.load() == Some(antenna_pol_slot) {
            return Err(PipelineError::Unreachable(format!(
                "mock pipeline rejected antenna/pol slot {antenna_pol_slot}"
            )));
        }
        self.record(Call::UpdateCalibrationGains {
            slot,
            antenna_pol_slot,
            gains: gains.to_vec(),
        })
    }

    fn set_vlbi_destination(&self, addr: IpAddr, port: u16) -> Result<(), PipelineError> {
        self.record(Call::SetVlbiDestination { addr, port })
    }
}

/// Hands out [`MockPipeline`]s covering consecutive blocks of
/// [`NCHAN_PIPELINE`] channels, in connection order.
pub(crate) struct MockConnector {
    pub(crate) pipelines: Mutex<Vec<(String, usize, MockPipeline)>>,
    /// Connecting to this (host, pipeline id) fails.
    pub(crate) unreachable: Option<(String, usize)>,
}

impl MockConnector {
    pub(crate) fn new() -> MockConnector {
        MockConnector {
            pipelines: Mutex::new(vec![]),
            unreachable: None,
        }
    }

    /// The mock pipelines in connection order.
    pub(crate) fn handles(&self) -> Vec<MockPipeline> {
        self.pipelines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, p)| p.clone())
            .collect()
    }
}

impl PipelineConnector for MockConnector {
    fn connect(
        &self,
        host: &str,
        pipeline_id: usize,
    ) -> Result<Box<dyn PipelineControl>, PipelineError> {
        if let Some((h, i)) = self.unreachable.as_ref() {
            if h == host && *i == pipeline_id {
                return Err(PipelineError::Unreachable(format!("{host}/{pipeline_id}")));
            }
        }
        let mut pipelines = self.pipelines.lock().unwrap();
        let pipeline = MockPipeline::new(
            MOCK_CHAN0 + pipelines.len() * NCHAN_PIPELINE,
            NCHAN_PIPELINE,
        );
        pipelines.push((host.to_string(), pipeline_id, pipeline.clone()));
        Ok(Box::new(pipeline))
    }
}

pub(crate) fn hosts(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("gpu{i:02}")).collect()
}

/// A full-size station with every antenna at the array centre, except for
/// those given.
pub(crate) fn station_with(offsets: &[(usize, Enz)]) -> Station {
    let mut positions = vec![Enz::default(); NSTAND];
    for &(i, enz) in offsets {
        positions[i] = enz;
    }
    Station::ovro_with_positions(&positions).unwrap()
}
