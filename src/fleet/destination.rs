// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The beam destination tables shared by every beam on a pipeline.
//!
//! Each pipeline has one 16-slot table of (address, port) pairs, one slot per
//! beam. Several beams may be controlled at the same time against the same
//! pipelines, so updating a single slot must not lose another beam's update.
//! The [`DestinationCoordinator`] keeps the authoritative copy of each table;
//! its lock covers only the local read-patch of a table and never a remote
//! call.

use std::{
    net::IpAddr,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::debug;

use crate::{
    config::Destination,
    constants::NBEAM,
    pipeline::{PipelineControl, PipelineError},
};

/// A full beam destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTable {
    pub addrs: [IpAddr; NBEAM],
    pub ports: [u16; NBEAM],
}

impl DestinationTable {
    /// Build a table from what a pipeline reports. Pipelines may report fewer
    /// than 16 entries; the reported entries are then repeated to fill the
    /// table. Extra entries are dropped.
    pub fn from_reported(addrs: &[IpAddr], ports: &[u16]) -> Result<Self, PipelineError> {
        if addrs.is_empty() || ports.is_empty() {
            return Err(PipelineError::MalformedStatus(
                "no beam destinations were reported".to_string(),
            ));
        }
        Ok(DestinationTable {
            addrs: std::array::from_fn(|i| addrs[i % addrs.len()]),
            ports: std::array::from_fn(|i| ports[i % ports.len()]),
        })
    }

    /// The destination of the zero-indexed beam slot `slot`.
    pub fn get(&self, slot: usize) -> Option<Destination> {
        Some(Destination {
            addr: *self.addrs.get(slot)?,
            port: *self.ports.get(slot)?,
        })
    }

    fn patch(&mut self, slot: usize, dest: Destination) {
        self.addrs[slot] = dest.addr;
        self.ports[slot] = dest.port;
    }
}

struct VersionedTable {
    table: DestinationTable,
    /// Bumped on every patch.
    version: u64,
}

pub struct DestinationCoordinator {
    tables: Mutex<Vec<Option<VersionedTable>>>,
}

impl DestinationCoordinator {
    pub(super) fn new(num_pipelines: usize) -> DestinationCoordinator {
        DestinationCoordinator {
            tables: Mutex::new((0..num_pipelines).map(|_| None).collect()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<VersionedTable>>> {
        // A table is always left consistent, even by a panicking holder.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current table for the pipeline at fleet index `index`, if it has
    /// ever been touched.
    pub fn table(&self, index: usize) -> Option<DestinationTable> {
        self.lock()
            .get(index)
            .and_then(|t| t.as_ref())
            .map(|t| t.table.clone())
    }

    /// Point the zero-indexed beam slot `slot` of the pipeline at fleet index
    /// `index` at `dest`, leaving every other slot as it is.
    ///
    /// The first time a pipeline's table is needed, it is seeded from what the
    /// pipeline reports. After the table is written to the pipeline, if
    /// another beam patched the same table in the meantime, the newest table
    /// is written again so that the pipeline ends up with every beam's
    /// update.
    pub fn patch_slot(
        &self,
        index: usize,
        pipeline: &dyn PipelineControl,
        slot: usize,
        dest: Destination,
    ) -> Result<(), PipelineError> {
        if slot >= NBEAM {
            return Err(PipelineError::Rejected(format!(
                "beam destination slot {slot} is out of range"
            )));
        }

        let needs_seed = matches!(self.lock().get(index), Some(None));
        let seed = if needs_seed {
            let status = pipeline.get_status()?;
            Some(DestinationTable::from_reported(
                &status.dest_addrs,
                &status.dest_ports,
            )?)
        } else {
            None
        };

        let (mut table, mut version) = {
            let mut tables = self.lock();
            let entry = tables.get_mut(index).ok_or_else(|| {
                PipelineError::Rejected(format!("no pipeline at fleet index {index}"))
            })?;
            if entry.is_none() {
                if let Some(table) = seed {
                    *entry = Some(VersionedTable { table, version: 0 });
                }
            }
            let entry = entry.as_mut().ok_or_else(|| {
                PipelineError::MalformedStatus("destination table was never seeded".to_string())
            })?;
            entry.table.patch(slot, dest);
            entry.version += 1;
            (entry.table.clone(), entry.version)
        };

        loop {
            debug!("Sending beam destination table version {version} to pipeline index {index}");
            pipeline.set_destination(&table.addrs, &table.ports)?;

            let tables = self.lock();
            match tables.get(index).and_then(|t| t.as_ref()) {
                Some(latest) if latest.version > version => {
                    table = latest.table.clone();
                    version = latest.version;
                }
                _ => return Ok(()),
            }
        }
    }
}
