// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with setting up and querying a fleet of pipelines.

use thiserror::Error;

use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("No servers were given to control")]
    NoHosts,

    #[error("Asked to control {got} servers, but there are only {max}")]
    TooManyServers { got: usize, max: usize },

    #[error("Asked to control {got} pipelines, but this must be between 1 and {max}")]
    BadPipelineCount { got: usize, max: usize },

    #[error("Couldn't connect to {host} (pipeline {pipeline_id}): {err}")]
    Connect {
        host: String,
        pipeline_id: usize,
        err: PipelineError,
    },

    #[error("{host} (pipeline {pipeline_id}) reports that it processes no channels")]
    NoChannels { host: String, pipeline_id: usize },

    #[error("Cannot associate {:.3} MHz with any pipeline currently under control", .freq_hz / 1e6)]
    NotFound { freq_hz: f64 },
}
