// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from talking to a single pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Couldn't reach the pipeline: {0}")]
    Unreachable(String),

    #[error("The pipeline rejected the command: {0}")]
    Rejected(String),

    #[error("The pipeline reported a malformed status: {0}")]
    MalformedStatus(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
