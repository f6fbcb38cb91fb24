// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration of a beam-control session.
//!
//! Configuration (and station descriptions) may be written as toml or json; the
//! format is chosen by the file extension. Every field is optional and falls
//! back to the defaults used on the OVRO-LWA X-engine.

use std::{
    fs::File,
    io::Read,
    net::IpAddr,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use itertools::Itertools;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::constants::*;

lazy_static::lazy_static! {
    pub(crate) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(crate) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Deserialise a toml or json file into `T`.
pub(crate) fn read_arg_file<T: DeserializeOwned>(file: &Path) -> Result<T, ConfigError> {
    debug!("Attempting to parse argument file {}", file.display());

    let arg_file_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| ArgFileTypes::from_str(&e).ok());

    let mut contents = String::new();
    match arg_file_type {
        Some(ArgFileTypes::Toml) => {
            debug!("Parsing toml file...");
            File::open(file)?.read_to_string(&mut contents)?;
            toml::from_str(&contents).map_err(|err| ConfigError::Decode {
                file: file.to_path_buf(),
                format: "toml",
                err: err.to_string(),
            })
        }
        Some(ArgFileTypes::Json) => {
            debug!("Parsing json file...");
            File::open(file)?.read_to_string(&mut contents)?;
            serde_json::from_str(&contents).map_err(|err| ConfigError::Decode {
                file: file.to_path_buf(),
                format: "json",
                err: err.to_string(),
            })
        }
        None => Err(ConfigError::UnknownExtension(file.to_path_buf())),
    }
}

/// A UDP destination for beam data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub addr: IpAddr,
    pub port: u16,
}

/// Everything needed to start controlling a beam.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeamControlConfig {
    /// The beam to control (1 to 16).
    pub beam: u8,

    /// The GPU servers to control. If not given, `nserver` default hostnames
    /// are generated.
    pub servers: Option<Vec<String>>,

    /// The number of servers used when `servers` isn't given.
    pub nserver: Option<usize>,

    /// The number of pipelines on each server.
    pub npipeline_per_server: Option<usize>,

    /// A directory containing bandpass calibration tables.
    pub cal_directory: Option<PathBuf>,

    /// Where the beam data is sent.
    pub destination: Option<Destination>,

    /// Where the VLBI copy of beam 1 is sent.
    pub vlbi_destination: Option<Destination>,

    /// How often a tracked target's pointing is refreshed \[seconds\].
    pub update_interval: Option<f64>,

    /// The pause between successive calibration pushes \[milliseconds\].
    pub cal_push_interval_ms: Option<u64>,
}

impl BeamControlConfig {
    pub fn read<P: AsRef<Path>>(file: P) -> Result<BeamControlConfig, ConfigError> {
        let config: BeamControlConfig = read_arg_file(file.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that can be checked without talking to anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=NBEAM).contains(&(self.beam as usize)) {
            return Err(ConfigError::Invalid(format!(
                "beam must be between 1 and {NBEAM}, got {}",
                self.beam
            )));
        }
        if let Some(interval) = self.update_interval {
            if !interval.is_finite() || interval <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "update_interval must be positive, got {interval}"
                )));
            }
        }
        if let Some(servers) = self.servers.as_ref() {
            if servers.is_empty() {
                return Err(ConfigError::Invalid(
                    "servers was given, but is empty".to_string(),
                ));
            }
        }

        let num_servers = match self.servers.as_ref() {
            Some(s) => s.len(),
            None => self.nserver.unwrap_or(DEFAULT_NSERVER),
        };
        if !(1..=NSERVER).contains(&num_servers) {
            return Err(ConfigError::Invalid(format!(
                "the number of servers must be between 1 and {NSERVER}, got {num_servers}"
            )));
        }
        let per_server = self.pipelines_per_host();
        match num_servers.checked_mul(per_server) {
            Some(n) if per_server > 0 && n <= NPIPELINE => (),
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "{num_servers} servers with {per_server} pipelines each is not between 1 and {NPIPELINE} pipelines"
                )))
            }
        }
        Ok(())
    }

    /// The servers to connect to.
    pub fn hosts(&self) -> Vec<String> {
        match self.servers.as_ref() {
            Some(s) => s.clone(),
            None => (1..=self.nserver.unwrap_or(DEFAULT_NSERVER))
                .map(default_hostname)
                .collect(),
        }
    }

    pub fn pipelines_per_host(&self) -> usize {
        self.npipeline_per_server
            .unwrap_or(DEFAULT_NPIPELINE_PER_SERVER)
    }

    pub fn cal_directory(&self) -> &Path {
        self.cal_directory
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CAL_DIRECTORY))
    }

    pub fn destination(&self) -> Destination {
        self.destination.unwrap_or(Destination {
            addr: DEFAULT_BEAM_DEST_ADDR,
            port: DEFAULT_BEAM_DEST_PORT,
        })
    }

    pub fn vlbi_destination(&self) -> Destination {
        self.vlbi_destination.unwrap_or(Destination {
            addr: DEFAULT_VLBI_DEST_ADDR,
            port: DEFAULT_VLBI_DEST_PORT,
        })
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
            .map(Duration::from_secs_f64)
            .unwrap_or(DEFAULT_UPDATE_INTERVAL)
    }

    pub fn cal_push_interval(&self) -> Duration {
        self.cal_push_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CAL_PUSH_INTERVAL)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File '{0}' doesn't have a recognised file extension! Valid extensions are: {}", *ARG_FILE_TYPES_COMMA_SEPARATED)]
    UnknownExtension(PathBuf),

    #[error("Couldn't decode {format} structure from {file:?}:\n{err}")]
    Decode {
        file: PathBuf,
        format: &'static str,
        err: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
