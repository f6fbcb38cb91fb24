// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The beamctl binary: offline tools for OVRO-LWA beam control.

use clap::Parser;

use lwa_beamctl::{Beamctl, BeamctlError};

fn main() {
    // Returning a `Result` from main would print the `Debug` representation
    // of the error; print the `Display` one instead.
    if let Err(e) = try_main() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), BeamctlError> {
    Beamctl::parse().run()
}
