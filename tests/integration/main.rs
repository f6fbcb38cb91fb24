// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests of the beamctl binary.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod cal_verify;
mod config_verify;
mod delays;
mod resolve;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

fn beamctl() -> Command {
    Command::cargo_bin("beamctl").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn make_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(
    filename: T,
    dir: U,
    contents: &str,
) -> PathBuf {
    let path = dir.as_ref().join(filename);
    let mut f = File::create(&path).expect("couldn't make file");
    f.write_all(contents.as_bytes()).expect("couldn't write file");
    path
}

/// A two-antenna station: one at the centre and one 10 m east of it.
fn two_antenna_station(dir: &Path) -> PathBuf {
    make_file_in_dir(
        "station.toml",
        dir,
        indoc::indoc! {r#"
            name = "pair"

            [[antennas]]
            index = 0
            e = 0.0
            n = 0.0
            z = 0.0

            [[antennas]]
            index = 1
            e = 10.0
            n = 0.0
            z = 0.0
        "#},
    )
}
