// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{beamctl, get_cmd_output, two_antenna_station};

#[test]
fn test_delays_towards_the_east() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let station = two_antenna_station(tmp_dir.path());
    let out = tmp_dir.path().join("delays.json");

    #[rustfmt::skip]
    let cmd = beamctl()
        .args([
            "delays",
            "--station", &format!("{}", station.display()),
            "--az", "90",
            "--alt", "0",
            "--json",
            "--output", &format!("{}", out.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "delays failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let delays = json["delays_ns"].as_array().unwrap();
    assert_eq!(delays.len(), 2);
    assert_abs_diff_eq!(delays[0].as_f64().unwrap(), 33.35641, epsilon = 1e-4);
    assert_abs_diff_eq!(delays[1].as_f64().unwrap(), 0.0);
    assert_abs_diff_eq!(json["azimuth_deg"].as_f64().unwrap(), 90.0, epsilon = 1e-9);
}

#[test]
fn test_zenith_delays_as_text() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let station = two_antenna_station(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = beamctl()
        .args([
            "delays",
            "--station", &format!("{}", station.display()),
            "--target", "zenith",
        ])
        .ok();
    assert!(cmd.is_ok(), "delays failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("# antenna delay_ns"), "{stdout}");
    assert!(stdout.contains("\n0 0.000000\n"), "{stdout}");
    assert!(stdout.contains("\n1 0.000000\n"), "{stdout}");
}

#[test]
fn test_delays_below_the_horizon_fail() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let station = two_antenna_station(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = beamctl()
        .args([
            "delays",
            "--station", &format!("{}", station.display()),
            "--az", "10",
            "--alt", "-5",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("below the horizon"), "{stderr}");
}

#[test]
fn test_delays_need_a_direction() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let station = two_antenna_station(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = beamctl()
        .args([
            "delays",
            "--station", &format!("{}", station.display()),
            "--az", "10",
        ])
        .ok();
    assert!(cmd.is_err());
}
