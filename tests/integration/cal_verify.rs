// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{beamctl, get_cmd_output};

#[test]
fn test_cal_verify_without_tables() {
    let cmd = beamctl().args(["cal-verify"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("No calibration tables"), "{stderr}");

    // An empty directory has no tables either.
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    #[rustfmt::skip]
    let cmd = beamctl()
        .args([
            "cal-verify",
            "--cal-dir", &format!("{}", tmp_dir.path().display()),
        ])
        .ok();
    assert!(cmd.is_err());
}

#[test]
fn test_cal_verify_reports_bad_tables() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    // A directory, but not a CASA table.
    let fake = tmp_dir.path().join("fake.bcal");
    std::fs::create_dir(&fake).unwrap();

    let cmd = beamctl()
        .args(["cal-verify", &format!("{}", fake.display())])
        .ok();
    assert!(cmd.is_err());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("SPECTRAL_WINDOW"), "{stdout}");
    assert!(stderr.contains("1 of 1 calibration tables"), "{stderr}");
}
