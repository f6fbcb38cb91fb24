// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{beamctl, get_cmd_output, make_file_in_dir};

#[test]
fn test_config_verify() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir(
        "beam3.toml",
        tmp_dir.path(),
        &indoc::formatdoc!(
            r#"
                beam = 3
                servers = ["gpu01", "gpu02"]
                npipeline_per_server = 2
                cal_directory = "{}"
                destination = {{ addr = "10.41.0.30", port = 20003 }}
                update_interval = 15.0
            "#,
            tmp_dir.path().display()
        ),
    );

    let cmd = beamctl()
        .args(["config-verify", &format!("{}", config.display())])
        .ok();
    assert!(cmd.is_ok(), "config-verify failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("Beam 3"), "{stdout}");
    assert!(stdout.contains("gpu01, gpu02"), "{stdout}");
    assert!(stdout.contains("10.41.0.30:20003"), "{stdout}");
    assert!(stdout.contains("0 calibration tables"), "{stdout}");
    assert!(!stdout.contains("VLBI"), "{stdout}");
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_config_verify_rejects_bad_beams() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir("beam.toml", tmp_dir.path(), "beam = 20\n");

    let cmd = beamctl()
        .args(["config-verify", &format!("{}", config.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("beam must be between 1 and 16"), "{stderr}");
}

#[test]
fn test_config_verify_needs_a_known_format() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir("beam.yaml", tmp_dir.path(), "beam: 2\n");

    let cmd = beamctl()
        .args(["config-verify", &format!("{}", config.display())])
        .ok();
    assert!(cmd.is_err());
}
