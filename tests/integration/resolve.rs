// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{beamctl, get_cmd_output, make_file_in_dir};

#[test]
fn test_resolve_the_pole() {
    let cmd = beamctl().args(["resolve", "0", "90"]).ok();
    assert!(cmd.is_ok(), "resolve failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("Altitude:"), "{stdout}");
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_resolve_names_need_a_catalog() {
    let cmd = beamctl().args(["resolve", "Cyg A"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("catalog"), "{stderr}");

    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = make_file_in_dir(
        "catalog.toml",
        tmp_dir.path(),
        indoc::indoc! {r#"
            [sources."Cyg A"]
            ra = "19h59m28.36s"
            dec = "40d44m02.1s"
        "#},
    );
    #[rustfmt::skip]
    let cmd = beamctl()
        .args([
            "resolve", "cyg a",
            "--catalog", &format!("{}", catalog.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "resolve failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Azimuth:"), "{stdout}");
}
