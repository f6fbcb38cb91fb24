// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use approx::assert_abs_diff_eq;
use marlu::c32;
use ndarray::prelude::*;
use tempfile::TempDir;

use super::*;
use crate::constants::{chan_to_freq, NCHAN_PIPELINE};

/// Hands back whatever it was made with.
pub(crate) struct InMemoryReader(pub(crate) RawCalibration);

impl CalibrationReader for InMemoryReader {
    fn read(&self, _path: &Path) -> Result<RawCalibration, CalibrationError> {
        Ok(self.0.clone())
    }
}

/// A full-size calibration starting at channel `chan0`, with every gain set to
/// `gain`.
pub(crate) fn uniform_raw(chan0: usize, gain: c32) -> RawCalibration {
    RawCalibration {
        gains: Array3::from_elem((NSTAND, NCHAN_CAL, NPOL), gain),
        flags: Array3::from_elem((NSTAND, NCHAN_CAL, NPOL), false),
        chan_freqs: (chan0..chan0 + NCHAN_CAL).map(chan_to_freq).collect(),
    }
}

/// A directory that looks like a calibration table.
pub(crate) fn fake_bcal_dir(parent: &Path, name: &str) -> PathBuf {
    let path = parent.join(name);
    fs::create_dir_all(path.join("SPECTRAL_WINDOW")).unwrap();
    path
}

#[test]
fn gains_are_normalised_on_load() {
    let table = CalibrationTable::from_raw(uniform_raw(1000, c32::new(3.0, 4.0))).unwrap();
    for g in table.gains() {
        assert_abs_diff_eq!(g.norm(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(g.re, 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(g.im, 0.8, epsilon = 1e-6);
    }
}

#[test]
fn wrong_dimensions_are_malformed() {
    let mut raw = uniform_raw(1000, c32::new(1.0, 0.0));
    raw.gains = Array3::default((NSTAND - 1, NCHAN_CAL, NPOL));
    raw.flags = Array3::default((NSTAND - 1, NCHAN_CAL, NPOL));
    assert!(matches!(
        CalibrationTable::from_raw(raw),
        Err(CalibrationError::MalformedCalibration {
            what: "antennas",
            expected: NSTAND,
            got: 351
        })
    ));

    let mut raw = uniform_raw(1000, c32::new(1.0, 0.0));
    raw.gains = Array3::default((NSTAND, NCHAN_CAL, 4));
    raw.flags = Array3::default((NSTAND, NCHAN_CAL, 4));
    assert!(matches!(
        CalibrationTable::from_raw(raw),
        Err(CalibrationError::MalformedCalibration {
            what: "polarisations",
            ..
        })
    ));

    let mut raw = uniform_raw(1000, c32::new(1.0, 0.0));
    raw.chan_freqs.pop();
    assert!(matches!(
        CalibrationTable::from_raw(raw),
        Err(CalibrationError::MalformedCalibration {
            what: "channel frequencies",
            ..
        })
    ));

    let mut raw = uniform_raw(1000, c32::new(1.0, 0.0));
    raw.flags = Array3::default((NSTAND, NCHAN_CAL, 1));
    assert!(matches!(
        CalibrationTable::from_raw(raw),
        Err(CalibrationError::Inconsistent(_))
    ));
}

#[test]
fn zero_and_flagged_gains_give_zero_coefficients() {
    let mut raw = uniform_raw(1000, c32::new(0.0, 2.0));
    // A zero gain can't be inverted.
    raw.gains[(5, 10, 0)] = c32::new(0.0, 0.0);
    // A perfectly good gain that is flagged.
    raw.gains[(7, 20, 1)] = c32::new(1.0, 0.0);
    raw.flags[(7, 20, 1)] = true;
    let table = CalibrationTable::from_raw(raw).unwrap();
    assert_eq!(table.num_flagged(), 1);

    let cal = table.coefficients();
    assert_eq!(cal.dim(), (NSTAND, NCHAN_CAL, NPOL));
    assert_eq!(cal[(5, 10, 0)], c32::new(0.0, 0.0));
    assert_eq!(cal[(7, 20, 1)], c32::new(0.0, 0.0));
    // The other polarisation of the zero gain is fine.
    assert_eq!(cal[(5, 10, 1)], c32::new(0.0, -1.0));
    // 1 / (0 + 1i) = -1i everywhere else.
    let num_zero = cal.iter().filter(|c| c.re == 0.0 && c.im == 0.0).count();
    assert_eq!(num_zero, 2);
    let num_expected = cal.iter().filter(|&&c| c == c32::new(0.0, -1.0)).count();
    assert_eq!(num_expected, NSTAND * NCHAN_CAL * NPOL - 2);
}

#[test]
fn coefficients_match_a_hand_computed_reference() {
    let mut raw = uniform_raw(1000, c32::new(1.0, 0.0));
    let reference = [
        (c32::new(2.0, 0.0), c32::new(1.0, 0.0)),
        (c32::new(-5.0, 0.0), c32::new(-1.0, 0.0)),
        (c32::new(0.0, 0.5), c32::new(0.0, -1.0)),
        (c32::new(0.0, -3.0), c32::new(0.0, 1.0)),
        (c32::new(3.0, 4.0), c32::new(0.6, -0.8)),
        (c32::new(-4.0, 3.0), c32::new(-0.8, -0.6)),
    ];
    for (ant, (gain, _)) in reference.iter().enumerate() {
        raw.gains.slice_mut(s![ant, .., ..]).fill(*gain);
    }
    raw.flags.slice_mut(s![100, .., 0]).fill(true);
    let cal = CalibrationTable::from_raw(raw).unwrap().coefficients();

    for (ant, (_, expected)) in reference.iter().enumerate() {
        for c in cal.slice(s![ant, .., ..]) {
            assert_abs_diff_eq!(c.re, expected.re, epsilon = 1e-6);
            assert_abs_diff_eq!(c.im, expected.im, epsilon = 1e-6);
        }
    }
    for c in cal.slice(s![100, .., 0]) {
        assert_eq!(*c, c32::default());
    }
    for c in cal.slice(s![100, .., 1]) {
        assert_eq!(*c, c32::new(1.0, 0.0));
    }
}

#[test]
fn block_centre_frequencies() {
    let table = CalibrationTable::from_raw(uniform_raw(1000, c32::new(1.0, 0.0))).unwrap();
    assert_eq!(
        table.block_centre_freq(0),
        Some(chan_to_freq(1000 + NCHAN_PIPELINE / 2))
    );
    assert_eq!(
        table.block_centre_freq(1),
        Some(chan_to_freq(1000 + NCHAN_PIPELINE + NCHAN_PIPELINE / 2))
    );
    assert_eq!(table.block_centre_freq(2), None);
}

#[test]
fn load_checks_the_artifact_structure() {
    let dir = TempDir::new().unwrap();
    let reader = InMemoryReader(uniform_raw(1000, c32::new(1.0, 0.0)));

    let missing = dir.path().join("missing.bcal");
    assert!(matches!(
        CalibrationTable::load_with(&missing, &reader),
        Err(CalibrationError::NotADirectory(_))
    ));

    let no_spw = dir.path().join("no_spw.bcal");
    fs::create_dir(&no_spw).unwrap();
    assert!(matches!(
        CalibrationTable::load_with(&no_spw, &reader),
        Err(CalibrationError::NoSpectralWindow(_))
    ));

    let good = fake_bcal_dir(dir.path(), "good.bcal");
    let table = CalibrationTable::load_with(&good, &reader).unwrap();
    assert_eq!(table.chan_freqs().len(), NCHAN_CAL);
}

#[test]
fn cal_tables_are_found_and_sorted() {
    let dir = TempDir::new().unwrap();
    fake_bcal_dir(dir.path(), "b.bcal");
    fake_bcal_dir(dir.path(), "a.bcal");
    fs::write(dir.path().join("notes.txt"), "not a table").unwrap();

    let found = find_cal_tables(dir.path()).unwrap();
    assert_eq!(
        found,
        vec![dir.path().join("a.bcal"), dir.path().join("b.bcal")]
    );

    let empty = TempDir::new().unwrap();
    assert!(find_cal_tables(empty.path()).unwrap().is_empty());
}
